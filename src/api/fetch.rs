// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use bytes::Bytes;
use url::Url;

use crate::error::FetchError;
use crate::http::HttpClient;

use super::schema::RawEpisode;

/// Number of episodes requested per regeneration
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Build the paginated episodes query URL, newest first
pub fn episodes_url(api_base: &str, limit: usize) -> Result<Url, FetchError> {
    let invalid = |source| FetchError::InvalidBaseUrl {
        base: api_base.to_string(),
        source,
    };

    // Without a trailing slash `join` would replace the last path segment
    let mut base = Url::parse(api_base).map_err(invalid)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    let mut url = base.join("episodes").map_err(invalid)?;
    url.query_pairs_mut()
        .append_pair("_limit", &limit.to_string())
        .append_pair("_sort", "published_at")
        .append_pair("_order", "desc");

    Ok(url)
}

/// Fetch the raw response body of the episodes query (without parsing)
pub async fn fetch_episodes_bytes<C: HttpClient + ?Sized>(
    client: &C,
    url: &Url,
) -> Result<Bytes, FetchError> {
    let response = client
        .get(url.as_str())
        .await
        .map_err(|e| FetchError::RequestFailed {
            url: url.to_string(),
            source: e,
        })?;

    if !response.is_success() {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    Ok(response.body)
}

/// Parse the episodes query response into raw records
pub fn parse_episodes(body: &[u8], url: &Url) -> Result<Vec<RawEpisode>, FetchError> {
    serde_json::from_slice(body).map_err(|e| FetchError::MalformedJson {
        url: url.to_string(),
        source: e,
    })
}

/// Fetch and parse one page of episodes from a query built by [`episodes_url`]
pub async fn fetch_episodes<C: HttpClient + ?Sized>(
    client: &C,
    url: &Url,
) -> Result<Vec<RawEpisode>, FetchError> {
    let body = fetch_episodes_bytes(client, url).await?;
    parse_episodes(&body, url)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::http::HttpResponse;

    struct MockHttpClient {
        status: u16,
        body: &'static str,
        requested: Mutex<Vec<String>>,
    }

    impl MockHttpClient {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn get(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
            self.requested.lock().unwrap().push(url.to_string());
            Ok(HttpResponse {
                status: self.status,
                body: Bytes::from_static(self.body.as_bytes()),
            })
        }
    }

    fn local_query() -> Url {
        episodes_url("http://localhost:3333", 12).unwrap()
    }

    #[test]
    fn episodes_url_carries_pagination_and_sort() {
        let url = episodes_url("http://localhost:3333", 12).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3333/episodes?_limit=12&_sort=published_at&_order=desc"
        );
    }

    #[test]
    fn episodes_url_keeps_base_path() {
        let url = episodes_url("https://api.example.com/v1", 5).unwrap();
        assert_eq!(url.path(), "/v1/episodes");

        let url = episodes_url("https://api.example.com/v1/", 5).unwrap();
        assert_eq!(url.path(), "/v1/episodes");
    }

    #[test]
    fn episodes_url_rejects_garbage() {
        let err = episodes_url("not a url", 12).unwrap_err();
        assert!(matches!(err, FetchError::InvalidBaseUrl { .. }));
    }

    #[tokio::test]
    async fn fetch_episodes_parses_records() {
        let client = MockHttpClient::new(
            200,
            r#"[{"id": "a", "title": "A", "file": {"url": "u", "duration": "10"}}]"#,
        );

        let records = fetch_episodes(&client, &local_query()).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_deref(), Some("a"));
        assert_eq!(
            client.requested.lock().unwrap().as_slice(),
            ["http://localhost:3333/episodes?_limit=12&_sort=published_at&_order=desc"]
        );
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let client = MockHttpClient::new(500, "oops");

        let err = fetch_episodes(&client, &local_query()).await.unwrap_err();

        assert!(matches!(err, FetchError::HttpStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn malformed_json_is_an_error() {
        let client = MockHttpClient::new(200, r#"{"episodes": []}"#);

        let err = fetch_episodes(&client, &local_query()).await.unwrap_err();

        assert!(matches!(err, FetchError::MalformedJson { .. }));
    }

    #[tokio::test]
    async fn empty_array_is_not_an_error() {
        let client = MockHttpClient::new(200, "[]");

        let records = fetch_episodes(&client, &local_query()).await.unwrap();

        assert!(records.is_empty());
    }
}
