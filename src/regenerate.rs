// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::api::{DEFAULT_PAGE_SIZE, episodes_url, fetch_episodes, validate_episodes};
use crate::episode::transform_episodes;
use crate::error::{BuildError, RegenerateError, RenderError};
use crate::home::{HomeProps, PageMode, render_home};
use crate::http::HttpClient;
use crate::progress::{RegenerationEvent, SharedRegenerationReporter};

/// API queried when no base URL is configured
pub const DEFAULT_API_BASE: &str = "http://localhost:3333";

/// How long a generated homepage is served before it is regenerated
pub const DEFAULT_REVALIDATE: Duration = Duration::from_secs(60 * 60 * 8);

/// Options for generating the homepage
#[derive(Debug, Clone)]
pub struct SiteOptions {
    /// Base URL of the episodes API
    pub api_base: String,
    /// Number of episodes requested
    pub limit: usize,
    /// Time a generated page stays fresh
    pub revalidate: Duration,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            limit: DEFAULT_PAGE_SIZE,
            revalidate: DEFAULT_REVALIDATE,
        }
    }
}

/// One immutable generation of the homepage
#[derive(Debug, Clone)]
pub struct HomeSnapshot {
    /// Data the page was rendered from
    pub props: HomeProps,
    /// The rendered document
    pub html: String,
    /// Quoted content hash of `html`, usable as an HTTP entity tag
    pub etag: String,
    /// When this snapshot was produced
    pub generated_at: DateTime<Utc>,
}

impl HomeSnapshot {
    /// Render a snapshot from already assembled props
    pub fn render(props: HomeProps, mode: PageMode) -> Result<Self, RenderError> {
        let html = render_home(&props, mode)?;
        let etag = content_etag(&html);

        Ok(Self {
            props,
            html,
            etag,
            generated_at: Utc::now(),
        })
    }
}

/// Entity tag for a rendered document: `"sha256:<hex>"`
pub fn content_etag(html: &str) -> String {
    format!("\"sha256:{:x}\"", Sha256::digest(html.as_bytes()))
}

/// Run one fetch-transform-render cycle for the server.
///
/// Any failure aborts the whole cycle; there is no partial page.
pub async fn regenerate_home<C: HttpClient + ?Sized>(
    client: &C,
    options: &SiteOptions,
    reporter: &SharedRegenerationReporter,
) -> Result<HomeSnapshot, RegenerateError> {
    regenerate(client, options, PageMode::Served, reporter).await
}

async fn regenerate<C: HttpClient + ?Sized>(
    client: &C,
    options: &SiteOptions,
    mode: PageMode,
    reporter: &SharedRegenerationReporter,
) -> Result<HomeSnapshot, RegenerateError> {
    let result = assemble_home(client, options, mode, reporter).await;

    if let Err(e) = &result {
        reporter.report(RegenerationEvent::RegenerationFailed {
            error: e.to_string(),
        });
    }

    result
}

async fn assemble_home<C: HttpClient + ?Sized>(
    client: &C,
    options: &SiteOptions,
    mode: PageMode,
    reporter: &SharedRegenerationReporter,
) -> Result<HomeSnapshot, RegenerateError> {
    let url = episodes_url(&options.api_base, options.limit)?;

    reporter.report(RegenerationEvent::FetchingEpisodes {
        url: url.to_string(),
    });

    let raw = fetch_episodes(client, &url).await?;

    reporter.report(RegenerationEvent::EpisodesFetched { count: raw.len() });

    let validated = validate_episodes(raw)?;
    let props = HomeProps::from_episodes(transform_episodes(&validated));
    let snapshot = HomeSnapshot::render(props, mode)?;

    reporter.report(RegenerationEvent::SnapshotRendered {
        latest_count: snapshot.props.latest_episodes.len(),
        catalog_count: snapshot.props.all_episodes.len(),
        etag: snapshot.etag.clone(),
    });

    Ok(snapshot)
}

/// Generate a standalone homepage once and write it to `output_path`.
///
/// No server answers `/play` for this file, so its play triggers drive an
/// in-page player over the embedded episode list instead.
pub async fn build_static_page<C: HttpClient + ?Sized>(
    client: &C,
    options: &SiteOptions,
    output_path: &Path,
    reporter: &SharedRegenerationReporter,
) -> Result<HomeSnapshot, RegenerateError> {
    let snapshot = regenerate(client, options, PageMode::Standalone, reporter).await?;

    if let Err(e) = write_page(output_path, &snapshot.html).await {
        reporter.report(RegenerationEvent::RegenerationFailed {
            error: e.to_string(),
        });
        return Err(e.into());
    }

    reporter.report(RegenerationEvent::PageWritten {
        path: output_path.display().to_string(),
        bytes: snapshot.html.len(),
    });

    Ok(snapshot)
}

async fn write_page(path: &Path, html: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| BuildError::CreateDirectoryFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    tokio::fs::write(path, html)
        .await
        .map_err(|e| BuildError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}
