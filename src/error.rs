// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when querying the episodes API
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid API base URL '{base}': {source}")]
    InvalidBaseUrl {
        base: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to fetch episodes from {url}: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Malformed JSON from {url}: {source}")]
    MalformedJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while validating raw episode records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Episode #{index} ({id}) is missing required field '{field}'")]
    MissingField {
        index: usize,
        id: String,
        field: &'static str,
    },

    #[error("Episode #{index} ({id}) has a non-numeric duration: {value}")]
    InvalidDuration {
        index: usize,
        id: String,
        value: String,
    },

    #[error("Episode #{index} ({id}) has an unparseable publish date '{value}'")]
    InvalidDate {
        index: usize,
        id: String,
        value: String,
    },
}

/// Errors that can occur when writing the statically built page
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write page {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur when rendering a page from its templates
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Page templates failed to load: {0}")]
    TemplatesUnavailable(String),

    #[error("Failed to render template '{template}': {source}")]
    Template {
        template: &'static str,
        #[source]
        source: handlebars::RenderError,
    },

    #[error("Failed to encode the episode list: {0}")]
    EncodeList(#[from] serde_json::Error),
}

/// Errors raised when a play trigger does not resolve to an episode
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    #[error("No episode at position {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Episode list changed since the page was rendered (page {page}, current {current})")]
    ListChanged { page: String, current: String },
}

/// Top-level errors for one regeneration cycle
#[derive(Error, Debug)]
pub enum RegenerateError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_names_record_and_field() {
        let err = SchemaError::MissingField {
            index: 3,
            id: "a-vida-e-boa".to_string(),
            field: "file.duration",
        };

        let message = err.to_string();
        assert!(message.contains("#3"));
        assert!(message.contains("a-vida-e-boa"));
        assert!(message.contains("file.duration"));
    }

    #[test]
    fn regenerate_error_wraps_stage_errors() {
        let err: RegenerateError = FetchError::HttpStatus {
            url: "http://localhost:3333/episodes".to_string(),
            status: 503,
        }
        .into();

        assert!(matches!(err, RegenerateError::Fetch(_)));
        assert!(err.to_string().contains("503"));
    }
}
