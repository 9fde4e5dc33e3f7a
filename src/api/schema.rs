// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::error::SchemaError;

/// An episode record exactly as the API returns it
#[derive(Debug, Clone, Deserialize)]
pub struct RawEpisode {
    pub id: Option<String>,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    pub members: Option<String>,
    pub published_at: Option<String>,
    pub file: Option<RawFile>,
}

/// The nested audio file of a raw record
#[derive(Debug, Clone, Deserialize)]
pub struct RawFile {
    pub url: Option<String>,
    pub duration: Option<RawDuration>,
}

/// `file.duration` is served either as a number or as a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDuration {
    Seconds(u64),
    Fractional(f64),
    Text(String),
}

/// A raw record that passed validation, with its fields coerced to their real types
#[derive(Debug, Clone, PartialEq)]
pub struct ApiEpisode {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub description: String,
    pub members: String,
    pub published_at: DateTime<Utc>,
    pub duration: u64,
    pub audio_url: String,
}

/// Validate a whole batch, failing on the first malformed record
pub fn validate_episodes(raw: Vec<RawEpisode>) -> Result<Vec<ApiEpisode>, SchemaError> {
    raw.into_iter()
        .enumerate()
        .map(|(index, record)| validate_episode(index, record))
        .collect()
}

/// Validate a single record found at `index` in the response
pub fn validate_episode(index: usize, raw: RawEpisode) -> Result<ApiEpisode, SchemaError> {
    let id = raw.id.ok_or_else(|| SchemaError::MissingField {
        index,
        id: "<unknown>".to_string(),
        field: "id",
    })?;

    let missing = |field: &'static str| SchemaError::MissingField {
        index,
        id: id.clone(),
        field,
    };

    let title = raw.title.ok_or_else(|| missing("title"))?;
    let published_raw = raw.published_at.ok_or_else(|| missing("published_at"))?;
    let file = raw.file.ok_or_else(|| missing("file"))?;
    let audio_url = file.url.ok_or_else(|| missing("file.url"))?;
    let duration_raw = file.duration.ok_or_else(|| missing("file.duration"))?;

    let duration = coerce_duration(&duration_raw).ok_or_else(|| SchemaError::InvalidDuration {
        index,
        id: id.clone(),
        value: describe_duration(&duration_raw),
    })?;

    let published_at =
        parse_published_at(&published_raw).ok_or_else(|| SchemaError::InvalidDate {
            index,
            id: id.clone(),
            value: published_raw.clone(),
        })?;

    Ok(ApiEpisode {
        id,
        title,
        thumbnail: raw.thumbnail.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        members: raw.members.unwrap_or_default(),
        published_at,
        duration,
        audio_url,
    })
}

/// Coerce a raw duration into whole, non-negative seconds
pub fn coerce_duration(raw: &RawDuration) -> Option<u64> {
    match raw {
        RawDuration::Seconds(seconds) => Some(*seconds),
        RawDuration::Fractional(value) => whole_seconds(*value),
        RawDuration::Text(text) => {
            let text = text.trim();
            text.parse::<u64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(whole_seconds))
        }
    }
}

fn whole_seconds(value: f64) -> Option<u64> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Some(value as u64)
    } else {
        None
    }
}

fn describe_duration(raw: &RawDuration) -> String {
    match raw {
        RawDuration::Seconds(seconds) => seconds.to_string(),
        RawDuration::Fractional(value) => value.to_string(),
        RawDuration::Text(text) => format!("\"{text}\""),
    }
}

/// Parse an ISO-8601 timestamp; timestamps without an offset are taken as UTC
pub fn parse_published_at(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    let formats = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    for format in formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
