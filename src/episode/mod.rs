// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod date;
mod duration;

pub use date::{DISPLAY_LOCALE, format_published_at};
pub use duration::format_duration;

use serde::Serialize;

use crate::api::ApiEpisode;

/// An episode in display form, ready to be rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub description: String,
    pub members: String,
    pub duration: u64,
    pub duration_as_string: String,
    pub url: String,
    pub published_at: String,
}

impl Episode {
    /// Build the display form of a validated API record
    pub fn from_api(episode: &ApiEpisode) -> Self {
        Self {
            id: episode.id.clone(),
            title: episode.title.clone(),
            thumbnail: episode.thumbnail.clone(),
            description: episode.description.clone(),
            members: episode.members.clone(),
            duration: episode.duration,
            duration_as_string: format_duration(episode.duration),
            url: episode.audio_url.clone(),
            published_at: format_published_at(&episode.published_at),
        }
    }

    /// Route of the episode's detail page
    pub fn detail_path(&self) -> String {
        episode_path(&self.id)
    }
}

/// Route of the detail page for the episode with `id`
pub fn episode_path(id: &str) -> String {
    format!("/episodes/{id}")
}

/// Transform a validated batch, preserving order
pub fn transform_episodes(episodes: &[ApiEpisode]) -> Vec<Episode> {
    episodes.iter().map(Episode::from_api).collect()
}
