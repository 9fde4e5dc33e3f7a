// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod render;

pub use render::{PAGE_TITLE, PageMode, render_episode_page, render_home};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::episode::Episode;
use crate::error::PlayError;
use crate::player::PlaybackController;

/// Number of episodes shown in the "latest releases" section
pub const LATEST_COUNT: usize = 2;

/// The two listings of the homepage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Latest releases, the first entries of the feed
    Latest,
    /// Full catalog, everything after the latest releases
    Catalog,
}

/// Split a newest-first list into the latest releases and the remainder.
///
/// Both halves keep the original order and together contain every episode.
pub fn partition_episodes(mut episodes: Vec<Episode>) -> (Vec<Episode>, Vec<Episode>) {
    let rest = episodes.split_off(LATEST_COUNT.min(episodes.len()));
    (episodes, rest)
}

/// Data backing one generated homepage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeProps {
    pub latest_episodes: Vec<Episode>,
    pub all_episodes: Vec<Episode>,
}

impl HomeProps {
    /// Partition an ordered episode list into homepage props
    pub fn from_episodes(episodes: Vec<Episode>) -> Self {
        let (latest_episodes, all_episodes) = partition_episodes(episodes);
        Self {
            latest_episodes,
            all_episodes,
        }
    }

    /// Total number of episodes on the page
    pub fn len(&self) -> usize {
        self.latest_episodes.len() + self.all_episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Latest releases followed by the catalog, the list handed to the player
    pub fn episode_list(&self) -> Vec<Episode> {
        self.latest_episodes
            .iter()
            .chain(self.all_episodes.iter())
            .cloned()
            .collect()
    }

    /// Absolute position in [`Self::episode_list`] of a row within a section
    pub fn play_index(&self, section: Section, local_index: usize) -> usize {
        match section {
            Section::Latest => local_index,
            Section::Catalog => local_index + self.latest_episodes.len(),
        }
    }

    /// Start playback of the whole list at an absolute position
    pub fn play(
        &self,
        controller: &dyn PlaybackController,
        index: usize,
    ) -> Result<(), PlayError> {
        let len = self.len();
        if index >= len {
            return Err(PlayError::IndexOutOfRange { index, len });
        }

        controller.enqueue_and_play(&self.episode_list(), index);
        Ok(())
    }

    /// Short hash of the episode ids in list order.
    ///
    /// Play indices are only meaningful against the list they were rendered
    /// from; two props with the same version index the same episodes.
    pub fn list_version(&self) -> String {
        let mut hasher = Sha256::new();
        for episode in self.latest_episodes.iter().chain(self.all_episodes.iter()) {
            hasher.update(episode.id.as_bytes());
            hasher.update(b"\n");
        }

        let digest = format!("{:x}", hasher.finalize());
        digest[..16].to_string()
    }

    /// Start playback for a trigger rendered from the list named `version`
    pub fn play_listed(
        &self,
        controller: &dyn PlaybackController,
        version: &str,
        index: usize,
    ) -> Result<(), PlayError> {
        let current = self.list_version();
        if version != current {
            return Err(PlayError::ListChanged {
                page: version.to_string(),
                current,
            });
        }

        self.play(controller, index)
    }

    /// Start playback from the play trigger of a row within a section
    pub fn play_from(
        &self,
        controller: &dyn PlaybackController,
        section: Section,
        local_index: usize,
    ) -> Result<(), PlayError> {
        self.play(controller, self.play_index(section, local_index))
    }

    /// Look up an episode by id in either section
    pub fn find_episode(&self, id: &str) -> Option<&Episode> {
        self.latest_episodes
            .iter()
            .chain(self.all_episodes.iter())
            .find(|episode| episode.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    /// Records every call instead of playing anything
    #[derive(Default)]
    struct RecordingController {
        calls: Mutex<Vec<(Vec<String>, usize)>>,
    }

    impl PlaybackController for RecordingController {
        fn enqueue_and_play(&self, items: &[Episode], start_index: usize) {
            let ids = items.iter().map(|e| e.id.clone()).collect();
            self.calls.lock().unwrap().push((ids, start_index));
        }
    }

    fn make_episodes(n: usize) -> Vec<Episode> {
        (0..n)
            .map(|i| Episode {
                id: format!("ep-{i}"),
                title: format!("Episode {i}"),
                thumbnail: String::new(),
                description: String::new(),
                members: String::new(),
                duration: 60,
                duration_as_string: "01:00".to_string(),
                url: format!("https://example.com/{i}.mp3"),
                published_at: "25 abr 22".to_string(),
            })
            .collect()
    }

    fn ids(episodes: &[Episode]) -> Vec<String> {
        episodes.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn partition_sizes_for_any_batch() {
        for n in 0..=12 {
            let episodes = make_episodes(n);
            let (latest, rest) = partition_episodes(episodes.clone());

            assert_eq!(latest.len(), n.min(2), "n = {n}");
            assert_eq!(rest.len(), n.saturating_sub(2), "n = {n}");

            let rejoined: Vec<_> = latest.into_iter().chain(rest).collect();
            assert_eq!(rejoined, episodes, "n = {n}");
        }
    }

    #[test]
    fn single_episode_goes_to_latest() {
        let props = HomeProps::from_episodes(make_episodes(1));

        assert_eq!(ids(&props.latest_episodes), ["ep-0"]);
        assert!(props.all_episodes.is_empty());
    }

    #[test]
    fn empty_batch_yields_empty_props() {
        let props = HomeProps::from_episodes(Vec::new());

        assert!(props.is_empty());
        assert!(props.episode_list().is_empty());
        assert_eq!(props, HomeProps::default());
    }

    #[test]
    fn play_index_matches_position_in_combined_list() {
        let props = HomeProps::from_episodes(make_episodes(7));
        let combined = props.episode_list();

        for (local, episode) in props.latest_episodes.iter().enumerate() {
            let k = props.play_index(Section::Latest, local);
            assert_eq!(combined[k], *episode);
        }

        for (local, episode) in props.all_episodes.iter().enumerate() {
            let k = props.play_index(Section::Catalog, local);
            assert_eq!(combined[k], *episode);
        }
    }

    #[test]
    fn play_from_catalog_uses_absolute_index() {
        let props = HomeProps::from_episodes(make_episodes(3));
        let controller = RecordingController::default();

        props.play_from(&controller, Section::Catalog, 0).unwrap();

        let calls = controller.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, ["ep-0", "ep-1", "ep-2"]);
        assert_eq!(calls[0].1, 2);
    }

    #[test]
    fn play_from_latest_uses_local_index() {
        let props = HomeProps::from_episodes(make_episodes(5));
        let controller = RecordingController::default();

        props.play_from(&controller, Section::Latest, 1).unwrap();

        let calls = controller.calls.lock().unwrap();
        assert_eq!(calls[0].1, 1);
        assert_eq!(calls[0].0.len(), 5);
    }

    #[test]
    fn play_out_of_range_does_not_reach_controller() {
        let props = HomeProps::from_episodes(make_episodes(2));
        let controller = RecordingController::default();

        let err = props.play(&controller, 2).unwrap_err();

        assert_eq!(err, PlayError::IndexOutOfRange { index: 2, len: 2 });
        assert!(controller.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn list_version_follows_ids_and_order() {
        let props = HomeProps::from_episodes(make_episodes(3));
        let same = HomeProps::from_episodes(make_episodes(3));
        let mut reordered = make_episodes(3);
        reordered.swap(1, 2);

        assert_eq!(props.list_version(), same.list_version());
        assert_eq!(props.list_version().len(), 16);
        assert_ne!(
            props.list_version(),
            HomeProps::from_episodes(reordered).list_version()
        );
        assert_ne!(
            props.list_version(),
            HomeProps::from_episodes(make_episodes(4)).list_version()
        );
    }

    #[test]
    fn play_listed_rejects_a_changed_list() {
        let rendered = HomeProps::from_episodes(make_episodes(3));
        let mut newer = make_episodes(3);
        newer[0].id = "ep-new".to_string();
        let current = HomeProps::from_episodes(newer);
        let controller = RecordingController::default();

        let err = current
            .play_listed(&controller, &rendered.list_version(), 2)
            .unwrap_err();
        assert!(matches!(err, PlayError::ListChanged { .. }));
        assert!(controller.calls.lock().unwrap().is_empty());

        rendered
            .play_listed(&controller, &rendered.list_version(), 2)
            .unwrap();
        assert_eq!(controller.calls.lock().unwrap()[0].1, 2);
    }

    #[test]
    fn find_episode_searches_both_sections() {
        let props = HomeProps::from_episodes(make_episodes(4));

        assert!(props.find_episode("ep-1").is_some());
        assert!(props.find_episode("ep-3").is_some());
        assert!(props.find_episode("ep-9").is_none());
    }

    #[test]
    fn serializes_like_page_props() {
        let props = HomeProps::from_episodes(make_episodes(3));
        let json = serde_json::to_value(&props).unwrap();

        assert_eq!(json["latestEpisodes"].as_array().unwrap().len(), 2);
        assert_eq!(json["allEpisodes"].as_array().unwrap().len(), 1);
    }
}
