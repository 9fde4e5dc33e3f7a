// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::episode::Episode;

/// Capability handed to the page for starting playback.
///
/// The page never owns playback state; it only asks the controller to
/// replace its queue and start at a given position.
pub trait PlaybackController: Send + Sync {
    /// Replace the queue with `items` and start playing `items[start_index]`
    fn enqueue_and_play(&self, items: &[Episode], start_index: usize);
}

/// Current contents of a [`PlaybackQueue`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueState {
    pub episodes: Vec<Episode>,
    pub current_index: Option<usize>,
}

impl QueueState {
    /// The episode currently selected for playback, if any
    pub fn current(&self) -> Option<&Episode> {
        self.current_index.and_then(|index| self.episodes.get(index))
    }
}

/// In-memory playback queue used by the server
#[derive(Debug, Default)]
pub struct PlaybackQueue {
    state: Mutex<QueueState>,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue wrapped in an Arc
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Copy of the current queue
    pub fn snapshot(&self) -> QueueState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PlaybackController for PlaybackQueue {
    fn enqueue_and_play(&self, items: &[Episode], start_index: usize) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.episodes = items.to_vec();
        state.current_index = (start_index < items.len()).then_some(start_index);

        if let Some(episode) = state.current() {
            tracing::info!(
                episode = %episode.id,
                index = start_index,
                queued = items.len(),
                "Playback started"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_episode(id: &str) -> Episode {
        Episode {
            id: id.to_string(),
            title: format!("Episode {id}"),
            thumbnail: String::new(),
            description: String::new(),
            members: String::new(),
            duration: 60,
            duration_as_string: "01:00".to_string(),
            url: format!("https://example.com/{id}.mp3"),
            published_at: "25 abr 22".to_string(),
        }
    }

    #[test]
    fn new_queue_is_empty() {
        let queue = PlaybackQueue::new();
        let state = queue.snapshot();

        assert!(state.episodes.is_empty());
        assert!(state.current().is_none());
    }

    #[test]
    fn enqueue_replaces_queue_and_selects_start() {
        let queue = PlaybackQueue::new();
        let items = vec![make_episode("a"), make_episode("b"), make_episode("c")];

        queue.enqueue_and_play(&items, 2);

        let state = queue.snapshot();
        assert_eq!(state.episodes.len(), 3);
        assert_eq!(state.current_index, Some(2));
        assert_eq!(state.current().map(|e| e.id.as_str()), Some("c"));

        queue.enqueue_and_play(&items[..1], 0);
        assert_eq!(queue.snapshot().episodes.len(), 1);
    }

    #[test]
    fn out_of_range_start_selects_nothing() {
        let queue = PlaybackQueue::new();
        queue.enqueue_and_play(&[make_episode("a")], 5);

        assert!(queue.snapshot().current().is_none());
    }
}
