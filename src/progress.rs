// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

/// Events emitted while a page is regenerated
#[derive(Debug, Clone)]
pub enum RegenerationEvent {
    /// The episodes query is being sent
    FetchingEpisodes { url: String },

    /// The API answered and the records were parsed
    EpisodesFetched { count: usize },

    /// Records were validated, transformed and rendered
    SnapshotRendered {
        latest_count: usize,
        catalog_count: usize,
        etag: String,
    },

    /// The rendered page was written to disk
    PageWritten { path: String, bytes: usize },

    /// The regeneration was aborted
    RegenerationFailed { error: String },
}

/// Trait for reporting regeneration progress.
///
/// Implementations can use this to drive a spinner, write log lines,
/// or collect events in tests.
pub trait RegenerationReporter: Send + Sync {
    /// Report a regeneration event
    fn report(&self, event: RegenerationEvent);
}

/// A shared reference to a regeneration reporter
pub type SharedRegenerationReporter = Arc<dyn RegenerationReporter>;

/// A reporter that silently ignores all events.
/// Useful for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl RegenerationReporter for NoopReporter {
    fn report(&self, _event: RegenerationEvent) {}
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedRegenerationReporter {
        Arc::new(Self)
    }
}

/// A reporter that turns events into `tracing` records
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl TracingReporter {
    /// Create a new TracingReporter wrapped in an Arc
    pub fn shared() -> SharedRegenerationReporter {
        Arc::new(Self)
    }
}

impl RegenerationReporter for TracingReporter {
    fn report(&self, event: RegenerationEvent) {
        match event {
            RegenerationEvent::FetchingEpisodes { url } => {
                tracing::debug!(%url, "Fetching episodes");
            }
            RegenerationEvent::EpisodesFetched { count } => {
                tracing::debug!(count, "Episodes fetched");
            }
            RegenerationEvent::SnapshotRendered {
                latest_count,
                catalog_count,
                etag,
            } => {
                tracing::info!(latest_count, catalog_count, %etag, "Homepage regenerated");
            }
            RegenerationEvent::PageWritten { path, bytes } => {
                tracing::info!(%path, bytes, "Page written");
            }
            RegenerationEvent::RegenerationFailed { error } => {
                tracing::warn!(%error, "Regeneration failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_events() -> Vec<RegenerationEvent> {
        vec![
            RegenerationEvent::FetchingEpisodes {
                url: "http://localhost:3333/episodes".to_string(),
            },
            RegenerationEvent::EpisodesFetched { count: 12 },
            RegenerationEvent::SnapshotRendered {
                latest_count: 2,
                catalog_count: 10,
                etag: "\"sha256:abc\"".to_string(),
            },
            RegenerationEvent::PageWritten {
                path: "out/index.html".to_string(),
                bytes: 2048,
            },
            RegenerationEvent::RegenerationFailed {
                error: "HTTP error 503".to_string(),
            },
        ]
    }

    #[test]
    fn noop_reporter_handles_all_events() {
        let reporter = NoopReporter;
        for event in all_events() {
            reporter.report(event);
        }
    }

    #[test]
    fn tracing_reporter_handles_all_events() {
        let reporter = TracingReporter::shared();
        for event in all_events() {
            reporter.report(event);
        }
    }
}
