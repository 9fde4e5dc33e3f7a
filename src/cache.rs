// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::time::Instant;

use crate::error::RegenerateError;

/// Outcome of a regeneration, shareable between every caller waiting on it
pub type RegenerationResult<T> = Result<Arc<T>, Arc<RegenerateError>>;

type InFlight<T> = Shared<BoxFuture<'static, RegenerationResult<T>>>;

/// How a cached value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from a fresh entry
    Fresh,
    /// Served from an expired entry while a regeneration runs in the background
    Stale,
    /// No usable entry existed; the caller waited for a regeneration
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Fresh => "HIT",
            CacheStatus::Stale => "STALE",
            CacheStatus::Miss => "MISS",
        }
    }
}

struct Entry<T> {
    value: Option<Arc<T>>,
    refreshed_at: Option<Instant>,
    in_flight: Option<InFlight<T>>,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            value: None,
            refreshed_at: None,
            in_flight: None,
        }
    }
}

/// Per-route cache with a time-to-live and single-flight regeneration.
///
/// Expired entries keep being served while one background regeneration
/// replaces them. A failed regeneration leaves the previous value in place.
pub struct RevalidatingCache<T> {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry<T>>>,
}

impl<T: Send + Sync + 'static> RevalidatingCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Time an entry stays fresh
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current value for `key` without triggering a regeneration
    pub fn peek(&self, key: &str) -> Option<Arc<T>> {
        self.lock_entries()
            .get(key)
            .and_then(|entry| entry.value.clone())
    }

    /// Whether a regeneration for `key` is running
    pub fn is_regenerating(&self, key: &str) -> bool {
        self.lock_entries()
            .get(key)
            .is_some_and(|entry| entry.in_flight.is_some())
    }

    /// Get the value for `key`, regenerating it when missing or expired.
    ///
    /// `regenerate` is only called when no regeneration for `key` is in
    /// flight; concurrent callers share the running one.
    pub async fn get_or_regenerate<F, Fut>(
        self: &Arc<Self>,
        key: &str,
        regenerate: F,
    ) -> Result<(Arc<T>, CacheStatus), Arc<RegenerateError>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, RegenerateError>> + Send + 'static,
    {
        let waiting = {
            let mut entries = self.lock_entries();
            let entry = entries.entry(key.to_string()).or_default();

            if let Some(value) = entry.value.clone() {
                let fresh = entry
                    .refreshed_at
                    .is_some_and(|at| at.elapsed() < self.ttl);
                if fresh {
                    return Ok((value, CacheStatus::Fresh));
                }

                if entry.in_flight.is_none() {
                    tracing::debug!(key, "Entry expired, regenerating in background");
                    entry.in_flight = Some(self.start(key, regenerate()));
                }
                return Ok((value, CacheStatus::Stale));
            }

            entry
                .in_flight
                .get_or_insert_with(|| self.start(key, regenerate()))
                .clone()
        };

        waiting.await.map(|value| (value, CacheStatus::Miss))
    }

    /// Spawn a regeneration that stores its result when done
    fn start<Fut>(self: &Arc<Self>, key: &str, regeneration: Fut) -> InFlight<T>
    where
        Fut: Future<Output = Result<T, RegenerateError>> + Send + 'static,
    {
        let cache = Arc::clone(self);
        let key = key.to_string();

        let in_flight = async move {
            let result = regeneration.await.map(Arc::new).map_err(Arc::new);
            cache.complete(&key, &result);
            result
        }
        .boxed()
        .shared();

        // Runs to completion even if every waiting caller goes away
        tokio::spawn(in_flight.clone());

        in_flight
    }

    fn complete(&self, key: &str, result: &RegenerationResult<T>) {
        let mut entries = self.lock_entries();
        let entry = entries.entry(key.to_string()).or_default();
        entry.in_flight = None;

        match result {
            Ok(value) => {
                entry.value = Some(Arc::clone(value));
                entry.refreshed_at = Some(Instant::now());
            }
            Err(error) => {
                tracing::warn!(
                    key,
                    %error,
                    serving_stale = entry.value.is_some(),
                    "Regeneration failed"
                );
            }
        }
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
