//! Recordings kept per source identity.

use std::sync::Arc;

use hashbrown::HashMap;
use tracing::debug;

use crate::error::Result;
use crate::load::{Recording, load_recording};
use crate::params::LoadParams;
use crate::source::RecordSource;

/// Loaded recordings keyed by source identity.
///
/// A recording is loaded once per identity and shared afterwards. Use
/// [`reload`](Self::reload) after the source has changed.
#[derive(Debug, Clone, Default)]
pub struct RecordingCache {
    entries: HashMap<String, Arc<Recording>>,
    params: LoadParams,
}

impl RecordingCache {
    /// Creates an empty cache that loads with `params`.
    #[must_use]
    pub fn new(params: LoadParams) -> Self {
        Self {
            entries: HashMap::new(),
            params,
        }
    }

    /// Parameters used for every load.
    #[must_use]
    pub const fn params(&self) -> &LoadParams {
        &self.params
    }

    /// Returns the cached recording of `identity`, if any.
    #[must_use]
    pub fn get(&self, identity: &str) -> Option<Arc<Recording>> {
        self.entries.get(identity).cloned()
    }

    /// Returns true if `identity` is cached.
    #[must_use]
    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    /// Number of cached recordings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cached recording of `source`, loading it on a miss.
    ///
    /// # Errors
    ///
    /// Returns the load error on a miss; nothing is cached then.
    pub fn get_or_load<S>(&mut self, source: &S) -> Result<Arc<Recording>>
    where
        S: RecordSource + ?Sized,
    {
        if let Some(recording) = self.get(source.identity()) {
            debug!(source = source.identity(), "Recording cache hit");
            return Ok(recording);
        }
        debug!(source = source.identity(), "Recording cache miss");
        self.reload(source)
    }

    /// Loads `source` and replaces any cached recording of its identity.
    ///
    /// # Errors
    ///
    /// Returns the load error. The stale entry is evicted in that case.
    pub fn reload<S>(&mut self, source: &S) -> Result<Arc<Recording>>
    where
        S: RecordSource + ?Sized,
    {
        match load_recording(source, &self.params) {
            Ok(recording) => {
                let recording = Arc::new(recording);
                self.entries
                    .insert(source.identity().to_owned(), Arc::clone(&recording));
                Ok(recording)
            }
            Err(err) => {
                self.entries.remove(source.identity());
                Err(err)
            }
        }
    }

    /// Drops the cached recording of `identity`.
    ///
    /// Returns true if one was cached.
    pub fn invalidate(&mut self, identity: &str) -> bool {
        let removed = self.entries.remove(identity).is_some();
        if removed {
            debug!(source = identity, "Recording cache entry invalidated");
        }
        removed
    }

    /// Drops every cached recording.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
