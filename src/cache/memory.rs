use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::trace;

use super::ConfigFileCache;
use crate::model::file_key;
use crate::ConfigFileRelease;

/// In-process release cache keyed by file identity
///
/// Keeps only the newest active release per file. Used when the control plane
/// embeds the watch center without an external cache, and by tests.
#[derive(Debug, Default)]
pub struct MemoryFileCache {
    releases: DashMap<String, ConfigFileRelease>,
}

impl MemoryFileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `release` as the active release of its file
    ///
    /// Returns false when an equal or newer version is already cached, or when
    /// the release is not active.
    pub fn put_release(
        &self,
        release: ConfigFileRelease,
    ) -> bool {
        if !release.active {
            return false;
        }

        match self.releases.entry(release.active_key()) {
            Entry::Occupied(mut entry) => {
                if entry.get().version >= release.version {
                    return false;
                }
                trace!(file = %entry.key(), version = release.version, "Active release replaced");
                entry.insert(release);
            }
            Entry::Vacant(entry) => {
                trace!(file = %entry.key(), version = release.version, "Active release cached");
                entry.insert(release);
            }
        }
        true
    }

    pub fn remove_release(
        &self,
        namespace: &str,
        group: &str,
        file_name: &str,
    ) -> Option<ConfigFileRelease> {
        self.releases
            .remove(&file_key(namespace, group, file_name))
            .map(|(_, release)| release)
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

impl ConfigFileCache for MemoryFileCache {
    fn get_active_release(
        &self,
        namespace: &str,
        group: &str,
        file_name: &str,
    ) -> Option<ConfigFileRelease> {
        self.releases
            .get(&file_key(namespace, group, file_name))
            .map(|r| r.value().clone())
    }
}
