use std::sync::Arc;

use confwatch::ClientFileInfo;
use confwatch::ConfigFileRelease;
use confwatch::LocalEventHub;
use confwatch::MemoryFileCache;
use confwatch::WatchCenter;
use confwatch::WatchConfig;

pub const NAMESPACE: &str = "mesh";
pub const GROUP: &str = "sidecar";

pub fn watched(
    file_name: &str,
    version: u64,
) -> ClientFileInfo {
    ClientFileInfo::new(NAMESPACE, GROUP, file_name, version)
}

pub fn published(
    file_name: &str,
    version: u64,
) -> ConfigFileRelease {
    ConfigFileRelease::new(NAMESPACE, GROUP, file_name, version).with_md5(format!("{file_name}@{version}"))
}

pub struct Harness {
    pub hub: LocalEventHub,
    pub cache: Arc<MemoryFileCache>,
    pub center: Arc<WatchCenter>,
}

impl Harness {
    pub fn start(config: WatchConfig) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let hub = LocalEventHub::new();
        let cache = Arc::new(MemoryFileCache::new());
        let center = WatchCenter::new(config, cache.clone(), &hub).expect("watch center should start");
        Self { hub, cache, center }
    }

    /// Stores the release and announces it, the way the publishing side does
    pub fn publish(
        &self,
        release: ConfigFileRelease,
    ) {
        self.cache.put_release(release.clone());
        self.hub.publish_release(release).expect("publish should succeed");
    }
}

pub fn fast_config() -> WatchConfig {
    WatchConfig {
        long_poll_timeout_ms: 300,
        max_long_poll_timeout_ms: 2_000,
        event_queue_size: 128,
        sweep_interval_ms: 50,
        stream_buffer_size: 8,
        recheck_after_register: true,
    }
}
