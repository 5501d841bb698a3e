use std::sync::Arc;
use std::time::Duration;

use crate::ClientFileInfo;
use crate::ConfigFileRelease;
use crate::LocalEventHub;
use crate::MemoryFileCache;
use crate::WatchCenter;
use crate::WatchConfig;

pub const TEST_NAMESPACE: &str = "default";
pub const TEST_GROUP: &str = "app";

pub fn file(
    file_name: &str,
    version: u64,
) -> ClientFileInfo {
    ClientFileInfo::new(TEST_NAMESPACE, TEST_GROUP, file_name, version)
}

pub fn release(
    file_name: &str,
    version: u64,
) -> ConfigFileRelease {
    ConfigFileRelease::new(TEST_NAMESPACE, TEST_GROUP, file_name, version)
        .with_md5(format!("md5-{file_name}-{version}"))
        .with_name(format!("release-{version}"))
}

/// Watch config with short hold times for tests
pub fn test_watch_config() -> WatchConfig {
    WatchConfig {
        long_poll_timeout_ms: 200,
        max_long_poll_timeout_ms: 1_000,
        event_queue_size: 64,
        sweep_interval_ms: 50,
        stream_buffer_size: 8,
        recheck_after_register: true,
    }
}

pub struct TestContext {
    pub hub: LocalEventHub,
    pub cache: Arc<MemoryFileCache>,
    pub center: Arc<WatchCenter>,
}

/// Watch center wired to an in-process event hub and release cache
pub fn setup_watch_center(config: WatchConfig) -> TestContext {
    enable_logger();
    let hub = LocalEventHub::new();
    let cache = Arc::new(MemoryFileCache::new());
    let center = WatchCenter::new(config, cache.clone(), &hub).expect("watch center should start");
    TestContext { hub, cache, center }
}

/// Yields until the dispatcher drained everything published so far
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = env_logger::builder().is_test(true).try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}
