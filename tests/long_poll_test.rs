mod common;

use std::time::Duration;

use common::fast_config;
use common::published;
use common::watched;
use common::Harness;
use confwatch::gather_metrics;
use confwatch::AuthChecker;
use confwatch::AuthError;
use confwatch::AuthorizedWatchService;
use confwatch::ResponseCode;
use confwatch::WatchAuthContext;
use confwatch::WatchOutcome;
use tokio::time::Instant;

#[tokio::test]
async fn test_client_polls_until_release_arrives() {
    let harness = Harness::start(fast_config());
    harness.publish(published("route.yaml", 1));

    // First poll with nothing cached locally is answered at once
    let outcome = harness
        .center
        .long_poll_watch("sidecar-1", vec![watched("route.yaml", 0)], None)
        .unwrap();
    let WatchOutcome::Immediate(rsp) = outcome else {
        panic!("stale client must be answered immediately");
    };
    let held = rsp.config_file.expect("changed file");
    assert_eq!(held.version, 1);

    // Second poll waits for the next publish
    let outcome = harness
        .center
        .long_poll_watch("sidecar-1", vec![watched("route.yaml", held.version)], None)
        .unwrap();
    let WatchOutcome::Pending(handle) = outcome else {
        panic!("up to date client must wait");
    };

    let publisher = {
        let release = published("route.yaml", 2);
        let cache = harness.cache.clone();
        let hub = harness.hub.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            cache.put_release(release.clone());
            hub.publish_release(release).unwrap();
        })
    };

    let rsp = handle.await_result(Duration::from_secs(5)).await;
    publisher.await.unwrap();

    assert_eq!(rsp.code, ResponseCode::ExecuteSuccess);
    let file = rsp.config_file.as_ref().unwrap();
    assert_eq!(file.version, 2);
    assert_eq!(file.md5.as_deref(), Some("route.yaml@2"));
    assert_eq!(harness.center.client_count(), 0);
}

#[tokio::test]
async fn test_idle_poll_ends_with_no_change() {
    let harness = Harness::start(fast_config());
    let start = Instant::now();

    let outcome = harness
        .center
        .long_poll_watch("sidecar-1", vec![watched("route.yaml", 3)], None)
        .unwrap();
    let WatchOutcome::Pending(handle) = outcome else {
        panic!("up to date client must wait");
    };

    let rsp = handle.await_result(Duration::from_secs(5)).await;

    assert_eq!(rsp.code, ResponseCode::DataNoChange);
    assert!(start.elapsed() >= Duration::from_millis(300));
    assert_eq!(harness.center.client_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_clients_resolve_exactly_once() {
    let harness = Harness::start(fast_config());

    let mut waiters = Vec::new();
    for i in 0..50 {
        let outcome = harness
            .center
            .long_poll_watch(&format!("sidecar-{i}"), vec![watched("route.yaml", 1)], Some(Duration::from_secs(1)))
            .unwrap();
        let WatchOutcome::Pending(handle) = outcome else {
            panic!("up to date client must wait");
        };
        waiters.push(tokio::spawn(async move { handle.await_result(Duration::from_secs(5)).await }));
    }
    assert_eq!(harness.center.client_count(), 50);

    harness.publish(published("route.yaml", 2));

    for waiter in waiters {
        let rsp = waiter.await.unwrap();
        // Publish and expiry race; each client gets exactly one of them
        assert!(rsp.is_changed() || rsp.is_not_modified());
    }
    assert_eq!(harness.center.client_count(), 0);
    assert_eq!(harness.center.watched_file_count(), 0);
    assert!(gather_metrics().contains("confwatch_notified_clients"));
}

#[tokio::test]
async fn test_stream_follows_every_release() {
    let harness = Harness::start(fast_config());
    harness.publish(published("cluster.yaml", 1));

    let mut sub = harness
        .center
        .subscribe_stream("sidecar-1", vec![watched("cluster.yaml", 0)])
        .unwrap();
    assert_eq!(sub.recv().await.unwrap().config_file.as_ref().unwrap().version, 1);

    harness.publish(published("cluster.yaml", 2));
    harness.publish(published("cluster.yaml", 3));

    assert_eq!(sub.recv().await.unwrap().config_file.as_ref().unwrap().version, 2);
    assert_eq!(sub.recv().await.unwrap().config_file.as_ref().unwrap().version, 3);

    // Streams outlive the long poll deadline
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(harness.center.client_count(), 1);

    drop(sub);
    assert_eq!(harness.center.client_count(), 0);
}

struct NamespaceGate;

impl AuthChecker for NamespaceGate {
    fn check_permission(
        &self,
        ctx: &WatchAuthContext,
    ) -> Result<(), AuthError> {
        match ctx.files.iter().find(|f| f.file_name.starts_with("secret")) {
            Some(f) => Err(AuthError::FileDenied {
                client_id: ctx.client_id.clone(),
                file: f.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[tokio::test]
async fn test_permission_gate_blocks_protected_files() {
    let harness = Harness::start(fast_config());
    let service = AuthorizedWatchService::new(harness.center.clone(), std::sync::Arc::new(NamespaceGate));

    let outcome = service
        .long_poll_watch("sidecar-1", vec![watched("secret.yaml", 0)], None)
        .unwrap();
    let WatchOutcome::Immediate(rsp) = outcome else {
        panic!("denied request must be answered immediately");
    };
    assert_eq!(rsp.code, ResponseCode::NotAllowedAccess);

    let outcome = service
        .long_poll_watch("sidecar-1", vec![watched("route.yaml", 0)], None)
        .unwrap();
    assert!(matches!(outcome, WatchOutcome::Pending(_)));
}

#[tokio::test]
async fn test_shutdown_releases_waiters() {
    let harness = Harness::start(fast_config());
    let outcome = harness
        .center
        .long_poll_watch("sidecar-1", vec![watched("route.yaml", 0)], Some(Duration::from_secs(2)))
        .unwrap();
    let WatchOutcome::Pending(handle) = outcome else {
        panic!("up to date client must wait");
    };

    harness.center.shutdown();

    let rsp = handle.await_result(Duration::from_secs(1)).await;
    assert!(rsp.is_not_modified());
    assert!(harness.center.long_poll_watch("sidecar-2", vec![watched("route.yaml", 0)], None).is_err());
}
