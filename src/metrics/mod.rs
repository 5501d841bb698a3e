use lazy_static::lazy_static;
use prometheus::exponential_buckets;
use prometheus::Encoder;
use prometheus::Histogram;
use prometheus::HistogramOpts;
use prometheus::IntCounter;
use prometheus::IntCounterVec;
use prometheus::IntGaugeVec;
use prometheus::Opts;
use prometheus::Registry;
use tracing::warn;


lazy_static! {
    pub static ref WATCH_CLIENTS: IntGaugeVec = IntGaugeVec::new(
        Opts::new("confwatch_watch_clients", "Live watch registrations per watch center"),
        &["center"]
    )
    .expect("metric can not be created");

    pub static ref WATCHED_FILES: IntGaugeVec = IntGaugeVec::new(
        Opts::new("confwatch_watched_files", "Files with at least one interested client per watch center"),
        &["center"]
    )
    .expect("metric can not be created");

    pub static ref NOTIFIED_CLIENTS: IntCounterVec = IntCounterVec::new(
        Opts::new("confwatch_notified_clients", "File changed replies delivered by the dispatcher"),
        &["mode"]
    )
    .expect("metric can not be created");

    pub static ref EXPIRED_WATCHES: IntCounter = IntCounter::new(
        "confwatch_expired_watches",
        "Registrations resolved with no change by the expiry sweeper"
    )
    .expect("metric can not be created");

    pub static ref QUICK_RESPONSES: IntCounterVec = IntCounterVec::new(
        Opts::new("confwatch_quick_responses", "Watch requests answered at registration time"),
        &["outcome"]
    )
    .expect("metric can not be created");

    pub static ref DROPPED_PUBLISH_EVENTS: IntCounterVec = IntCounterVec::new(
        Opts::new("confwatch_dropped_publish_events", "Publish events dropped on a full subscriber queue"),
        &["topic"]
    )
    .expect("metric can not be created");

    pub static ref DISPATCH_LATENCY_MS: Histogram = Histogram::with_opts(
        HistogramOpts::new("confwatch_dispatch_latency_ms", "Time to fan one publish event out to its bucket in ms")
            .buckets(exponential_buckets(0.01, 4.0, 10).expect("valid buckets"))
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = {
        let registry = Registry::new();
        register_custom_metrics(&registry);
        registry
    };
}

fn register_custom_metrics(registry: &Registry) {
    registry
        .register(Box::new(WATCH_CLIENTS.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(WATCHED_FILES.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(NOTIFIED_CLIENTS.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(EXPIRED_WATCHES.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(QUICK_RESPONSES.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(DROPPED_PUBLISH_EVENTS.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(DISPATCH_LATENCY_MS.clone()))
        .expect("collector can be registered");
}

/// Renders every watch center metric in the Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        warn!("could not encode custom metrics: {}", e);
    };
    match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            warn!("custom metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    }
}
