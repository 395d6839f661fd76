use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Lazily initializes the process-wide metrics registry.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Credential cache
    pub credential_exchanges: IntCounterVec,
    pub credential_cache_hits: IntCounter,
    pub credential_invalidations: IntCounter,

    // Upstream providers
    pub upstream_requests: IntCounterVec,
    pub upstream_duration: HistogramVec,

    // Runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("vibes".into()), None).expect("metrics registry");

        let metrics = Arc::new(Self {
            credential_exchanges: IntCounterVec::new(Opts::new("credential_exchanges_total", "Client credentials exchanges by outcome"), &["outcome"]).expect("metric"),
            credential_cache_hits: IntCounter::new("credential_cache_hits_total", "Bearer tokens served from cache").expect("metric"),
            credential_invalidations: IntCounter::new("credential_invalidations_total", "Explicit credential cache invalidations").expect("metric"),

            upstream_requests: IntCounterVec::new(Opts::new("upstream_requests_total", "Requests to upstream providers"), &["provider", "status"]).expect("metric"),
            upstream_duration: HistogramVec::new(HistogramOpts::new("upstream_request_duration_seconds", "Upstream request duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["provider"]).expect("metric"),

            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors during startup").expect("metric"),
            up: IntGauge::new("up", "1 if service is serving").expect("metric"),

            registry,
        });

        let reg = &metrics.registry;
        reg.register(Box::new(metrics.credential_exchanges.clone())).expect("register metric");
        reg.register(Box::new(metrics.credential_cache_hits.clone())).expect("register metric");
        reg.register(Box::new(metrics.credential_invalidations.clone())).expect("register metric");
        reg.register(Box::new(metrics.upstream_requests.clone())).expect("register metric");
        reg.register(Box::new(metrics.upstream_duration.clone())).expect("register metric");
        reg.register(Box::new(metrics.config_validation_errors.clone())).expect("register metric");
        reg.register(Box::new(metrics.up.clone())).expect("register metric");

        metrics
    }
}
