use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token metrics
    pub token_refreshes: IntCounterVec,
    pub token_expiry_unix: IntGauge,

    // Transport metrics
    pub http_attempts: IntCounterVec,
    pub http_retries_exhausted: IntCounterVec,

    // Listing metrics
    pub listing_fetch_duration: HistogramVec,
    pub listing_fetch_failures: IntCounterVec,
    pub parse_failures: IntCounter,

    // Config
    pub config_validation_errors: IntCounter,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("listingagent".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Token
            token_refreshes: IntCounterVec::new(Opts::new("token_refreshes_total", "Token refresh attempts by outcome"),&["outcome"],).unwrap(),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Current access token expiry timestamp").unwrap(),

            // Transport
            http_attempts: IntCounterVec::new(Opts::new("http_attempts_total", "HTTP attempts by endpoint and outcome"),&["endpoint", "outcome"],).unwrap(),
            http_retries_exhausted: IntCounterVec::new(Opts::new("http_retries_exhausted_total", "Logical calls that ran out of attempts"),&["endpoint"],).unwrap(),

            // Listing
            listing_fetch_duration: HistogramVec::new(HistogramOpts::new("listing_fetch_duration_seconds", "Listing fetch duration seconds").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),&["outcome"],).unwrap(),
            listing_fetch_failures: IntCounterVec::new(Opts::new("listing_fetch_failures_total", "Listing fetch failures by reason"),&["reason"],).unwrap(),
            parse_failures: IntCounter::new("parse_failures_total","Listing payload parse failures",).unwrap(),

            config_validation_errors: IntCounter::new("config_validation_errors_total","Validation errors during startup",).unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_refreshes.clone())).unwrap();
        reg.register(Box::new(metrics.token_expiry_unix.clone())).unwrap();
        reg.register(Box::new(metrics.http_attempts.clone())).unwrap();
        reg.register(Box::new(metrics.http_retries_exhausted.clone())).unwrap();
        reg.register(Box::new(metrics.listing_fetch_duration.clone())).unwrap();
        reg.register(Box::new(metrics.listing_fetch_failures.clone())).unwrap();
        reg.register(Box::new(metrics.parse_failures.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();

        metrics
    }
}
