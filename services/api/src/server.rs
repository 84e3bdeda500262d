use crate::cli::ServeArgs;
use crate::infra::{AppState, PortalStores, SeedData};
use crate::routes::with_merit_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use scholarship_portal::config::AppConfig;
use scholarship_portal::error::AppError;
use scholarship_portal::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let stores = PortalStores::default();
    if let Some(path) = args.seed.take() {
        let seed = SeedData::from_path(&path)?;
        info!(
            path = %path.display(),
            scholarships = seed.scholarships.len(),
            applications = seed.applications.len(),
            "seeding in-memory stores"
        );
        stores.seed(seed)?;
    }
    let merit_service = Arc::new(stores.service(config.merit.clone()));

    let app = with_merit_routes(merit_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "scholarship portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}
