use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_geo_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use listing_desk::config::AppConfig;
use listing_desk::error::AppError;
use listing_desk::geo::{GeoError, GeoService, GoogleMapsClient};
use listing_desk::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    if config.geo.api_key.is_none() {
        warn!("GOOGLE_MAPS_API_KEY is not set; geocoding routes will answer 500");
    }
    let maps = GoogleMapsClient::new(&config.geo).map_err(GeoError::from)?;
    let geo_service = Arc::new(GeoService::new(Arc::new(maps)));

    let app = with_geo_routes(geo_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, country = %config.geo.country, "listing desk ready");

    axum::serve(listener, app).await?;
    Ok(())
}
