use crate::cli::ServeArgs;
use crate::infra::{AppState, Store};
use crate::routes::with_project_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use eventdesk::config::AppConfig;
use eventdesk::error::AppError;
use eventdesk::projects::{EventService, ProjectRepository, RegistrationRepository};
use eventdesk::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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

    let store = Store::from_config(&config.storage);
    info!(storage = %store.describe(), "repository selected");

    match store {
        Store::Memory(store) => serve(config, store.clone(), store).await,
        Store::Json(store) => serve(config, store.clone(), store).await,
    }
}

async fn serve<P, R>(
    config: AppConfig,
    projects: Arc<P>,
    registrations: Arc<R>,
) -> Result<(), AppError>
where
    P: ProjectRepository + 'static,
    R: RegistrationRepository + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(EventService::new(projects, registrations));

    let app = with_project_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "eventdesk api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
