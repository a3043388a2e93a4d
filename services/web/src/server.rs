use crate::cli::ServeArgs;
use crate::infra::{open_store, AppState};
use crate::routes::with_inquiry_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use techforge::config::AppConfig;
use techforge::error::AppError;
use techforge::inquiries::InquiryService;
use techforge::notifications::ConfiguredMailer;
use techforge::telemetry;
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

    let store = Arc::new(open_store(&config)?);
    let mailer = Arc::new(ConfiguredMailer::from_config(&config.mail.transport)?);
    let inquiry_service = Arc::new(InquiryService::new(
        store,
        mailer,
        config.mail.settings.clone(),
    ));

    let app = with_inquiry_routes(inquiry_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "techforge site ready");

    axum::serve(listener, app).await?;
    Ok(())
}
