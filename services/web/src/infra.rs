use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use techforge::config::AppConfig;
use techforge::error::AppError;
use techforge::inquiries::{InquiryStatus, InquiryStore};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_status(raw: &str) -> Result<InquiryStatus, String> {
    raw.parse::<InquiryStatus>().map_err(|err| err.to_string())
}

/// Opens the store named by `INQUIRY_STORE_PATH`, falling back to process memory.
pub(crate) fn open_store(config: &AppConfig) -> Result<InquiryStore, AppError> {
    let store = InquiryStore::open(config.storage.path.as_deref())?;
    match &config.storage.path {
        Some(path) => info!(path = %path.display(), "using json inquiry store"),
        None => info!("using in-memory inquiry store; inquiries are lost on restart"),
    }
    Ok(store)
}
