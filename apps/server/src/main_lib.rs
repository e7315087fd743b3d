use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use encargos_core::calculations::{CalculationService, CalculationServiceTrait};
use encargos_core::cdi::{CdiService, RateSource};
use encargos_core::reconciliation::ReconciliationService;
use encargos_erp::ErpClient;
use encargos_storage_sqlite::calculations::CalculationRepository;
use encargos_storage_sqlite::db;

pub struct AppState {
    pub calculation_service: Arc<dyn CalculationServiceTrait>,
    pub rate_source: Arc<dyn RateSource>,
}

pub fn init_tracing() {
    let log_format = std::env::var("ENCARGOS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let (db_path, pool) = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);
    let writer = db::spawn_writer(pool.clone());

    let erp = Arc::new(ErpClient::new(config.erp.clone())?);
    let store = Arc::new(CalculationRepository::new(pool, writer));

    let cdi_service = CdiService::new(erp.clone() as Arc<dyn RateSource>);
    let reconciliation = ReconciliationService::new(erp.clone(), cdi_service);

    let calculation_service = Arc::new(CalculationService::new(
        erp.clone(),
        erp.clone(),
        reconciliation,
        store,
        erp.clone(),
    ));

    Ok(Arc::new(AppState {
        calculation_service,
        rate_source: erp,
    }))
}
