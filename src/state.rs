//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;
use tracing::info_span;

use crate::config::environment::EnvironmentConfig;
use crate::graphql::{build_schema, AutoSchema};
use crate::repositories::auto_repository::AutoStore;
use crate::services::auto_read_service::AutoReadService;
use crate::services::auto_write_service::AutoWriteService;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub store: Arc<dyn AutoStore>,
    pub read_service: Arc<AutoReadService>,
    pub write_service: Arc<AutoWriteService>,
    pub schema: AutoSchema,
}

impl AppState {
    /// Construir servicios y schema GraphQL sobre un store
    pub fn new(store: Arc<dyn AutoStore>, config: EnvironmentConfig) -> Self {
        let read_service = Arc::new(AutoReadService::new(
            store.clone(),
            info_span!("auto_read_service"),
        ));
        let write_service = Arc::new(AutoWriteService::new(
            store.clone(),
            read_service.clone(),
            info_span!("auto_write_service"),
        ));
        let schema = build_schema(read_service.clone(), write_service.clone());

        Self {
            config,
            store,
            read_service,
            write_service,
            schema,
        }
    }
}
