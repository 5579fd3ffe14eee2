// Route exports
pub mod profiles;
pub mod shortlist;

use crate::core::Reconciler;
use crate::services::{EmbeddingClient, PostgresClient};
use actix_web::web;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PostgresClient>,
    pub embeddings: Arc<EmbeddingClient>,
    pub reconciler: Reconciler,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(profiles::configure)
            .configure(shortlist::configure),
    );
}
