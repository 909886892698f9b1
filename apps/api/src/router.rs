use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use doctor_cell::{doctor_routes, DoctorService};
use shared_config::AppConfig;
use shared_realtime::{realtime_routes, ChangeNotifier};
use token_queue_cell::{token_routes, TokenQueueService};

/// Services shared by every cell, wired to one change notifier.
#[derive(Clone)]
pub struct AppState {
    pub doctors: Arc<DoctorService>,
    pub tokens: Arc<TokenQueueService>,
    pub notifier: ChangeNotifier,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        let notifier = ChangeNotifier::new(config.change_channel_capacity);
        let doctors = Arc::new(DoctorService::from_config(config, notifier.clone()));
        let tokens = Arc::new(TokenQueueService::from_config(
            config,
            Arc::clone(&doctors),
            notifier.clone(),
        ));

        Self {
            doctors,
            tokens,
            notifier,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic Queue API is running!" }))
        .nest("/doctors", doctor_routes(state.doctors.clone()))
        .nest("/tokens", token_routes(state.tokens.clone()))
        .nest("/realtime", realtime_routes(state.notifier.clone()))
}
