use std::sync::Arc;
use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers::{
    allocate_token,
    complete_token,
    get_queue,
};
use crate::services::queue::TokenQueueService;

pub fn token_routes(service: Arc<TokenQueueService>) -> Router {
    Router::new()
        .route("/", get(get_queue).post(allocate_token))
        .route("/{token_id}/complete", post(complete_token))
        .with_state(service)
}
