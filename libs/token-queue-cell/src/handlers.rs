use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use tracing::info;
use uuid::Uuid;

use shared_models::error::AppError;

use crate::{
    AllocateTokenRequest, QueueQuery, QueueView, Token, TokenReceipt,
    services::queue::TokenQueueService,
};

/// Issue a token for today's queue of the requested doctor
#[axum::debug_handler]
pub async fn allocate_token(
    State(service): State<Arc<TokenQueueService>>,
    Json(request): Json<AllocateTokenRequest>,
) -> Result<(StatusCode, Json<TokenReceipt>), AppError> {
    info!("Token request for doctor: {}", request.doctor_id);

    let receipt = service.allocate_token(request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Queue view for one doctor and date
#[axum::debug_handler]
pub async fn get_queue(
    State(service): State<Arc<TokenQueueService>>,
    Query(query): Query<QueueQuery>,
) -> Result<Json<QueueView>, AppError> {
    let view = service.queue_view(query.doctor_id, query.date).await?;
    Ok(Json(view))
}

#[axum::debug_handler]
pub async fn complete_token(
    State(service): State<Arc<TokenQueueService>>,
    Path(token_id): Path<Uuid>,
) -> Result<Json<Token>, AppError> {
    let token = service.mark_complete(token_id).await?;
    Ok(Json(token))
}
