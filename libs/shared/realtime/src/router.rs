use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use tracing::info;

use shared_models::error::AppError;

use crate::{ChangeEvent, ChangeFilter, ChangeNotifier, ChangeTable};

#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    pub table: ChangeTable,
    pub field: Option<String>,
    pub value: Option<String>,
}

pub fn realtime_routes(notifier: ChangeNotifier) -> Router {
    Router::new()
        .route("/changes", get(stream_changes))
        .with_state(notifier)
}

/// Server-Sent Events feed of change notices; the event name is the change kind.
pub async fn stream_changes(
    State(notifier): State<ChangeNotifier>,
    Query(query): Query<SubscribeQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let filter = match (query.field, query.value) {
        (Some(field), Some(value)) if !field.trim().is_empty() => Some(ChangeFilter::eq(field.trim(), value)),
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest(
                "Filter needs both a non-empty field and a value".to_string(),
            ))
        }
    };

    info!("Realtime subscription on {} with filter {:?}", query.table, filter);

    let stream = notifier
        .subscribe(query.table, filter)
        .into_stream()
        .map(|event| Ok(to_sse_event(&event)));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn to_sse_event(event: &ChangeEvent) -> Event {
    let data = serde_json::to_string(event).unwrap_or_default();
    Event::default().event(event.kind.as_str()).data(data)
}
