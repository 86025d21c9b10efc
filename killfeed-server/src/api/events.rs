use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use killfeed_core::entities::EventId;

use super::ApiError;
use crate::state::AppState;

/// `GET /` and `GET /home`: the most recent events and the last-update time.
pub(super) async fn home(state: State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.view.home().await?))
}

/// `GET /events/{event_id}`: stored documents for one event.
///
/// Returns an empty array for unknown ids.
pub(super) async fn get_event(
    state: State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let documents = state.view.event(EventId(event_id)).await?;
    Ok(Json(documents))
}
