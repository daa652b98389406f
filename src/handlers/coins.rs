use axum::{Json, extract::State, http::StatusCode};
use sea_orm::EntityTrait;

use crate::AppState;
use crate::entities::{prelude::*, snapshot};
use crate::models::error::ErrorResponse;

/// Handler for GET /coins
/// Returns the current snapshot in storage order; an empty store yields [].
pub async fn get_coins(
    State(state): State<AppState>,
) -> Result<Json<Vec<snapshot::Model>>, (StatusCode, Json<ErrorResponse>)> {
    let coins = Snapshot::find().all(&state.db).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(format!("Database error: {}", e))),
        )
    })?;

    Ok(Json(coins))
}
