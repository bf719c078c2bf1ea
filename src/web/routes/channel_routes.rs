use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::db::{entities::channel, services};
use crate::web::models::{AuthenticatedUser, CreateChannelRequest};
use crate::web::{AppError, AppState};

// --- Route Handlers ---

async fn list_channels_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<channel::Model>>, AppError> {
    let channels = services::get_channels_by_user_id(&app_state.db_pool, authenticated_user.id).await?;
    Ok(Json(channels))
}

async fn create_channel_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateChannelRequest>, AppError>,
) -> Result<(StatusCode, Json<channel::Model>), AppError> {
    let channel_name = payload.channel_name.trim();
    let telegram_channel_id = payload.telegram_channel_id.trim();
    if channel_name.is_empty() || telegram_channel_id.is_empty() {
        return Err(AppError::InvalidInput("Please fill in all fields".to_string()));
    }

    let channel =
        services::create_channel(&app_state.db_pool, authenticated_user.id, channel_name, telegram_channel_id).await?;
    info!(user_id = %authenticated_user.id, channel_id = %channel.id, "Channel added.");
    Ok((StatusCode::CREATED, Json(channel)))
}

async fn delete_channel_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(channel_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let rows_affected = services::delete_channel(&app_state.db_pool, channel_id, authenticated_user.id).await?;

    if rows_affected > 0 {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Channel not found".to_string()))
    }
}

// --- Router ---

pub fn create_channels_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_channels_handler).post(create_channel_handler))
        .route("/{channel_id}", delete(delete_channel_handler))
}
