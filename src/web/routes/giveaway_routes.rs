use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::get,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::db::{entities::giveaway, services};
use crate::web::models::{AuthenticatedUser, giveaway_models::CreateGiveawayRequest};
use crate::web::{AppError, AppState};

async fn list_giveaways_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<giveaway::Model>>, AppError> {
    let giveaways = services::get_giveaways_by_user_id(&app_state.db_pool, authenticated_user.id).await?;
    Ok(Json(giveaways))
}

async fn create_giveaway_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateGiveawayRequest>, AppError>,
) -> Result<(StatusCode, Json<giveaway::Model>), AppError> {
    let new_giveaway = payload
        .validate(authenticated_user.id)
        .map_err(AppError::InvalidInput)?;

    // The channel must belong to the caller.
    services::get_channel_for_user(&app_state.db_pool, new_giveaway.channel_id, authenticated_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Channel not found".to_string()))?;

    let giveaway = services::create_giveaway(&app_state.db_pool, new_giveaway).await?;
    info!(
        user_id = %authenticated_user.id,
        giveaway_id = %giveaway.id,
        channel_id = %giveaway.channel_id,
        "Giveaway created."
    );
    Ok((StatusCode::CREATED, Json(giveaway)))
}

async fn get_giveaway_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(giveaway_id): Path<Uuid>,
) -> Result<Json<giveaway::Model>, AppError> {
    services::get_giveaway_for_user(&app_state.db_pool, giveaway_id, authenticated_user.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Giveaway not found".to_string()))
}

async fn delete_giveaway_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(giveaway_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let rows_affected = services::delete_giveaway(&app_state.db_pool, giveaway_id, authenticated_user.id).await?;
    if rows_affected > 0 {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Giveaway not found".to_string()))
    }
}

pub fn create_giveaways_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_giveaways_handler).post(create_giveaway_handler))
        .route("/{giveaway_id}", get(get_giveaway_handler).delete(delete_giveaway_handler))
}
