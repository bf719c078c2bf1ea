use axum::{Json, body::Bytes, extract::State};
use std::sync::Arc;
use tracing::warn;

use crate::services::registration_service;
use crate::web::models::{RegisterBotRequest, RegisterBotResponse};
use crate::web::{AppError, AppState};

/// Path the dashboard frontend calls; kept for existing clients.
pub const REGISTER_BOT_FUNCTION_PATH: &str = "/functions/v1/register-bot";
pub const REGISTER_BOT_API_PATH: &str = "/api/register-bot";

/// Links a bot token to an account, creating the account on first use.
///
/// The body is parsed by hand so that a missing or non-JSON content type is
/// not rejected before the token is looked at. It must be a JSON object.
pub async fn register_bot_handler(
    State(app_state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<RegisterBotResponse>, AppError> {
    let payload = RegisterBotRequest::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Rejected register-bot request with malformed body.");
        AppError::InvalidInput("Invalid request body".to_string())
    })?;
    let raw_token = payload.bot_token.unwrap_or_default();

    let registration = registration_service::register_bot(
        app_state.token_store.as_ref(),
        app_state.accounts.as_ref(),
        &raw_token,
    )
    .await?;

    Ok(Json(registration.into()))
}
