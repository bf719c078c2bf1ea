use axum::{
    body::Body as AxumBody,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::web::models::{AuthenticatedUser, Claims};
use crate::web::{AppState, error::AppError};

/// Name of the http-only session cookie set by the login handlers.
pub const AUTH_COOKIE: &str = "token";

/// Bearer token from the `Authorization` header, else the session cookie.
fn session_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty());

    match bearer {
        Some(token) => Some(token.to_string()),
        None => jar.get(AUTH_COOKIE).map(|c| c.value().to_string()),
    }
}

fn decode_session(token: &str, jwt_secret: &str) -> Result<AuthenticatedUser, AppError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        warn!(error = ?e, "Rejected session token.");
        AppError::InvalidCredentials
    })?
    .claims;

    Ok(AuthenticatedUser {
        id: claims.sub,
        email: claims.email,
    })
}

/// Requires a valid session and exposes the caller as an `AuthenticatedUser`
/// request extension.
pub async fn auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request<AxumBody>,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(req.headers(), &jar).ok_or_else(|| {
        debug!(path = %req.uri().path(), "Request without session token.");
        AppError::InvalidCredentials
    })?;

    let user = decode_session(&token, &state.config.jwt_secret)?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
