use axum::{
    Json, Router,
    extract::State,
    http::{HeaderName, Method, header},
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::{
    WithRejection,
    cookie::{Cookie, CookieJar, SameSite},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::server::config::ServerConfig;
use crate::services::account_provider::{AccountProvider, DbAccountProvider};
use crate::services::auth_service;
use crate::services::token_store::{DbTokenStore, TokenStore};
use crate::web::{
    middleware::auth::{self, AUTH_COOKIE},
    models::{BotLoginRequest, LoginRequest, LoginResponse, RegisterRequest, UserResponse},
    routes::*,
};

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: Arc<DatabaseConnection>,
    pub config: Arc<ServerConfig>,
    pub token_store: Arc<dyn TokenStore>,
    pub accounts: Arc<dyn AccountProvider>,
}

impl AppState {
    /// State with the token store and account provider backed by `db_pool`.
    pub fn new(db_pool: Arc<DatabaseConnection>, config: Arc<ServerConfig>) -> Self {
        let token_store = Arc::new(DbTokenStore::new(db_pool.clone()));
        let accounts = Arc::new(DbAccountProvider::new(db_pool.clone(), config.bcrypt_cost));
        Self {
            db_pool,
            config,
            token_store,
            accounts,
        }
    }
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(true)
        .build()
}

async fn register_handler(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> Result<Json<UserResponse>, AppError> {
    let user_response = auth_service::register_user(app_state.accounts.as_ref(), payload).await?;
    Ok(Json(user_response))
}

async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let login_response = auth_service::login_user(&app_state.db_pool, payload, &app_state.config.jwt_secret).await?;
    Ok((jar.add(session_cookie(login_response.token.clone())), Json(login_response)))
}

async fn bot_login_handler(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<BotLoginRequest>, AppError>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let raw_token = payload.bot_token.unwrap_or_default();
    let login_response =
        auth_service::login_with_bot_token(&app_state.db_pool, &raw_token, &app_state.config.jwt_secret).await?;
    Ok((jar.add(session_cookie(login_response.token.clone())), Json(login_response)))
}

async fn logout_handler(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    (jar, Json(serde_json::json!({ "message": "Logged out" })))
}

async fn health_check_handler() -> &'static str {
    "OK"
}

/// Permissive CORS for the browser frontend and for preflight requests to
/// the register-bot function.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(vec![
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

pub fn create_axum_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check_handler))
        .route(bot_routes::REGISTER_BOT_FUNCTION_PATH, post(bot_routes::register_bot_handler))
        .route(bot_routes::REGISTER_BOT_API_PATH, post(bot_routes::register_bot_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/bot-login", post(bot_login_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route(
            "/api/auth/me",
            get(auth_service::me).route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .nest(
            "/api/channels",
            channel_routes::create_channels_router().route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .nest(
            "/api/giveaways",
            giveaway_routes::create_giveaways_router().route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .with_state(app_state)
        .layer(cors_layer())
}
