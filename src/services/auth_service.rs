use axum::{Extension, Json};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::db::{entities::user, services};
use crate::services::account_provider::{AccountProvider, NewAccount};
use crate::services::bot_token::{BOT_EMAIL_DOMAIN, BotToken};
use crate::web::error::AppError;
use crate::web::models::{AuthenticatedUser, Claims, LoginRequest, LoginResponse, RegisterRequest, UserResponse};

const MIN_PASSWORD_LEN: usize = 8;
// bcrypt ignores everything past this many bytes.
const MAX_PASSWORD_LEN: usize = 72;
const TOKEN_TTL_HOURS: i64 = 24;

/// Email/password sign-up. No verification mail is sent, so the account is
/// confirmed on creation.
pub async fn register_user(accounts: &dyn AccountProvider, req: RegisterRequest) -> Result<UserResponse, AppError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidInput("Email and password are required".to_string()));
    }
    if !email.contains('@') {
        return Err(AppError::InvalidInput("Invalid email address".to_string()));
    }
    if email.ends_with(&format!("@{BOT_EMAIL_DOMAIN}")) {
        return Err(AppError::InvalidInput(
            "This email domain is reserved for bot accounts".to_string(),
        ));
    }
    if req.password.len() < MIN_PASSWORD_LEN || req.password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters long."
        )));
    }

    let id = accounts
        .create_account(NewAccount {
            email: &email,
            password: &req.password,
            confirmed: true,
        })
        .await?;
    info!(user_id = %id, "User registered with email.");

    Ok(UserResponse { id, email })
}

pub async fn login_user(db: &DatabaseConnection, req: LoginRequest, jwt_secret: &str) -> Result<LoginResponse, AppError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidInput("Email and password are required".to_string()));
    }

    let user = services::get_user_by_email(db, &email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if user.email_confirmed_at.is_none() {
        return Err(AppError::Unauthorized("Email not confirmed".to_string()));
    }

    let password = req.password;
    let password_hash = user.password_hash.clone();
    let valid_password = tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Password verification task failed: {e}")))?
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;

    if !valid_password {
        warn!(user_id = %user.id, "Rejected login with wrong password.");
        return Err(AppError::InvalidCredentials);
    }

    create_jwt_for_user(&user, jwt_secret)
}

/// Logs a bot owner in with the raw bot token, which doubles as the password
/// of the account provisioned for it.
pub async fn login_with_bot_token(
    db: &DatabaseConnection,
    raw_token: &str,
    jwt_secret: &str,
) -> Result<LoginResponse, AppError> {
    let token = BotToken::parse(raw_token).map_err(|e| AppError::InvalidInput(e.to_string()))?;
    let req = LoginRequest {
        email: token.account_email(),
        password: token.as_str().to_string(),
    };

    login_user(db, req, jwt_secret).await.map_err(|e| match e {
        AppError::InvalidCredentials | AppError::Unauthorized(_) => {
            AppError::Unauthorized("Invalid bot token or token not registered.".to_string())
        }
        other => other,
    })
}

pub fn create_jwt_for_user(user: &user::Model, jwt_secret: &str) -> Result<LoginResponse, AppError> {
    let expiration = (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize;

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        exp: expiration,
    };

    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(jwt_secret.as_ref()))
        .map_err(|e| AppError::TokenCreationError(e.to_string()))?;

    Ok(LoginResponse {
        token,
        user_id: user.id,
        email: user.email.clone(),
    })
}

pub async fn me(Extension(user): Extension<AuthenticatedUser>) -> Json<UserResponse> {
    Json(UserResponse {
        id: user.id,
        email: user.email,
    })
}
