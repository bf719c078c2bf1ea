use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::registration_service::Registration;

pub mod giveaway_models;

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct BotLoginRequest {
    #[serde(rename = "botToken", default)]
    pub bot_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub email: String,
}

// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // account id
    pub email: String,
    pub exp: usize,
}

/// Struct to hold authenticated user details, to be passed as a request extension.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
}

/// Body of `POST /functions/v1/register-bot`.
#[derive(Debug, Deserialize)]
pub struct RegisterBotRequest {
    #[serde(rename = "botToken", default)]
    pub bot_token: Option<String>,
}

impl RegisterBotRequest {
    /// Parses a raw body. Only a JSON object is accepted; serde would
    /// otherwise also read the struct from an array such as `["1:a"]`.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(body)?;
        serde_json::from_value(serde_json::Value::Object(object))
    }
}

/// `{ "user_id" }` for an already registered token, plus `success` and
/// `message` when the account was created by this request.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RegisterBotResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Registration> for RegisterBotResponse {
    fn from(registration: Registration) -> Self {
        match registration {
            Registration::Existing(user_id) => RegisterBotResponse {
                success: None,
                user_id,
                message: None,
            },
            Registration::Created(user_id) => RegisterBotResponse {
                success: Some(true),
                user_id,
                message: Some("Bot registered successfully".to_string()),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateChannelRequest {
    #[serde(default)]
    pub channel_name: String,
    #[serde(default)]
    pub telegram_channel_id: String,
}
