pub mod account_provider;
pub mod auth_service;
pub mod bot_token;
pub mod registration_service;
pub mod token_store;
