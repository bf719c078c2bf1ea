//! SeaORM entities for the dashboard tables.
//!
//! `users` holds every account, whether it signed up with email/password or was
//! provisioned from a bot token. `user_tokens` links a bot token to its account.

pub mod channel;
pub mod giveaway;
pub mod user;
pub mod user_token;
