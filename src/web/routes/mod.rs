pub mod bot_routes;
pub mod channel_routes;
pub mod giveaway_routes;
