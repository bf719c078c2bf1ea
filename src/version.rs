/// Build version, overridable at compile time with `GIVEAWAY_BACKEND_VERSION`.
pub const VERSION: &str = match option_env!("GIVEAWAY_BACKEND_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
