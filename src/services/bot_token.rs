use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Domain used for the synthetic email of accounts provisioned from a bot token.
pub const BOT_EMAIL_DOMAIN: &str = "telegram.bot";

// ASCII digits only: `\d` would also accept other Unicode digits.
static BOT_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+:[A-Za-z0-9_-]+$").expect("bot token pattern is valid"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid bot token format")]
pub struct InvalidBotToken;

/// A Telegram bot token of the form `<numeric-id>:<secret>`.
///
/// The token is a credential, so `Debug` only shows the bot id.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BotToken(String);

impl BotToken {
    pub fn parse(raw: &str) -> Result<Self, InvalidBotToken> {
        if BOT_TOKEN_RE.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidBotToken)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric prefix before the first `:`.
    pub fn bot_id(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(id, _)| id)
    }

    /// Email of the account that owns this bot, e.g. `123456@telegram.bot`.
    pub fn account_email(&self) -> String {
        format!("{}@{BOT_EMAIL_DOMAIN}", self.bot_id())
    }
}

impl FromStr for BotToken {
    type Err = InvalidBotToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BotToken({}:***)", self.bot_id())
    }
}
