use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::services::NewGiveaway;

fn default_num_winners() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct CreateGiveawayRequest {
    pub channel_id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub prize: String,
    #[serde(default = "default_num_winners")]
    pub num_winners: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl CreateGiveawayRequest {
    /// Checks the form rules and trims the text fields. The error is the
    /// message shown to the user.
    pub fn validate(self, user_id: Uuid) -> Result<NewGiveaway, String> {
        let title = self.title.trim();
        let prize = self.prize.trim();
        if title.is_empty() || prize.is_empty() {
            return Err("Please fill in all required fields".to_string());
        }
        if self.start_date >= self.end_date {
            return Err("End date must be after start date".to_string());
        }
        if self.num_winners < 1 {
            return Err("Number of winners must be at least 1".to_string());
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(NewGiveaway {
            user_id,
            channel_id: self.channel_id,
            title: title.to_string(),
            description,
            prize: prize.to_string(),
            num_winners: self.num_winners,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}
