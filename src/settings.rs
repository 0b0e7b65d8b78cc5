use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub debug: bool,
    pub enable_swagger: bool,
    pub port: u16,
    pub schedule_url: Url,
    pub news_url: Url,
    pub news_source: String,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    pub friends_file: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // APP_SCHEDULE_URL, APP_FETCH_TIMEOUT_SECS, ...
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("debug", false)?
            .set_default("enable_swagger", true)?
            .set_default("port", 8080)?
            .set_default(
                "schedule_url",
                "https://cloud.timeedit.net/hda/web/public/ri1t6fZ7YQb1bnQY53Q9YQtnZ507fX966n5756ny.html",
            )?
            .set_default("news_url", "https://www.du.se")?
            .set_default("news_source", "Högskolan Dalarna")?
            .set_default("fetch_timeout_secs", 10)?
            .set_default("user_agent", "Mozilla/5.0")?
            .set_default("friends_file", "friends.json")?
            .build()?;

        config.try_deserialize()
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
