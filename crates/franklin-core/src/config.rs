use std::{
    env,
    path::PathBuf,
    time::Duration,
};

use crate::{errors::Error, Result};

pub const DOMAIN_LIST_FILE_NAME: &str = "paywallDomainList.json";

/// Typed configuration, built once at startup and shared as `Arc<Config>`.
#[derive(Clone, Debug)]
pub struct Config {
    // Discord
    pub discord_token: String,
    pub app_id: u64,
    pub bot_owner: u64,
    pub dm_bot_owner_on_archive_failure: bool,

    // Storage
    pub data_dir: Option<PathBuf>,
    pub assets_dir: PathBuf,

    // Archive service
    pub archive_base_url: String,
    pub archive_timeout: Duration,

    // Message pipeline
    pub max_invocation_attempts: u32,
    pub retry_delay: Duration,
    pub max_urls_per_message: usize,

    // Discord limits
    pub list_chunk_size: usize,
}

impl Config {
    /// Load from the process environment (plus `.env` if present).
    pub fn load() -> Result<Self> {
        // Existing env vars win over `.env`; a missing file is fine.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key/value source. Tests use this instead of mutating env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        // Required env vars
        let discord_token = get("DISCORD_TOKEN").ok_or_else(|| missing("DISCORD_TOKEN"))?;
        let app_id = parse_snowflake("APP_ID", get("APP_ID"))?;
        let bot_owner = parse_snowflake("BOT_OWNER", get("BOT_OWNER"))?;

        // Anything other than the literal "true" disables escalation DMs.
        let dm_bot_owner_on_archive_failure =
            get("DM_BOT_OWNER_ON_ARCHIVE_FAILURE").as_deref() == Some("true");

        let data_dir = get("DATA_DIR").map(PathBuf::from);
        let assets_dir = get("ASSETS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("assets"));

        let archive_base_url = get("ARCHIVE_BASE_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| "https://archive.ph".to_string());
        let archive_timeout = Duration::from_millis(
            get("ARCHIVE_TIMEOUT_MS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(30_000),
        );

        Ok(Self {
            discord_token,
            app_id,
            bot_owner,
            dm_bot_owner_on_archive_failure,
            data_dir,
            assets_dir,
            archive_base_url,
            archive_timeout,
            max_invocation_attempts: 3,
            retry_delay: Duration::from_secs(5),
            max_urls_per_message: 3,
            // Discord embeds cap descriptions at 4096 chars.
            list_chunk_size: 4000,
        })
    }

    /// Where the live domain list is read from and written to.
    pub fn domain_list_path(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.join(DOMAIN_LIST_FILE_NAME),
            None => self.bundled_domain_list_path(),
        }
    }

    /// The default list shipped with the bot.
    pub fn bundled_domain_list_path(&self) -> PathBuf {
        self.assets_dir.join(DOMAIN_LIST_FILE_NAME)
    }

    /// Seed source for a missing live list. `None` when the live list *is* the bundled one.
    pub fn domain_list_seed_path(&self) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|_| self.bundled_domain_list_path())
    }
}

fn missing(key: &str) -> Error {
    Error::Config(format!("{key} environment variable is required"))
}

fn parse_snowflake(key: &str, value: Option<String>) -> Result<u64> {
    let value = value.ok_or_else(|| missing(key))?;
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| Error::Config(format!("{key} must be a numeric Discord id: {e}")))
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
pub(crate) fn test_config(dir: &std::path::Path) -> Config {
    Config {
        discord_token: "x".to_string(),
        app_id: 1,
        bot_owner: 99,
        dm_bot_owner_on_archive_failure: false,
        data_dir: Some(dir.join("data")),
        assets_dir: dir.join("assets"),
        archive_base_url: "http://archive.invalid".to_string(),
        archive_timeout: Duration::from_secs(1),
        max_invocation_attempts: 3,
        retry_delay: Duration::ZERO,
        max_urls_per_message: 3,
        list_chunk_size: 4000,
    }
}
