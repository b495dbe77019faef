use std::fmt;

use chrono::{DateTime, Utc};

use crate::{errors::Error, Result};

/// Discord user id (snowflake).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub u64);

/// Discord channel id (snowflake).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u64);

/// Discord message id (snowflake).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub u64);

/// A stable reference to a posted message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

/// The author of a message or the invoker of a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Author {
    pub id: UserId,
    pub name: String,
    pub is_bot: bool,
}

impl Author {
    /// Platform mention syntax, used in operator diagnostics.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id.0)
    }
}

pub const MIN_DOMAIN_LEN: usize = 2;
pub const MAX_DOMAIN_LEN: usize = 50;

/// A watched base-domain label, e.g. `bloomberg` (never `bloomberg.com`).
///
/// Always lowercase, 2-50 chars of `[a-z0-9-]`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WatchedDomain(String);

impl WatchedDomain {
    /// Validate and normalize raw user input.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim().to_lowercase();

        if trimmed.contains('.') || trimmed.contains('/') {
            return Err(Error::Validation(format!(
                "`{trimmed}` looks like a full domain or URL"
            )));
        }

        let len = trimmed.chars().count();
        if !(MIN_DOMAIN_LEN..=MAX_DOMAIN_LEN).contains(&len) {
            return Err(Error::Validation(format!(
                "domain must be {MIN_DOMAIN_LEN}-{MAX_DOMAIN_LEN} characters, got {len}"
            )));
        }

        if !trimmed
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(Error::Validation(format!(
                "`{trimmed}` contains characters outside [a-z0-9-]"
            )));
        }

        Ok(Self(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WatchedDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A link in a message whose base domain is watched, with the query stripped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaywallMatch {
    pub url: String,
    pub base_domain: String,
}

/// A timestamped snapshot held by the archival service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchivedMemento {
    pub url: String,
    pub timestamp: DateTime<Utc>,
}
