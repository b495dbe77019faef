//! archive.today adapter.
//!
//! Implements the `franklin-core` ArchiveLookup port over the TimeMap endpoint
//! (`GET <base>/timemap/<url>`), which answers in RFC 7089 link-format.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use franklin_core::{
    config::Config, domain::ArchivedMemento, errors::Error, ports::ArchiveLookup, Result,
};

const USER_AGENT: &str = concat!("franklin-bot/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct ArchiveTodayClient {
    base_url: String,
    http: reqwest::Client,
}

impl ArchiveTodayClient {
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::External(format!("archive http client build error: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.archive_base_url.clone(), cfg.archive_timeout)
    }

    pub fn timemap_url(&self, url: &str) -> String {
        format!("{}/timemap/{url}", self.base_url)
    }
}

#[async_trait]
impl ArchiveLookup for ArchiveTodayClient {
    async fn timemap(&self, url: &str) -> Result<Vec<ArchivedMemento>> {
        let resp = self
            .http
            .get(self.timemap_url(url))
            .send()
            .await
            .map_err(|e| Error::Lookup(format!("timemap request error: {e}")))?;

        // 404 is the service's "never archived" answer.
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(url, "No archived snapshots");
            return Ok(Vec::new());
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Lookup(format!(
                "timemap failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::Lookup(format!("timemap body error: {e}")))?;
        Ok(parse_timemap(&body))
    }
}

/// Mementos in a link-format TimeMap, in document order.
///
/// Entries without a `memento` relation or a parseable `datetime` are skipped.
pub fn parse_timemap(body: &str) -> Vec<ArchivedMemento> {
    split_entries(body)
        .into_iter()
        .filter_map(parse_entry)
        .collect()
}

fn parse_entry(entry: &str) -> Option<ArchivedMemento> {
    let entry = entry.trim();
    let rest = entry.strip_prefix('<')?;
    let (target, params) = rest.split_once('>')?;

    let mut is_memento = false;
    let mut datetime = None;
    for param in split_outside_quotes(params, ';') {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"');
        match key.trim() {
            "rel" => is_memento = value.split_whitespace().any(|r| r == "memento"),
            "datetime" => datetime = DateTime::parse_from_rfc2822(value).ok(),
            _ => {}
        }
    }

    if !is_memento {
        return None;
    }
    Some(ArchivedMemento {
        url: target.trim().to_string(),
        timestamp: datetime?.with_timezone(&Utc),
    })
}

/// Split on top-level commas (`datetime` values contain commas inside quotes).
fn split_entries(body: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut in_quotes = false;
    let mut in_target = false;
    let mut start = 0usize;

    for (i, c) in body.char_indices() {
        match c {
            '"' if !in_target => in_quotes = !in_quotes,
            '<' if !in_quotes => in_target = true,
            '>' if !in_quotes => in_target = false,
            ',' if !in_quotes && !in_target => {
                out.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&body[start..]);
    out.into_iter().filter(|s| !s.trim().is_empty()).collect()
}

fn split_outside_quotes(s: &str, sep: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut in_quotes = false;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == sep && !in_quotes {
            out.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    out.push(&s[start..]);
    out
}
