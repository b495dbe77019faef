//! Pull links out of free-form text and keep the ones on watched domains.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use crate::{domain::PaywallMatch, ports::DomainStore, Result};

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)https?://\S+").expect("static url regex"))
}

/// Every whitespace-delimited `http(s)://...` run, in order of appearance. No validation.
pub fn extract_urls(text: &str) -> Vec<&str> {
    url_regex().find_iter(text).map(|m| m.as_str()).collect()
}

/// Second-to-last host label, lowercased (`www.bloomberg.com` -> `bloomberg`).
pub fn base_domain(host: &str) -> Option<String> {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return None;
    }
    Some(labels[labels.len() - 2].to_lowercase())
}

/// Examine at most `max_candidates` links and keep those whose base domain is watched.
///
/// Links that fail to parse are skipped. Kept links are reduced to
/// scheme + host + path (query and fragment dropped).
pub fn match_paywall_urls(
    text: &str,
    watched: &[String],
    max_candidates: usize,
) -> Vec<PaywallMatch> {
    let mut out = Vec::new();

    for candidate in extract_urls(text).into_iter().take(max_candidates) {
        let Ok(parsed) = Url::parse(candidate) else {
            debug!(candidate, "Skipping unparseable URL");
            continue;
        };
        let Some(base) = parsed.host_str().and_then(base_domain) else {
            continue;
        };
        if !watched.iter().any(|d| d == &base) {
            continue;
        }

        let url = format!("{}{}", parsed.origin().ascii_serialization(), parsed.path());
        debug!(%url, base_domain = %base, "Matched paywalled URL");
        out.push(PaywallMatch {
            url,
            base_domain: base,
        });
    }

    out
}

/// Read the current watched list and match `text` against it.
pub async fn extract_paywall_domain_urls(
    store: &dyn DomainStore,
    text: &str,
    max_candidates: usize,
) -> Result<Vec<PaywallMatch>> {
    let watched = store.list().await?;
    Ok(match_paywall_urls(text, &watched, max_candidates))
}
