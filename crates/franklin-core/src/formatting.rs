//! User-facing text: archive replies, status prefixes, list chunking.

pub const NOTICE: &str = "⚠️";
pub const SUCCESS: &str = "✅";

/// Reply for the archived links found in one message. `None` when nothing was found.
pub fn generate_reply(archived_urls: &[String]) -> Option<String> {
    match archived_urls {
        [] => None,
        [only] => Some(format!(
            "We found an archived link for the paywalled URL you included at {only}"
        )),
        many => {
            let mut lines =
                vec!["We found archived links for the paywalled URLs you included at:".to_string()];
            lines.extend(many.iter().map(|url| format!("* {url}")));
            Some(lines.join("\n"))
        }
    }
}

/// Split `s` into pieces of at most `limit` characters, never splitting a char.
pub fn chunk_chars(s: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let chars: Vec<char> = s.chars().collect();
    chars
        .chunks(limit)
        .map(|c| c.iter().collect::<String>())
        .collect()
}

/// Wrap `body` in a fenced code block.
pub fn code_block(body: &str) -> String {
    format!("```\n{body}\n```")
}
