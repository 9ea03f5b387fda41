//! Turning scanned or typed text into the canonical machine code used as the
//! exercise lookup key.
//!
//! QR stickers on the machines carry either the bare code (`LP-02`) or a
//! link into the app (`https://gym.example/machine/LP-02`,
//! `https://gym.example/scan?code=LP-02`). Anything else is passed through
//! upper-cased so that the lookup reports it as unknown.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Up to four letters, an optional dash, then up to four digits.
static MACHINE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{1,4}-?[0-9]{1,4}$").expect("valid regex"));

const CODE_QUERY_PARAM: &str = "code";

/// Trims and upper-cases a code. Storage keys and lookups both go through
/// this so comparisons are case-insensitive.
pub fn canonical(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Whether `text` is a bare machine code such as `LP-02` or `bp1`.
pub fn is_machine_code(text: &str) -> bool {
    MACHINE_CODE_RE.is_match(text)
}

/// Extracts the canonical machine code from a raw scan payload or manual
/// entry. Never fails: text that is neither a code nor a URL comes back
/// trimmed and upper-cased.
pub fn normalize(raw_payload: &str) -> String {
    let trimmed = raw_payload.trim();
    if is_machine_code(trimmed) {
        return trimmed.to_uppercase();
    }

    if let Ok(url) = Url::parse(trimmed) {
        if let Some(code) = code_from_url(&url) {
            return code;
        }
    }

    trimmed.to_uppercase()
}

fn code_from_url(url: &Url) -> Option<String> {
    let from_query = url
        .query_pairs()
        .find(|(key, value)| key == CODE_QUERY_PARAM && !value.trim().is_empty())
        .map(|(_, value)| canonical(&value));
    if from_query.is_some() {
        return from_query;
    }

    url.path()
        .split('/')
        .rfind(|segment| !segment.is_empty())
        .map(str::to_uppercase)
}
