//! Best-effort version extraction from a textual response dump.
//!
//! The frontend schema differs between server releases, so the response is
//! treated as opaque text rather than a typed message. Keys are tried in
//! priority order and the first plausible token after a key wins; if no key
//! yields anything the whole text is scanned for a semver-shaped word.

/// Keys searched for, highest priority first
pub const VERSION_KEYS: [&str; 4] = [
    "server_version",
    "build_version",
    "version",
    "component_version",
];

/// Extract a plausible version string from `text`.
///
/// Returns `None` when neither a key-anchored token nor a bare
/// semver-shaped word is present.
pub fn extract_version(text: &str) -> Option<String> {
    if let Some(version) = VERSION_KEYS.iter().find_map(|key| scan_after_key(text, key)) {
        return Some(version);
    }

    text.split_whitespace()
        .find(|word| looks_like_semver(word))
        .map(str::to_string)
}

/// `true` when splitting on `.` yields two or three non-empty components.
pub fn looks_like_semver(token: &str) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return false;
    }
    parts.iter().all(|p| !p.is_empty())
}

fn scan_after_key(text: &str, key: &str) -> Option<String> {
    let key = key.to_ascii_lowercase();
    // ASCII folding keeps byte offsets identical between `lowered` and `text`
    let lowered = text.to_ascii_lowercase();
    let idx = lowered.find(&key)?;

    text[idx..]
        .split(|c: char| !is_token_char(c))
        .filter(|token| !token.is_empty())
        .filter(|token| !token.to_ascii_lowercase().contains(&key))
        .find(|token| looks_like_semver(token) || has_digit_and_dot(token))
        .map(str::to_string)
}

fn is_token_char(c: char) -> bool {
    c == '.' || c == '-' || c.is_ascii_alphanumeric()
}

fn has_digit_and_dot(token: &str) -> bool {
    token.contains('.') && token.chars().any(|c| c.is_ascii_digit())
}
