use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};

// Tried in order; the first pattern that matches wins.
static ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // https://drive.google.com/file/d/<id>/view
        r"/file/d/([^/?#]+)",
        // https://drive.google.com/open?id=<id>&...
        r"[?&]id=([^&#]+)",
        // https://drive.google.com/drive/folders/<id>?usp=sharing
        r"/folders/([^?/#]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Extracts the file or folder id from a pasted Drive URL.
pub fn resolve_id(url: &str) -> Result<String> {
    let url = url.trim();
    if url.is_empty() {
        return Err(Error::EmptyUrl);
    }

    ID_PATTERNS
        .iter()
        .find_map(|pattern| {
            pattern
                .captures(url)
                .and_then(|caps| caps.get(1))
                .map(|id| id.as_str())
                .filter(|id| !id.is_empty())
        })
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidUrl(url.to_string()))
}
