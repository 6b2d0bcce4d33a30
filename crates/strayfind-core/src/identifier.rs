//! Identifier codec: recognizes the 8-4-4-4-12 hexadecimal tokens the catalog
//! uses for asset and user IDs, including tokens embedded at the start of
//! generated filenames such as `{id}-thumbnail.webp` or `{id}.mp4`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Length in bytes of a canonical identifier.
pub const IDENTIFIER_LEN: usize = 36;

static IDENTIFIER_PATTERN: OnceLock<Regex> = OnceLock::new();

fn identifier_pattern() -> &'static Regex {
    IDENTIFIER_PATTERN.get_or_init(|| {
        Regex::new(
            r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
        )
        .expect("identifier pattern compiles")
    })
}

/// Returns true iff `token` is exactly a grouped hexadecimal identifier.
///
/// Case-insensitive. No surrounding whitespace or partial matches are accepted.
pub fn is_valid_identifier(token: &str) -> bool {
    token.len() == IDENTIFIER_LEN && identifier_pattern().is_match(token)
}

/// Extracts the identifier occupying the first 36 characters of `name`.
///
/// Only the prefix is examined: generated filenames are always
/// `{identifier}{suffix}`, so a token further into the string is ignored.
pub fn extract_leading_identifier(name: &str) -> Option<Identifier> {
    name.get(..IDENTIFIER_LEN).and_then(Identifier::parse)
}

/// A catalog identifier, stored lowercased so comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Parse a standalone token, rejecting anything that is not a valid identifier.
    pub fn parse(token: &str) -> Option<Self> {
        if is_valid_identifier(token) {
            Some(Self(token.to_ascii_lowercase()))
        } else {
            None
        }
    }

    /// Accept an identifier as reported by the catalog.
    ///
    /// The catalog is authoritative for its own IDs, so the value is only
    /// normalized, not validated. A malformed catalog ID can never equal an
    /// ID derived from a filename, which only come from [`Identifier::parse`].
    /// Returns `None` for empty input.
    pub fn from_catalog(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw.to_ascii_lowercase()))
        }
    }

    /// The normalized (lowercase) string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
