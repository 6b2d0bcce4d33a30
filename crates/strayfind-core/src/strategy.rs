//! Directory strategy dispatch: decides, from a relative path alone, which
//! identity set and comparison rule applies to a filesystem entry.

use crate::error::PolicyError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Matching rule applied to a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Original content: exact path match against catalog paths.
    Primary,
    /// Generated content (thumbnails, transcodes): leading identifier of the
    /// filename must be a known content ID.
    Derived,
    /// Per-owner content: second path segment must be a known owner ID.
    Owner,
    /// Reserved marker file: always known.
    Marker,
    /// Unrecognized location: never known.
    Unknown,
}

impl Strategy {
    /// All strategies, in dispatch precedence order.
    pub const ALL: [Strategy; 5] = [
        Strategy::Marker,
        Strategy::Primary,
        Strategy::Derived,
        Strategy::Owner,
        Strategy::Unknown,
    ];
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Primary => write!(f, "primary"),
            Strategy::Derived => write!(f, "derived"),
            Strategy::Owner => write!(f, "owner"),
            Strategy::Marker => write!(f, "marker"),
            Strategy::Unknown => write!(f, "unknown"),
        }
    }
}

/// Which top-level directories map to which strategy.
///
/// Defaults to the Immich storage layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryPolicy {
    /// Directories holding original uploads
    pub primary_dirs: Vec<String>,
    /// Directories holding files generated from an asset
    pub derived_dirs: Vec<String>,
    /// Directories keyed by owner ID in their second segment
    pub owner_dirs: Vec<String>,
    /// Base filename that is always considered known
    pub marker_name: String,
}

impl Default for DirectoryPolicy {
    fn default() -> Self {
        Self {
            primary_dirs: vec!["library".to_string(), "upload".to_string()],
            derived_dirs: vec!["thumbs".to_string(), "encoded-video".to_string()],
            owner_dirs: vec!["profile".to_string()],
            marker_name: ".immich".to_string(),
        }
    }
}

impl DirectoryPolicy {
    /// Validate the policy and build a [`Dispatcher`] from it.
    pub fn compile(&self) -> Result<Dispatcher, PolicyError> {
        if self.marker_name.is_empty() || self.marker_name.contains('/') {
            return Err(PolicyError::InvalidMarker(self.marker_name.clone()));
        }

        let mut segments: HashMap<String, Strategy> = HashMap::new();
        let groups = [
            (Strategy::Primary, &self.primary_dirs),
            (Strategy::Derived, &self.derived_dirs),
            (Strategy::Owner, &self.owner_dirs),
        ];

        for (strategy, dirs) in groups {
            for dir in dirs {
                if dir.is_empty() {
                    return Err(PolicyError::EmptySegment(strategy));
                }
                if dir.contains('/') {
                    return Err(PolicyError::NestedSegment(dir.clone()));
                }
                if let Some(first) = segments.insert(dir.clone(), strategy) {
                    if first != strategy {
                        return Err(PolicyError::ConflictingSegment {
                            segment: dir.clone(),
                            first,
                            second: strategy,
                        });
                    }
                }
            }
        }

        Ok(Dispatcher {
            segments,
            marker_name: self.marker_name.clone(),
        })
    }
}

/// Compiled, immutable form of a [`DirectoryPolicy`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    segments: HashMap<String, Strategy>,
    marker_name: String,
}

impl Dispatcher {
    /// Choose the strategy for a forward-slash relative path.
    ///
    /// The marker check looks at the base filename, so a marker nested at
    /// any depth is recognized. Everything else keys on the top-level
    /// segment. A path without a directory component (including the empty
    /// path) has no recognizable top-level directory and is `Unknown`.
    pub fn classify(&self, rel_path: &str) -> Strategy {
        if file_name(rel_path) == self.marker_name {
            return Strategy::Marker;
        }

        match rel_path.split_once('/') {
            Some((top, _)) => self.segments.get(top).copied().unwrap_or(Strategy::Unknown),
            None => Strategy::Unknown,
        }
    }

    /// The marker filename in effect.
    pub fn marker_name(&self) -> &str {
        &self.marker_name
    }
}

/// Last segment of a forward-slash path.
pub(crate) fn file_name(rel_path: &str) -> &str {
    rel_path.rsplit('/').next().unwrap_or(rel_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> Dispatcher {
        DirectoryPolicy::default().compile().unwrap()
    }

    #[test]
    fn test_default_policy_layout() {
        let d = dispatcher();
        assert_eq!(d.classify("library/admin/2024/a.jpg"), Strategy::Primary);
        assert_eq!(d.classify("upload/abc/a.jpg"), Strategy::Primary);
        assert_eq!(d.classify("thumbs/u/aa/bb/x-thumbnail.webp"), Strategy::Derived);
        assert_eq!(d.classify("encoded-video/u/aa/bb/x.mp4"), Strategy::Derived);
        assert_eq!(d.classify("profile/u/profile-image.jpg"), Strategy::Owner);
        assert_eq!(d.marker_name(), ".immich");
    }

    #[test]
    fn test_marker_at_any_depth() {
        let d = dispatcher();
        assert_eq!(d.classify(".immich"), Strategy::Marker);
        assert_eq!(d.classify("library/.immich"), Strategy::Marker);
        assert_eq!(d.classify("thumbs/a/b/c/.immich"), Strategy::Marker);
        assert_eq!(d.classify("weird/.immich"), Strategy::Marker);
    }

    #[test]
    fn test_marker_must_be_base_name() {
        let d = dispatcher();
        assert_eq!(d.classify(".immich/file.txt"), Strategy::Unknown);
        assert_eq!(d.classify("library/.immich.bak"), Strategy::Primary);
    }

    #[test]
    fn test_unknown_top_level() {
        let d = dispatcher();
        assert_eq!(d.classify("backups/dump.sql.gz"), Strategy::Unknown);
        assert_eq!(d.classify("Library/a.jpg"), Strategy::Unknown);
    }

    #[test]
    fn test_malformed_paths_are_unknown() {
        let d = dispatcher();
        assert_eq!(d.classify(""), Strategy::Unknown);
        assert_eq!(d.classify("stray.jpg"), Strategy::Unknown);
        assert_eq!(d.classify("library"), Strategy::Unknown);
        assert_eq!(d.classify("/library/a.jpg"), Strategy::Unknown);
    }

    #[test]
    fn test_custom_policy() {
        let policy = DirectoryPolicy {
            primary_dirs: vec!["originals".to_string()],
            derived_dirs: vec!["previews".to_string()],
            owner_dirs: vec!["avatars".to_string()],
            marker_name: ".keep".to_string(),
        };
        let d = policy.compile().unwrap();
        assert_eq!(d.classify("originals/a.jpg"), Strategy::Primary);
        assert_eq!(d.classify("previews/a.jpg"), Strategy::Derived);
        assert_eq!(d.classify("avatars/u/a.jpg"), Strategy::Owner);
        assert_eq!(d.classify("library/a.jpg"), Strategy::Unknown);
        assert_eq!(d.classify("originals/sub/.keep"), Strategy::Marker);
    }

    #[test]
    fn test_conflicting_segment_rejected() {
        let policy = DirectoryPolicy {
            derived_dirs: vec!["library".to_string()],
            ..DirectoryPolicy::default()
        };
        let err = policy.compile().unwrap_err();
        assert_eq!(
            err,
            PolicyError::ConflictingSegment {
                segment: "library".to_string(),
                first: Strategy::Primary,
                second: Strategy::Derived,
            }
        );
    }

    #[test]
    fn test_repeated_segment_same_strategy_allowed() {
        let policy = DirectoryPolicy {
            primary_dirs: vec!["library".to_string(), "library".to_string()],
            ..DirectoryPolicy::default()
        };
        assert!(policy.compile().is_ok());
    }

    #[test]
    fn test_invalid_segments_rejected() {
        let empty = DirectoryPolicy {
            owner_dirs: vec![String::new()],
            ..DirectoryPolicy::default()
        };
        assert_eq!(empty.compile().unwrap_err(), PolicyError::EmptySegment(Strategy::Owner));

        let nested = DirectoryPolicy {
            primary_dirs: vec!["a/b".to_string()],
            ..DirectoryPolicy::default()
        };
        assert!(matches!(nested.compile(), Err(PolicyError::NestedSegment(_))));
    }

    #[test]
    fn test_invalid_marker_rejected() {
        let policy = DirectoryPolicy {
            marker_name: String::new(),
            ..DirectoryPolicy::default()
        };
        assert!(matches!(policy.compile(), Err(PolicyError::InvalidMarker(_))));
    }

    #[test]
    fn test_policy_deserialize_partial() {
        let policy: DirectoryPolicy =
            serde_json::from_str(r#"{"marker_name": ".marker"}"#).unwrap();
        assert_eq!(policy.marker_name, ".marker");
        assert_eq!(policy.primary_dirs, vec!["library", "upload"]);
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::Derived.to_string(), "derived");
        assert_eq!(Strategy::ALL.len(), 5);
    }
}
