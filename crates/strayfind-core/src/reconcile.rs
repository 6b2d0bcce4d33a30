//! Reconciliation engine: applies directory dispatch to every filesystem
//! entry against a frozen catalog snapshot and collects what the catalog
//! does not know about.

use crate::catalog::CatalogSnapshot;
use crate::identifier::{extract_leading_identifier, Identifier};
use crate::strategy::{file_name, Dispatcher, Strategy};
use std::collections::HashMap;
use tracing::{debug, info};

/// Outcome of matching a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchVerdict {
    /// Whether the catalog accounts for the entry
    pub known: bool,
    /// The strategy that decided it
    pub strategy: Strategy,
}

/// A filesystem entry the catalog has no record of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UntrackedEntry {
    /// Forward-slash path relative to the storage root
    pub rel_path: String,
    /// Strategy under which the entry was found unknown
    pub strategy: Strategy,
}

/// Per-run counters, mostly for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Entries examined
    pub entries: usize,
    /// Entries found untracked
    pub untracked: usize,
    /// Entries examined under each strategy
    pub by_strategy: HashMap<Strategy, usize>,
}

/// Result of a reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    /// Untracked entries in input order
    pub untracked: Vec<UntrackedEntry>,
    /// Counters for the pass
    pub stats: ReconcileStats,
}

/// Matches filesystem entries against a snapshot under a dispatcher.
///
/// Holds shared borrows only, so the snapshot cannot change underneath it and
/// the same reconciler can be used from several threads at once.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    dispatcher: &'a Dispatcher,
    snapshot: &'a CatalogSnapshot,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler over a frozen snapshot.
    pub fn new(dispatcher: &'a Dispatcher, snapshot: &'a CatalogSnapshot) -> Self {
        Self { dispatcher, snapshot }
    }

    /// Decide whether a single entry is known to the catalog.
    pub fn verdict(&self, rel_path: &str) -> MatchVerdict {
        let strategy = self.dispatcher.classify(rel_path);
        let known = match strategy {
            Strategy::Primary => self.snapshot.contains_path(rel_path),
            Strategy::Derived => extract_leading_identifier(file_name(rel_path))
                .is_some_and(|id| self.snapshot.contains_content_id(&id)),
            Strategy::Owner => owner_segment(rel_path)
                .is_some_and(|id| self.snapshot.contains_owner_id(&id)),
            Strategy::Marker => true,
            Strategy::Unknown => false,
        };
        MatchVerdict { known, strategy }
    }

    /// Run every entry through [`Reconciler::verdict`], keeping input order.
    ///
    /// The input is not deduplicated: an entry listed twice and untracked is
    /// reported twice.
    pub fn run<I, S>(&self, entries: I) -> ReconcileOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut outcome = ReconcileOutcome::default();

        for entry in entries {
            let rel_path = entry.as_ref();
            let verdict = self.verdict(rel_path);
            outcome.stats.entries += 1;
            *outcome.stats.by_strategy.entry(verdict.strategy).or_insert(0) += 1;

            if !verdict.known {
                debug!(path = rel_path, strategy = %verdict.strategy, "Found untracked file");
                outcome.untracked.push(UntrackedEntry {
                    rel_path: rel_path.to_string(),
                    strategy: verdict.strategy,
                });
            }
        }
        outcome.stats.untracked = outcome.untracked.len();

        let count = |s: Strategy| outcome.stats.by_strategy.get(&s).copied().unwrap_or(0);
        info!(
            entries = outcome.stats.entries,
            untracked_found = outcome.stats.untracked,
            primary = count(Strategy::Primary),
            derived = count(Strategy::Derived),
            owner = count(Strategy::Owner),
            marker = count(Strategy::Marker),
            unknown = count(Strategy::Unknown),
            "Matching complete"
        );
        outcome
    }
}

/// Second path segment parsed as an owner identifier, e.g. the `{userId}` in
/// `profile/{userId}/profile-image.jpg`.
fn owner_segment(rel_path: &str) -> Option<Identifier> {
    rel_path.split('/').nth(1).and_then(Identifier::parse)
}

/// Return the entries of `entries` the catalog does not account for, in input order.
pub fn find_untracked<I, S>(
    entries: I,
    dispatcher: &Dispatcher,
    snapshot: &CatalogSnapshot,
) -> Vec<UntrackedEntry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Reconciler::new(dispatcher, snapshot).run(entries).untracked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ContentRecord;
    use crate::strategy::DirectoryPolicy;

    const ASSET: &str = "aaaaaaaa-1111-2222-3333-444444444444";
    const USER: &str = "bbbbbbbb-1111-2222-3333-444444444444";

    fn snapshot() -> CatalogSnapshot {
        let mut snapshot = CatalogSnapshot::new();
        snapshot.merge(&[ContentRecord::new(ASSET, USER, "library/admin/2024/photo1.jpg")]);
        snapshot
    }

    fn untracked_paths(entries: &[&str], snapshot: &CatalogSnapshot) -> Vec<String> {
        let dispatcher = DirectoryPolicy::default().compile().unwrap();
        find_untracked(entries.iter(), &dispatcher, snapshot)
            .into_iter()
            .map(|u| u.rel_path)
            .collect()
    }

    #[test]
    fn test_primary_exact_match() {
        let s = snapshot();
        assert!(untracked_paths(&["library/admin/2024/photo1.jpg"], &s).is_empty());
        assert_eq!(
            untracked_paths(&["library/admin/2024/photo1.JPG"], &s),
            vec!["library/admin/2024/photo1.JPG"]
        );
    }

    #[test]
    fn test_derived_thumbnail_and_video() {
        let s = snapshot();
        let thumb = format!("thumbs/{}/aa/aa/{}-thumbnail.webp", USER, ASSET);
        let video = format!("encoded-video/{}/aa/aa/{}.mp4", USER, ASSET);
        assert!(untracked_paths(&[thumb.as_str(), video.as_str()], &s).is_empty());
    }

    #[test]
    fn test_derived_uppercase_filename_matches() {
        let s = snapshot();
        let thumb = format!("thumbs/x/{}-preview.jpeg", ASSET.to_uppercase());
        assert!(untracked_paths(&[thumb.as_str()], &s).is_empty());
    }

    #[test]
    fn test_derived_without_identifier_is_untracked() {
        let s = snapshot();
        assert_eq!(
            untracked_paths(&["thumbs/x/random.webp"], &s),
            vec!["thumbs/x/random.webp"]
        );
    }

    #[test]
    fn test_owner_match() {
        let s = snapshot();
        let known = format!("profile/{}/profile-image.jpg", USER);
        let unknown = "profile/cccccccc-1111-2222-3333-444444444444/profile-image.jpg";
        assert_eq!(untracked_paths(&[known.as_str(), unknown], &s), vec![unknown]);
    }

    #[test]
    fn test_owner_uppercase_segment_matches() {
        let s = snapshot();
        let upper = format!("profile/{}/profile-image.jpg", USER.to_uppercase());
        assert!(untracked_paths(&[upper.as_str()], &s).is_empty());

        let mut upper_catalog = CatalogSnapshot::new();
        upper_catalog.merge(&[ContentRecord::new("", &USER.to_uppercase(), "")]);
        let lower = format!("profile/{}/profile-image.jpg", USER);
        assert!(untracked_paths(&[lower.as_str()], &upper_catalog).is_empty());
    }

    #[test]
    fn test_owner_segment_must_be_valid_identifier() {
        let mut s = snapshot();
        s.merge(&[ContentRecord::new("", "user-1", "")]);
        assert_eq!(
            untracked_paths(&["profile/user-1/profile-image.jpg"], &s),
            vec!["profile/user-1/profile-image.jpg"]
        );
    }

    #[test]
    fn test_owner_file_directly_in_profile_dir() {
        let s = snapshot();
        assert_eq!(untracked_paths(&["profile/a.jpg"], &s), vec!["profile/a.jpg"]);
    }

    #[test]
    fn test_marker_always_known() {
        let s = CatalogSnapshot::new();
        assert!(untracked_paths(&[".immich", "upload/.immich", "thumbs/.immich"], &s).is_empty());
    }

    #[test]
    fn test_duplicates_reported_twice() {
        let s = snapshot();
        assert_eq!(
            untracked_paths(&["backups/x.sql", "backups/x.sql"], &s),
            vec!["backups/x.sql", "backups/x.sql"]
        );
    }

    #[test]
    fn test_malformed_paths_reported() {
        let s = snapshot();
        assert_eq!(untracked_paths(&["", "stray"], &s), vec!["", "stray"]);
    }

    #[test]
    fn test_verdict_reports_strategy() {
        let dispatcher = DirectoryPolicy::default().compile().unwrap();
        let s = snapshot();
        let reconciler = Reconciler::new(&dispatcher, &s);

        assert_eq!(
            reconciler.verdict("library/admin/2024/photo1.jpg"),
            MatchVerdict { known: true, strategy: Strategy::Primary }
        );
        assert_eq!(
            reconciler.verdict("weird/x.dat"),
            MatchVerdict { known: false, strategy: Strategy::Unknown }
        );
    }

    #[test]
    fn test_run_stats() {
        let dispatcher = DirectoryPolicy::default().compile().unwrap();
        let s = snapshot();
        let outcome = Reconciler::new(&dispatcher, &s).run([
            "library/admin/2024/photo1.jpg",
            "library/admin/2024/stray.jpg",
            ".immich",
            "weird/x",
        ]);

        assert_eq!(outcome.stats.entries, 4);
        assert_eq!(outcome.stats.untracked, 2);
        assert_eq!(outcome.stats.by_strategy.get(&Strategy::Primary), Some(&2));
        assert_eq!(outcome.stats.by_strategy.get(&Strategy::Marker), Some(&1));
        assert_eq!(outcome.untracked[0].strategy, Strategy::Primary);
        assert_eq!(outcome.untracked[1].strategy, Strategy::Unknown);
    }
}
