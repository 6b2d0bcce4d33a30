use strayfind_core::UntrackedEntry;

/// Notice printed after the listing when files were not moved.
pub const DRY_RUN_NOTICE: &str =
    "Dry-run mode: no files were moved. Use --move to relocate untracked files.";

/// Human-readable listing of untracked entries. Empty input renders nothing.
pub fn render_report(untracked: &[UntrackedEntry], dry_run: bool) -> String {
    if untracked.is_empty() {
        return String::new();
    }

    let mut out = format!("\nFound {} untracked file(s):\n", untracked.len());
    for entry in untracked {
        out.push_str("  ");
        out.push_str(&entry.rel_path);
        out.push('\n');
    }
    if dry_run {
        out.push('\n');
        out.push_str(DRY_RUN_NOTICE);
        out.push('\n');
    }
    out
}
