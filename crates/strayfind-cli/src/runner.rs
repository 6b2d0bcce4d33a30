//! One end-to-end pass: pick a run mode, build the catalog snapshot, scan,
//! reconcile, report and relocate.

use crate::config::RunConfig;
use crate::report::render_report;
use anyhow::Context;
use std::fmt;
use std::path::PathBuf;
use strayfind_catalog::{CatalogClient, CatalogError, CatalogSource, DatabaseSource, User};
use strayfind_core::{CatalogSnapshot, Identifier, Reconciler, UntrackedEntry};
use strayfind_fs::{move_untracked, scan_files, MoveSummary, ScanOptions};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How the catalog was queried and which part of the tree was scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Admin key with database access: every user, whole storage root
    Admin,
    /// One user's library through the API
    SingleUser,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Admin => write!(f, "admin"),
            RunMode::SingleUser => write!(f, "single-user"),
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Mode the run used
    pub mode: RunMode,
    /// Filesystem entries examined
    pub entries_scanned: usize,
    /// Entries the catalog does not account for
    pub untracked: Vec<UntrackedEntry>,
    /// What the relocator did
    pub moves: MoveSummary,
}

/// What to scan and how to label the results.
struct ScanPlan {
    mode: RunMode,
    root: PathBuf,
    options: ScanOptions,
}

/// Drives a single reconciliation run.
pub struct Runner {
    config: RunConfig,
    cancel: CancellationToken,
    admin_source: Option<Box<dyn CatalogSource>>,
}

impl Runner {
    /// Create a runner; `cancel` aborts catalog fetches and the scan.
    pub fn new(config: RunConfig, cancel: CancellationToken) -> Self {
        Self {
            config,
            cancel,
            admin_source: None,
        }
    }

    /// Catalog source for admin runs, used instead of a [`DatabaseSource`]
    /// built from `db_url`.
    pub fn with_admin_source(mut self, source: Box<dyn CatalogSource>) -> Self {
        self.admin_source = Some(source);
        self
    }

    fn has_admin_source(&self) -> bool {
        self.admin_source.is_some() || self.config.db_url.is_some()
    }

    /// Execute the run. Fails on the first error from any step.
    pub async fn run(&self) -> anyhow::Result<RunReport> {
        let client = CatalogClient::new(&self.config.immich_url, &self.config.api_key)
            .with_page_size(self.config.page_size)
            .with_cancellation(self.cancel.clone());

        let admin_users = match client.fetch_all_users().await {
            Ok(users) => Some(users),
            Err(CatalogError::NotAdmin) => None,
            Err(e) => return Err(e).context("check API key permissions"),
        };

        let (snapshot, plan) = match admin_users {
            Some(users) if self.has_admin_source() => self.collect_admin(&users).await?,
            admin_users => {
                if admin_users.is_some() {
                    warn!("Admin API key without --db-url, scanning only the calling user's library");
                }
                self.collect_single_user(&client).await?
            }
        };
        let snapshot = snapshot.strip_path_prefix(&self.config.path_prefix);
        info!(
            mode = %plan.mode,
            paths = snapshot.paths().len(),
            content_ids = snapshot.content_ids().len(),
            owner_ids = snapshot.owner_ids().len(),
            "Catalog snapshot ready"
        );

        let files = self.scan(plan.root, plan.options).await?;
        let outcome = Reconciler::new(&self.config.dispatcher, &snapshot).run(&files);

        let moves = if outcome.untracked.is_empty() {
            info!("No untracked files found");
            MoveSummary::default()
        } else {
            eprint!("{}", render_report(&outcome.untracked, !self.config.do_move));
            self.relocate(&outcome.untracked).await?
        };

        Ok(RunReport {
            mode: plan.mode,
            entries_scanned: outcome.stats.entries,
            untracked: outcome.untracked,
            moves,
        })
    }

    async fn collect_admin(&self, users: &[User]) -> anyhow::Result<(CatalogSnapshot, ScanPlan)> {
        let mut snapshot = match (&self.admin_source, self.config.db_url.as_deref()) {
            (Some(source), _) => {
                info!(source = source.name(), "Admin mode: loading assets");
                collect_snapshot(source.as_ref()).await?
            }
            (None, Some(db_url)) => {
                let source = DatabaseSource::new(db_url).with_cancellation(self.cancel.clone());
                info!(db_url = %source.redacted_url(), "Admin mode: loading assets from database");
                collect_snapshot(&source).await?
            }
            (None, None) => anyhow::bail!("admin mode requires a catalog database"),
        };
        let added = snapshot.extend_owners(users.iter().filter_map(|u| Identifier::from_catalog(&u.id)));
        info!(users = users.len(), owners_added = added, "Registered admin user list as owners");

        let plan = ScanPlan {
            mode: RunMode::Admin,
            root: self.config.library_path.clone(),
            options: ScanOptions {
                exclude_dirs: self.config.scan_exclude_dirs.clone(),
                prefix: None,
            },
        };
        Ok((snapshot, plan))
    }

    async fn collect_single_user(
        &self,
        client: &CatalogClient,
    ) -> anyhow::Result<(CatalogSnapshot, ScanPlan)> {
        let user = client
            .fetch_current_user()
            .await
            .context("fetch current user")?;
        let label = user.storage_label().with_context(|| {
            format!(
                "user {} has no storage label; set one in the Immich admin settings",
                user.name
            )
        })?;
        info!(user = %user.name, storage_label = label, "Single-user mode");

        let mut snapshot = collect_snapshot(client).await?;
        snapshot.extend_owners(Identifier::from_catalog(&user.id));

        let plan = ScanPlan {
            mode: RunMode::SingleUser,
            root: self.config.library_path.join("library").join(label),
            // exclusions name storage-root directories, which lie outside this root
            options: ScanOptions {
                exclude_dirs: Vec::new(),
                prefix: Some(format!("library/{}/", label)),
            },
        };
        Ok((snapshot, plan))
    }

    async fn scan(&self, root: PathBuf, options: ScanOptions) -> anyhow::Result<Vec<String>> {
        let cancel = self.cancel.clone();
        let shown = root.display().to_string();
        info!(root = %shown, "Scanning storage tree");

        tokio::task::spawn_blocking(move || scan_files(&root, &options, &cancel))
            .await
            .context("scan task failed")?
            .with_context(|| format!("scan {}", shown))
    }

    async fn relocate(&self, untracked: &[UntrackedEntry]) -> anyhow::Result<MoveSummary> {
        let rel_paths: Vec<String> = untracked.iter().map(|e| e.rel_path.clone()).collect();
        let library = self.config.library_path.clone();
        let target = self.config.target_dir.clone();
        let dry_run = !self.config.do_move;

        let summary = tokio::task::spawn_blocking(move || {
            move_untracked(&rel_paths, &library, &target, dry_run)
        })
        .await
        .context("move task failed")?
        .context("relocate untracked files")?;

        info!(
            moved = summary.moved,
            planned = summary.planned,
            target = %self.config.target_dir.display(),
            "Relocation complete"
        );
        Ok(summary)
    }
}

async fn collect_snapshot(source: &dyn CatalogSource) -> anyhow::Result<CatalogSnapshot> {
    let mut snapshot = CatalogSnapshot::new();
    source
        .collect(&mut snapshot)
        .await
        .with_context(|| format!("fetch assets from {}", source.name()))?;
    Ok(snapshot)
}
