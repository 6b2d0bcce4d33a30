use crate::cli::Cli;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strayfind_catalog::DEFAULT_PAGE_SIZE;
use strayfind_core::{DirectoryPolicy, Dispatcher};
use strayfind_fs::DEFAULT_EXCLUDED_DIRS;

/// File-level configuration. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrayConfig {
    /// Immich server URL
    pub immich_url: Option<String>,
    /// Immich API key
    pub api_key: Option<String>,
    /// Storage root on disk
    pub library_path: Option<PathBuf>,
    /// Prefix stripped from catalog paths
    pub path_prefix: String,
    /// Where untracked files are moved to
    pub target_dir: PathBuf,
    /// PostgreSQL URL for admin runs
    pub db_url: Option<String>,
    /// Assets requested per search page
    pub page_size: u32,
    /// Top-level directories the scanner skips
    pub scan_exclude_dirs: Vec<String>,
    /// Directory-to-strategy mapping
    pub policy: DirectoryPolicy,
}

impl Default for StrayConfig {
    fn default() -> Self {
        Self {
            immich_url: None,
            api_key: None,
            library_path: None,
            path_prefix: String::from("/data/"),
            target_dir: PathBuf::from("./immich-orphans"),
            db_url: None,
            page_size: DEFAULT_PAGE_SIZE,
            scan_exclude_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            policy: DirectoryPolicy::default(),
        }
    }
}

impl StrayConfig {
    /// Parse a `.toml` or `.json` file, chosen by extension.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        match ext.to_lowercase().as_str() {
            "toml" => {
                let config: StrayConfig = toml::from_str(&contents)?;
                Ok(config)
            }
            "json" => {
                let config: StrayConfig = serde_json::from_str(&contents)?;
                Ok(config)
            }
            _ => anyhow::bail!("Unsupported config file extension: {}", ext),
        }
    }

    /// Load the config named on the command line, or defaults when none was
    /// given or the file does not exist.
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        match &cli.config {
            Some(path) if path.exists() => Self::from_file(path),
            Some(path) => {
                tracing::warn!("Config file not found, using defaults: {}", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Overlay flags given on the command line.
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        if let Some(url) = &cli.immich_url {
            self.immich_url = Some(url.clone());
        }
        if let Some(key) = &cli.api_key {
            self.api_key = Some(key.clone());
        }
        if let Some(path) = &cli.library_path {
            self.library_path = Some(path.clone());
        }
        if let Some(prefix) = &cli.path_prefix {
            self.path_prefix = prefix.clone();
        }
        if let Some(dir) = &cli.target_dir {
            self.target_dir = dir.clone();
        }
        if let Some(db) = &cli.db_url {
            self.db_url = Some(db.clone());
        }
        self
    }

    /// Check required settings and compile the directory policy.
    pub fn resolve(self, do_move: bool) -> anyhow::Result<RunConfig> {
        let (immich_url, api_key, library_path) =
            match (non_empty(self.immich_url), non_empty(self.api_key), self.library_path) {
                (Some(url), Some(key), Some(path)) => (url, key, path),
                _ => anyhow::bail!("--immich-url, --api-key, and --library-path are required"),
            };
        let dispatcher = self
            .policy
            .compile()
            .context("invalid directory policy")?;

        Ok(RunConfig {
            immich_url,
            api_key,
            library_path,
            path_prefix: self.path_prefix,
            target_dir: self.target_dir,
            db_url: non_empty(self.db_url),
            page_size: self.page_size.max(1),
            scan_exclude_dirs: self.scan_exclude_dirs,
            dispatcher,
            do_move,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Fully-resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Immich server URL
    pub immich_url: String,
    /// Immich API key
    pub api_key: String,
    /// Storage root on disk
    pub library_path: PathBuf,
    /// Prefix stripped from catalog paths
    pub path_prefix: String,
    /// Where untracked files are moved to
    pub target_dir: PathBuf,
    /// PostgreSQL URL, enables whole-tree admin runs
    pub db_url: Option<String>,
    /// Assets requested per search page, at least 1
    pub page_size: u32,
    /// Top-level directories of the storage root the scanner skips
    pub scan_exclude_dirs: Vec<String>,
    /// Compiled directory policy
    pub dispatcher: Dispatcher,
    /// Move files instead of only listing them
    pub do_move: bool,
}
