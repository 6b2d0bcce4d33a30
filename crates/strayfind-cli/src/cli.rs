use clap::Parser;
use std::path::PathBuf;

/// Command-line flags. Anything left unset falls back to the config file,
/// then to built-in defaults.
#[derive(Parser, Debug, Clone)]
#[command(name = "strayfind")]
#[command(about = "Find files in an Immich storage tree that Immich has no record of", long_about = None)]
pub struct Cli {
    /// Immich server URL (e.g. http://immich:2283)
    #[arg(long, env = "IMMICH_URL")]
    pub immich_url: Option<String>,

    /// Immich API key
    #[arg(long, env = "IMMICH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Immich storage root on disk (parent of upload/ and library/)
    #[arg(long)]
    pub library_path: Option<PathBuf>,

    /// Prefix stripped from catalog paths to make them relative to --library-path [default: /data/]
    #[arg(long)]
    pub path_prefix: Option<String>,

    /// Directory untracked files are moved to [default: ./immich-orphans]
    #[arg(long)]
    pub target_dir: Option<PathBuf>,

    /// PostgreSQL URL for multi-user scans with an admin key
    #[arg(long, env = "IMMICH_DB_URL", hide_env_values = true)]
    pub db_url: Option<String>,

    /// Actually move files (dry-run by default)
    #[arg(long = "move")]
    pub do_move: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file (.toml or .json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
