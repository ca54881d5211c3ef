use clap::Parser;
use esa_archiver::{ArchiveConfig, EsaClient, HttpDownloader, sequential};
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Archive esa.io posts and their attachments to Markdown files.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to write the archive into.
    /// Required unless set in config.
    #[arg(value_name = "TARGET_DIR")]
    target_dir: Option<PathBuf>,

    /// esa team name (the `docs` in docs.esa.io).
    #[arg(long, value_name = "NAME")]
    team: Option<String>,

    /// Path to a specific configuration file.
    /// Defaults to $XDG_CONFIG_HOME/esa-archiver/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print each file written and log progress.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress standard output (progress bar and summary).
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Deserialize, Default)]
struct FileConfig {
    target_dir: Option<PathBuf>,
    team: Option<String>,
    attachment_prefixes: Option<Vec<String>>,
    api_base: Option<Url>,
}

fn load_file_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    let path = if let Some(p) = explicit_path {
        if !p.exists() {
            return Err(eyre!("Config file not found: {}", p.display()));
        }
        Some(p.to_path_buf())
    } else {
        dirs::config_dir()
            .map(|d| d.join("esa-archiver/config.toml"))
            .filter(|p| p.exists())
    };

    match path {
        None => Ok(FileConfig::default()),
        Some(p) => {
            let content = fs::read_to_string(&p)
                .wrap_err_with(|| format!("Failed to read config: {}", p.display()))?;
            toml::from_str(&content)
                .wrap_err_with(|| format!("Failed to parse config: {}", p.display()))
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "esa_archiver=info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // 1. Load config file (CLI path > default path)
    let file_cfg = load_file_config(cli.config.as_deref())?;

    // 2. Resolve target_dir and team (CLI > Config)
    let target_dir = cli
        .target_dir
        .or(file_cfg.target_dir)
        .ok_or_else(|| eyre!("Please specify a target directory"))?;

    let team = cli
        .team
        .or(file_cfg.team)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| eyre!("Missing team name.\nUse --team, or set team in config.toml."))?;

    // 3. Credential comes only from the environment
    let token = std::env::var("ESA_TOKEN").unwrap_or_default();

    // 4. Build the Archive Config
    let mut config = ArchiveConfig::new(target_dir, team);
    if let Some(prefixes) = file_cfg.attachment_prefixes {
        config.attachment_prefixes = prefixes;
    }
    config.verbose = cli.verbose;
    config.quiet = cli.quiet;

    let client = match file_cfg.api_base {
        Some(base) => EsaClient::with_base_url(token, &config.team, base),
        None => EsaClient::new(token, &config.team),
    }?;
    let downloader = HttpDownloader::new()?;

    // 5. Run the Business Logic
    sequential::execute(&config, &client, &downloader)
        .wrap_err_with(|| format!("Archiving into {} failed", config.target_dir.display()))?;

    Ok(())
}
