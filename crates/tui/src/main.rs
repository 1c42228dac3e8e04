use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lazyaz_core::Domain;
use lazyaz_tui::{RunOptions, config};
use std::path::PathBuf;
use std::sync::Mutex;

const LOG_ENV: &str = "LAZYAZ_LOG";
const DEFAULT_LOG_FILTER: &str = "lazyaz=info,lazyaz_tui=info,lazyaz_devops=info";

#[derive(Parser)]
#[command(
    name = "lazyaz",
    version,
    about = "Terminal browser for Azure DevOps work items, pull requests and pipelines"
)]
struct Cli {
    /// Config file to use instead of ./lazyaz.toml or ~/.lazyaz.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Page to open at startup
    #[arg(long, value_enum)]
    page: Option<Page>,

    /// Log file (default: ~/.lazyaz/lazyaz.log)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Page {
    Workitems,
    Pullrequests,
    Pipelines,
}

impl From<Page> for Domain {
    fn from(page: Page) -> Self {
        match page {
            Page::Workitems => Domain::WorkItems,
            Page::Pullrequests => Domain::PullRequests,
            Page::Pipelines => Domain::Pipelines,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file)?;

    lazyaz_tui::run(RunOptions {
        config_path: cli.config,
        start_page: cli.page.map(Domain::from),
    })
}

/// File logger, `~/.lazyaz/lazyaz.log` unless overridden.
fn init_logging(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => config::data_dir()?.join("lazyaz.log"),
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
