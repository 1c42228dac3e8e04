//! Terminal browser for Azure DevOps work items, pull requests and
//! pipeline runs.

pub mod app;
pub mod config;
pub mod engine;
pub mod extensions;
mod theme;
mod ui;
mod views;

use anyhow::{Context, Result};
use app::{App, AppEvent};
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use engine::{AnnounceDuration, Announcement, BrowserController, BrowserPage};
use extensions::{EntryPointTable, ExtensionRegistry};
use lazyaz_core::{Domain, PipelineRun, PullRequest, WorkItem};
use lazyaz_devops::{
    AzCli, DevOpsClient, DevOpsConfig, Identity, PipelineRunSource, PullRequestSource,
    WorkItemSource,
};
use ratatui::prelude::*;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Explicit config file; otherwise `./lazyaz.toml` then `~/.lazyaz.toml`.
    pub config_path: Option<PathBuf>,
    /// Overrides `ui.start_page`.
    pub start_page: Option<Domain>,
}

/// Launch the TUI.
pub fn run(options: RunOptions) -> Result<()> {
    let (mut config, _) = config::load_config(options.config_path.as_deref())?;
    if let Some(page) = options.start_page {
        config.ui.start_page = page.tag().to_string();
    }
    let devops = DevOpsConfig::from_environment(&config.devops)
        .context("Azure DevOps organization is not configured")?;
    tracing::info!(
        organization = %devops.organization,
        project = %devops.project,
        "starting lazyaz"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("lazyaz-worker")
        .build()
        .context("Failed to start background runtime")?;

    let client = Arc::new(DevOpsClient::new(Arc::new(AzCli::default()), devops));
    let identity = Arc::new(Identity::new(Arc::clone(&client)));
    let pages = build_pages(&client, &identity, runtime.handle());
    let registry = ExtensionRegistry::load(&config.extensions, &EntryPointTable::builtin());

    let (tx, rx) = mpsc::channel();
    let lookup = Arc::clone(&identity);
    runtime.spawn_blocking(move || {
        let _ = tx.send(AppEvent::Identity(lookup.profile()));
    });

    let mut app = App::new(pages, registry, &config.ui).with_events(rx);
    let skipped = app.registry.warnings().len();
    if skipped > 0 {
        app.announce_at(
            Announcement::error(format!("{skipped} extension warning(s); see the log"))
                .with_duration(AnnounceDuration::Seconds(10)),
            Instant::now(),
        );
    }

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    app.start();
    let result = event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    // Blocking az calls still running are abandoned, not joined.
    drop(app);
    runtime.shutdown_background();

    result
}

fn build_pages(
    client: &Arc<DevOpsClient>,
    identity: &Arc<Identity>,
    runtime: &Handle,
) -> Vec<Box<dyn BrowserPage>> {
    Domain::ALL
        .iter()
        .map(|domain| -> Box<dyn BrowserPage> {
            match domain {
                Domain::WorkItems => Box::new(BrowserController::<WorkItem>::new(
                    Arc::new(WorkItemSource::new(Arc::clone(client))),
                    runtime.clone(),
                )),
                Domain::PullRequests => Box::new(BrowserController::<PullRequest>::new(
                    Arc::new(PullRequestSource::new(Arc::clone(client), Arc::clone(identity))),
                    runtime.clone(),
                )),
                Domain::Pipelines => Box::new(BrowserController::<PipelineRun>::new(
                    Arc::new(PipelineRunSource::new(Arc::clone(client))),
                    runtime.clone(),
                )),
            }
        })
        .collect()
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.tick(Instant::now());

        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if app.handle_key(key) {
                    break;
                }
            }
        }
    }
    Ok(())
}
