use anyhow::{Context, Result};
use clap::Parser;
use localturk::config::Config;
use localturk::runtime::service::TurkService;
use localturk::server;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Run Mechanical Turk-like tasks locally", long_about = None)]
struct Cli {
    /// HTML template with an optional `<!-- localturk-repeat -->` region
    template: PathBuf,

    /// CSV file with one task per row
    tasks: PathBuf,

    /// CSV file completed records are appended to
    outputs: PathBuf,

    /// Port to listen on
    #[arg(long, short, default_value_t = 4321)]
    port: u16,

    /// Number of tasks per page
    #[arg(long, short, default_value_t = 1)]
    batch_size: usize,

    /// Serve static content from this directory
    #[arg(long, short)]
    static_dir: Option<PathBuf>,

    /// Quit when all tasks are done
    #[arg(long, short)]
    quit_on_done: bool,

    /// Do not open a browser on startup
    #[arg(long)]
    no_open: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            template: cli.template,
            tasks: cli.tasks,
            outputs: cli.outputs,
            port: cli.port,
            batch_size: cli.batch_size,
            static_dir: cli.static_dir,
            quit_on_done: cli.quit_on_done,
            open_browser: !cli.no_open,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config: Config = Cli::parse().into();
    info!(config = %serde_json::to_string(&config)?, "Starting local turk");

    let service = TurkService::from_config(&config)
        .with_context(|| format!("Failed to start with template {}", config.template.display()))?;
    let (done, total) = service.progress().await;
    info!("Completed {} / {} tasks, {} per page", done, total, service.batch_size());

    server::run(&config, Arc::new(service)).await
}
