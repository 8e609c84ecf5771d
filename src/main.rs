use anyhow::{Context, Result as AnyhowResult};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tree_browser::config::{self, BrowserConfig};
use tree_browser::nav::{BrowserSession, RoutingDecision, SelectOutcome};
use tree_browser::services::accessor::{LocalTreeAccessor, SlowAccessor, TreeAccessor};
use tree_browser::services::tracing_setup;

/// Browse a directory tree the way a remote share is browsed
#[derive(Parser, Debug)]
#[command(name = "tree-browser")]
#[command(about = "List a directory tree and route entries to viewers", long_about = None)]
#[command(version)]
struct Args {
    /// Directory served as the tree root
    #[arg(value_name = "ROOT")]
    root: PathBuf,

    /// Path below the root to list, '/'-separated (default: the root)
    #[arg(value_name = "PATH")]
    path: Option<String>,

    /// Activate the entry with this name and print where it leads
    #[arg(long, value_name = "NAME")]
    select: Option<String>,

    /// Print the first bytes of a selected file
    #[arg(long, value_name = "BYTES")]
    peek: Option<usize>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Path to log file (default: the data directory)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Delay every accessor call by this many milliseconds
    #[arg(long, value_name = "MS")]
    slow_ms: Option<u64>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

fn init_logging(log_file: Option<PathBuf>) {
    let Some(path) = log_file.or_else(config::default_log_path) else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = tracing_setup::init_global(&path) {
        eprintln!("Warning: logging disabled ({}): {}", path.display(), e);
    }
}

fn load_config(path: Option<PathBuf>) -> AnyhowResult<BrowserConfig> {
    match path {
        Some(path) => BrowserConfig::load_from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => match config::default_config_path() {
            Some(path) => BrowserConfig::load_or_default(&path)
                .with_context(|| format!("Failed to load config from {}", path.display())),
            None => Ok(BrowserConfig::default()),
        },
    }
}

fn print_listing(session: &BrowserSession) {
    let title = session.title().unwrap_or("/");
    println!("{}", title);
    for row in session.display_rows() {
        let marker = if row.is_directory { "/" } else { "" };
        println!("  {}{}  {}", row.name, marker, row.secondary_text());
    }
}

async fn run(args: Args, config: BrowserConfig) -> AnyhowResult<()> {
    let local: Arc<dyn TreeAccessor> = Arc::new(LocalTreeAccessor::new(&args.root));
    let accessor: Arc<dyn TreeAccessor> = match args.slow_ms {
        Some(ms) => Arc::new(SlowAccessor::with_uniform_delay(
            local,
            Duration::from_millis(ms),
        )),
        None => local,
    };

    let mut session = BrowserSession::new(accessor, config);
    session
        .reload()
        .await
        .with_context(|| format!("Failed to list {}", args.root.display()))?;

    let segments = args.path.as_deref().unwrap_or("");
    for segment in segments.split('/').filter(|s| !s.is_empty()) {
        match session.select_named(segment) {
            Some(SelectOutcome::Descended(path)) => {
                session
                    .reload()
                    .await
                    .with_context(|| format!("Failed to list {:?}", path.as_str()))?;
            }
            Some(SelectOutcome::Launch(launch)) => {
                anyhow::bail!("{:?} is not a directory", launch.path().as_str());
            }
            None => {
                anyhow::bail!(
                    "No entry named {:?} in {:?}",
                    segment,
                    session.current().path().as_str()
                );
            }
        }
    }

    let Some(name) = args.select else {
        print_listing(&session);
        return Ok(());
    };

    match session.select_named(&name) {
        Some(SelectOutcome::Descended(path)) => {
            println!("{}", RoutingDecision::Descend(path.clone()));
            session
                .reload()
                .await
                .with_context(|| format!("Failed to list {:?}", path.as_str()))?;
            print_listing(&session);
        }
        Some(SelectOutcome::Launch(launch)) => {
            println!("{}", launch.decision);
            if let Some(len) = args.peek {
                let bytes = launch
                    .accessor
                    .read_range(launch.path().as_str(), 0, len)
                    .await
                    .with_context(|| format!("Failed to read {:?}", launch.path().as_str()))?;
                println!("{}", String::from_utf8_lossy(&bytes));
            }
        }
        None => anyhow::bail!(
            "No entry named {:?} in {:?}",
            name,
            session.current().path().as_str()
        ),
    }

    Ok(())
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    init_logging(args.log_file.clone());

    let config = load_config(args.config.clone())?;
    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(run(args, config))
}
