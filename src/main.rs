use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::oneshot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chair_flying::catalog::Catalog;
use chair_flying::config::{Settings, DEFAULT_CONFIG_FILE};
use chair_flying::console::{
    prompt_selection, render_config_summary, render_follow_ups, render_session_start,
    render_session_summary, render_summary_since, ConfigSummary, Console, Event, SessionSummary,
    TerminalConsole,
};
use chair_flying::db::HistoryStore;
use chair_flying::error::EmptyPoolCause;
use chair_flying::models::HistoryRecord;
use chair_flying::pool::DrawPolicy;
use chair_flying::session::{Pacing, Session, SessionReport, Termination};
use chair_flying::{filter, Error};

/// How long an interrupted session gets to wind down on its own.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(300);

#[derive(Parser)]
#[command(name = "chairfly")]
#[command(about = "Randomly timed chair flying drills for maneuvers and emergencies")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a drill session (default)
    Drill(DrillArgs),
    /// Validate the configuration and maneuver catalog
    Check {
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
    /// List every maneuver marked for follow-up
    FollowUps {
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
    /// Write a default configuration file
    Init {
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
}

#[derive(Args)]
struct DrillArgs {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Seed the random source for a reproducible session
    #[arg(long)]
    seed: Option<u64>,

    /// Wait for Enter between maneuvers instead of a random timer
    #[arg(short, long)]
    manual: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Default for DrillArgs {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG_FILE),
            seed: None,
            manual: false,
            verbose: false,
        }
    }
}

/// Initialize tracing on stderr; stdout belongs to the drill.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "chair_flying=debug,chairfly=debug"
    } else {
        "chair_flying=warn,chairfly=warn"
    };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Drill(DrillArgs::default()));

    let verbose = matches!(&command, Commands::Drill(args) if args.verbose);
    init_tracing(verbose);

    match command {
        Commands::Drill(args) => drill(args).await?,
        Commands::Check { config } => check(&config)?,
        Commands::FollowUps { config } => follow_ups(&config)?,
        Commands::Init { config } => init(&config)?,
    }

    Ok(())
}

fn open_history(settings: &Settings) -> anyhow::Result<HistoryStore> {
    let store = match &settings.history_file {
        Some(path) => HistoryStore::open(path.clone())?,
        None => HistoryStore::open_default()?,
    };
    store.migrate()?;
    Ok(store)
}

async fn drill(args: DrillArgs) -> anyhow::Result<()> {
    let mut settings = Settings::load(&args.config)?;
    if args.manual {
        settings.manual_mode = true;
    }
    let catalog = Catalog::from_path(&settings.maneuvers_file)?;
    let store = open_history(&settings)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let started_at = Utc::now();
    let (tx, mut rx) = oneshot::channel();

    // Blocking terminal I/O runs off the runtime so Ctrl+C stays observable.
    let worker_store = store.clone();
    let worker_flag = interrupted.clone();
    std::thread::spawn(move || {
        let result = run_interactive(&settings, &catalog, worker_store, args.seed, worker_flag);
        let _ = tx.send(result);
    });

    let outcome = tokio::select! {
        result = &mut rx => result.context("drill thread exited without a result")?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupt received");
            interrupted.store(true, Ordering::SeqCst);
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut rx).await {
                Ok(Ok(result)) => result,
                // Still blocked on a read: summarize from the store.
                _ => {
                    print!("\n\nSession interrupted.\n");
                    print!("{}", render_summary_since(&store, started_at)?);
                    return Ok(());
                }
            }
        }
    };

    match outcome? {
        Some(report) if report.termination == Termination::Depleted => {
            Err(Error::EmptyPool(EmptyPoolCause::Depleted).into())
        }
        _ => Ok(()),
    }
}

/// Dialog, configuration summary, session loop and session summary.
///
/// `Ok(None)` when input ended during the startup dialog.
fn run_interactive(
    settings: &Settings,
    catalog: &Catalog,
    mut store: HistoryStore,
    seed: Option<u64>,
    interrupted: Arc<AtomicBool>,
) -> chair_flying::Result<Option<SessionReport>> {
    let mut console = TerminalConsole::stdio(interrupted);
    console.emit(&Event::Text(&format!(
        "{}\nCHAIR FLYING PRACTICE\n{}",
        "=".repeat(60),
        "=".repeat(60)
    )));

    let Some(selection) = prompt_selection(&mut console)? else {
        return Ok(None);
    };
    let pool = filter::filter(catalog, selection.level, selection.include_emergencies)?;

    let pacing = if settings.manual_mode {
        Pacing::Manual
    } else {
        Pacing::Timed(settings.interval()?)
    };
    let display = settings.display();

    console.emit(&Event::Text(&render_config_summary(&ConfigSummary {
        catalog: catalog.counts(),
        pool_size: pool.len(),
        selection: &selection,
        pacing: &pacing,
        emergency_probability: settings.emergency_probability,
        display,
    })));

    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let policy = DrawPolicy::new(&selection, settings.emergency_probability);
    let mut session = Session::new(catalog, pool, policy, pacing, display, rng)?;
    console.emit(&Event::Text(&render_session_start(
        selection.mode,
        session.remaining(),
        session.pool().len(),
    )));
    let report = session.run(&mut console, &mut store)?;

    let total_history = store.count().map_err(Error::History)?;
    console.emit(&Event::Text(&render_session_summary(&SessionSummary {
        turns: &report.turns,
        removed: &report.removed,
        total_history,
    })));
    Ok(Some(report))
}

fn check(config: &Path) -> anyhow::Result<()> {
    let settings = Settings::load(config)?;
    let catalog = Catalog::from_path(&settings.maneuvers_file)?;
    let counts = catalog.counts();

    println!("Configuration OK: {}", config.display());
    println!(
        "Maneuvers: {} ({} emergency, {} private, {} commercial)",
        counts.total, counts.emergency, counts.private, counts.commercial
    );
    if settings.manual_mode {
        println!("Timing mode: Manual (user-prompted)");
    } else {
        println!(
            "Interval range: {}-{} seconds",
            settings.interval_min_sec, settings.interval_max_sec
        );
    }
    if let Some(probability) = settings.emergency_probability {
        println!("Emergency probability: {}%", probability);
    }
    Ok(())
}

fn follow_ups(config: &Path) -> anyhow::Result<()> {
    let settings = Settings::load(config)?;
    let store = open_history(&settings)?;
    let records: Vec<HistoryRecord> = store.get_follow_ups()?;
    print!("{}", render_follow_ups(&records));
    Ok(())
}

fn init(config: &Path) -> anyhow::Result<()> {
    if config.exists() {
        anyhow::bail!(
            "{} already exists; remove it first to write a fresh configuration",
            config.display()
        );
    }
    Settings::default()
        .save(config)
        .with_context(|| format!("Failed to write {}", config.display()))?;
    println!("Wrote default configuration to {}", config.display());
    Ok(())
}
