mod config;
mod error;
mod ledger;
mod pipeline;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ledger::{Ledger, RandomIdentifiers};
use pipeline::{Clock, InstantClock, Sequencer, SequencerState, TokioClock};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use ui::{run_app, App, Tab};

#[derive(Parser, Debug)]
#[command(name = "vizlab")]
#[command(about = "TUI visualizer for blockchain chaining and a simplified LLM pipeline", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tab to open on start
    #[arg(short, long, value_enum)]
    tab: Option<Tab>,

    /// Log file used while the TUI is active
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the chain and the pipeline run to stdout without starting the TUI
    #[arg(long)]
    headless: bool,

    /// Blocks to append after the genesis block in headless mode
    #[arg(long, default_value_t = 2)]
    blocks: usize,

    /// Seed for reproducible block identifiers in headless mode
    #[arg(long)]
    seed: Option<u64>,

    /// Replay the pipeline on a virtual clock in headless mode
    #[arg(long)]
    instant: bool,
}

fn cleanup_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(tab) = args.tab {
        config.ui.start_tab = tab;
    }
    if let Some(file) = &args.log_file {
        config.log.file = file.clone();
    }
    Ok(config)
}

fn init_logging(config: &Config, headless: bool) -> Result<()> {
    let level = config.log_level()?;
    if headless {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_writer(io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        // The TUI owns the terminal, so logs go to a file.
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log.file)
            .with_context(|| format!("Failed to open log file: {}", config.log.file.display()))?;
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

fn print_progress(elapsed: Duration, previous: &SequencerState, current: &SequencerState) {
    let at = format!("[{:>6.2}s]", elapsed.as_secs_f64());
    if current.status_message != previous.status_message {
        println!("{} {}", at, current.status_message);
    }
    if current.tokenize_progress != previous.tokenize_progress {
        println!("{}   tokenization {}%", at, current.tokenize_progress);
    }
    if current.attention_score != previous.attention_score {
        println!("{}   attention {}%", at, current.attention_score);
    }
    if current.marker != previous.marker && current.marker_at_rest() {
        println!("{}   marker at {}", at, current.current_stage.label());
    }
}

async fn run_headless(args: &Args) -> Result<()> {
    let mut ids = match args.seed {
        Some(seed) => RandomIdentifiers::seeded(seed),
        None => RandomIdentifiers::new(),
    };
    let mut ledger = Ledger::initialize(&mut ids);
    for _ in 0..args.blocks {
        ledger.append_block(&mut ids);
    }
    ledger.verify()?;

    println!("Blockchain ({} blocks):", ledger.len());
    for block in ledger.blocks() {
        println!(
            "  Block {:>3}  hash {}  prev {}",
            block.number,
            block.identifier,
            block
                .previous_identifier
                .as_deref()
                .unwrap_or("Genesis Block")
        );
    }
    println!();

    let virtual_clock = Arc::new(InstantClock::new());
    let clock: Arc<dyn Clock> = if args.instant {
        virtual_clock.clone()
    } else {
        Arc::new(TokioClock)
    };
    let mut sequencer = Sequencer::new(clock);

    let script = sequencer.script();
    println!(
        "LLM pipeline ({} steps, {:.1}s):",
        script.steps().len(),
        script.total_duration().as_secs_f64()
    );

    let started = tokio::time::Instant::now();
    let elapsed = || {
        if args.instant {
            virtual_clock.elapsed()
        } else {
            started.elapsed()
        }
    };

    let mut previous = sequencer.snapshot();
    sequencer
        .run_observed(|current| {
            print_progress(elapsed(), &previous, current);
            previous = current.clone();
        })
        .await;

    if args.instant {
        println!(
            "Replayed {} suspension points on a virtual clock",
            virtual_clock.sleeps()
        );
    }
    Ok(())
}

async fn run_tui(config: Config) -> Result<()> {
    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        cleanup_terminal();
        original_hook(panic_info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and run
    let app = App::new(config, Arc::new(TokioClock));
    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    cleanup_terminal();
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_logging(&config, args.headless)?;
    info!("Starting vizlab v{}", env!("CARGO_PKG_VERSION"));

    // Headless mode follows every published state, so the sequencer task and
    // the printer share one thread.
    let mut builder = if args.headless {
        tokio::runtime::Builder::new_current_thread()
    } else {
        tokio::runtime::Builder::new_multi_thread()
    };
    let runtime = builder.enable_all().build()?;

    // Headless mode - print everything and exit
    if args.headless {
        return runtime.block_on(run_headless(&args));
    }
    runtime.block_on(run_tui(config))
}
