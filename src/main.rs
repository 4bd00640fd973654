//! Balloon Analogue Risk Task - terminal edition
//!
//! Single-session, self-contained CLI application.
//! Participants draw cards (pump the balloon) for points and decide when to
//! collect before a losing card wipes out the deck.

mod cli;
mod error;
mod session;
mod task;

use chrono::Utc;
use clap::Parser;
use cli::{Display, InputHandler};
use session::{DataLog, SessionController, SessionOutcome, SessionReport};
use std::error::Error;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use task::config::{REPETITIONS, REWARD};
use task::{SeededRandom, TaskConfig, TrialSequence};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Stream of the session seed used for pop draws (stream 0 orders trials)
const POP_STREAM: u64 = 1;

#[derive(Parser, Debug)]
#[command(name = "bart-task")]
#[command(about = "Balloon Analogue Risk Task in the terminal")]
struct Args {
    /// Participant id; trial data is only saved when this is given
    #[arg(short, long)]
    subject: Option<String>,

    /// Directory for data files and the default log file
    #[arg(short, long, default_value = "data")]
    output_dir: PathBuf,

    /// Repetitions of each card / risk tier
    #[arg(short, long, default_value_t = REPETITIONS)]
    repetitions: usize,

    /// Points per successful pump
    #[arg(long, default_value_t = REWARD)]
    reward: u32,

    /// Start with the first trial instead of the instruction screen
    #[arg(long)]
    skip_instructions: bool,

    /// Log file (defaults to <output-dir>/bart.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

/// Send logs to a file; the terminal belongs to the task while it runs
fn init_logging(args: &Args) -> Result<(), Box<dyn Error>> {
    let path = args
        .log_file
        .clone()
        .unwrap_or_else(|| args.output_dir.join("bart.log"));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let default_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn print_summary(report: &SessionReport, data_path: Option<&Path>) {
    match report.outcome {
        SessionOutcome::Completed => println!("\n🎈 Session Complete!"),
        SessionOutcome::Aborted => println!("\n⏹  Session ended early."),
    }
    println!(
        "💰 Total banked: {} | {} trials | {:.1}s",
        report.state.permanent_bank,
        report.state.trials_completed,
        report.state.duration_secs()
    );

    for (max_pumps, tier) in report.stats.tiers() {
        let adjusted = tier
            .adjusted_average_pumps()
            .map(|avg| format!("{:.2}", avg))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   max {:>3}: {} balloons | {} collected | {} popped | {} timed out | \
             adjusted pumps {}",
            max_pumps, tier.balloons, tier.cashed_out, tier.popped, tier.timed_out, adjusted
        );
    }
    if let Some(overall) = report.stats.overall_adjusted_average() {
        println!("📊 Adjusted average pumps: {:.2}", overall);
    }

    match data_path {
        Some(path) => println!("📁 Trial data: {}", path.display()),
        None => println!("⚠️  No subject id given, trial data was not saved."),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = TaskConfig {
        repetitions: args.repetitions,
        reward: args.reward,
        show_instructions: !args.skip_instructions,
        ..TaskConfig::default()
    };
    config.validate()?;

    let trials = TrialSequence::generate(
        &config.stimuli,
        &config.max_pumps,
        config.repetitions,
        config.reward,
        config.seed,
    )?;

    let data_log = match &args.subject {
        Some(subject) => Some(DataLog::create(&args.output_dir, subject, Utc::now())?),
        None => {
            warn!("no subject id given, trial data will not be saved");
            None
        }
    };
    let data_path = data_log.as_ref().map(|log| log.path().to_path_buf());

    info!(
        subject = args.subject.as_deref().unwrap_or("-"),
        trials = trials.len(),
        repetitions = config.repetitions,
        reward = config.reward,
        "starting BART session"
    );

    let rng = SeededRandom::with_stream(config.seed, POP_STREAM);
    let display = Display::open(config.pop_image.clone())?;
    let input = InputHandler::new();

    // The display is dropped (terminal restored) when `run` returns
    let report = SessionController::new(config, display, input, rng, data_log).run(&trials)?;

    print_summary(&report, data_path.as_deref());
    Ok(())
}
