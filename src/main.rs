//! Synheart Focus Agent CLI
//!
//! Privacy-first gaze focus tracking for proctored quizzes.

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use crossbeam_channel::{bounded, RecvTimeoutError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use synheart_focus_agent::{
    config::Config,
    core::{FocusStatus, ReportBuilder, SessionFocusSummary, SessionReport},
    source::{channel_source, replay, ReplayEntry},
    tracker::{FocusTracker, TickOutcome, TrackingHandle},
    transparency::{create_shared_log_with_persistence, SharedTransparencyLog},
    PRIVACY_DECLARATION, VERSION,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "synheart-focus")]
#[command(author = "Synheart")]
#[command(version = VERSION)]
#[command(about = "Privacy-first gaze focus tracking for proctored quizzes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track focus over a stream of landmark frames (JSON Lines)
    Track {
        /// Landmark stream to read ("-" for stdin)
        #[arg(long, short, default_value = "-")]
        input: PathBuf,

        /// Tick interval in milliseconds (defaults to the configured interval)
        #[arg(long)]
        tick_ms: Option<u64>,

        /// Pace frames at the tick interval instead of replaying as fast as possible
        #[arg(long)]
        realtime: bool,

        /// Don't write a session report
        #[arg(long)]
        no_export: bool,

        /// Drop per-sample snapshots from the exported report
        #[arg(long)]
        no_snapshots: bool,
    },

    /// Show the summary stored in an exported session report
    Summary {
        /// Path to a session report
        report: PathBuf,
    },

    /// Show current status and cumulative statistics
    Status,

    /// Display privacy declaration
    Privacy,

    /// Show configuration
    Config,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Track {
            input,
            tick_ms,
            realtime,
            no_export,
            no_snapshots,
        } => cmd_track(&input, tick_ms, realtime, no_export, no_snapshots),
        Commands::Summary { report } => cmd_summary(&report),
        Commands::Status => {
            cmd_status();
            Ok(())
        }
        Commands::Privacy => {
            cmd_privacy();
            Ok(())
        }
        Commands::Config => {
            cmd_config();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_track(
    input: &Path,
    tick_ms: Option<u64>,
    realtime: bool,
    no_export: bool,
    no_snapshots: bool,
) -> anyhow::Result<()> {
    println!("Synheart Focus Agent v{VERSION}");
    println!();

    // Load or create configuration
    let config = Config::load().unwrap_or_default();
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }
    let tick_interval = tick_ms
        .map(Duration::from_millis)
        .unwrap_or(config.tick_interval);

    let reader = replay::open(input)
        .with_context(|| format!("could not open landmark stream {input:?}"))?;

    println!("Starting focus tracking...");
    println!("  Input: {}", input.display());
    println!("  Tick interval: {}ms", tick_interval.as_millis());
    println!("  Pacing: {}", if realtime { "realtime" } else { "as fast as possible" });
    println!("  Starting question: {}", config.initial_question);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    // Set up transparency log
    let transparency_log =
        create_shared_log_with_persistence(config.data_path.join("transparency.json"));

    let mut tracker = FocusTracker::new()
        .with_config(&config)
        .with_transparency(transparency_log.clone());

    let (frames, source) = channel_source(4);
    let handle = tracker
        .start_tracking(source)
        .context("focus tracker is not ready")?;
    if let Some(session_id) = tracker.session_id() {
        println!("Session ID: {session_id}");
    }

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone(), handle.clone())?;

    // Parse the stream on its own thread so a slow reader never stalls a tick
    let (entry_tx, entry_rx) = bounded(64);
    let reader_running = running.clone();
    let reader_thread = thread::spawn(move || {
        for entry in replay::read_entries(reader) {
            if !reader_running.load(Ordering::SeqCst) || entry_tx.send(entry).is_err() {
                break;
            }
        }
    });

    let mut last_status: Option<FocusStatus> = None;
    let mut last_tick = Instant::now();
    let mut stream_ended = false;

    while running.load(Ordering::SeqCst) && handle.is_active() {
        match entry_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(Ok(ReplayEntry::Question { question })) => {
                match tracker.set_current_question(question) {
                    Ok(()) => println!("Question {question}"),
                    Err(e) => eprintln!("Warning: {e}"),
                }
            }
            Ok(Ok(ReplayEntry::Frame(frame))) => {
                if realtime {
                    let elapsed = last_tick.elapsed();
                    if elapsed < tick_interval {
                        thread::sleep(tick_interval - elapsed);
                    }
                    last_tick = Instant::now();
                }

                if frames.send(frame).is_err() {
                    warn!("Frame channel closed");
                    break;
                }

                if let TickOutcome::Recorded(sample) = tracker.tick() {
                    let status = tracker.current_focus_status();
                    if status != last_status {
                        println!(
                            "  [q{}] {:.0}% {}",
                            tracker.current_question(),
                            sample.focus_level,
                            tracker.current_focus_label()
                        );
                        last_status = status;
                    }
                }
            }
            Ok(Err(e)) => {
                eprintln!("Warning: skipping entry: {e}");
            }
            Err(RecvTimeoutError::Timeout) => {
                debug!("Waiting for landmark frames");
            }
            Err(RecvTimeoutError::Disconnected) => {
                stream_ended = true;
                break;
            }
        }
    }

    running.store(false, Ordering::SeqCst);
    drop(entry_rx);
    // A reader blocked on stdin after Ctrl+C is left to exit with the process
    if stream_ended && reader_thread.join().is_err() {
        eprintln!("Warning: landmark reader thread panicked");
    }

    println!();
    println!("Stopping focus tracking...");

    let summary = tracker.finish_session();
    print_summary(&summary);

    if !no_export {
        let include_snapshots = config.include_snapshots && !no_snapshots;
        match export_report(&tracker, &summary, &config.export_path, include_snapshots) {
            Ok(path) => {
                transparency_log.record_report_exported();
                println!("Report saved to {path:?}");
            }
            Err(e) => eprintln!("Error exporting report: {e:#}"),
        }
    }

    save_transparency(&transparency_log);

    // Final stats
    println!();
    println!("{}", transparency_log.summary());
    Ok(())
}

fn export_report(
    tracker: &FocusTracker,
    summary: &SessionFocusSummary,
    export_dir: &Path,
    include_snapshots: bool,
) -> anyhow::Result<PathBuf> {
    let builder = ReportBuilder::new().include_snapshots(include_snapshots);
    let now = Utc::now();
    let report = builder.build(
        tracker.session_id().unwrap_or_default(),
        tracker.started_at().unwrap_or(now),
        tracker.ended_at().unwrap_or(now),
        summary,
    );

    std::fs::create_dir_all(export_dir)?;
    let path = export_dir.join(format!("session_{}.json", now.format("%Y%m%d_%H%M%S")));
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

fn save_transparency(log: &SharedTransparencyLog) {
    if let Err(e) = log.save() {
        eprintln!("Warning: Could not save transparency stats: {e}");
    }
}

fn print_summary(summary: &SessionFocusSummary) {
    println!();
    println!("Session Summary");
    println!("===============");
    println!();

    if summary.per_question.is_empty() {
        println!("No focus samples were recorded.");
        return;
    }

    println!("  Question   Avg focus   Status                Time     Samples");
    for question in &summary.per_question {
        println!(
            "  {:>8}   {:>8.1}%   {:<20}  {:>6}ms  {:>7}",
            question.question_number,
            question.average_focus_percent,
            question.focus_status.as_str(),
            question.time_spent_ms,
            question.snapshots.len()
        );
    }
    println!();
    println!("  Overall focus: {:.1}%", summary.overall_focus_percent);
    println!("  Focus time: {}%", summary.focus_time_percent());
    println!("  Total duration: {}ms", summary.total_duration_ms);
    println!(
        "  Focused time: {}ms (measured: {}ms)",
        summary.total_focused_time_ms, summary.integrated_focused_time_ms
    );
    println!("  Samples: {}", summary.total_samples);
}

fn cmd_summary(path: &Path) -> anyhow::Result<()> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("could not read {path:?}"))?;
    let report: SessionReport = serde_json::from_str(&content)
        .with_context(|| format!("{path:?} is not a session report"))?;

    if report.report_version != synheart_focus_agent::core::REPORT_VERSION {
        bail!(
            "unsupported report version {} (expected {})",
            report.report_version,
            synheart_focus_agent::core::REPORT_VERSION
        );
    }

    println!("Session {}", report.session_id);
    println!("  Device: {}", report.device_id);
    println!("  Started: {}", report.started_at_utc);
    println!("  Ended: {}", report.ended_at_utc);
    print_summary(&report.summary);
    Ok(())
}

/// Persisted transparency counters shown by `status`.
const STATUS_COUNTERS: &[(&str, &str)] = &[
    ("sessions_started", "Sessions started"),
    ("frames_processed", "Frames processed"),
    ("frames_not_ready", "Frames not ready"),
    ("frames_without_face", "Frames without a face"),
    ("frames_rejected", "Frames rejected"),
    ("tick_errors", "Tick errors"),
    ("reports_exported", "Reports exported"),
];

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("Synheart Focus Agent Status");
    println!("===========================");
    println!();

    // Show config
    println!("Configuration:");
    println!("  Tick interval: {}ms", config.tick_interval.as_millis());
    println!("  Starting question: {}", config.initial_question);
    println!("  Report snapshots: {}", config.include_snapshots);
    println!("  Export path: {:?}", config.export_path);
    println!();

    // Load and show transparency stats if available
    let stats_path = config.data_path.join("transparency.json");
    if stats_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&stats_path) {
            if let Ok(stats) = serde_json::from_str::<serde_json::Value>(&content) {
                println!("Cumulative Statistics:");
                for (key, label) in STATUS_COUNTERS {
                    if let Some(value) = stats.get(key) {
                        println!("  {label}: {value}");
                    }
                }
            }
        }
    } else {
        println!("No previous session data found.");
    }
}

fn cmd_privacy() {
    println!("{PRIVACY_DECLARATION}");
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>, handle: TrackingHandle) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
        handle.stop();
    })
    .context("could not set Ctrl+C handler")
}
