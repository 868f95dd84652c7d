//! Pulseloop CLI
//!
//! Closed-loop HRV biofeedback agent for adaptive music sessions.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pulseloop_agent::{
    audio::{AudioSink, ConsoleSink},
    config::Config,
    control::{update_audio_params, AudioParams, ControlConfig},
    session::{log::read_summary_rows, select_source, Session, SUMMARY_FILE},
    VERSION,
};
use std::io::{BufRead, Write};
use std::sync::atomic::Ordering;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pulseloop")]
#[command(version = VERSION)]
#[command(about = "Closed-loop HRV biofeedback for adaptive music sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a biofeedback session
    Run {
        /// Skip sensor discovery and use the simulated stream
        #[arg(long)]
        sim: bool,

        /// Subject id for the summary log (default: configured/hostname)
        #[arg(long)]
        subject: Option<String>,

        /// Session label for the summary log
        #[arg(long)]
        label: Option<String>,

        /// Baseline duration in seconds
        #[arg(long)]
        baseline: Option<u64>,

        /// Pre-window duration in seconds (measured from session start)
        #[arg(long)]
        pre: Option<u64>,

        /// Post-window duration in seconds (measured from session end)
        #[arg(long)]
        post: Option<u64>,
    },

    /// Sensor-free harness: type z-score (and optional secondary) pairs
    Manual,

    /// Show configuration and recent session summaries
    Status,

    /// Show configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            sim,
            subject,
            label,
            baseline,
            pre,
            post,
        } => cmd_run(sim, subject, label, baseline, pre, post),
        Commands::Manual => cmd_manual(),
        Commands::Status => cmd_status(),
        Commands::Config => cmd_config(),
    }
}

fn cmd_run(
    sim: bool,
    subject: Option<String>,
    label: Option<String>,
    baseline: Option<u64>,
    pre: Option<u64>,
    post: Option<u64>,
) -> anyhow::Result<()> {
    let mut config = Config::load().unwrap_or_default();
    if let Some(subject) = subject {
        config.subject_id = subject;
    }
    if let Some(label) = label {
        config.session_label = label;
    }
    if let Some(s) = baseline {
        config.schedule.baseline_s = s as f64;
    }
    if let Some(s) = pre {
        config.schedule.pre_window_s = s as f64;
    }
    if let Some(s) = post {
        config.schedule.post_window_s = s as f64;
    }
    config.ensure_directories().context("creating data directories")?;

    println!("Pulseloop v{VERSION}");
    println!();
    println!("Starting HRV + adaptive music session");
    println!("  Subject:     {}", config.subject_id);
    println!("  Label:       {}", config.session_label);
    println!("  Baseline:    first {:.0}s (relax, music settles)", config.schedule.baseline_s);
    println!("  Pre window:  first {:.0}s", config.schedule.pre_window_s);
    println!("  Post window: last {:.0}s", config.schedule.post_window_s);
    println!();
    println!("Press Ctrl+C to end the session");
    println!();

    let source = select_source(&config, sim);
    let session = Session::new(config, source, Box::new(ConsoleSink::new()));

    let running = session.running_flag();
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .context("setting Ctrl+C handler")?;

    let report = session.run().context("session failed")?;

    println!();
    println!("===== SESSION SUMMARY =====");
    println!("Session ID:  {}", report.identity.session_id);
    println!("Ended by:    {:?}", report.end_reason);
    println!("Duration:    {:.1} s ({} samples)", report.summary.t_last, report.sample_count);
    println!("Pre mean z:  {:+.3}  (n={})", report.summary.pre_mean, report.summary.pre_n);
    println!("Post mean z: {:+.3}  (n={})", report.summary.post_mean, report.summary.post_n);
    println!("Delta z:     {:+.3}", report.summary.delta);
    println!(
        "Stress:      {:+.3} -> {:+.3}  (delta {:+.3})",
        report.summary.pre_stress(),
        report.summary.post_stress(),
        report.summary.delta_stress()
    );
    println!();
    println!("Per-sample log: {}", report.sample_log_path.display());
    println!("Summary row:    {}", report.summary_path.display());

    Ok(())
}

/// Interactive harness: each input line is `z` or `z secondary`, mapped
/// through the controller and applied to the sink. `q` quits.
fn cmd_manual() -> anyhow::Result<()> {
    let control = ControlConfig::default();
    let mut sink = ConsoleSink::new();
    let mut params = AudioParams::default();

    println!("Manual mode (q to quit). Enter: z [secondary]");
    println!("  e.g. '-1.0 0.2' (stressed), '0.5' (relaxed)");
    sink.apply(&params);

    let stdin = std::io::stdin();
    loop {
        print!("z [secondary] > ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line.to_lowercase().as_str(), "q" | "quit" | "exit") {
            break;
        }

        let mut parts = line.split_whitespace();
        let z: f64 = match parts.next().map(str::parse) {
            Some(Ok(z)) => z,
            _ => {
                println!("  could not parse z, try again");
                continue;
            }
        };
        let secondary: Option<f64> = match parts.next().map(str::parse) {
            None => None,
            Some(Ok(s)) => Some(s),
            Some(Err(_)) => {
                println!("  could not parse secondary, try again");
                continue;
            }
        };

        params = update_audio_params(&control, &params, Some(z), secondary, false);
        sink.apply(&params);
        println!(
            "  tempo={:.3}  pitch={:.2}  volume={:.1}",
            params.tempo, params.pitch, params.volume
        );
    }

    sink.stop();
    Ok(())
}

fn cmd_status() -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("Pulseloop Status");
    println!("================");
    println!();
    println!("Configuration:");
    println!("  Subject:          {}", config.subject_id);
    println!("  Label:            {}", config.session_label);
    println!(
        "  Schedule:         baseline {:.0}s / pre {:.0}s / post {:.0}s",
        config.schedule.baseline_s, config.schedule.pre_window_s, config.schedule.post_window_s
    );
    println!("  Interval window:  {} beats", config.window_capacity);
    println!("  Log directory:    {}", config.log_dir.display());
    println!();

    let summary_path = config.data_dir.join(SUMMARY_FILE);
    match read_summary_rows(&summary_path) {
        Ok(rows) if !rows.is_empty() => {
            println!("Recent sessions ({} total):", rows.len());
            for row in rows.iter().rev().take(5) {
                println!("  {row}");
            }
        }
        _ => println!("No previous session data found."),
    }

    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {}", Config::config_path().display());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );

    Ok(())
}
