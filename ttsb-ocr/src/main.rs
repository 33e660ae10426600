//! Scoreboard OCR tool (ttsb-ocr) - Main entry point
//!
//! Reads OCR frame dumps for a batch of clips and writes player names,
//! score changes or token statistics to stdout. Logs go to stderr.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use ttsb_common::config::{resolve_config, TomlConfig};
use ttsb_ocr::frames::{inspect_lengths, LengthBucket};
use ttsb_ocr::pipeline::score_batch;
use ttsb_ocr::{load_clips, load_roster, ClipReport, Pipeline, TransitionPolicy};

/// Command-line arguments for ttsb-ocr
#[derive(Parser, Debug)]
#[command(name = "ttsb-ocr")]
#[command(about = "Player names and score changes from table-tennis scoreboard OCR")]
#[command(version)]
struct Args {
    /// Config file (overrides TTSB_CONFIG and the platform default)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Name the players of every clip
    Identify {
        /// Roster file, one name per line (defaults to roster_path from config)
        #[arg(short, long, env = "TTSB_ROSTER")]
        roster: Option<PathBuf>,

        /// Clip dump (JSON array of { clip, frames })
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Validated score changes of every clip
    Scores {
        /// Clip dump (JSON array of { clip, frames })
        #[arg(short, long)]
        input: PathBuf,

        /// Only accept resets after a match is won
        #[arg(long)]
        strict: bool,
    },

    /// Token-count distribution of the frames in a dump
    Inspect {
        /// Clip dump (JSON array of { clip, frames })
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

/// JSON envelope for every subcommand
#[derive(Serialize)]
struct Output<T: Serialize> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    body: T,
}

#[derive(Serialize)]
struct ClipsBody<T: Serialize> {
    clips: T,
}

#[derive(Serialize)]
struct LengthsBody {
    lengths: BTreeMap<usize, LengthBucket>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing; RUST_LOG wins over the configured level
    let env_filter = EnvFilter::try_from_default_env();
    let filter_from_env = env_filter.is_ok();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|_| EnvFilter::new(filter_directive("info"))));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = resolve_config(args.config.as_deref()).context("Failed to load configuration")?;
    if !filter_from_env {
        filter_handle
            .reload(EnvFilter::new(filter_directive(&config.logging.level)))
            .context("Failed to apply configured log level")?;
    }

    match args.command {
        Commands::Identify {
            roster,
            input,
            format,
        } => identify(&config, roster, input, format),
        Commands::Scores { input, strict } => scores(&config, input, strict),
        Commands::Inspect { input } => inspect(input),
    }
}

fn filter_directive(level: &str) -> String {
    format!("ttsb_ocr={0},ttsb_common={0}", level)
}

fn identify(
    config: &TomlConfig,
    roster: Option<PathBuf>,
    input: PathBuf,
    format: OutputFormat,
) -> Result<()> {
    let roster_path = roster
        .or_else(|| config.roster_path.clone())
        .context("No roster given: pass --roster or set roster_path in the config file")?;
    let roster = load_roster(&roster_path)
        .with_context(|| format!("Failed to load roster {}", roster_path.display()))?;
    let clips = load_clips(&input)
        .with_context(|| format!("Failed to load clips {}", input.display()))?;

    info!(
        "Identifying players in {} clip(s) against {} roster names",
        clips.len(),
        roster.len()
    );
    let pipeline = Pipeline::new(Arc::new(roster), config);
    let reports = pipeline.process_batch(&clips);

    match format {
        OutputFormat::Json => write_json(ClipsBody { clips: &reports }),
        OutputFormat::Csv => write_players_csv(&reports),
    }
}

fn scores(config: &TomlConfig, input: PathBuf, strict: bool) -> Result<()> {
    let clips = load_clips(&input)
        .with_context(|| format!("Failed to load clips {}", input.display()))?;

    let policy = if strict {
        TransitionPolicy::Strict {
            match_win_series: config.scoring.match_win_series,
        }
    } else {
        TransitionPolicy::from(&config.scoring)
    };
    info!("Validating scores of {} clip(s) with {:?}", clips.len(), policy);

    let reports = score_batch(&clips, policy);
    write_json(ClipsBody { clips: &reports })
}

fn inspect(input: PathBuf) -> Result<()> {
    let clips = load_clips(&input)
        .with_context(|| format!("Failed to load clips {}", input.display()))?;
    write_json(LengthsBody {
        lengths: inspect_lengths(&clips),
    })
}

fn write_json<T: Serialize>(body: T) -> Result<()> {
    let output = Output {
        generated_at: Utc::now(),
        body,
    };
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &output).context("Failed to write JSON output")?;
    writeln!(out)?;
    Ok(())
}

fn write_players_csv(reports: &[ClipReport]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout().lock());
    writer.write_record(["clip_id", "player1", "player2", "player3", "player4"])?;
    for report in reports {
        let [p1, p2, p3, p4] = report.players.slots();
        writer.write_record([
            report.clip.as_str(),
            p1.as_str(),
            p2.as_str(),
            p3.as_str(),
            p4.as_str(),
        ])?;
    }
    writer.flush().context("Failed to write CSV output")?;
    Ok(())
}
