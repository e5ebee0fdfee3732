//! IAMF Verification Log CLI
//!
//! Thin wrapper around iamf-vlog-core for command-line usage.
//!
//! ## Usage
//!
//! ```bash
//! # Render decoded OBUs (JSON lines) into a verification log
//! iamf-vlog render decoded.jsonl -o decoder.vlog
//!
//! # Compare a verification log against a reference trace
//! iamf-vlog diff decoder.vlog reference.vlog
//! ```
//!
//! ## Input format
//!
//! One JSON object per line, either a decoded OBU or a pre-rendered block:
//!
//! ```text
//! {"type": "obu", "obu": {"kind": "temporal_delimiter"}}
//! {"type": "obu", "obu": {"kind": "audio_frame", "audio_substream_id": 0, "size": 120}, "trim_at_start": 312}
//! {"type": "text", "category": "decoder_op", "key": 0, "lines": ["DecoderOp_0:", "  frames: 1"]}
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use iamf_vlog_core::{diff_logs, Category, Obu, SampleTrim, SessionConfig, VlogSession};
use serde::Deserialize;
use tracing::warn;

/// IAMF Verification Log - decoder trace generator
#[derive(Parser)]
#[command(name = "iamf-vlog")]
#[command(version = "0.1.0")]
#[command(about = "IAMF Verification Log - decoder trace generator")]
#[command(
    long_about = "Renders decoded IAMF OBUs into an ordered, diffable verification log and compares logs against reference traces."
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Upper bound on the rendered size of one record, in bytes
    #[arg(long, global = true)]
    max_record_bytes: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render decoded OBUs into a verification log
    Render {
        /// JSON-lines file of decoded OBUs and pre-rendered blocks
        input: PathBuf,

        /// Verification log to write (replaced if it exists)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Compare a verification log against a reference
    Diff {
        /// Log produced by the decoder under test
        actual: PathBuf,
        /// Reference log
        reference: PathBuf,
    },
}

/// One line of render input.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InputLine {
    Obu {
        obu: Obu,
        #[serde(default)]
        trim_at_start: u64,
        #[serde(default)]
        trim_at_end: u64,
    },
    Text {
        category: Category,
        key: u64,
        lines: Vec<String>,
    },
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn session_config(max_record_bytes: Option<usize>) -> SessionConfig {
    let config = SessionConfig::default();
    match max_record_bytes {
        Some(bytes) => config.with_max_record_bytes(bytes),
        None => config,
    }
}

/// Counts reported after rendering.
#[derive(Debug, Default)]
struct RenderSummary {
    written: usize,
    dropped: usize,
}

fn render(input: &Path, output: &Path, config: SessionConfig) -> Result<RenderSummary> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input {}", input.display()))?;

    let mut session = VlogSession::new(config);
    session
        .open(output)
        .with_context(|| format!("Failed to open log {}", output.display()))?;

    let summary = match render_lines(&mut session, input, &source) {
        Ok(summary) => summary,
        Err(e) => {
            // A failed run leaves no log behind
            if let Err(abort_err) = session.abort() {
                warn!(error = %abort_err, "Failed to discard partial log");
            }
            return Err(e);
        }
    };

    session
        .close()
        .with_context(|| format!("Failed to write log {}", output.display()))?;
    Ok(summary)
}

fn render_lines(session: &mut VlogSession, input: &Path, source: &str) -> Result<RenderSummary> {
    let mut summary = RenderSummary::default();
    for (index, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let entry: InputLine = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: invalid input line", input.display(), index + 1))?;

        let result = match entry {
            InputLine::Obu {
                obu,
                trim_at_start,
                trim_at_end,
            } => session
                .emit(&obu, SampleTrim::new(trim_at_start, trim_at_end))
                .map(|_| ()),
            InputLine::Text {
                category,
                key,
                lines,
            } => {
                let mut block = session.block(category);
                for text in &lines {
                    block.line(0, format_args!("{text}"));
                }
                session.emit_block(key, block)
            }
        };

        match result {
            Ok(()) => summary.written += 1,
            Err(e) => {
                warn!(line = index + 1, error = %e, "Record dropped");
                summary.dropped += 1;
            }
        }
    }
    Ok(summary)
}

fn diff(actual: &Path, reference: &Path) -> Result<bool> {
    let ours = fs::read_to_string(actual)
        .with_context(|| format!("Failed to read {}", actual.display()))?;
    let theirs = fs::read_to_string(reference)
        .with_context(|| format!("Failed to read {}", reference.display()))?;

    let report = diff_logs(&ours, &theirs).context("Failed to parse verification log")?;

    for (category, count) in &report.compared {
        println!("  {}: {} blocks compared", category, count);
    }
    if report.is_match() {
        println!("Logs match.");
    } else {
        println!();
        for mismatch in &report.mismatches {
            println!("MISMATCH {}", mismatch);
        }
    }
    Ok(report.is_match())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = session_config(cli.max_record_bytes);

    match cli.command {
        Commands::Render { input, output } => {
            let summary = render(&input, &output, config)?;
            println!("Wrote {} records to {}", summary.written, output.display());
            if summary.dropped > 0 {
                println!("Dropped {} records (see warnings)", summary.dropped);
            }
        }

        Commands::Diff { actual, reference } => {
            println!("Comparing {} against {}", actual.display(), reference.display());
            if !diff(&actual, &reference)? {
                anyhow::bail!("Verification logs differ");
            }
        }
    }

    Ok(())
}
