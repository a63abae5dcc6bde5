use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use depacketize::{CaptureFile, Depacketizer, Summary};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Converts a capture of RTP-encapsulated H.264 into an Annex B elementary stream.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Capture of "RTP " framed packets
    input: PathBuf,

    /// Annex B output file
    output: PathBuf,

    /// Comma separated base64 parameter sets (SPS, PPS) written ahead of the stream
    parameter_sets: Option<String>,

    /// -v info, -vv debug, -vvv trace. RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn convert(input: &Path, output: &Path, parameter_sets: Option<&str>) -> Result<Summary> {
    let capture = CaptureFile::from_file_path(input)
        .with_context(|| format!("unable to read {}", input.display()))?;
    let file = File::create(output)
        .with_context(|| format!("unable to create {}", output.display()))?;
    let mut out = BufWriter::new(file);

    let mut depacketizer = Depacketizer::new();
    if let Some(parameter_sets) = parameter_sets {
        depacketizer.write_parameter_sets(parameter_sets, &mut out)?;
    }

    depacketizer
        .depacketize(capture.records(), &mut out)
        .with_context(|| format!("failed converting into {}", output.display()))?;

    Ok(depacketizer.finish())
}

fn main() -> Result<()> {
    let Args {
        input,
        output,
        parameter_sets,
        verbose,
    } = Args::parse();
    init_tracing(verbose);

    let summary = convert(&input, &output, parameter_sets.as_deref())?;
    if let Some(err) = summary.stopped_by {
        warn!("{}: stream ended early: {err}", input.display());
    }

    Ok(())
}
