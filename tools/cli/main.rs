//! Command-line front end for the SWIPE' pitch tracker.
//!
//! Reads mono WAV audio (file or stdin), writes one `time value` line per
//! output frame (file or stdout), and supports batch lists of input/output
//! pairs. Values are Hz, or Mel with `-m`; unvoiced frames print as NaN
//! unless `-n` suppresses them.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use swipetrack::dsp::utils::hz_to_mel;
use swipetrack::{pitch_track, read_wav, read_wav_file, TrackParams};

#[derive(Parser)]
#[command(name = "swipetrack", disable_version_flag = true)]
#[command(about = "Track the fundamental frequency of a WAV recording")]
struct Cli {
    /// Input WAV file (stdin when omitted)
    #[arg(short = 'i', value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Batch file with one "input output" pair per line
    #[arg(short = 'b', value_name = "FILE", conflicts_with_all = ["input", "output"])]
    batch: Option<PathBuf>,

    /// Pitch search range in Hz
    #[arg(short = 'r', value_name = "MIN:MAX", default_value = "100:600")]
    range: String,

    /// Strength threshold below which frames are unvoiced
    #[arg(
        short = 's',
        value_name = "THRESHOLD",
        default_value_t = swipetrack::DEFAULT_STRENGTH_THRESHOLD
    )]
    strength: f64,

    /// Output time step in seconds
    #[arg(short = 't', value_name = "SECONDS", default_value_t = swipetrack::MIN_TIME_STEP)]
    time_step: f64,

    /// Print Mel instead of Hz
    #[arg(short = 'm')]
    mel: bool,

    /// Omit unvoiced frames from the output
    #[arg(short = 'n')]
    no_unvoiced: bool,

    /// Print version information and exit
    #[arg(short = 'v', long = "version")]
    version: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if cli.version {
        println!("swipetrack {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let params = match parse_params(&cli) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("swipetrack: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(batch) = &cli.batch {
        return run_batch(batch, &params, &cli);
    }

    match run_one(cli.input.as_deref(), cli.output.as_deref(), &params, &cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("swipetrack: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn parse_params(cli: &Cli) -> Result<TrackParams> {
    let (min, max) = cli
        .range
        .split_once(':')
        .with_context(|| format!("range '{}' is not MIN:MAX", cli.range))?;
    let min: f64 = min
        .trim()
        .parse()
        .with_context(|| format!("bad minimum pitch '{min}'"))?;
    let max: f64 = max
        .trim()
        .parse()
        .with_context(|| format!("bad maximum pitch '{max}'"))?;
    if !(min >= 1.0 && max > min) {
        bail!("range {min}:{max} is invalid (need 1.0 <= min < max)");
    }
    Ok(TrackParams {
        min_pitch: min,
        max_pitch: max,
        strength_threshold: cli.strength,
        time_step: cli.time_step,
    })
}

/// Track one input into one output. `None` paths mean stdin/stdout.
fn run_one(
    input: Option<&Path>,
    output: Option<&Path>,
    params: &TrackParams,
    cli: &Cli,
) -> Result<()> {
    let audio = match input {
        Some(path) => {
            read_wav_file(path).with_context(|| format!("reading '{}'", path.display()))?
        }
        None => read_wav(io::stdin().lock()).context("reading WAV from stdin")?,
    };

    // clamp once up front: the effective time step also drives timestamps
    let params = params.clamped(audio.rate);
    let track = pitch_track(&audio.samples, audio.rate, &params)
        .with_context(|| match input {
            Some(path) => format!("tracking '{}'", path.display()),
            None => "tracking stdin".to_string(),
        })?;

    let mut sink: BufWriter<Box<dyn Write>> = match output {
        Some(path) => BufWriter::new(Box::new(
            File::create(path).with_context(|| format!("creating '{}'", path.display()))?,
        )),
        None => BufWriter::new(Box::new(io::stdout().lock())),
    };

    let dt = params.time_step;
    for (j, &p) in track.iter().enumerate() {
        if cli.no_unvoiced && p.is_nan() {
            continue;
        }
        let value = if cli.mel && p.is_finite() {
            hz_to_mel(p)
        } else {
            p
        };
        writeln!(sink, "{:4.7} {:5.4}", j as f64 * dt, value)?;
    }
    sink.flush()?;
    Ok(())
}

/// Run every "input output" pair in a batch file; failures are reported and
/// the batch keeps going.
fn run_batch(batch: &Path, params: &TrackParams, cli: &Cli) -> ExitCode {
    let file = match File::open(batch) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("swipetrack: opening batch '{}': {e}", batch.display());
            return ExitCode::FAILURE;
        }
    };

    let mut failures = 0usize;
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("swipetrack: reading batch '{}': {e}", batch.display());
                return ExitCode::FAILURE;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (input, output) = match (fields.next(), fields.next()) {
            (Some(i), Some(o)) => (PathBuf::from(i), PathBuf::from(o)),
            _ => {
                eprintln!(
                    "swipetrack: {}:{}: expected 'input output'",
                    batch.display(),
                    lineno + 1
                );
                failures += 1;
                continue;
            }
        };
        if let Err(e) = run_one(Some(&input), Some(&output), params, cli) {
            eprintln!("swipetrack: {}: {e:#}", input.display());
            failures += 1;
        }
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
