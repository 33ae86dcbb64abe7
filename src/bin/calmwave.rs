//! Calmwave CLI - Command-line interface for the stress engine
//!
//! Commands:
//! - assess: Score readings against a baseline (batch mode)
//! - run: Score streaming readings from stdin (streaming mode)
//! - calibrate: Build a resting baseline from readings
//! - doctor: Diagnose engine and state-file health

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use calmwave::calibration::{BaselineRecorder, DEFAULT_TREND_WINDOW};
use calmwave::pipeline::StressProcessor;
use calmwave::types::{AssessmentPayload, BaselineMetrics, SensorReading};
use calmwave::{EngineError, ENGINE_VERSION, REPORT_VERSION};

/// Calmwave - On-device stress scoring engine
#[derive(Parser)]
#[command(name = "calmwave")]
#[command(author = "Violetcare Labs")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score wearable readings into stress assessments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score readings against a baseline (batch mode)
    Assess {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Baseline file (BaselineMetrics JSON)
        #[arg(short, long)]
        baseline: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Reference-score window in readings
        #[arg(long, default_value_t = DEFAULT_TREND_WINDOW)]
        trend_window: usize,

        /// Load trend state from file
        #[arg(long)]
        load_trend: Option<PathBuf>,

        /// Save trend state to file after processing
        #[arg(long)]
        save_trend: Option<PathBuf>,
    },

    /// Score streaming readings from stdin (streaming mode)
    Run {
        /// Baseline file (BaselineMetrics JSON)
        #[arg(short, long)]
        baseline: PathBuf,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Reference-score window in readings
        #[arg(long, default_value_t = DEFAULT_TREND_WINDOW)]
        trend_window: usize,

        /// Load trend state from file
        #[arg(long)]
        load_trend: Option<PathBuf>,

        /// Save trend state to file on exit
        #[arg(long)]
        save_trend: Option<PathBuf>,

        /// Flush output after each assessment
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Build a resting baseline from calibration readings
    Calibrate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output baseline file (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Calibration window in samples
        #[arg(long)]
        window: Option<usize>,
    },

    /// Diagnose engine and state-file health
    Doctor {
        /// Check a baseline file
        #[arg(long)]
        baseline: Option<PathBuf>,

        /// Check a trend state file
        #[arg(long)]
        trend: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one reading per line)
    Ndjson,
    /// JSON array of readings
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one assessment per line)
    Ndjson,
    /// JSON array of assessments
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to parse reading: {0}")]
    ParseError(String),

    #[error("No readings in input")]
    NoReadings,

    #[error("{0} check(s) failed")]
    ChecksFailed(usize),
}

#[derive(Serialize)]
struct CliErrorReport {
    error: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let report = CliErrorReport {
                error: e.to_string(),
            };
            eprintln!(
                "{}",
                serde_json::to_string(&report).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Assess {
            input,
            output,
            baseline,
            input_format,
            output_format,
            trend_window,
            load_trend,
            save_trend,
        } => cmd_assess(
            &input,
            &output,
            &baseline,
            input_format,
            output_format,
            trend_window,
            load_trend.as_deref(),
            save_trend.as_deref(),
        ),

        Commands::Run {
            baseline,
            output_format,
            trend_window,
            load_trend,
            save_trend,
            flush,
        } => cmd_run(
            &baseline,
            output_format,
            trend_window,
            load_trend.as_deref(),
            save_trend.as_deref(),
            flush,
        ),

        Commands::Calibrate {
            input,
            output,
            input_format,
            window,
        } => cmd_calibrate(&input, &output, input_format, window),

        Commands::Doctor {
            baseline,
            trend,
            json,
        } => cmd_doctor(baseline.as_deref(), trend.as_deref(), json),
    }
}

fn read_input(input: &Path) -> Result<String, CliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &Path, data: &str) -> Result<(), CliError> {
    if output.to_string_lossy() == "-" {
        print!("{}", data);
        Ok(())
    } else {
        Ok(fs::write(output, data)?)
    }
}

fn parse_readings(data: &str, format: InputFormat) -> Result<Vec<SensorReading>, CliError> {
    match format {
        InputFormat::Ndjson => data
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                serde_json::from_str::<SensorReading>(line)
                    .map_err(|e| CliError::ParseError(e.to_string()))
            })
            .collect(),
        InputFormat::Json => {
            serde_json::from_str(data).map_err(|e| CliError::ParseError(e.to_string()))
        }
    }
}

fn load_baseline(path: &Path) -> Result<BaselineMetrics, CliError> {
    let json = fs::read_to_string(path)?;
    let baseline: BaselineMetrics = serde_json::from_str(&json)?;
    baseline.validate()?;
    Ok(baseline)
}

fn format_output(
    payloads: &[AssessmentPayload],
    format: &OutputFormat,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut out = String::new();
            for payload in payloads {
                out.push_str(&serde_json::to_string(payload)?);
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Json => Ok(serde_json::to_string(payloads)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(payloads)?),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_assess(
    input: &Path,
    output: &Path,
    baseline_path: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    trend_window: usize,
    load_trend: Option<&Path>,
    save_trend: Option<&Path>,
) -> Result<(), CliError> {
    let baseline = load_baseline(baseline_path)?;
    let readings = parse_readings(&read_input(input)?, input_format)?;

    if readings.is_empty() {
        return Err(CliError::NoReadings);
    }

    let mut processor = StressProcessor::with_trend_window(baseline, trend_window)?;

    if let Some(trend_path) = load_trend {
        let trend_json = fs::read_to_string(trend_path)?;
        processor.load_trend(&trend_json)?;
    }

    let mut payloads = Vec::with_capacity(readings.len());
    for reading in &readings {
        payloads.push(processor.assess(reading)?);
    }

    if let Some(trend_path) = save_trend {
        fs::write(trend_path, processor.save_trend()?)?;
    }

    write_output(output, &format_output(&payloads, &output_format)?)
}

fn cmd_run(
    baseline_path: &Path,
    output_format: OutputFormat,
    trend_window: usize,
    load_trend: Option<&Path>,
    save_trend: Option<&Path>,
    flush: bool,
) -> Result<(), CliError> {
    let baseline = load_baseline(baseline_path)?;
    let mut processor = StressProcessor::with_trend_window(baseline, trend_window)?;

    if let Some(trend_path) = load_trend {
        let trend_json = fs::read_to_string(trend_path)?;
        processor.load_trend(&trend_json)?;
    }

    if atty::is(atty::Stream::Stdin) {
        eprintln!("Reading NDJSON sensor readings from stdin (one per line, Ctrl-D to finish)");
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let reading: SensorReading = serde_json::from_str(trimmed)
            .map_err(|e| CliError::ParseError(format!("Failed to parse reading: {}", e)))?;

        let payload = processor.assess(&reading)?;

        let out = match output_format {
            OutputFormat::Ndjson | OutputFormat::Json => serde_json::to_string(&payload)?,
            OutputFormat::JsonPretty => serde_json::to_string_pretty(&payload)?,
        };
        writeln!(stdout, "{}", out)?;
        if flush {
            stdout.flush()?;
        }
    }

    if let Some(trend_path) = save_trend {
        fs::write(trend_path, processor.save_trend()?)?;
    }

    Ok(())
}

fn cmd_calibrate(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    window: Option<usize>,
) -> Result<(), CliError> {
    let readings = parse_readings(&read_input(input)?, input_format)?;

    if readings.is_empty() {
        return Err(CliError::NoReadings);
    }

    let mut recorder = match window {
        Some(size) => BaselineRecorder::new(size),
        None => BaselineRecorder::default(),
    };

    for reading in &readings {
        recorder.record(&reading.metrics)?;
    }

    let baseline = recorder.baseline()?;
    let json = serde_json::to_string_pretty(&baseline)?;
    write_output(output, &json)
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Error,
}

fn cmd_doctor(
    baseline: Option<&Path>,
    trend: Option<&Path>,
    json: bool,
) -> Result<(), CliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Calmwave version {}", ENGINE_VERSION),
    });

    checks.push(DoctorCheck {
        name: "report_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Report schema: {}", REPORT_VERSION),
    });

    if let Some(baseline_path) = baseline {
        checks.push(check_baseline_file(baseline_path));
    }

    if let Some(trend_path) = trend {
        checks.push(check_trend_file(trend_path));
    }

    let failed = checks
        .iter()
        .filter(|c| c.status == CheckStatus::Error)
        .count();

    if json {
        println!("{}", serde_json::to_string_pretty(&checks)?);
    } else {
        for check in &checks {
            let marker = match check.status {
                CheckStatus::Ok => "ok",
                CheckStatus::Error => "ERROR",
            };
            println!("[{}] {}: {}", marker, check.name, check.message);
        }
    }

    if failed > 0 {
        Err(CliError::ChecksFailed(failed))
    } else {
        Ok(())
    }
}

fn check_baseline_file(path: &Path) -> DoctorCheck {
    let name = "baseline".to_string();

    if !path.exists() {
        return DoctorCheck {
            name,
            status: CheckStatus::Error,
            message: format!("Baseline file not found: {}", path.display()),
        };
    }

    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<BaselineMetrics>(&content) {
            Ok(parsed) => match parsed.validate() {
                Ok(()) => DoctorCheck {
                    name,
                    status: CheckStatus::Ok,
                    message: format!(
                        "Baseline valid (hr {}, hrv {}, eda {})",
                        parsed.baseline_hr, parsed.baseline_hrv, parsed.baseline_eda
                    ),
                },
                Err(e) => DoctorCheck {
                    name,
                    status: CheckStatus::Error,
                    message: e.to_string(),
                },
            },
            Err(e) => DoctorCheck {
                name,
                status: CheckStatus::Error,
                message: format!("Invalid baseline JSON: {}", e),
            },
        },
        Err(e) => DoctorCheck {
            name,
            status: CheckStatus::Error,
            message: format!("Cannot read baseline file: {}", e),
        },
    }
}

fn check_trend_file(path: &Path) -> DoctorCheck {
    let name = "trend".to_string();

    if !path.exists() {
        return DoctorCheck {
            name,
            status: CheckStatus::Error,
            message: format!("Trend file not found: {}", path.display()),
        };
    }

    match fs::read_to_string(path) {
        Ok(content) => match calmwave::ScoreTrend::from_json(&content) {
            Ok(parsed) => DoctorCheck {
                name,
                status: CheckStatus::Ok,
                message: format!("Trend state valid ({} scores in window)", parsed.len()),
            },
            Err(e) => DoctorCheck {
                name,
                status: CheckStatus::Error,
                message: format!("Invalid trend JSON: {}", e),
            },
        },
        Err(e) => DoctorCheck {
            name,
            status: CheckStatus::Error,
            message: format!("Cannot read trend file: {}", e),
        },
    }
}
