use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use skinage_capture::validation::{check_lighting, validate};
use skinage_capture::{metrics, FaceBox, Frame};
use skinage_core::prediction::parse_reply;
use skinage_core::quality::corrected_age;
use skinage_core::{Factor, LifestyleLog, PredictionRequest, PredictionResponse, Report, SkinFactors};
use skinage_gauge::{to_svg, GaugeInput};
use std::path::{Path, PathBuf};

mod client;
mod config;

use client::PredictionClient;
use config::Config;

#[derive(Parser)]
#[command(name = "skinage", about = "Skin age prediction gauges, analysis and reports")]
struct Cli {
    /// TOML config file (defaults to $SKINAGE_CONFIG, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a single gauge as SVG
    Gauge {
        /// Five-level label (very_low .. very_high) for the ring gauge
        #[arg(long, conflicts_with = "tier")]
        level: Option<String>,
        /// Severity tier (1-3) for the segmented gauge
        #[arg(long)]
        tier: Option<i64>,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Analyze a captured image locally and print the result as JSON
    Analyze {
        /// Captured still (JPEG or PNG)
        image: PathBuf,
        /// Known real age in years
        #[arg(long, conflicts_with = "detected_age")]
        real_age: Option<u32>,
        /// Age reported by a detector; corrected before use
        #[arg(long)]
        detected_age: Option<i64>,
        /// Lifestyle factor as key=value (repeatable)
        #[arg(long = "factor", value_parser = parse_factor)]
        factors: Vec<(Factor, String)>,
        /// Detected face box as x,y,width,height (repeatable)
        #[arg(long = "face")]
        faces: Vec<FaceBox>,
        /// Skip framing and lighting checks
        #[arg(long)]
        skip_checks: bool,
        /// Also write an SVG report here
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Submit a captured image to the prediction service and write a report
    Predict {
        image: PathBuf,
        #[arg(long = "factor", value_parser = parse_factor)]
        factors: Vec<(Factor, String)>,
        /// Report path (defaults to <output_dir>/skin-report.svg)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Save the raw service response as JSON
        #[arg(long)]
        save_response: Option<PathBuf>,
    },
    /// Render a saved prediction response as an SVG report
    Report {
        /// Response JSON as returned by the service
        response: PathBuf,
        #[arg(long = "factor", value_parser = parse_factor)]
        factors: Vec<(Factor, String)>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Score one day of habits and print the log entry as JSON
    Lifestyle {
        /// Water intake in liters
        #[arg(long)]
        water: f64,
        /// Hours of sleep
        #[arg(long)]
        sleep: u32,
        /// Stress level (low, moderate, high)
        #[arg(long, default_value = "moderate")]
        stress: String,
        /// Sun exposure (low, moderate, high)
        #[arg(long, default_value = "moderate")]
        sun: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Gauge {
            level,
            tier,
            output,
        } => {
            let input = match (tier, level) {
                (Some(tier), _) => GaugeInput::Tier(Some(tier)),
                (None, Some(level)) => GaugeInput::from_label(&level),
                (None, None) => GaugeInput::Label(None),
            };
            if !input.is_recognized() {
                tracing::warn!(?input, "unrecognized score, rendering the default gauge");
            }
            write_output(output.as_deref(), &to_svg(&input.render_with(&config.gauge)))?;
        }
        Commands::Analyze {
            image,
            real_age,
            detected_age,
            factors,
            faces,
            skip_checks,
            report,
        } => {
            let frame =
                Frame::open(&image).with_context(|| format!("loading {}", image.display()))?;
            if !skip_checks {
                if faces.is_empty() {
                    tracing::warn!("no face boxes given, checking lighting only");
                    check_lighting(frame.avg_brightness(), &config.capture)?;
                } else {
                    validate(&frame, &faces, &config.capture)?;
                }
            }

            let measured = metrics::measure(&frame)?;
            let real_age = real_age.or(detected_age.map(corrected_age));
            let factors = skin_factors(&factors);
            let response = PredictionResponse::from_analysis(&measured, real_age, &factors)?;
            println!("{}", serde_json::to_string_pretty(&response)?);

            if let Some(path) = report {
                write_report(&config, response, factors, &path)?;
            }
        }
        Commands::Predict {
            image,
            factors,
            output,
            save_response,
        } => {
            let frame =
                Frame::open(&image).with_context(|| format!("loading {}", image.display()))?;
            let factors = skin_factors(&factors);
            let request = PredictionRequest {
                image: frame.to_jpeg_data_url()?,
                skin_factors: factors.clone(),
            };

            let client = PredictionClient::new(&config)?;
            tracing::info!(url = %config.service_url, "submitting capture");
            let response = client.predict(&request).await?;

            if let Some(path) = save_response {
                write_output(Some(&path), &serde_json::to_string_pretty(&response)?)?;
            }
            let path = output.unwrap_or_else(|| config.report_path());
            write_report(&config, response, factors, &path)?;
        }
        Commands::Report {
            response,
            factors,
            output,
        } => {
            let body = std::fs::read_to_string(&response)
                .with_context(|| format!("reading {}", response.display()))?;
            let parsed = parse_reply(&body)?;
            let mut report = Report::new(parsed).with_style(config.gauge.clone());
            if !factors.is_empty() {
                report = report.with_factors(skin_factors(&factors));
            }
            let path = output.unwrap_or_else(|| config.report_path());
            write_output(Some(&path), &report.to_svg())?;
        }
        Commands::Lifestyle {
            water,
            sleep,
            stress,
            sun,
        } => {
            let log = LifestyleLog::new(water, sleep, &stress, &sun);
            tracing::info!(total = log.total(), "lifestyle scored");
            println!("{}", serde_json::to_string_pretty(&log)?);
        }
    }

    Ok(())
}

/// Parse `key=value` into a known factor and its raw value.
fn parse_factor(s: &str) -> Result<(Factor, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {s:?}"))?;
    let factor = Factor::from_key(key.trim()).ok_or_else(|| {
        let known: Vec<&str> = Factor::ALL.iter().map(|f| f.key()).collect();
        format!("unknown factor {key:?} (expected one of {})", known.join(", "))
    })?;
    Ok((factor, value.trim().to_string()))
}

/// Factors left unset keep the moderate default.
fn skin_factors(pairs: &[(Factor, String)]) -> SkinFactors {
    let mut factors = SkinFactors::default();
    for (factor, value) in pairs {
        factors.set_raw(factor.key(), value.as_str());
    }
    factors
}

fn write_report(
    config: &Config,
    response: PredictionResponse,
    factors: SkinFactors,
    path: &Path,
) -> Result<()> {
    let report = Report::new(response)
        .with_factors(factors)
        .with_style(config.gauge.clone());
    write_output(Some(path), &report.to_svg())
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::write(path, content)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = content.len(), "written");
        }
        None => println!("{content}"),
    }
    Ok(())
}
