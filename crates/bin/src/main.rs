//! Contrail CLI binary.
//!
//! Trains the profit model from a CSV file or predicts profit for JSON
//! records with a saved model.

mod integration;

use chrono::Utc;
use clap::{Parser, ValueEnum};
use contrail::{PipelineOptions, ProfitPipeline, TrainingOutcome};
use contrail_model::ModelConfig;
use contrail_reporting::{MAX_REFRESH_HOURS, SchedulerConfig};
use indicatif::{ProgressBar, ProgressStyle};
use integration::input::read_input;
use integration::reporting::ReportingSession;
use serde::Serialize;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const TOP_FEATURES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Train, save and evaluate a model
    Train,
    /// Predict with a saved model
    Predict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputType {
    /// One JSON object
    Single,
    /// A JSON array of objects
    Batch,
}

#[derive(Debug, Parser)]
#[command(name = "contrail")]
#[command(about = "Contrail: airline operating profit prediction", long_about = None)]
#[command(version)]
struct Cli {
    /// What to run
    #[arg(long, value_enum, default_value_t = Mode::Predict)]
    mode: Mode,

    /// Training data CSV
    #[arg(long, default_value = "data/raw/airline_data.csv")]
    data_path: PathBuf,

    /// Saved model location
    #[arg(long, default_value = "models/saved_models/model.bin")]
    model_path: PathBuf,

    /// Shape of the prediction input
    #[arg(long, value_enum, default_value_t = InputType::Single)]
    input_type: InputType,

    /// JSON record(s) inline, or a path to a .json file
    #[arg(long)]
    input: Option<String>,

    /// Upload prediction results to the BI store
    #[arg(long)]
    reporting: bool,

    /// Reporting connector config
    #[arg(long, default_value = "config/reporting.json")]
    reporting_config: PathBuf,

    /// Hours between scheduled uploads (1 to 8760)
    #[arg(long, default_value_t = 24, value_parser = clap::value_parser!(u64).range(1..=MAX_REFRESH_HOURS))]
    refresh_hours: u64,

    /// Append this many principal components to the features
    #[arg(long)]
    pca_components: Option<usize>,

    /// Keep only the K features most associated with profit
    #[arg(long)]
    select_k: Option<usize>,

    /// Cross-validation folds
    #[arg(long, default_value_t = 5)]
    cv_folds: usize,

    /// Directory for diagnostic plot data
    #[arg(long)]
    diagnostics_dir: Option<PathBuf>,

    /// Path of the JSON evaluation report
    #[arg(long)]
    report_path: Option<PathBuf>,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn pipeline_options(&self) -> PipelineOptions {
        let mut model = ModelConfig {
            cv_folds: self.cv_folds,
            ..ModelConfig::default()
        };
        model.features.pca_components = self.pca_components;
        model.features.select_k = self.select_k;

        PipelineOptions {
            model,
            diagnostics_dir: self.diagnostics_dir.clone(),
            report_path: self.report_path.clone(),
            ..PipelineOptions::new(&self.data_path, &self.model_path)
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!(error = %e, "Run failed");
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Returns `false` when the run completed but produced an error result.
async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let pipeline = ProfitPipeline::new(cli.pipeline_options());

    match cli.mode {
        Mode::Train => {
            let outcome = train(pipeline).await?;
            print_training(&outcome);
            Ok(true)
        }
        Mode::Predict => predict(&cli, &pipeline).await,
    }
}

async fn train(pipeline: ProfitPipeline) -> Result<TrainingOutcome, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {elapsed} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!(
        "Training on {}...",
        pipeline.options().data_path.display()
    ));

    let result = tokio::task::spawn_blocking(move || pipeline.train()).await?;
    match result {
        Ok(outcome) => {
            pb.finish_with_message("Training complete");
            Ok(outcome)
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            Err(e.into())
        }
    }
}

fn print_training(outcome: &TrainingOutcome) {
    let report = &outcome.report;

    println!("\n=== Model Evaluation ===");
    println!("Rows:           {}", outcome.n_rows);
    println!("Held-out rows:  {}", report.n_samples);
    println!("R2:             {:.4}", report.metrics.r2);
    println!("RMSE:           {:.2}", report.metrics.rmse);
    println!("MAE:            {:.2}", report.metrics.mae);
    println!("MAPE:           {:.2}%", report.metrics.mape);

    if let Some(cv) = &report.cross_validation {
        let scores: Vec<String> = cv.scores.iter().map(|s| format!("{:.4}", s)).collect();
        println!("\n=== Cross-Validation ===");
        println!("R2 scores:      [{}]", scores.join(", "));
        println!("Mean R2:        {:.4} (+/- {:.4})", cv.mean, cv.std * 2.0);
    }

    println!("\n=== Prediction Summary ===");
    println!(
        "Predicted:      mean {:.2}, std {:.2}, min {:.2}, max {:.2}",
        report.predictions.mean, report.predictions.std, report.predictions.min, report.predictions.max
    );
    println!(
        "Actual:         mean {:.2}, std {:.2}, min {:.2}, max {:.2}",
        report.actuals.mean, report.actuals.std, report.actuals.min, report.actuals.max
    );

    if !report.feature_importances.is_empty() {
        println!("\n=== Top Features ===");
        for fi in report.feature_importances.iter().take(TOP_FEATURES) {
            println!("{:<40} {:.4}", fi.feature, fi.importance);
        }
    }
    println!();
}

async fn predict(cli: &Cli, pipeline: &ProfitPipeline) -> Result<bool, Box<dyn std::error::Error>> {
    let value = read_input(cli.input.as_deref())?;

    let reporting = if cli.reporting {
        match ReportingSession::start(&cli.reporting_config, SchedulerConfig::new(cli.refresh_hours)) {
            Ok(session) => Some(session),
            Err(e) => {
                error!(error = %e, "Reporting setup failed, continuing without uploads");
                None
            }
        }
    } else {
        None
    };

    let now = Utc::now();
    let (succeeded, rows) = match cli.input_type {
        InputType::Single => {
            let result = pipeline.predict_single(&value);
            print_json(&result)?;
            (result.is_success(), result.prediction_rows(now))
        }
        InputType::Batch => {
            let result = pipeline.predict_batch(&value);
            print_json(&result)?;
            (result.is_success(), result.prediction_rows(now))
        }
    };
    info!(succeeded, rows = rows.len(), "Prediction finished");

    if let Some(session) = reporting {
        session.publish(rows).await;
        session.shutdown().await;
    }

    Ok(succeeded)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
