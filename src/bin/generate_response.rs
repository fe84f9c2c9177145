//! Response stage entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use irlbench::catalog::ExamCatalog;
use irlbench::config::Config;
use irlbench::logging;
use irlbench::pipeline::respond::{self, RespondOptions};
use irlbench::retry::RetryPolicy;
use irlbench::services::{ModelAdapter, ResponseMode};

#[derive(Parser, Debug)]
#[command(
    name = "generate_response",
    about = "Collect a student model's answers to the extracted problems"
)]
struct Cli {
    /// Student model to evaluate.
    #[arg(long, required = true)]
    model: String,

    /// Exam catalog file.
    #[arg(long, default_value = "exams.toml")]
    exams: PathBuf,

    /// Directory holding the dataset CSV splits.
    #[arg(long = "dataset-dir", default_value = "dataset")]
    dataset_dir: PathBuf,

    /// Directory for the response CSV files.
    #[arg(long = "responses-dir", default_value = "responses")]
    responses_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let config = Config::from_env();
    let catalog = ExamCatalog::load(&cli.exams)?;

    logging::log_stage_start("response generation", &cli.model);

    let adapter = ModelAdapter::new(&config, &cli.model, ResponseMode::FreeText);
    let policy = RetryPolicy::from_config(&config);
    let opts = RespondOptions {
        dataset_dir: cli.dataset_dir,
        responses_dir: cli.responses_dir,
    };

    respond::run(&catalog, &adapter, &policy, &opts).await
}
