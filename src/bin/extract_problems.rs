//! Extraction stage entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use irlbench::catalog::ExamCatalog;
use irlbench::config::Config;
use irlbench::pipeline::extract::{self, ExtractOptions};
use irlbench::retry::RetryPolicy;
use irlbench::services::{ModelAdapter, ResponseMode};
use irlbench::{logging, Language};

#[derive(Parser, Debug)]
#[command(
    name = "extract_problems",
    about = "Extract problems and marking-scheme answers from scanned exam pages"
)]
struct Cli {
    /// Vision model used for extraction.
    #[arg(long, default_value = "gemini-2.0-flash")]
    model: String,

    /// Exam catalog file.
    #[arg(long, default_value = "exams.toml")]
    exams: PathBuf,

    /// Directory holding the scanned page images.
    #[arg(long = "images-dir", default_value = "exam_images")]
    images_dir: PathBuf,

    /// Directory for the extracted problem text files.
    #[arg(long = "results-dir", default_value = "results")]
    results_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let config = Config::from_env();
    let catalog = ExamCatalog::load(&cli.exams)?;

    logging::log_stage_start("extraction", &cli.model);
    tracing::info!(
        "{} exams ({} English, {} Irish)",
        catalog.exams.len(),
        catalog
            .exams
            .iter()
            .filter(|e| e.language() == Some(Language::English))
            .count(),
        catalog
            .exams
            .iter()
            .filter(|e| e.language() == Some(Language::Irish))
            .count()
    );

    let adapter = ModelAdapter::new(&config, &cli.model, ResponseMode::FreeText);
    let policy = RetryPolicy::from_config(&config);
    let opts = ExtractOptions {
        images_dir: cli.images_dir,
        results_dir: cli.results_dir,
    };

    extract::run(&catalog, &adapter, &policy, &opts).await
}
