//! Judgement stage entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use irlbench::catalog::ExamCatalog;
use irlbench::config::Config;
use irlbench::logging;
use irlbench::pipeline::judge::{self, JudgeOptions};
use irlbench::retry::RetryPolicy;
use irlbench::services::{ModelAdapter, ResponseMode};

#[derive(Parser, Debug)]
#[command(
    name = "generate_judgement",
    about = "Grade recorded responses against the marking scheme with a judge model"
)]
struct Cli {
    /// Judge model.
    #[arg(long = "judge_model", required = true)]
    judge_model: String,

    /// Student model whose responses are being graded.
    #[arg(long = "student_model", required = true)]
    student_model: String,

    /// Exam catalog file.
    #[arg(long, default_value = "exams.toml")]
    exams: PathBuf,

    /// Directory holding the response CSV files.
    #[arg(long = "responses-dir", default_value = "responses")]
    responses_dir: PathBuf,

    /// Directory for the judgement CSV files.
    #[arg(long = "judgements-dir", default_value = "judgements")]
    judgements_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let config = Config::from_env();
    let catalog = ExamCatalog::load(&cli.exams)?;

    logging::log_stage_start("judgement", &cli.judge_model);
    tracing::info!("grading responses from {}", cli.student_model);

    let adapter = ModelAdapter::new(&config, &cli.judge_model, ResponseMode::JsonVerdict);
    let policy = RetryPolicy::from_config(&config);
    let opts = JudgeOptions {
        responses_dir: cli.responses_dir,
        judgements_dir: cli.judgements_dir,
    };

    judge::run(&catalog, &adapter, &cli.student_model, &policy, &opts).await
}
