//! Analysis stage entry point: fold judgement files into summary scores.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use irlbench::analysis::{analyze, write_summary};
use irlbench::catalog::{ExamCatalog, Language};
use irlbench::logging;

#[derive(Parser, Debug)]
#[command(
    name = "run_analysis",
    about = "Aggregate judgement files into per-subject and per-language scores"
)]
struct Cli {
    /// Student model to analyze.
    #[arg(long, default_value = "gemini-2.0-flash")]
    model: String,

    /// Judge model whose verdicts to read.
    #[arg(long = "judge-model", default_value = "gemini-2.5-flash-preview-04-17")]
    judge_model: String,

    /// Exam catalog file.
    #[arg(long, default_value = "exams.toml")]
    exams: PathBuf,

    /// Directory containing judgement CSV files.
    #[arg(long = "judgements-dir", default_value = "judgements")]
    judgements_dir: PathBuf,

    /// Directory containing response CSV files.
    #[arg(long = "responses-dir", default_value = "responses")]
    responses_dir: PathBuf,

    /// Directory for summary outputs.
    #[arg(long = "output-dir", default_value = "output")]
    output_dir: PathBuf,
}

fn fmt(score: Option<f64>) -> String {
    score.map(|s| format!("{:.2}%", s)).unwrap_or_else(|| "n/a".to_string())
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let catalog = ExamCatalog::load(&cli.exams)?;
    logging::log_stage_start("analysis", &cli.model);

    let report = analyze(
        &catalog,
        &cli.judgements_dir,
        &cli.responses_dir,
        &cli.model,
        &cli.judge_model,
    )?;

    println!("--- Summary ---");
    println!("Model: {}", cli.model);
    println!();
    for lang in [Language::English, Language::Irish] {
        for subject in report.subjects.iter().filter(|s| s.language == Some(lang)) {
            if let Some(score) = subject.score() {
                println!("{}: {:.2}%", subject.display_name, score);
            }
        }
        println!();
    }

    println!("Average scores:");
    println!("English: {}", fmt(report.english_score));
    println!("Irish: {}", fmt(report.irish_score));

    println!();
    println!("Irish language fidelity (share of responses written in Irish):");
    println!("All responses: {}", fmt(report.fidelity.total_pct()));
    println!("Correct responses: {}", fmt(report.fidelity.correct_pct()));
    println!("Incorrect responses: {}", fmt(report.fidelity.incorrect_pct()));

    let summary_path = write_summary(&report, &cli.output_dir, &cli.model)?;
    println!();
    println!("Summary written to {}", summary_path.display());

    Ok(())
}
