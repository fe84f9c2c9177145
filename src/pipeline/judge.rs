//! Judgement stage: grade each recorded response against its marking
//! scheme with a judge model.
//!
//! Consumes the response stage's CSV for a student model and appends a
//! `judgement` column holding the judge's JSON verdict verbatim. Rows for
//! image-bearing problems are skipped up front when the student model is
//! known not to support images; calling the judge about a response that
//! could never have seen the figure would grade noise.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};

use crate::catalog::ExamCatalog;
use crate::config::is_text_only_student;
use crate::pipeline::driver::{run_batch, Job};
use crate::records::{
    file_safe_model, read_rows, write_rows, JudgementRow, ResponseRow,
    JUDGEMENT_FAILURE_SENTINEL,
};
use crate::retry::RetryPolicy;
use crate::services::prompts::judgement_prompt;
use crate::services::{png_data_url, ModelAdapter};

#[derive(Clone, Debug)]
pub struct JudgeOptions {
    pub responses_dir: PathBuf,
    pub judgements_dir: PathBuf,
}

/// Output path for one exam/student/judge triple.
pub fn judgements_path(
    judgements_dir: &Path,
    dataset_key: &str,
    student_model: &str,
    judge_model: &str,
) -> PathBuf {
    judgements_dir.join(format!(
        "{}_{}_judge_model_{}.csv",
        dataset_key,
        file_safe_model(student_model),
        file_safe_model(judge_model)
    ))
}

fn skip_message(student_model: &str) -> String {
    format!("Skipped: {} does not support image files", student_model)
}

fn build_jobs(rows: &[JudgementRow], student_model: &str) -> Vec<Job> {
    rows.iter()
        .map(|row| {
            let images = row.images();
            if is_text_only_student(student_model) && !images.is_empty() {
                return Job::Skip(skip_message(student_model));
            }
            Job::Invoke {
                prompt: judgement_prompt(&row.problem, &row.response, &row.answer),
                images: images.iter().map(|bytes| png_data_url(bytes)).collect(),
            }
        })
        .collect()
}

/// Run the judgement stage for every exam in the catalog.
pub async fn run(
    catalog: &ExamCatalog,
    adapter: &ModelAdapter,
    student_model: &str,
    policy: &RetryPolicy,
    opts: &JudgeOptions,
) -> Result<()> {
    for exam in &catalog.exams {
        let key = exam.dataset_key();
        let in_path = opts
            .responses_dir
            .join(format!("{}_{}.csv", key, file_safe_model(student_model)));
        if !in_path.exists() {
            warn!("no responses at {}, skipping exam", in_path.display());
            continue;
        }

        let responses: Vec<ResponseRow> = read_rows(&in_path)?;
        let mut rows: Vec<JudgementRow> =
            responses.into_iter().map(JudgementRow::from).collect();

        let out_path =
            judgements_path(&opts.judgements_dir, &key, student_model, adapter.model());
        info!(
            "judging {} ({} rows) -> {}",
            key,
            rows.len(),
            out_path.display()
        );

        let jobs = build_jobs(&rows, student_model);
        let stats = run_batch(jobs, adapter, policy, JUDGEMENT_FAILURE_SENTINEL, |i, cell| {
            rows[i].judgement = cell;
            write_rows(&out_path, &rows)
        })
        .await?;

        info!(
            "{}: {} judged, {} failed, {} skipped",
            key, stats.succeeded, stats.failed, stats.skipped
        );
    }
    Ok(())
}
