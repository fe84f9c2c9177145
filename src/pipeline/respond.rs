//! Response stage: prompt the student model with each extracted problem
//! and record its answer.
//!
//! Reads the published dataset split for each exam (a CSV with `problem`,
//! `answer` and up to two problem images), fills the `response` column row
//! by row, and rewrites the whole output file after every row so a killed
//! run leaves a usable partial file. A rerun starts from the dataset
//! again and overwrites the previous output entirely.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};

use crate::catalog::ExamCatalog;
use crate::pipeline::driver::{run_batch, Job};
use crate::records::{
    file_safe_model, read_rows, write_rows, ResponseRow, RESPONSE_FAILURE_SENTINEL,
};
use crate::retry::RetryPolicy;
use crate::services::prompts::response_prompt;
use crate::services::{png_data_url, ModelAdapter};

#[derive(Clone, Debug)]
pub struct RespondOptions {
    pub dataset_dir: PathBuf,
    pub responses_dir: PathBuf,
}

/// Output path for one exam/model pair.
pub fn responses_path(responses_dir: &Path, dataset_key: &str, model: &str) -> PathBuf {
    responses_dir.join(format!("{}_{}.csv", dataset_key, file_safe_model(model)))
}

fn build_jobs(rows: &[ResponseRow]) -> Vec<Job> {
    rows.iter()
        .map(|row| Job::Invoke {
            prompt: response_prompt(&row.problem),
            images: row
                .problem_images()
                .iter()
                .map(|bytes| png_data_url(bytes))
                .collect(),
        })
        .collect()
}

/// Run the response stage for every exam in the catalog.
pub async fn run(
    catalog: &ExamCatalog,
    adapter: &ModelAdapter,
    policy: &RetryPolicy,
    opts: &RespondOptions,
) -> Result<()> {
    for exam in &catalog.exams {
        let key = exam.dataset_key();
        let dataset_path = opts.dataset_dir.join(format!("{}.csv", key));
        if !dataset_path.exists() {
            warn!("no dataset split at {}, skipping exam", dataset_path.display());
            continue;
        }

        let mut rows: Vec<ResponseRow> = read_rows(&dataset_path)?;
        let out_path = responses_path(&opts.responses_dir, &key, adapter.model());
        info!(
            "responding to {} ({} problems) -> {}",
            key,
            rows.len(),
            out_path.display()
        );

        let jobs = build_jobs(&rows);
        let stats = run_batch(jobs, adapter, policy, RESPONSE_FAILURE_SENTINEL, |i, cell| {
            rows[i].response = cell;
            write_rows(&out_path, &rows)
        })
        .await?;

        info!(
            "{}: {} answered, {} failed",
            key, stats.succeeded, stats.failed
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::encode_image_cell;

    #[test]
    fn output_path_uses_dataset_key_and_safe_model_name() {
        let path = responses_path(
            Path::new("responses"),
            "LC003ALP100EV_problems",
            "org/model-1",
        );
        assert_eq!(
            path,
            PathBuf::from("responses/LC003ALP100EV_problems_org--model-1.csv")
        );
    }

    #[test]
    fn jobs_carry_format_suffix_and_images() {
        let rows = vec![ResponseRow {
            problem: "Integrate x.".to_string(),
            answer: "x^2/2".to_string(),
            problem_image_1: Some(encode_image_cell(&[1, 2, 3])),
            ..Default::default()
        }];
        let jobs = build_jobs(&rows);
        match &jobs[0] {
            Job::Invoke { prompt, images } => {
                assert!(prompt.starts_with("Integrate x."));
                assert!(prompt.contains("Confidence:"));
                assert_eq!(images.len(), 1);
                assert!(images[0].starts_with("data:image/png;base64,"));
            }
            Job::Skip(_) => panic!("response stage never skips"),
        }
    }
}
