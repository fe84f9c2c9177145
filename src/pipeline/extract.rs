//! Extraction stage: exam pages + marking-scheme pages in, problem/answer
//! text blocks out.
//!
//! Each section is one model call carrying the section's exam pages
//! followed by its marking-scheme pages, so the model can line up
//! question numbers across the two scans. Output accumulates per exam and
//! is written once per exam; a section that exhausts its retries is
//! logged and contributes nothing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::catalog::{ExamCatalog, ExamSpec, FileGroup};
use crate::retry::{with_retry, RetryPolicy};
use crate::services::prompts::EXTRACTION_PROMPT;
use crate::services::{jpeg_data_url, ModelAdapter};

#[derive(Clone, Debug)]
pub struct ExtractOptions {
    pub images_dir: PathBuf,
    pub results_dir: PathBuf,
}

/// Output path for one exam's extracted problems.
pub fn problems_path(results_dir: &Path, exam_name: &str) -> PathBuf {
    results_dir.join(format!("{}_problems.txt", exam_name))
}

fn load_group_images(group: &FileGroup) -> Result<Vec<String>> {
    group
        .all_files()
        .map(|path| {
            let bytes = std::fs::read(path)
                .with_context(|| format!("cannot read page image {}", path.display()))?;
            Ok(jpeg_data_url(&bytes))
        })
        .collect()
}

async fn extract_exam(
    exam: &ExamSpec,
    adapter: &ModelAdapter,
    policy: &RetryPolicy,
    opts: &ExtractOptions,
) -> Result<()> {
    let groups = exam.file_groups(&opts.images_dir);
    info!("extracting {} ({} sections)", exam.name, groups.len());

    let mut problems = String::new();
    for (i, group) in groups.iter().enumerate() {
        let images = load_group_images(group)?;
        info!(
            "{} section {}/{}: {} exam pages, {} scheme pages",
            exam.name,
            i + 1,
            groups.len(),
            group.source_files.len(),
            group.scheme_files.len()
        );

        let outcome =
            with_retry(policy, || adapter.generate(EXTRACTION_PROMPT, &images)).await;
        match outcome {
            crate::retry::Outcome::Completed(text) => {
                problems.push_str(&text);
                problems.push('\n');
            }
            crate::retry::Outcome::Failed => {
                error!(
                    "{} section {}/{}: extraction failed after retries, section skipped",
                    exam.name,
                    i + 1,
                    groups.len()
                );
            }
        }
    }

    std::fs::create_dir_all(&opts.results_dir)
        .with_context(|| format!("cannot create {}", opts.results_dir.display()))?;
    let out_path = problems_path(&opts.results_dir, &exam.name);
    std::fs::write(&out_path, &problems)
        .with_context(|| format!("cannot write {}", out_path.display()))?;
    info!("wrote {}", out_path.display());
    Ok(())
}

/// Run extraction for every exam in the catalog.
pub async fn run(
    catalog: &ExamCatalog,
    adapter: &ModelAdapter,
    policy: &RetryPolicy,
    opts: &ExtractOptions,
) -> Result<()> {
    for exam in &catalog.exams {
        extract_exam(exam, adapter, policy, opts).await?;
    }
    Ok(())
}
