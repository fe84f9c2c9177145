//! Aggregation of judged results into per-subject and per-language
//! statistics.
//!
//! Everything here is recomputed from the judgement CSVs on each run;
//! nothing is persisted except the summary table. A verdict that cannot
//! be decoded is excluded from a subject's denominator; a parse failure
//! is not evidence of a wrong answer.

pub mod language;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{ExamCatalog, ExamSpec, Language};
use crate::pipeline::judge::judgements_path;
use crate::pipeline::respond;
use crate::records::{read_rows, JudgementRow, ResponseRow, Verdict};

/// Per-subject correctness and confidence, derived from one judgement file.
#[derive(Clone, Debug)]
pub struct SubjectResult {
    pub name: String,
    pub display_name: String,
    pub language: Option<Language>,
    pub correct: Vec<bool>,
    pub confidences: Vec<f64>,
    /// Rows whose verdict could not be decoded (sentinels, skips, junk).
    pub excluded: usize,
}

impl SubjectResult {
    /// Mean correctness as a percentage over decodable rows only.
    pub fn score(&self) -> Option<f64> {
        if self.correct.is_empty() {
            return None;
        }
        let right = self.correct.iter().filter(|c| **c).count();
        Some(right as f64 / self.correct.len() as f64 * 100.0)
    }

    pub fn mean_confidence(&self) -> Option<f64> {
        if self.confidences.is_empty() {
            return None;
        }
        Some(self.confidences.iter().sum::<f64>() / self.confidences.len() as f64)
    }
}

/// Fold judgement rows into correctness booleans, confidences, and the
/// count of excluded rows.
pub fn collect_verdicts(rows: &[JudgementRow]) -> (Vec<bool>, Vec<f64>, usize) {
    let mut correct = Vec::new();
    let mut confidences = Vec::new();
    let mut excluded = 0usize;

    for row in rows {
        match Verdict::parse(&row.judgement).and_then(|v| v.is_correct().map(|c| (v, c))) {
            Some((verdict, is_correct)) => {
                correct.push(is_correct);
                if let Some(conf) = verdict.confidence_percent() {
                    confidences.push(conf);
                }
            }
            None => excluded += 1,
        }
    }

    (correct, confidences, excluded)
}

/// Fold already-loaded judgement rows into one subject's result.
pub fn subject_from_rows(exam: &ExamSpec, rows: &[JudgementRow]) -> SubjectResult {
    let (correct, confidences, excluded) = collect_verdicts(rows);
    SubjectResult {
        name: exam.name.clone(),
        display_name: exam.display_name.clone(),
        language: exam.language(),
        correct,
        confidences,
        excluded,
    }
}

/// Load and fold one subject's judgement file.
pub fn load_subject_result(
    judgements_dir: &Path,
    exam: &ExamSpec,
    student_model: &str,
    judge_model: &str,
) -> Result<SubjectResult> {
    let path = judgements_path(
        judgements_dir,
        &exam.dataset_key(),
        student_model,
        judge_model,
    );
    let rows: Vec<JudgementRow> =
        read_rows(&path).with_context(|| format!("cannot load judgements for {}", exam.name))?;
    Ok(subject_from_rows(exam, &rows))
}

/// Unweighted mean: every subject counts equally regardless of its size.
pub fn unweighted_mean(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().sum::<f64>() / scores.len() as f64)
}

/// Fraction of Irish-exam responses actually written in Irish, overall and
/// split by verdict.
#[derive(Clone, Copy, Debug, Default)]
pub struct IrishFidelity {
    pub irish_responses: usize,
    pub total_responses: usize,
    pub correct_irish: usize,
    pub correct_total: usize,
    pub incorrect_irish: usize,
    pub incorrect_total: usize,
}

fn pct(part: usize, whole: usize) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(part as f64 / whole as f64 * 100.0)
    }
}

impl IrishFidelity {
    pub fn total_pct(&self) -> Option<f64> {
        pct(self.irish_responses, self.total_responses)
    }

    pub fn correct_pct(&self) -> Option<f64> {
        pct(self.correct_irish, self.correct_total)
    }

    pub fn incorrect_pct(&self) -> Option<f64> {
        pct(self.incorrect_irish, self.incorrect_total)
    }

    /// Tally the overall language split from raw response texts. Language
    /// is classified independently of any verdict.
    pub fn accumulate_responses<'a>(&mut self, responses: impl Iterator<Item = &'a str>) {
        for response in responses {
            if response.trim().is_empty() {
                continue;
            }
            self.total_responses += 1;
            if language::is_irish(response) {
                self.irish_responses += 1;
            }
        }
    }

    /// Tally the correct/incorrect language split. Only rows with a
    /// decodable verdict contribute.
    pub fn accumulate_verdict_split(&mut self, rows: &[JudgementRow]) {
        for row in rows {
            if row.response.trim().is_empty() {
                continue;
            }
            let in_irish = language::is_irish(&row.response);
            if let Some(is_correct) = Verdict::parse(&row.judgement).and_then(|v| v.is_correct()) {
                if is_correct {
                    self.correct_total += 1;
                    if in_irish {
                        self.correct_irish += 1;
                    }
                } else {
                    self.incorrect_total += 1;
                    if in_irish {
                        self.incorrect_irish += 1;
                    }
                }
            }
        }
    }
}

/// Full analysis output for one student model.
#[derive(Clone, Debug)]
pub struct AnalysisReport {
    pub subjects: Vec<SubjectResult>,
    pub english_score: Option<f64>,
    pub irish_score: Option<f64>,
    pub fidelity: IrishFidelity,
}

fn language_mean(subjects: &[SubjectResult], lang: Language) -> Option<f64> {
    let scores: Vec<f64> = subjects
        .iter()
        .filter(|s| s.language == Some(lang))
        .filter_map(|s| s.score())
        .collect();
    unweighted_mean(&scores)
}

/// Aggregate every subject's judgement file for a student/judge pair.
///
/// The overall language-fidelity tally prefers the response stage's raw
/// CSV when it is still on disk, falling back to the response column
/// carried through the judgement file.
pub fn analyze(
    catalog: &ExamCatalog,
    judgements_dir: &Path,
    responses_dir: &Path,
    student_model: &str,
    judge_model: &str,
) -> Result<AnalysisReport> {
    let mut subjects = Vec::new();
    let mut fidelity = IrishFidelity::default();

    for exam in &catalog.exams {
        let path = judgements_path(
            judgements_dir,
            &exam.dataset_key(),
            student_model,
            judge_model,
        );
        if !path.exists() {
            warn!("no judgements at {}, subject omitted", path.display());
            continue;
        }
        let judged: Vec<JudgementRow> = read_rows(&path)
            .with_context(|| format!("cannot load judgements for {}", exam.name))?;
        let subject = subject_from_rows(exam, &judged);
        if subject.excluded > 0 {
            info!(
                "{}: {} rows excluded from statistics",
                subject.name, subject.excluded
            );
        }

        if exam.language() == Some(Language::Irish) {
            let responses_path =
                respond::responses_path(responses_dir, &exam.dataset_key(), student_model);
            if responses_path.exists() {
                let responses: Vec<ResponseRow> = read_rows(&responses_path)?;
                fidelity.accumulate_responses(responses.iter().map(|r| r.response.as_str()));
            } else {
                fidelity.accumulate_responses(judged.iter().map(|r| r.response.as_str()));
            }
            fidelity.accumulate_verdict_split(&judged);
        }
        subjects.push(subject);
    }

    let english_score = language_mean(&subjects, Language::English);
    let irish_score = language_mean(&subjects, Language::Irish);

    Ok(AnalysisReport {
        subjects,
        english_score,
        irish_score,
        fidelity,
    })
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    subject: &'a str,
    display_name: &'a str,
    language: &'a str,
    graded_items: usize,
    excluded_items: usize,
    score_percent: String,
    mean_confidence_percent: String,
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

/// Write the per-subject summary table.
pub fn write_summary(report: &AnalysisReport, output_dir: &Path, model: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create {}", output_dir.display()))?;
    let path = output_dir.join(format!(
        "{}_summary.csv",
        crate::records::file_safe_model(model)
    ));

    let rows: Vec<SummaryRow> = report
        .subjects
        .iter()
        .map(|s| SummaryRow {
            subject: &s.name,
            display_name: &s.display_name,
            language: match s.language {
                Some(Language::English) => "English",
                Some(Language::Irish) => "Irish",
                None => "",
            },
            graded_items: s.correct.len(),
            excluded_items: s.excluded,
            score_percent: fmt_opt(s.score()),
            mean_confidence_percent: fmt_opt(s.mean_confidence()),
        })
        .collect();

    crate::records::write_rows(&path, &rows)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn judged_row(correct: &str) -> JudgementRow {
        JudgementRow {
            problem: "Q".to_string(),
            answer: "A".to_string(),
            response: "Answer: 4\nConfidence: 80%".to_string(),
            judgement: format!(
                r#"{{"extracted_final_answer": "4", "reasoning": "r", "correct": "{}", "confidence": "80%"}}"#,
                correct
            ),
            ..Default::default()
        }
    }

    fn malformed_row() -> JudgementRow {
        JudgementRow {
            judgement: "Error: Failed to get judgement".to_string(),
            response: "Answer: 7".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn malformed_rows_do_not_shift_the_denominator() {
        let rows = vec![
            judged_row("yes"),
            judged_row("no"),
            judged_row("yes"),
            malformed_row(),
        ];
        let (correct, _, excluded) = collect_verdicts(&rows);
        assert_eq!(correct.len(), 3);
        assert_eq!(excluded, 1);

        let subject = SubjectResult {
            name: "LC022ALP000EV".to_string(),
            display_name: "Physics (English)".to_string(),
            language: Some(Language::English),
            correct,
            confidences: vec![],
            excluded,
        };
        let score = subject.score().unwrap();
        assert!((score - 66.666).abs() < 0.01, "got {}", score);
    }

    #[test]
    fn subject_folds_once_from_loaded_rows() {
        let exam = ExamSpec {
            name: "LC022ALP000IV".to_string(),
            marking_scheme: "LC022ALP000IV_ms".to_string(),
            display_name: "Physics (Irish)".to_string(),
            sections: vec![],
        };
        let rows = vec![judged_row("yes"), judged_row("no"), malformed_row()];

        let subject = subject_from_rows(&exam, &rows);
        assert_eq!(subject.language, Some(Language::Irish));
        assert_eq!(subject.correct.len(), 2);
        assert_eq!(subject.excluded, 1);
        assert_eq!(subject.score(), Some(50.0));

        // The file-backed loader must agree with the in-memory fold.
        let dir = tempfile::tempdir().unwrap();
        let path = judgements_path(dir.path(), &exam.dataset_key(), "student", "judge");
        crate::records::write_rows(&path, &rows).unwrap();
        let loaded = load_subject_result(dir.path(), &exam, "student", "judge").unwrap();
        assert_eq!(loaded.score(), subject.score());
        assert_eq!(loaded.excluded, subject.excluded);
    }

    #[test]
    fn language_score_is_unweighted_across_subjects() {
        // 80% over 10 items and 20% over 2 items average to 50%, not the
        // pooled 70%.
        assert_eq!(unweighted_mean(&[80.0, 20.0]), Some(50.0));
        assert_eq!(unweighted_mean(&[]), None);
    }

    #[test]
    fn confidences_come_from_decodable_verdicts_only() {
        let rows = vec![judged_row("yes"), malformed_row()];
        let (_, confidences, _) = collect_verdicts(&rows);
        assert_eq!(confidences, vec![80.0]);
    }

    #[test]
    fn fidelity_counts_language_independently_of_verdict() {
        let mut irish_correct = judged_row("yes");
        irish_correct.response = "Tá an freagra agam agus tá sé ceart.".to_string();
        let mut english_wrong = judged_row("no");
        english_wrong.response = "The answer is wrong but it is in English.".to_string();
        let mut irish_unjudged = malformed_row();
        irish_unjudged.response = "Níl mé cinnte ach seo é an freagra.".to_string();

        let rows = vec![irish_correct, english_wrong, irish_unjudged];
        let mut fidelity = IrishFidelity::default();
        fidelity.accumulate_responses(rows.iter().map(|r| r.response.as_str()));
        fidelity.accumulate_verdict_split(&rows);

        assert_eq!(fidelity.total_responses, 3);
        assert_eq!(fidelity.irish_responses, 2);
        assert_eq!(fidelity.correct_total, 1);
        assert_eq!(fidelity.correct_irish, 1);
        assert_eq!(fidelity.incorrect_total, 1);
        assert_eq!(fidelity.incorrect_irish, 0);
        assert_eq!(fidelity.correct_pct(), Some(100.0));
    }
}
