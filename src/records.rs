//! Row types for the CSV interchange files and the judge verdict format.
//!
//! The response and judgement stages share one row shape; the judgement
//! stage adds a column. Image cells are stored as a JSON object with a
//! `bytes` key holding base64 data, so a row stays a flat string record
//! that any CSV reader can pass through untouched.

use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Sentinel written to the `response` column when all attempts fail.
pub const RESPONSE_FAILURE_SENTINEL: &str = "Error: Failed to get response";
/// Sentinel written to the `judgement` column when all attempts fail.
pub const JUDGEMENT_FAILURE_SENTINEL: &str = "Error: Failed to get judgement";

/// One extracted problem as published in the dataset, plus the student
/// model's answer once the response stage has filled it in.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ResponseRow {
    pub problem: String,
    pub answer: String,
    #[serde(default)]
    pub problem_image_1: Option<String>,
    #[serde(default)]
    pub problem_image_2: Option<String>,
    #[serde(default)]
    pub answer_image_1: Option<String>,
    #[serde(default)]
    pub response: String,
}

impl ResponseRow {
    /// Decoded problem images, in column order. Empty cells are skipped.
    pub fn problem_images(&self) -> Vec<Vec<u8>> {
        [&self.problem_image_1, &self.problem_image_2]
            .into_iter()
            .flatten()
            .filter_map(|cell| decode_image_cell(cell))
            .collect()
    }
}

/// A response row with the judge's verdict appended.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct JudgementRow {
    pub problem: String,
    pub answer: String,
    #[serde(default)]
    pub problem_image_1: Option<String>,
    #[serde(default)]
    pub problem_image_2: Option<String>,
    #[serde(default)]
    pub answer_image_1: Option<String>,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub judgement: String,
}

impl From<ResponseRow> for JudgementRow {
    fn from(row: ResponseRow) -> Self {
        Self {
            problem: row.problem,
            answer: row.answer,
            problem_image_1: row.problem_image_1,
            problem_image_2: row.problem_image_2,
            answer_image_1: row.answer_image_1,
            response: row.response,
            judgement: String::new(),
        }
    }
}

impl JudgementRow {
    pub fn images(&self) -> Vec<Vec<u8>> {
        [&self.problem_image_1, &self.problem_image_2, &self.answer_image_1]
            .into_iter()
            .flatten()
            .filter_map(|cell| decode_image_cell(cell))
            .collect()
    }
}

#[derive(Deserialize, Serialize)]
struct ImageCell {
    bytes: String,
}

/// Encode raw image bytes into the `{"bytes": "<base64>"}` cell format.
pub fn encode_image_cell(data: &[u8]) -> String {
    serde_json::to_string(&ImageCell {
        bytes: BASE64.encode(data),
    })
    .unwrap_or_default()
}

/// Decode an image cell. Returns `None` for empty or malformed cells; a
/// bad cell means "no image", not an abort.
pub fn decode_image_cell(cell: &str) -> Option<Vec<u8>> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    let parsed: ImageCell = serde_json::from_str(cell).ok()?;
    BASE64.decode(parsed.bytes.trim()).ok()
}

/// Structured verdict the judge model is asked to emit.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Verdict {
    pub extracted_final_answer: String,
    pub reasoning: String,
    pub correct: String,
    pub confidence: String,
}

impl Verdict {
    /// Tolerant decode of the verdict stored in a judgement cell.
    ///
    /// Judge models wrap JSON in code fences or prose often enough that a
    /// strict parse would throw away good rows; we cut out the outermost
    /// `{...}` before decoding. Failure is a first-class `None`, not an
    /// error: the aggregation excludes such rows from its denominator.
    pub fn parse(raw: &str) -> Option<Verdict> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(verdict) = serde_json::from_str::<Verdict>(raw) {
            return Some(verdict);
        }
        let start = raw.find('{')?;
        let end = raw.rfind('}')?;
        if end <= start {
            return None;
        }
        serde_json::from_str(&raw[start..=end]).ok()
    }

    /// `Some(true)` for a literal `yes`, `Some(false)` for `no`, `None`
    /// for anything else.
    pub fn is_correct(&self) -> Option<bool> {
        match self.correct.trim().to_ascii_lowercase().as_str() {
            "yes" => Some(true),
            "no" => Some(false),
            _ => None,
        }
    }

    /// Confidence as a percentage, if one can be extracted.
    pub fn confidence_percent(&self) -> Option<f64> {
        parse_confidence(&self.confidence)
    }
}

static CONFIDENCE_RE: OnceLock<Regex> = OnceLock::new();

/// Pull a percentage out of free text: `"85%"`, `"85 %"` and
/// `"Confidence: 85%"` all parse to `85.0`.
pub fn parse_confidence(raw: &str) -> Option<f64> {
    let re = CONFIDENCE_RE.get_or_init(|| {
        Regex::new(r"(\d+(?:\.\d+)?)").expect("confidence pattern is valid")
    });
    re.captures(raw)?.get(1)?.as_str().parse().ok()
}

/// Model identifiers may contain `/` (hub-style names); flatten them for
/// use in file names.
pub fn file_safe_model(model: &str) -> String {
    model.replace('/', "--")
}

/// Read all rows of a CSV file.
pub fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record.with_context(|| format!("bad row in {}", path.display()))?);
    }
    Ok(rows)
}

/// Write all rows to a CSV file, replacing any previous content. A rerun
/// reprocesses everything; there are no merge/append semantics.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot write {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_cell_round_trip() {
        let data = vec![0x89u8, b'P', b'N', b'G', 0, 1, 2, 3];
        let cell = encode_image_cell(&data);
        assert!(cell.contains("\"bytes\""));
        assert_eq!(decode_image_cell(&cell), Some(data));
    }

    #[test]
    fn malformed_image_cell_is_none() {
        assert_eq!(decode_image_cell(""), None);
        assert_eq!(decode_image_cell("not json"), None);
        assert_eq!(decode_image_cell("{\"bytes\": \"???\"}"), None);
    }

    #[test]
    fn verdict_parses_plain_json() {
        let v = Verdict::parse(
            r#"{"extracted_final_answer": "4", "reasoning": "matches", "correct": "yes", "confidence": "90%"}"#,
        )
        .unwrap();
        assert_eq!(v.is_correct(), Some(true));
        assert_eq!(v.confidence_percent(), Some(90.0));
    }

    #[test]
    fn verdict_parses_fenced_json() {
        let raw = "```json\n{\"extracted_final_answer\": \"x\", \"reasoning\": \"r\", \"correct\": \"no\", \"confidence\": \"70\"}\n```";
        let v = Verdict::parse(raw).unwrap();
        assert_eq!(v.is_correct(), Some(false));
    }

    #[test]
    fn sentinel_and_garbage_fail_to_parse() {
        assert!(Verdict::parse(JUDGEMENT_FAILURE_SENTINEL).is_none());
        assert!(Verdict::parse("").is_none());
        assert!(Verdict::parse("Skipped: model does not support image files").is_none());
    }

    #[test]
    fn non_yes_no_correct_is_indeterminate() {
        let v = Verdict::parse(
            r#"{"extracted_final_answer": "x", "reasoning": "r", "correct": "maybe", "confidence": "50"}"#,
        )
        .unwrap();
        assert_eq!(v.is_correct(), None);
    }

    #[test]
    fn confidence_tolerates_percent_and_prose() {
        assert_eq!(parse_confidence("85%"), Some(85.0));
        assert_eq!(parse_confidence("85 %"), Some(85.0));
        assert_eq!(parse_confidence("  Confidence: 85%  "), Some(85.0));
        assert_eq!(parse_confidence("92.5"), Some(92.5));
        assert_eq!(parse_confidence("none"), None);
    }

    #[test]
    fn file_safe_model_flattens_hub_names() {
        assert_eq!(
            file_safe_model("meta-llama/Llama-4-Scout-17B-Instruct"),
            "meta-llama--Llama-4-Scout-17B-Instruct"
        );
        assert_eq!(file_safe_model("gpt-4.1"), "gpt-4.1");
    }
}
