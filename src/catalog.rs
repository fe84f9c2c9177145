//! Exam catalog: which exams to process, and how their scanned pages pair
//! up with the marking-scheme pages.
//!
//! The catalog is a TOML file loaded once per run and validated before any
//! network call. Each section carries both its exam page range and its
//! marking-scheme page range, so a source section can never be left
//! without a scheme counterpart.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::CatalogError;

/// Exam language, derived from the identifier suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    English,
    Irish,
}

impl Language {
    pub fn of_exam(name: &str) -> Option<Language> {
        if name.ends_with("EV") {
            Some(Language::English)
        } else if name.ends_with("IV") {
            Some(Language::Irish)
        } else {
            None
        }
    }
}

/// Half-open page interval `[start, end)`.
///
/// Sections may deliberately skip pages (covers, blanks, formula sheets);
/// gaps between sections are expected, not an error.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(from = "[u32; 2]")]
pub struct ImageRange {
    pub start: u32,
    pub end: u32,
}

impl From<[u32; 2]> for ImageRange {
    fn from([start, end]: [u32; 2]) -> Self {
        Self { start, end }
    }
}

impl ImageRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.start..self.end
    }
}

/// One exam section: its question pages and the scheme pages that grade it.
#[derive(Clone, Debug, Deserialize)]
pub struct SectionRanges {
    pub pages: ImageRange,
    pub scheme_pages: ImageRange,
}

/// One exam paper plus its marking scheme.
#[derive(Clone, Debug, Deserialize)]
pub struct ExamSpec {
    /// Exam identifier, e.g. `LC034ALP000EV`.
    pub name: String,
    /// Identifier of the marking-scheme scan, e.g. `LC034ALP000EV_ms`.
    pub marking_scheme: String,
    /// Human-readable subject name used in the analysis summary.
    pub display_name: String,
    pub sections: Vec<SectionRanges>,
}

/// Page images for one section, ready to submit in a single model call.
/// Source pages come first, then the scheme pages, so the model can
/// cross-reference question numbers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileGroup {
    pub source_files: Vec<PathBuf>,
    pub scheme_files: Vec<PathBuf>,
}

impl FileGroup {
    pub fn all_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.source_files.iter().chain(self.scheme_files.iter())
    }
}

/// Expand a page number into its scan filename. Page numbers stay below
/// 100, zero-padded to width 2 behind the `page-00` stem.
pub fn page_file(images_dir: &Path, exam: &str, page: u32) -> PathBuf {
    images_dir
        .join(exam)
        .join(format!("{}_page-00{:02}.jpg", exam, page))
}

fn expand_range(images_dir: &Path, exam: &str, range: ImageRange) -> Vec<PathBuf> {
    range.pages().map(|p| page_file(images_dir, exam, p)).collect()
}

impl ExamSpec {
    /// Dataset key for this exam's extracted-problem split.
    pub fn dataset_key(&self) -> String {
        format!("{}_problems", self.name)
    }

    pub fn language(&self) -> Option<Language> {
        Language::of_exam(&self.name)
    }

    /// Resolve each section into its pair of file lists.
    pub fn file_groups(&self, images_dir: &Path) -> Vec<FileGroup> {
        self.sections
            .iter()
            .map(|section| FileGroup {
                source_files: expand_range(images_dir, &self.name, section.pages),
                scheme_files: expand_range(images_dir, &self.marking_scheme, section.scheme_pages),
            })
            .collect()
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.sections.is_empty() {
            return Err(CatalogError::NoSections {
                exam: self.name.clone(),
            });
        }
        for (i, section) in self.sections.iter().enumerate() {
            for range in [section.pages, section.scheme_pages] {
                if !range.is_valid() {
                    return Err(CatalogError::InvalidRange {
                        exam: self.name.clone(),
                        section: i,
                        start: range.start,
                        end: range.end,
                    });
                }
            }
        }
        Ok(())
    }
}

/// The full set of exams for a benchmark run.
#[derive(Clone, Debug, Deserialize)]
pub struct ExamCatalog {
    #[serde(rename = "exam")]
    pub exams: Vec<ExamSpec>,
}

impl ExamCatalog {
    /// Load and validate a catalog file. Any invalid range is rejected
    /// here, before a single image is read or uploaded.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read exam catalog: {}", path.display()))?;
        let catalog: ExamCatalog = toml::from_str(&content)
            .with_context(|| format!("cannot parse exam catalog: {}", path.display()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = std::collections::HashSet::new();
        for exam in &self.exams {
            if !seen.insert(exam.name.as_str()) {
                return Err(CatalogError::DuplicateExam {
                    exam: exam.name.clone(),
                });
            }
            exam.validate()?;
        }
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&ExamSpec> {
        self.exams.iter().find(|e| e.name == name)
    }
}
