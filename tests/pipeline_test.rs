use irlbench::catalog::ExamCatalog;
use irlbench::records::{
    decode_image_cell, encode_image_cell, read_rows, write_rows, ResponseRow,
};
use std::path::Path;

#[test]
fn shipped_catalog_loads_and_validates() {
    let catalog = ExamCatalog::load(Path::new("exams.toml")).expect("catalog must be valid");
    assert!(!catalog.exams.is_empty());

    // Every exam appears in both languages.
    for exam in &catalog.exams {
        assert!(
            exam.language().is_some(),
            "exam {} has no language suffix",
            exam.name
        );
        assert!(!exam.sections.is_empty());
    }
}

#[test]
fn response_rows_survive_a_csv_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("rows.csv");

    let rows = vec![
        ResponseRow {
            problem: "What is 2 + 2, given the diagram?".to_string(),
            answer: "4".to_string(),
            problem_image_1: Some(encode_image_cell(&[1, 2, 3, 4])),
            response: "Answer: 4\nConfidence: 95%".to_string(),
            ..Default::default()
        },
        ResponseRow {
            problem: "Name the capital of Ireland.".to_string(),
            answer: "Dublin".to_string(),
            response: String::new(),
            ..Default::default()
        },
    ];

    write_rows(&path, &rows).expect("write");
    let loaded: Vec<ResponseRow> = read_rows(&path).expect("read");

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].problem, rows[0].problem);
    assert_eq!(
        decode_image_cell(loaded[0].problem_image_1.as_deref().unwrap()),
        Some(vec![1, 2, 3, 4])
    );
    assert!(loaded[1].problem_image_1.is_none());
}

#[test]
fn rerun_overwrites_instead_of_appending() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("responses.csv");

    let first_run: Vec<ResponseRow> = (0..5)
        .map(|i| ResponseRow {
            problem: format!("problem {}", i),
            answer: "x".to_string(),
            response: "stale".to_string(),
            ..Default::default()
        })
        .collect();
    write_rows(&path, &first_run).expect("first write");

    // A rerun reprocesses the current dataset, which now has fewer rows.
    let second_run: Vec<ResponseRow> = (0..3)
        .map(|i| ResponseRow {
            problem: format!("problem {}", i),
            answer: "x".to_string(),
            response: "fresh".to_string(),
            ..Default::default()
        })
        .collect();
    write_rows(&path, &second_run).expect("second write");

    let loaded: Vec<ResponseRow> = read_rows(&path).expect("read");
    assert_eq!(loaded.len(), 3, "row count must match the rerun, not the sum");
    assert!(loaded.iter().all(|r| r.response == "fresh"));
}
