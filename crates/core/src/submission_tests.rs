// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn parses_well_formed_payload() {
    let bytes = br#"{"summary":"Subtitled","changed_files":["README.md"]}"#;
    let submission = Submission::parse(bytes).unwrap();
    assert_eq!(submission.summary, "Subtitled");
    assert_eq!(submission.changed_files, vec!["README.md".to_string()]);
}

#[yare::parameterized(
    not_an_object = { b"\"just a string\"" },
    missing_changed_files = { br#"{"summary":"ok"}"# },
    changed_files_not_array = { br#"{"summary":"ok","changed_files":"README.md"}"# },
    summary_not_string = { br#"{"summary":1,"changed_files":[]}"# },
    changed_files_contains_non_string = { br#"{"summary":"ok","changed_files":[1,2]}"# },
    empty_body = { b"" },
)]
fn rejects_malformed_payloads(bytes: &[u8]) {
    let err = Submission::parse(bytes).unwrap_err();
    assert!(matches!(err, crate::CairnError::Invalid(_)));
}

#[test]
fn round_trips_through_bytes() {
    let submission = Submission::new("removed", vec!["old.txt".to_string()]);
    let bytes = submission.to_bytes();
    let parsed = Submission::parse(&bytes).unwrap();
    assert_eq!(parsed, submission);
}

#[test]
fn empty_changed_files_is_valid() {
    let bytes = br#"{"summary":"no-op","changed_files":[]}"#;
    let submission = Submission::parse(bytes).unwrap();
    assert!(submission.changed_files.is_empty());
}
