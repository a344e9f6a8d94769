// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn io_error_converts() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: CairnError = io_err.into();
    assert!(matches!(err, CairnError::Io(_)));
}

#[yare::parameterized(
    timeout = { CairnError::timeout("deadline"), true },
    io = { CairnError::Io("disk full".into()), true },
    not_found = { CairnError::not_found("x"), false },
    invalid = { CairnError::invalid("x"), false },
)]
fn retryability_matches_category(err: CairnError, expected: bool) {
    assert_eq!(err.is_retryable(), expected);
}

#[test]
fn display_includes_detail() {
    let err = CairnError::invalid("changed_files must be an array");
    assert!(err.to_string().contains("changed_files must be an array"));
}
