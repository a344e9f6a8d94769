// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn urgent_outranks_everything() {
    assert!(Priority::Urgent > Priority::High);
    assert!(Priority::High > Priority::Normal);
    assert!(Priority::Normal > Priority::Low);
}

#[test]
fn default_is_normal() {
    assert_eq!(Priority::default(), Priority::Normal);
}

#[yare::parameterized(
    low = { Priority::Low, "low" },
    normal = { Priority::Normal, "normal" },
    high = { Priority::High, "high" },
    urgent = { Priority::Urgent, "urgent" },
)]
fn display_matches_expected(priority: Priority, expected: &str) {
    assert_eq!(priority.to_string(), expected);
}

#[test]
fn serde_roundtrips() {
    for p in [Priority::Low, Priority::Normal, Priority::High, Priority::Urgent] {
        let json = serde_json::to_string(&p).unwrap();
        let parsed: Priority = serde_json::from_str(&json).unwrap();
        assert_eq!(p, parsed);
    }
}
