//! Pre-publication integrity checks for stored puzzle records.
//!
//! Every check runs independently so a record reports all of its problems at
//! once. Records never influence each other.

use crate::dates::{eastern_date, format_date_key, is_eastern_midnight, parse_date_key};
use crate::feedback::SLOTS;
use crate::info_log;
use crate::puzzle::{POOL_SIZE, PuzzleRecord};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// One failed check on one field of one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub issue: String,
    pub expected: String,
    pub actual: String,
}

impl Violation {
    fn new(field: &'static str, issue: &str, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            field,
            issue: issue.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.issue)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordReport {
    pub id: String,
    pub violations: Vec<Violation>,
}

impl RecordReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations_for(&self, field: &str) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.field == field)
    }
}

/// Per-record results for a whole batch, sorted by record id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub records: Vec<RecordReport>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn valid_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_valid()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.total() - self.valid_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecordReport> {
        self.records.iter().filter(|r| !r.is_valid())
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn get(&self, id: &str) -> Option<&RecordReport> {
        self.records.iter().find(|r| r.id == id)
    }
}

pub fn validate_batch<I>(records: I) -> BatchReport
where
    I: IntoIterator<Item = PuzzleRecord>,
{
    let mut reports: Vec<RecordReport> = records.into_iter().map(|r| validate_record(&r)).collect();
    reports.sort_by(|a, b| a.id.cmp(&b.id));
    let batch = BatchReport { records: reports };
    info_log!(
        "validate_batch() - {} records, {} failed",
        batch.total(),
        batch.failed_count()
    );
    batch
}

pub fn validate_record(record: &PuzzleRecord) -> RecordReport {
    let mut violations = Vec::new();
    let id_date = check_id(&record.id, &mut violations);
    check_publish_instant(record.field("publishInstant"), id_date, &record.id, &mut violations);
    check_question(record.field("question"), &mut violations);
    check_source(record.field("source"), &mut violations);
    check_source_date(record.field("sourceDate"), &mut violations);

    let possible = record.field("possibleAnswers");
    check_item_list("possibleAnswers", possible, POOL_SIZE, &mut violations);
    let correct = record.field("correctAnswers");
    check_item_list("correctAnswers", correct, SLOTS, &mut violations);
    if let (Some(Value::Array(possible)), Some(Value::Array(correct))) = (possible, correct) {
        check_subset(possible, correct, &mut violations);
    }

    RecordReport {
        id: record.id.clone(),
        violations,
    }
}

fn type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "missing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

fn require_string<'a>(
    field: &'static str,
    value: Option<&'a Value>,
    out: &mut Vec<Violation>,
) -> Option<&'a str> {
    match value {
        Some(Value::String(s)) => Some(s),
        other => {
            out.push(Violation::new(field, "Must be a string", "string", type_name(other)));
            None
        }
    }
}

fn check_id(id: &str, out: &mut Vec<Violation>) -> Option<NaiveDate> {
    let date = parse_date_key(id);
    if date.is_none() {
        out.push(Violation::new("id", "Must follow YYYY-MM-DD format", "YYYY-MM-DD", id));
    }
    date
}

fn check_publish_instant(
    value: Option<&Value>,
    id_date: Option<NaiveDate>,
    id: &str,
    out: &mut Vec<Violation>,
) {
    let instant = match value {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        _ => None,
    };
    let Some(instant) = instant else {
        let actual = match value {
            Some(Value::String(s)) => s.clone(),
            other => type_name(other).to_string(),
        };
        out.push(Violation::new(
            "publishInstant",
            "Must be a timestamp",
            "RFC 3339 timestamp",
            actual,
        ));
        return;
    };
    // Without a usable id there is no date to compare against.
    let Some(date) = id_date else {
        return;
    };
    if !is_eastern_midnight(instant, date) {
        out.push(Violation::new(
            "publishInstant",
            "Timestamp must be midnight Eastern Time for the date in ID",
            format!("{id} 00:00:00 ET"),
            format!(
                "{} (or not midnight)",
                format_date_key(eastern_date(instant))
            ),
        ));
    }
}

fn check_question(value: Option<&Value>, out: &mut Vec<Violation>) {
    let Some(question) = require_string("question", value, out) else {
        return;
    };
    if !question.ends_with('?') {
        let last = question.chars().last().map(String::from).unwrap_or_default();
        out.push(Violation::new(
            "question",
            "Must end with a question mark",
            "ends with ?",
            format!("ends with '{last}'"),
        ));
    }
    if !question.contains('5') {
        out.push(Violation::new(
            "question",
            "Must contain the number 5",
            "contains \"5\"",
            "does not contain \"5\"",
        ));
    }
}

fn check_source(value: Option<&Value>, out: &mut Vec<Violation>) {
    let Some(source) = require_string("source", value, out) else {
        return;
    };
    if Url::parse(source).is_err() {
        out.push(Violation::new("source", "Must be a valid URL", "valid URL", source));
    }
}

fn check_source_date(value: Option<&Value>, out: &mut Vec<Violation>) {
    let Some(source_date) = require_string("sourceDate", value, out) else {
        return;
    };
    if parse_date_key(source_date).is_none() {
        out.push(Violation::new(
            "sourceDate",
            "Must follow YYYY-MM-DD format",
            "YYYY-MM-DD",
            source_date,
        ));
    }
}

/// Count, element type and uniqueness checks shared by both answer lists.
fn check_item_list(field: &'static str, value: Option<&Value>, expected: usize, out: &mut Vec<Violation>) {
    let items = match value {
        Some(Value::Array(items)) => items,
        other => {
            out.push(Violation::new(field, "Must be an array", "array", type_name(other)));
            return;
        }
    };

    if items.len() != expected {
        out.push(Violation::new(
            field,
            &format!("Must have exactly {expected} items"),
            format!("{expected} items"),
            format!("{} items", items.len()),
        ));
    }

    let non_strings = items.iter().filter(|v| !v.is_string()).count();
    if non_strings > 0 {
        out.push(Violation::new(
            field,
            "All items must be strings",
            "all strings",
            format!("{non_strings} non-string items"),
        ));
    }

    // JSON text keeps "5" and 5 apart
    let unique: HashSet<String> = items.iter().map(Value::to_string).collect();
    if unique.len() != items.len() {
        out.push(Violation::new(
            field,
            "All items must be unique",
            format!("{expected} unique items"),
            format!("{} unique items", unique.len()),
        ));
    }
}

fn check_subset(possible: &[Value], correct: &[Value], out: &mut Vec<Violation>) {
    let missing: Vec<String> = correct
        .iter()
        .filter(|answer| !possible.contains(answer))
        .map(|answer| match answer {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    if !missing.is_empty() {
        out.push(Violation::new(
            "correctAnswers",
            "All items must exist in possibleAnswers",
            "all in possibleAnswers",
            format!("missing: [{}]", missing.join(", ")),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::tests::{sample_fields, sample_record};
    use serde_json::json;

    fn record_with(field: &str, value: Value) -> PuzzleRecord {
        let mut fields = sample_fields();
        fields.insert(field.to_string(), value);
        PuzzleRecord::new("2025-01-15", fields)
    }

    fn issues(report: &RecordReport, field: &str) -> Vec<String> {
        report.violations_for(field).map(|v| v.issue.clone()).collect()
    }

    #[test]
    fn test_valid_record() {
        let report = validate_record(&sample_record());
        assert!(report.is_valid(), "{:?}", report.violations);
    }

    #[test]
    fn test_id_format() {
        for bad in ["2025-1-15", "2025-02-30", "today", "2025/01/15"] {
            let record = PuzzleRecord::new(bad, sample_fields());
            let report = validate_record(&record);
            assert_eq!(issues(&report, "id"), vec!["Must follow YYYY-MM-DD format"]);
            // publishInstant has nothing to compare against
            assert_eq!(report.violations_for("publishInstant").count(), 0);
        }
    }

    #[test]
    fn test_publish_instant_not_midnight() {
        let report = validate_record(&record_with("publishInstant", json!("2025-01-15T00:00:00Z")));
        let v: Vec<&Violation> = report.violations_for("publishInstant").collect();
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].expected, "2025-01-15 00:00:00 ET");
        assert_eq!(v[0].actual, "2025-01-14 (or not midnight)");
    }

    #[test]
    fn test_publish_instant_wrong_day() {
        let report = validate_record(&record_with("publishInstant", json!("2025-01-16T05:00:00Z")));
        assert_eq!(report.violations_for("publishInstant").count(), 1);
    }

    #[test]
    fn test_publish_instant_with_offset() {
        let report = validate_record(&record_with(
            "publishInstant",
            json!("2025-01-15T00:00:00-05:00"),
        ));
        assert!(report.is_valid(), "{:?}", report.violations);
    }

    #[test]
    fn test_publish_instant_not_a_timestamp() {
        let report = validate_record(&record_with("publishInstant", json!(1736917200)));
        assert_eq!(issues(&report, "publishInstant"), vec!["Must be a timestamp"]);

        let mut fields = sample_fields();
        fields.remove("publishInstant");
        let report = validate_record(&PuzzleRecord::new("2025-01-15", fields));
        let v: Vec<&Violation> = report.violations_for("publishInstant").collect();
        assert_eq!(v[0].actual, "missing");
    }

    #[test]
    fn test_question_checks_are_independent() {
        let report = validate_record(&record_with("question", json!("Name the best teams.")));
        assert_eq!(
            issues(&report, "question"),
            vec!["Must end with a question mark", "Must contain the number 5"]
        );

        let report = validate_record(&record_with("question", json!("Top 5 teams")));
        assert_eq!(issues(&report, "question"), vec!["Must end with a question mark"]);

        let report = validate_record(&record_with("question", json!(5)));
        assert_eq!(issues(&report, "question"), vec!["Must be a string"]);
    }

    #[test]
    fn test_source_url() {
        let report = validate_record(&record_with("source", json!("not a url")));
        assert_eq!(issues(&report, "source"), vec!["Must be a valid URL"]);
        let report = validate_record(&record_with("source", json!("mailto:someone@example.com")));
        assert!(report.is_valid());
    }

    #[test]
    fn test_source_date() {
        let report = validate_record(&record_with("sourceDate", json!("Jan 10")));
        assert_eq!(issues(&report, "sourceDate"), vec!["Must follow YYYY-MM-DD format"]);
        let report = validate_record(&record_with("sourceDate", Value::Null));
        assert_eq!(issues(&report, "sourceDate"), vec!["Must be a string"]);
    }

    #[test]
    fn test_pool_short_with_duplicate() {
        let mut pool: Vec<String> = ('A'..='R').map(|c| c.to_string()).collect();
        pool.push("A".to_string());
        assert_eq!(pool.len(), 19);
        let report = validate_record(&record_with("possibleAnswers", json!(pool)));
        assert!(!report.is_valid());
        let v: Vec<&Violation> = report.violations_for("possibleAnswers").collect();
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].issue, "Must have exactly 20 items");
        assert_eq!(v[0].actual, "19 items");
        assert_eq!(v[1].issue, "All items must be unique");
        assert_eq!(v[1].actual, "18 unique items");
    }

    #[test]
    fn test_pool_non_strings() {
        let mut pool: Vec<Value> = ('A'..='S').map(|c| json!(c.to_string())).collect();
        pool.push(json!(7));
        let report = validate_record(&record_with("possibleAnswers", Value::Array(pool)));
        assert_eq!(issues(&report, "possibleAnswers"), vec!["All items must be strings"]);
    }

    #[test]
    fn test_pool_not_array_skips_subset_check() {
        let report = validate_record(&record_with("possibleAnswers", json!("A,B,C")));
        assert_eq!(issues(&report, "possibleAnswers"), vec!["Must be an array"]);
        assert_eq!(report.violations_for("correctAnswers").count(), 0);
    }

    #[test]
    fn test_correct_answers_checks() {
        let report = validate_record(&record_with("correctAnswers", json!(["A", "B", "B", "Y", "Z", "C"])));
        assert_eq!(
            issues(&report, "correctAnswers"),
            vec![
                "Must have exactly 5 items",
                "All items must be unique",
                "All items must exist in possibleAnswers",
            ]
        );
        let last = report.violations_for("correctAnswers").last().unwrap();
        assert_eq!(last.actual, "missing: [Y, Z]");
    }

    #[test]
    fn test_every_violation_reported() {
        let fields = match json!({
            "publishInstant": "yesterday",
            "question": "Best teams",
            "source": "nope",
            "sourceDate": "2025-13-01",
            "possibleAnswers": ["A"],
            "correctAnswers": ["B"],
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let report = validate_record(&PuzzleRecord::new("2025-01-15", fields));
        let fields: HashSet<&str> = report.violations.iter().map(|v| v.field).collect();
        for field in [
            "publishInstant",
            "question",
            "source",
            "sourceDate",
            "possibleAnswers",
            "correctAnswers",
        ] {
            assert!(fields.contains(field), "no violation for {field}");
        }
        assert_eq!(report.violations.len(), 8);
    }

    #[test]
    fn test_batch_sorted_and_independent() {
        let mut short_pool: Vec<String> = ('A'..='R').map(|c| c.to_string()).collect();
        short_pool.push("A".to_string());
        let mut bad_fields = sample_fields();
        bad_fields.insert("possibleAnswers".to_string(), json!(short_pool));

        let mut later = sample_fields();
        later.insert("publishInstant".to_string(), json!("2025-01-16T05:00:00Z"));

        let batch = validate_batch(vec![
            PuzzleRecord::new("2025-01-16", later),
            PuzzleRecord::new("2025-01-14", bad_fields),
            PuzzleRecord::new("2025-01-15", sample_fields()),
        ]);

        let ids: Vec<&str> = batch.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2025-01-14", "2025-01-15", "2025-01-16"]);
        assert_eq!(batch.total(), 3);
        assert_eq!(batch.valid_count(), 2);
        assert_eq!(batch.failed_count(), 1);
        assert!(!batch.is_success());

        let bad = batch.get("2025-01-14").unwrap();
        assert_eq!(bad.violations_for("possibleAnswers").count(), 2);
        // sample fields carry the 15th's publish instant
        assert_eq!(bad.violations_for("publishInstant").count(), 1);
        assert!(batch.get("2025-01-15").unwrap().is_valid());
        assert!(batch.get("2025-01-16").unwrap().is_valid());
    }

    #[test]
    fn test_empty_batch_succeeds() {
        let batch = validate_batch(Vec::new());
        assert!(batch.is_success());
        assert_eq!(batch.total(), 0);
    }
}
