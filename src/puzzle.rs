use crate::feedback::SLOTS;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

/// Number of candidates offered to the player each day.
pub const POOL_SIZE: usize = 20;

/// A stored puzzle document: its key plus the raw fields as persisted.
///
/// Nothing about the fields is trusted here; the validator inspects them
/// as-is and [`Puzzle::from_record`] converts them for play.
#[derive(Clone, Debug, PartialEq)]
pub struct PuzzleRecord {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl PuzzleRecord {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Field lookup honouring legacy aliases.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).or_else(|| match name {
            "publishInstant" => self.fields.get("date"),
            _ => None,
        })
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PuzzleError {
    #[error("puzzle {id}: malformed fields: {message}")]
    Malformed { id: String, message: String },
    #[error("puzzle {id}: expected {expected} {field}, found {actual}")]
    WrongCount {
        id: String,
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("puzzle {id}: duplicate entries in {field}")]
    Duplicates { id: String, field: &'static str },
    #[error("puzzle {id}: answer '{answer}' is not in the pool")]
    AnswerNotInPool { id: String, answer: String },
}

/// The typed fields of a stored puzzle, before the answer-set checks.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredFields {
    question: String,
    source: String,
    source_date: String,
    possible_answers: Vec<String>,
    correct_answers: Vec<String>,
}

/// A puzzle ready to be played.
///
/// Only [`Puzzle::from_record`] builds one, so a pool of 20 distinct items
/// holding 5 distinct ranked answers is guaranteed.
#[derive(Clone, Debug, PartialEq)]
pub struct Puzzle {
    id: String,
    publish_instant: DateTime<Utc>,
    question: String,
    source: String,
    source_date: String,
    possible_answers: Vec<String>,
    correct_answers: Vec<String>,
}

impl Puzzle {
    /// Converts a stored record, rejecting any whose answer sets could not be
    /// played: the pool must hold 20 distinct items and the answer 5 distinct
    /// members of the pool.
    pub fn from_record(record: &PuzzleRecord) -> Result<Self, PuzzleError> {
        let malformed = |message: String| PuzzleError::Malformed {
            id: record.id.clone(),
            message,
        };
        let stored: StoredFields = serde_json::from_value(Value::Object(record.fields.clone()))
            .map_err(|e| malformed(e.to_string()))?;
        let publish_instant = match record.field("publishInstant") {
            Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| malformed(format!("publishInstant: {e}")))?,
            _ => return Err(malformed("publishInstant: expected a timestamp".to_string())),
        };

        let puzzle = Puzzle {
            id: record.id.clone(),
            publish_instant,
            question: stored.question,
            source: stored.source,
            source_date: stored.source_date,
            possible_answers: stored.possible_answers,
            correct_answers: stored.correct_answers,
        };
        puzzle.check_answer_sets()?;
        Ok(puzzle)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn publish_instant(&self) -> DateTime<Utc> {
        self.publish_instant
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn source_date(&self) -> &str {
        &self.source_date
    }

    /// The pool in display order.
    pub fn possible_answers(&self) -> &[String] {
        &self.possible_answers
    }

    /// Ranked answers, rank 1 first.
    pub fn correct_answers(&self) -> &[String] {
        &self.correct_answers
    }

    fn check_answer_sets(&self) -> Result<(), PuzzleError> {
        for (field, items, expected) in [
            ("possibleAnswers", &self.possible_answers, POOL_SIZE),
            ("correctAnswers", &self.correct_answers, SLOTS),
        ] {
            if items.len() != expected {
                return Err(PuzzleError::WrongCount {
                    id: self.id.clone(),
                    field,
                    expected,
                    actual: items.len(),
                });
            }
            let unique: HashSet<&String> = items.iter().collect();
            if unique.len() != items.len() {
                return Err(PuzzleError::Duplicates {
                    id: self.id.clone(),
                    field,
                });
            }
        }
        if let Some(answer) = self
            .correct_answers
            .iter()
            .find(|a| !self.possible_answers.contains(a))
        {
            return Err(PuzzleError::AnswerNotInPool {
                id: self.id.clone(),
                answer: answer.clone(),
            });
        }
        Ok(())
    }

    pub fn in_pool(&self, item: &str) -> bool {
        self.possible_answers.iter().any(|a| a == item)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn sample_fields() -> Map<String, Value> {
        let pool: Vec<String> = ('A'..='T').map(|c| c.to_string()).collect();
        let value = json!({
            "publishInstant": "2025-01-15T05:00:00Z",
            "question": "What are the top 5 letters?",
            "source": "https://example.com/letters",
            "sourceDate": "2025-01-10",
            "possibleAnswers": pool,
            "correctAnswers": ["A", "B", "C", "D", "E"],
        });
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    pub(crate) fn sample_record() -> PuzzleRecord {
        PuzzleRecord::new("2025-01-15", sample_fields())
    }

    #[test]
    fn test_from_record_valid() {
        let puzzle = Puzzle::from_record(&sample_record()).unwrap();
        assert_eq!(puzzle.id(), "2025-01-15");
        assert_eq!(puzzle.possible_answers().len(), POOL_SIZE);
        assert_eq!(puzzle.correct_answers(), ["A", "B", "C", "D", "E"]);
        assert_eq!(puzzle.source_date(), "2025-01-10");
        assert!(puzzle.in_pool("T"));
        assert!(!puzzle.in_pool("Z"));
    }

    #[test]
    fn test_from_record_accepts_legacy_date_field() {
        let mut fields = sample_fields();
        let instant = fields.remove("publishInstant").unwrap();
        fields.insert("date".to_string(), instant);
        let record = PuzzleRecord::new("2025-01-15", fields);
        assert!(record.field("publishInstant").is_some());
        assert!(Puzzle::from_record(&record).is_ok());
    }

    #[test]
    fn test_from_record_prefers_publish_instant_over_legacy_date() {
        let mut fields = sample_fields();
        fields.insert("date".to_string(), json!("1999-01-01T05:00:00Z"));
        let record = PuzzleRecord::new("2025-01-15", fields);
        assert!(crate::validator::validate_record(&record).is_valid());
        let puzzle = Puzzle::from_record(&record).unwrap();
        assert_eq!(
            puzzle.publish_instant(),
            DateTime::parse_from_rfc3339("2025-01-15T05:00:00Z").unwrap()
        );
    }

    #[test]
    fn test_from_record_rejects_non_timestamp_instant() {
        let mut fields = sample_fields();
        fields.insert("publishInstant".to_string(), json!(1736917200));
        let err = Puzzle::from_record(&PuzzleRecord::new("2025-01-15", fields)).unwrap_err();
        assert!(matches!(err, PuzzleError::Malformed { .. }));
    }

    #[test]
    fn test_from_record_four_answers_rejected() {
        let mut fields = sample_fields();
        fields.insert("correctAnswers".to_string(), json!(["A", "B", "C", "D"]));
        let err = Puzzle::from_record(&PuzzleRecord::new("2025-01-15", fields)).unwrap_err();
        assert_eq!(
            err,
            PuzzleError::WrongCount {
                id: "2025-01-15".to_string(),
                field: "correctAnswers",
                expected: SLOTS,
                actual: 4,
            }
        );
    }

    #[test]
    fn test_from_record_missing_field() {
        let mut fields = sample_fields();
        fields.remove("question");
        let err = Puzzle::from_record(&PuzzleRecord::new("2025-01-15", fields)).unwrap_err();
        assert!(matches!(err, PuzzleError::Malformed { .. }));
    }

    #[test]
    fn test_from_record_short_pool() {
        let mut fields = sample_fields();
        fields.insert(
            "possibleAnswers".to_string(),
            json!(["A", "B", "C", "D", "E", "F"]),
        );
        let err = Puzzle::from_record(&PuzzleRecord::new("2025-01-15", fields)).unwrap_err();
        assert_eq!(
            err,
            PuzzleError::WrongCount {
                id: "2025-01-15".to_string(),
                field: "possibleAnswers",
                expected: POOL_SIZE,
                actual: 6,
            }
        );
    }

    #[test]
    fn test_from_record_duplicate_answers() {
        let mut fields = sample_fields();
        fields.insert("correctAnswers".to_string(), json!(["A", "A", "C", "D", "E"]));
        let err = Puzzle::from_record(&PuzzleRecord::new("2025-01-15", fields)).unwrap_err();
        assert!(matches!(err, PuzzleError::Duplicates { field: "correctAnswers", .. }));
    }

    #[test]
    fn test_from_record_answer_outside_pool() {
        let mut fields = sample_fields();
        fields.insert("correctAnswers".to_string(), json!(["A", "B", "C", "D", "Z"]));
        let err = Puzzle::from_record(&PuzzleRecord::new("2025-01-15", fields)).unwrap_err();
        assert_eq!(
            err,
            PuzzleError::AnswerNotInPool {
                id: "2025-01-15".to_string(),
                answer: "Z".to_string(),
            }
        );
    }
}
