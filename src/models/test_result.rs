// src/models/test_result.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

/// Represents the 'test_results' table: one completed, immutable attempt.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestResult {
    pub id: i64,
    pub user_id: i64,
    pub test_id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub date_taken: chrono::DateTime<chrono::Utc>,
    /// Per-question snapshot taken at submission time.
    pub answers_data: Json<Vec<AnswerRecord>>,
}

/// One graded question, as shown on the result page and stored in `answers_data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question: String,
    pub question_hindi: String,
    pub options: Vec<String>,
    pub options_hindi: Vec<String>,
    /// `None` when the question was left unanswered.
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// A row of the profile history, joined with the paper it belongs to.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResultHistoryEntry {
    pub id: i64,
    pub test_name: String,
    pub category: String,
    pub year: i64,
    pub section: String,
    pub score: i64,
    pub total_questions: i64,
    pub date_taken: chrono::DateTime<chrono::Utc>,
}

impl ResultHistoryEntry {
    /// Attempt time as shown in the history table.
    pub fn taken_on(&self) -> String {
        self.date_taken.format("%Y-%m-%d %H:%M").to_string()
    }
}
