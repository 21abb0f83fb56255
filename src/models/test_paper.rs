// src/models/test_paper.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

/// Represents the 'tests' table: one exam paper.
///
/// Rows are created only by the import engine and are unique on
/// (name, category, year, section).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestPaper {
    pub id: i64,
    pub name: String,
    /// Exam track, e.g. PRT, TGT, PGT.
    pub category: String,
    pub year: i64,
    /// Language or subject, e.g. Hindi, Pedagogy.
    pub section: String,
    /// Minutes allowed for the attempt.
    pub duration: i64,
}

/// A paper as listed on the paper selection page.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaperSummary {
    pub id: i64,
    pub name: String,
    pub section: String,
    pub duration: i64,
    pub question_count: i64,
}

/// Represents the 'questions' table.
///
/// The Hindi fields are always populated: the importer copies the English
/// text or options when a document omits them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub test_id: i64,
    pub question: String,
    pub question_hindi: String,
    pub options: Json<Vec<String>>,
    pub options_hindi: Json<Vec<String>>,
    /// Matched against the submitted option value, not an index.
    pub correct_answer: String,
}
