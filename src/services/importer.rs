// src/services/importer.rs

//! Bulk import of exam papers from a directory tree of JSON documents.
//!
//! A document is either *flat* (the paper itself) or *nested* (an object whose
//! values are papers, e.g. `{"part1": {...}, "part2": {...}}`). Every paper
//! needs `name`, `category`, `year`, `section`, `duration` and `questions`.
//!
//! Invariants:
//! * A paper is identified by (name, category, year, section). Re-importing an
//!   existing paper creates nothing and counts as processed.
//! * Question entries lacking `question`, `options` or `answer` are dropped.
//! * `question_hindi` / `options_hindi` are normalized to the English values
//!   when absent, so stored questions always carry both languages.
//! * One file is all-or-nothing (savepoint); the whole run is one transaction
//!   committed at the end.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use sqlx::{Acquire, SqliteConnection, SqlitePool, types::Json};
use walkdir::WalkDir;

pub const REQUIRED_PAPER_FIELDS: [&str; 6] =
    ["name", "category", "year", "section", "duration", "questions"];

pub const REQUIRED_QUESTION_FIELDS: [&str; 3] = ["question", "options", "answer"];

/// A paper as it appears in an import document.
#[derive(Debug, Clone, Deserialize)]
pub struct PaperDocument {
    pub name: String,
    pub category: String,
    #[serde(deserialize_with = "integer_or_numeric_string")]
    pub year: i64,
    pub section: String,
    #[serde(deserialize_with = "integer_or_numeric_string")]
    pub duration: i64,
    pub questions: Vec<Value>,
}

/// Accepts `2023` as well as `"2023"`; anything else is a type error.
fn integer_or_numeric_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Integer(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Integer(n) => Ok(n),
        Raw::Text(text) => text.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("expected an integer, found \"{}\"", text))
        }),
    }
}

#[derive(Debug, Clone, Deserialize)]
struct QuestionDocument {
    question: String,
    question_hindi: Option<String>,
    options: Vec<String>,
    options_hindi: Option<Vec<String>>,
    answer: String,
}

/// A question ready to insert, with both languages filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question: String,
    pub question_hindi: String,
    pub options: Vec<String>,
    pub options_hindi: Vec<String>,
    pub correct_answer: String,
}

impl QuestionDocument {
    fn normalize(self) -> NewQuestion {
        let question_hindi = self.question_hindi.unwrap_or_else(|| self.question.clone());
        let options_hindi = self.options_hindi.unwrap_or_else(|| self.options.clone());

        NewQuestion {
            question: self.question,
            question_hindi,
            options: self.options,
            options_hindi,
            correct_answer: self.answer,
        }
    }
}

impl PaperDocument {
    /// Usable questions of this paper, normalized. Entries missing a required
    /// field or carrying the wrong types are skipped.
    pub fn normalized_questions(&self) -> Vec<NewQuestion> {
        self.questions
            .iter()
            .filter(|entry| has_fields(entry, &REQUIRED_QUESTION_FIELDS))
            .filter_map(|entry| match QuestionDocument::deserialize(entry) {
                Ok(doc) => Some(doc.normalize()),
                Err(e) => {
                    tracing::debug!("Dropping malformed question in '{}': {}", self.name, e);
                    None
                }
            })
            .collect()
    }
}

/// Why a single file contributed nothing.
#[derive(Debug)]
pub enum FileError {
    Read(std::io::Error),
    Parse(serde_json::Error),
    /// No flat or nested paper found; lists the fields the root object lacks.
    NoPaper { missing: Vec<&'static str> },
    InvalidPaper(serde_json::Error),
    Database(sqlx::Error),
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::Read(e) => write!(f, "could not read file: {}", e),
            FileError::Parse(e) => write!(f, "invalid JSON: {}", e),
            FileError::NoPaper { missing } => {
                write!(f, "no valid test data found (missing fields: {:?})", missing)
            }
            FileError::InvalidPaper(e) => write!(f, "invalid test data: {}", e),
            FileError::Database(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for FileError {}

impl From<sqlx::Error> for FileError {
    fn from(err: sqlx::Error) -> Self {
        FileError::Database(err)
    }
}

/// Failure of a whole run. Nothing from the run is visible afterwards.
#[derive(Debug)]
pub enum ImportError {
    Database(sqlx::Error),
    Commit(sqlx::Error),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Database(e) => write!(f, "import aborted: {}", e),
            ImportError::Commit(e) => write!(f, "error committing import, rolled back: {}", e),
        }
    }
}

impl std::error::Error for ImportError {}

impl From<sqlx::Error> for ImportError {
    fn from(err: sqlx::Error) -> Self {
        ImportError::Database(err)
    }
}

/// Operator-facing counters for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub tests_created: usize,
    pub tests_existing: usize,
    pub questions_created: usize,
    pub categories: BTreeSet<String>,
    pub years: BTreeSet<i64>,
    pub sections: BTreeSet<String>,
}

impl ImportStats {
    fn absorb(&mut self, report: FileReport) {
        self.files_processed += 1;
        self.tests_existing += report.existing;
        for paper in report.created {
            self.tests_created += 1;
            self.questions_created += paper.questions;
            self.categories.insert(paper.category);
            self.years.insert(paper.year);
            self.sections.insert(paper.section);
        }
    }

    pub fn log_summary(&self) {
        tracing::info!(
            files_processed = self.files_processed,
            files_failed = self.files_failed,
            tests_created = self.tests_created,
            tests_existing = self.tests_existing,
            questions_created = self.questions_created,
            "Import summary"
        );
        if self.tests_created > 0 {
            tracing::info!(
                "Categories: {:?}, years: {:?}, sections: {:?}",
                self.categories,
                self.years,
                self.sections
            );
        }
    }
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Files processed: {}", self.files_processed)?;
        writeln!(f, "Files failed: {}", self.files_failed)?;
        writeln!(f, "Tests created: {}", self.tests_created)?;
        writeln!(f, "Tests already present: {}", self.tests_existing)?;
        write!(f, "Questions created: {}", self.questions_created)?;

        if self.tests_created > 0 {
            writeln!(f)?;
            writeln!(f, "Categories ({}):", self.categories.len())?;
            for category in &self.categories {
                writeln!(f, "  - {}", category)?;
            }
            writeln!(f, "Years ({}):", self.years.len())?;
            for year in &self.years {
                writeln!(f, "  - {}", year)?;
            }
            write!(f, "Sections ({}):", self.sections.len())?;
            for section in &self.sections {
                write!(f, "\n  - {}", section)?;
            }
        }
        Ok(())
    }
}

/// Result of a run that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The directory does not exist; the caller decides whether to create it.
    MissingDirectory(PathBuf),
    /// The directory holds no `.json` files.
    NoFiles,
    Completed(ImportStats),
}

#[derive(Debug, Default)]
struct FileReport {
    created: Vec<CreatedPaper>,
    existing: usize,
}

#[derive(Debug)]
struct CreatedPaper {
    category: String,
    year: i64,
    section: String,
    questions: usize,
}

fn has_fields(value: &Value, fields: &[&str]) -> bool {
    value
        .as_object()
        .is_some_and(|obj| fields.iter().all(|f| obj.contains_key(*f)))
}

/// Finds the papers in a parsed document.
///
/// The root is taken as a flat paper when it has every required field;
/// otherwise each object value that does is taken as a nested paper. A nested
/// candidate with badly typed fields is skipped; the file only fails when no
/// candidate survives.
pub fn extract_papers(root: &Value) -> Result<Vec<PaperDocument>, FileError> {
    let candidates: Vec<&Value> = if has_fields(root, &REQUIRED_PAPER_FIELDS) {
        vec![root]
    } else {
        root.as_object()
            .map(|obj| {
                obj.values()
                    .filter(|v| has_fields(v, &REQUIRED_PAPER_FIELDS))
                    .collect()
            })
            .unwrap_or_default()
    };

    if candidates.is_empty() {
        let missing = match root.as_object() {
            Some(obj) => REQUIRED_PAPER_FIELDS
                .iter()
                .copied()
                .filter(|f| !obj.contains_key(*f))
                .collect(),
            None => REQUIRED_PAPER_FIELDS.to_vec(),
        };
        return Err(FileError::NoPaper { missing });
    }

    let mut papers = Vec::with_capacity(candidates.len());
    let mut last_error = None;

    for candidate in candidates {
        match PaperDocument::deserialize(candidate) {
            Ok(paper) => papers.push(paper),
            Err(e) => {
                let name = candidate
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("<unnamed>");
                tracing::warn!("Skipping invalid test data '{}': {}", name, e);
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if papers.is_empty() => Err(FileError::InvalidPaper(e)),
        _ => Ok(papers),
    }
}

/// Every `.json` file below `dir`, in a stable order.
pub fn json_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect()
}

/// Inserts a paper unless one with the same natural key exists.
/// Returns the new id, or `None` when the paper was already present.
async fn insert_paper(
    conn: &mut SqliteConnection,
    paper: &PaperDocument,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO tests (name, category, year, section, duration)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (name, category, year, section) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(&paper.name)
    .bind(&paper.category)
    .bind(paper.year)
    .bind(&paper.section)
    .bind(paper.duration)
    .fetch_optional(&mut *conn)
    .await
}

async fn insert_question(
    conn: &mut SqliteConnection,
    test_id: i64,
    question: &NewQuestion,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO questions (test_id, question, question_hindi, options, options_hindi, correct_answer)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(test_id)
    .bind(&question.question)
    .bind(&question.question_hindi)
    .bind(Json(&question.options))
    .bind(Json(&question.options_hindi))
    .bind(&question.correct_answer)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn import_file(conn: &mut SqliteConnection, path: &Path) -> Result<FileReport, FileError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(FileError::Read)?;
    let root: Value = serde_json::from_str(&raw).map_err(FileError::Parse)?;
    let papers = extract_papers(&root)?;

    let mut report = FileReport::default();

    for paper in &papers {
        let Some(test_id) = insert_paper(conn, paper).await? else {
            tracing::info!("Test already exists, skipping: {}", paper.name);
            report.existing += 1;
            continue;
        };

        let questions = paper.normalized_questions();
        for question in &questions {
            insert_question(conn, test_id, question).await?;
        }

        tracing::info!("Loaded: {} ({} questions)", paper.name, questions.len());
        report.created.push(CreatedPaper {
            category: paper.category.clone(),
            year: paper.year,
            section: paper.section.clone(),
            questions: questions.len(),
        });
    }

    Ok(report)
}

/// Imports every JSON document below `dir` in one transaction.
///
/// A file that fails is rolled back on its own and counted in
/// `files_failed`; the run continues. A failed final commit discards the
/// whole run and is returned as `ImportError::Commit`.
pub async fn import_directory(pool: &SqlitePool, dir: &Path) -> Result<ImportOutcome, ImportError> {
    if !dir.is_dir() {
        tracing::warn!("Data directory not found: {}", dir.display());
        return Ok(ImportOutcome::MissingDirectory(dir.to_path_buf()));
    }

    let files = json_files(dir);
    if files.is_empty() {
        tracing::warn!("No JSON files found in {}", dir.display());
        return Ok(ImportOutcome::NoFiles);
    }

    let mut stats = ImportStats::default();
    let mut tx = pool.begin().await?;

    for path in &files {
        let relative = path.strip_prefix(dir).unwrap_or(path);
        tracing::info!("Processing: {}", relative.display());

        let mut savepoint = tx.begin().await?;
        match import_file(&mut *savepoint, path).await {
            Ok(report) => {
                savepoint.commit().await?;
                stats.absorb(report);
            }
            Err(e) => {
                savepoint.rollback().await?;
                tracing::warn!("Skipping {}: {}", relative.display(), e);
                stats.files_failed += 1;
            }
        }
    }

    tx.commit().await.map_err(|e| {
        tracing::error!("Error committing import: {}", e);
        ImportError::Commit(e)
    })?;

    Ok(ImportOutcome::Completed(stats))
}
