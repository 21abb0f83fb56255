// src/services/bootstrap.rs

use std::error::Error;
use std::path::Path;

use sqlx::{FromRow, SqlitePool};

use crate::{
    config::SeedUser,
    services::importer::{self, ImportOutcome},
    utils::hash::hash_password,
};

type BoxError = Box<dyn Error + Send + Sync>;

/// Row counts reported after an import that created data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCounts {
    pub users: i64,
    pub tests: i64,
    pub questions: i64,
}

#[derive(Debug, FromRow)]
struct SampleTest {
    name: String,
    category: String,
    year: i64,
    question_count: i64,
}

/// Imports `data_dir` only when the store has no tests yet.
pub async fn seed_if_empty(pool: &SqlitePool, data_dir: &Path) -> Result<(), BoxError> {
    let test_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tests")
        .fetch_one(pool)
        .await?;

    if test_count > 0 {
        tracing::info!("Database already has {} tests, no seeding needed", test_count);
        return Ok(());
    }

    tracing::info!("Database is empty, seeding from {}", data_dir.display());
    run_import(pool, data_dir).await?;
    Ok(())
}

/// Runs the import engine and reports the outcome.
///
/// A missing data directory is created so that files can be dropped in for
/// the next start.
pub async fn run_import(pool: &SqlitePool, data_dir: &Path) -> Result<ImportOutcome, BoxError> {
    let outcome = importer::import_directory(pool, data_dir).await?;

    match &outcome {
        ImportOutcome::MissingDirectory(dir) => {
            tokio::fs::create_dir_all(dir).await?;
            tracing::info!(
                "Created {}. Add JSON files to this directory and restart.",
                dir.display()
            );
        }
        ImportOutcome::NoFiles => {
            tracing::info!("Nothing to import from {}", data_dir.display());
        }
        ImportOutcome::Completed(stats) => {
            stats.log_summary();
            if stats.tests_created > 0 {
                verify(pool).await?;
            }
        }
    }

    Ok(outcome)
}

/// Logs table counts and a few sample tests.
pub async fn verify(pool: &SqlitePool) -> Result<StoreCounts, sqlx::Error> {
    let counts = store_counts(pool).await?;
    tracing::info!(
        users = counts.users,
        tests = counts.tests,
        questions = counts.questions,
        "Database verification"
    );

    let samples = sqlx::query_as::<_, SampleTest>(
        r#"
        SELECT t.name, t.category, t.year, COUNT(q.id) AS question_count
        FROM tests t
        LEFT JOIN questions q ON q.test_id = t.id
        GROUP BY t.id
        ORDER BY t.id
        LIMIT 3
        "#,
    )
    .fetch_all(pool)
    .await?;

    for sample in samples {
        tracing::info!(
            "Sample: {} ({} - {}): {} questions",
            sample.name,
            sample.category,
            sample.year,
            sample.question_count
        );
    }

    Ok(counts)
}

pub async fn store_counts(pool: &SqlitePool) -> Result<StoreCounts, sqlx::Error> {
    let (users, tests, questions) = sqlx::query_as::<_, (i64, i64, i64)>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM users),
            (SELECT COUNT(*) FROM tests),
            (SELECT COUNT(*) FROM questions)
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(StoreCounts {
        users,
        tests,
        questions,
    })
}

/// Creates the configured bootstrap account unless the username is taken.
pub async fn seed_user(pool: &SqlitePool, seed: &SeedUser) -> Result<(), BoxError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ?")
        .bind(&seed.username)
        .fetch_optional(pool)
        .await?;

    if exists.is_some() {
        tracing::info!("User '{}' already exists, skipping user seed", seed.username);
        return Ok(());
    }

    tracing::info!("Seeding user: {}", seed.username);
    let password_hash = hash_password(&seed.password)?;

    sqlx::query("INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)")
        .bind(&seed.username)
        .bind(&seed.email)
        .bind(&password_hash)
        .execute(pool)
        .await?;

    tracing::info!("User '{}' created successfully.", seed.username);
    Ok(())
}
