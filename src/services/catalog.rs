// src/services/catalog.rs

use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::test_paper::{PaperSummary, Question, TestPaper},
};

/// Distinct non-empty categories, alphabetically.
pub async fn categories(pool: &SqlitePool) -> Result<Vec<String>, AppError> {
    let categories = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT category FROM tests WHERE category <> '' ORDER BY category",
    )
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

/// Distinct years available for a category, newest first.
pub async fn years_for(pool: &SqlitePool, category: &str) -> Result<Vec<i64>, AppError> {
    let years = sqlx::query_scalar::<_, i64>(
        "SELECT DISTINCT year FROM tests WHERE category = ? ORDER BY year DESC",
    )
    .bind(category)
    .fetch_all(pool)
    .await?;

    Ok(years)
}

/// Papers of one category and year, with their question counts.
pub async fn papers_for(
    pool: &SqlitePool,
    category: &str,
    year: i64,
) -> Result<Vec<PaperSummary>, AppError> {
    let papers = sqlx::query_as::<_, PaperSummary>(
        r#"
        SELECT
            t.id,
            t.name,
            t.section,
            t.duration,
            COUNT(q.id) AS question_count
        FROM tests t
        LEFT JOIN questions q ON q.test_id = t.id
        WHERE t.category = ? AND t.year = ?
        GROUP BY t.id
        ORDER BY t.section, t.name
        "#,
    )
    .bind(category)
    .bind(year)
    .fetch_all(pool)
    .await?;

    Ok(papers)
}

pub async fn find_test(pool: &SqlitePool, test_id: i64) -> Result<TestPaper, AppError> {
    sqlx::query_as::<_, TestPaper>(
        "SELECT id, name, category, year, section, duration FROM tests WHERE id = ?",
    )
    .bind(test_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Test not found".to_string()))
}

/// All questions of a paper in insertion order.
pub async fn questions_for(pool: &SqlitePool, test_id: i64) -> Result<Vec<Question>, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, test_id, question, question_hindi, options, options_hindi, correct_answer
        FROM questions
        WHERE test_id = ?
        ORDER BY id
        "#,
    )
    .bind(test_id)
    .fetch_all(pool)
    .await?;

    Ok(questions)
}
