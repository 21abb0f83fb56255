// src/services/results.rs

use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        test_paper::TestPaper,
        test_result::{ResultHistoryEntry, TestResult},
    },
    services::catalog,
};

/// Decision of the review gate for one stored result.
#[derive(Debug)]
pub enum ReviewAccess {
    Granted { result: TestResult, test: TestPaper },
    /// The result exists but belongs to someone else.
    Denied,
}

/// Fetches a stored result for review by `requester_id`.
///
/// An unknown id is `NotFound`; a result owned by another user is `Denied`,
/// never its data.
pub async fn review(
    pool: &SqlitePool,
    result_id: i64,
    requester_id: i64,
) -> Result<ReviewAccess, AppError> {
    let result = sqlx::query_as::<_, TestResult>(
        r#"
        SELECT id, user_id, test_id, score, total_questions, date_taken, answers_data
        FROM test_results
        WHERE id = ?
        "#,
    )
    .bind(result_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Result not found".to_string()))?;

    if result.user_id != requester_id {
        tracing::warn!(
            result_id,
            requester_id,
            owner_id = result.user_id,
            "Denied access to another user's result"
        );
        return Ok(ReviewAccess::Denied);
    }

    let test = catalog::find_test(pool, result.test_id).await?;

    Ok(ReviewAccess::Granted { result, test })
}

/// A user's attempts, newest first.
pub async fn history(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<ResultHistoryEntry>, AppError> {
    let entries = sqlx::query_as::<_, ResultHistoryEntry>(
        r#"
        SELECT
            r.id,
            t.name AS test_name,
            t.category,
            t.year,
            t.section,
            r.score,
            r.total_questions,
            r.date_taken
        FROM test_results r
        JOIN tests t ON r.test_id = t.id
        WHERE r.user_id = ?
        ORDER BY r.date_taken DESC, r.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}
