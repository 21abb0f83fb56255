// src/services/scoring.rs

use std::collections::HashMap;

use sqlx::{SqlitePool, types::Json};

use crate::{
    error::AppError,
    models::{
        test_paper::{Question, TestPaper},
        test_result::AnswerRecord,
    },
    services::catalog,
    utils::session::SessionUser,
};

/// Outcome of grading one attempt.
///
/// `results` is exactly the payload persisted into `test_results.answers_data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSheet {
    pub score: i64,
    pub total_questions: i64,
    pub results: Vec<AnswerRecord>,
}

/// A graded submission and, for logged-in users, the id of the stored result.
#[derive(Debug, Clone)]
pub struct Submission {
    pub test: TestPaper,
    pub sheet: ScoreSheet,
    pub result_id: Option<i64>,
}

/// Grades `answers` against every question of a paper, in question order.
///
/// `answers` is keyed by the stringified question id. A question with no entry
/// counts as unanswered and is never correct. Comparison is exact string
/// equality: case-sensitive, no trimming, no partial credit.
pub fn grade(questions: &[Question], answers: &HashMap<String, String>) -> ScoreSheet {
    let mut score = 0;

    let results = questions
        .iter()
        .map(|q| {
            let user_answer = answers.get(&q.id.to_string()).cloned();
            let is_correct = user_answer.as_deref() == Some(q.correct_answer.as_str());
            if is_correct {
                score += 1;
            }

            AnswerRecord {
                question: q.question.clone(),
                question_hindi: q.question_hindi.clone(),
                options: q.options.0.clone(),
                options_hindi: q.options_hindi.0.clone(),
                user_answer,
                correct_answer: q.correct_answer.clone(),
                is_correct,
            }
        })
        .collect();

    ScoreSheet {
        score,
        total_questions: questions.len() as i64,
        results,
    }
}

/// Stores one immutable result row and returns its id.
pub async fn record_result(
    pool: &SqlitePool,
    user_id: i64,
    test_id: i64,
    sheet: &ScoreSheet,
) -> Result<i64, AppError> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO test_results (user_id, test_id, score, total_questions, date_taken, answers_data)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(test_id)
    .bind(sheet.score)
    .bind(sheet.total_questions)
    .bind(chrono::Utc::now())
    .bind(Json(&sheet.results))
    .fetch_one(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to store test result: {:?}", e);
        AppError::from(e)
    })?;

    Ok(id)
}

/// Grades a submission for `test_id`.
///
/// Anonymous attempts are graded and returned but leave no row behind.
pub async fn submit(
    pool: &SqlitePool,
    test_id: i64,
    user: Option<&SessionUser>,
    answers: &HashMap<String, String>,
) -> Result<Submission, AppError> {
    let test = catalog::find_test(pool, test_id).await?;
    let questions = catalog::questions_for(pool, test.id).await?;

    let sheet = grade(&questions, answers);

    let result_id = match user {
        Some(user) => {
            let id = record_result(pool, user.id, test.id, &sheet).await?;
            tracing::info!(
                user_id = user.id,
                test_id = test.id,
                score = sheet.score,
                total = sheet.total_questions,
                "Stored test result {}",
                id
            );
            Some(id)
        }
        None => {
            tracing::debug!(test_id = test.id, "Graded anonymous attempt, not stored");
            None
        }
    };

    Ok(Submission {
        test,
        sheet,
        result_id,
    })
}
