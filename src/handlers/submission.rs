// src/handlers/submission.rs

use std::collections::HashMap;

use axum::{
    Extension, Form,
    extract::{Path, State},
    response::Response,
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    handlers::papers::parse_id,
    services::{
        results::{self, ReviewAccess},
        scoring,
    },
    utils::{
        flash::{Flash, redirect_with_flash},
        session::SessionUser,
    },
    views::{PageContext, pages},
};

/// Grades a submitted paper.
///
/// Form keys are stringified question ids, values the chosen option. The
/// attempt is stored only for logged-in users; anonymous visitors still get
/// their score.
pub async fn submit_test(
    State(pool): State<SqlitePool>,
    ctx: PageContext,
    Path(test_id): Path<String>,
    Form(answers): Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let test_id = parse_id(&test_id, "Test")?;

    let submission = scoring::submit(&pool, test_id, ctx.user.as_ref(), &answers).await?;

    Ok(pages::result(
        &ctx,
        &submission.test,
        submission.sheet.score,
        submission.sheet.total_questions,
        &submission.sheet.results,
        false,
    ))
}

/// Shows a stored result to its owner only.
pub async fn view_result(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<SessionUser>,
    ctx: PageContext,
    Path(result_id): Path<String>,
) -> Result<Response, AppError> {
    let result_id = parse_id(&result_id, "Result")?;

    match results::review(&pool, result_id, user.id).await? {
        ReviewAccess::Granted { result, test } => Ok(pages::result(
            &ctx,
            &test,
            result.score,
            result.total_questions,
            &result.answers_data,
            true,
        )),
        ReviewAccess::Denied => Ok(redirect_with_flash(
            "/test/dashboard",
            Flash::error("Unauthorized access."),
        )),
    }
}
