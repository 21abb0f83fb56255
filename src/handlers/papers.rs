// src/handlers/papers.rs

use axum::{
    extract::{Path, State},
    response::Response,
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    services::catalog,
    views::{PageContext, pages},
};

/// Numeric path ids; anything else is a plain "not found".
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::NotFound(format!("{} not found", what)))
}

/// Lists distinct exam categories.
pub async fn dashboard(
    State(pool): State<SqlitePool>,
    ctx: PageContext,
) -> Result<Response, AppError> {
    let categories = catalog::categories(&pool).await?;
    Ok(pages::dashboard(&ctx, &categories))
}

pub async fn select_year(
    State(pool): State<SqlitePool>,
    ctx: PageContext,
    Path(category): Path<String>,
) -> Result<Response, AppError> {
    let years = catalog::years_for(&pool, &category).await?;
    Ok(pages::select_year(&ctx, &category, &years))
}

pub async fn select_paper(
    State(pool): State<SqlitePool>,
    ctx: PageContext,
    Path((category, year)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let year = parse_id(&year, "Year")?;
    let papers = catalog::papers_for(&pool, &category, year).await?;
    Ok(pages::select_paper(&ctx, &category, year, &papers))
}

/// Renders a paper's questions for answering.
pub async fn take_test(
    State(pool): State<SqlitePool>,
    ctx: PageContext,
    Path(test_id): Path<String>,
) -> Result<Response, AppError> {
    let test_id = parse_id(&test_id, "Test")?;
    let test = catalog::find_test(&pool, test_id).await?;
    let questions = catalog::questions_for(&pool, test.id).await?;
    Ok(pages::take_test(&ctx, &test, &questions))
}

pub async fn donate(ctx: PageContext) -> Response {
    pages::donate(&ctx)
}

pub async fn not_found() -> AppError {
    AppError::NotFound("Page not found".to_string())
}
