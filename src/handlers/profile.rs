use axum::{Extension, extract::State, response::Response};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    services::results,
    utils::session::SessionUser,
    views::{PageContext, pages},
};

/// The current user's test history, newest first.
pub async fn profile(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<SessionUser>,
    ctx: PageContext,
) -> Result<Response, AppError> {
    let history = results::history(&pool, user.id).await?;
    Ok(pages::profile(&ctx, &user.username, &history))
}
