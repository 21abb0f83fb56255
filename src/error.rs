// src/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use crate::views;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to rendered error pages.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 401 Unauthorized
    AuthError(String),

    // 404 Not Found
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Converts the error into an HTML page with the matching status code.
/// Internal details are logged, never rendered.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong on our side. Please try again later.".to_string(),
                )
            }
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        (status, views::error_page(status, &message)).into_response()
    }
}

/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}
