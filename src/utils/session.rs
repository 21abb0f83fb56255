// src/utils/session.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::AppError,
    utils::{
        cookie,
        flash::{Flash, redirect_with_flash},
    },
};

pub const SESSION_COOKIE: &str = "session";

/// Session token claims.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    pub username: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// The logged-in identity, injected into request extensions by `session_middleware`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
}

/// Signs a session token for the user.
pub fn sign_session(
    id: i64,
    username: &str,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        sub: id.to_string(),
        username: username.to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies a session token and resolves the identity it carries.
pub fn verify_session(token: &str, secret: &str) -> Result<SessionUser, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid session".to_string()))?;

    let id = token_data
        .claims
        .sub
        .parse::<i64>()
        .map_err(|_| AppError::AuthError("Invalid session subject".to_string()))?;

    Ok(SessionUser {
        id,
        username: token_data.claims.username,
    })
}

pub fn login_cookie(token: String, ttl_seconds: u64) -> Cookie<'static> {
    cookie::build(SESSION_COOKIE, token, ttl_seconds)
}

pub fn logout_cookie() -> Cookie<'static> {
    cookie::expired(SESSION_COOKIE)
}

/// Axum Middleware: Session.
///
/// Decodes the `session` cookie when present and injects `SessionUser` into
/// the request extensions. Missing, expired or tampered tokens leave the
/// request anonymous.
pub async fn session_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(req.headers());

    if let Some(token) = jar.get(SESSION_COOKIE) {
        match verify_session(token.value(), &config.secret_key) {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(_) => tracing::debug!("Ignoring invalid session cookie"),
        }
    }

    next.run(req).await
}

/// Axum Middleware: Login required.
///
/// Must be layered inside `session_middleware`. Anonymous requests are sent
/// to the login page with a flash message.
pub async fn login_required(req: Request<Body>, next: Next) -> Response {
    if req.extensions().get::<SessionUser>().is_none() {
        return redirect_with_flash("/login", Flash::info("Please log in to access this page."));
    }

    next.run(req).await
}
