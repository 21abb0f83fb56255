// src/handlers/auth.rs

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginForm, RegisterForm, User},
    utils::{
        flash::{Flash, redirect_with_cookies, redirect_with_flash},
        hash::{hash_password, verify_password},
        session::{login_cookie, logout_cookie, sign_session},
    },
    views::{PageContext, pages},
};

/// Landing page; logged-in users go straight to the dashboard.
pub async fn index(ctx: PageContext) -> Response {
    if ctx.user.is_some() {
        return Redirect::to("/test/dashboard").into_response();
    }
    pages::index(&ctx)
}

pub async fn register_page(ctx: PageContext) -> Response {
    pages::register(&ctx)
}

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it. Validation problems and
/// taken usernames or emails are reported with a flash message on the form.
pub async fn register(
    State(pool): State<SqlitePool>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if let Err(validation_errors) = form.validate() {
        return Ok(redirect_with_flash(
            "/register",
            Flash::error(validation_errors.to_string()),
        ));
    }

    let username_taken = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ?")
        .bind(&form.username)
        .fetch_optional(&pool)
        .await?
        .is_some();
    if username_taken {
        return Ok(redirect_with_flash(
            "/register",
            Flash::error("Username already exists!"),
        ));
    }

    let email_taken = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?")
        .bind(&form.email)
        .fetch_optional(&pool)
        .await?
        .is_some();
    if email_taken {
        return Ok(redirect_with_flash(
            "/register",
            Flash::error("Email already exists!"),
        ));
    }

    let password_hash = hash_password(&form.password)?;

    let inserted = sqlx::query("INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)")
        .bind(&form.username)
        .bind(&form.email)
        .bind(&password_hash)
        .execute(&pool)
        .await;

    match inserted {
        Ok(_) => {
            tracing::info!("Registered user '{}'", form.username);
            Ok(redirect_with_flash(
                "/login",
                Flash::success("User registered successfully! Please login."),
            ))
        }
        // A concurrent registration won the race for the same name or email.
        Err(e)
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation()) =>
        {
            Ok(redirect_with_flash(
                "/register",
                Flash::error("Username or email already exists!"),
            ))
        }
        Err(e) => {
            tracing::error!("Failed to register user: {:?}", e);
            Err(AppError::from(e))
        }
    }
}

pub async fn login_page(ctx: PageContext) -> Response {
    pages::login(&ctx)
}

/// Authenticates a user and stores a signed session token in a cookie.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let invalid = || redirect_with_flash("/login", Flash::error("Invalid username or password"));

    if form.validate().is_err() {
        return Ok(invalid());
    }

    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, created_at FROM users WHERE username = ?",
    )
    .bind(&form.username)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::from(e)
    })?;

    let Some(user) = user else {
        return Ok(invalid());
    };

    if !verify_password(&form.password, &user.password_hash)? {
        tracing::info!("Failed login for '{}'", user.username);
        return Ok(invalid());
    }

    let token = sign_session(
        user.id,
        &user.username,
        &config.secret_key,
        config.session_ttl_seconds,
    )?;

    let jar = CookieJar::new().add(login_cookie(token, config.session_ttl_seconds));
    Ok(redirect_with_cookies(
        jar,
        "/test/dashboard",
        Flash::success("Login successful!"),
    ))
}

pub async fn logout() -> Response {
    redirect_with_cookies(
        CookieJar::new().add(logout_cookie()),
        "/",
        Flash::info("You have been logged out."),
    )
}
