// src/utils/cookie.rs

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// A site-wide `HttpOnly` cookie that lives for `max_age_seconds`.
pub fn build(name: &'static str, value: String, max_age_seconds: u64) -> Cookie<'static> {
    let max_age = Duration::seconds(i64::try_from(max_age_seconds).unwrap_or(i64::MAX));

    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

/// A cookie that makes the browser drop `name` immediately.
pub fn expired(name: &'static str) -> Cookie<'static> {
    build(name, String::new(), 0)
}
