// src/utils/flash.rs

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use url::form_urlencoded;

use crate::utils::cookie;

pub const FLASH_COOKIE: &str = "flash";

/// Flash messages only need to survive a single redirect.
const FLASH_MAX_AGE_SECONDS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

impl FlashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
            FlashKind::Info => "info",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "success" => Some(FlashKind::Success),
            "error" => Some(FlashKind::Error),
            "info" => Some(FlashKind::Info),
            _ => None,
        }
    }
}

/// A one-shot message shown at the top of the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Info,
            message: message.into(),
        }
    }

    /// Cookie-safe encoding: `kind=<kind>&msg=<message>`, form-url-encoded.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("kind", self.kind.as_str())
            .append_pair("msg", &self.message)
            .finish()
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let mut kind = None;
        let mut message = None;

        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "kind" => kind = FlashKind::parse(&value),
                "msg" => message = Some(value.into_owned()),
                _ => {}
            }
        }

        Some(Self {
            kind: kind?,
            message: message?,
        })
    }

    pub fn from_jar(jar: &CookieJar) -> Option<Self> {
        jar.get(FLASH_COOKIE).and_then(|c| Self::decode(c.value()))
    }

    pub fn into_cookie(self) -> Cookie<'static> {
        cookie::build(FLASH_COOKIE, self.encode(), FLASH_MAX_AGE_SECONDS)
    }
}

/// Redirects (303) and stores `flash` for the page the browser lands on.
pub fn redirect_with_flash(to: &str, flash: Flash) -> Response {
    redirect_with_cookies(CookieJar::new(), to, flash)
}

/// Like `redirect_with_flash`, also sending the cookies already added to `jar`.
pub fn redirect_with_cookies(jar: CookieJar, to: &str, flash: Flash) -> Response {
    (jar.add(flash.into_cookie()), Redirect::to(to)).into_response()
}
