// src/views/mod.rs

//! Server-rendered pages. Templates live in `templates/` and extend
//! `base.html`; askama escapes every interpolated value.

pub mod pages;

use std::convert::Infallible;

use askama::Template;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::utils::{
    cookie,
    flash::{FLASH_COOKIE, Flash},
    session::SessionUser,
};

/// What every page needs besides its own content: who is logged in and the
/// pending flash message, if any.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub user: Option<SessionUser>,
    pub flash: Option<Flash>,
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        Ok(PageContext {
            user: parts.extensions.get::<SessionUser>().cloned(),
            flash: Flash::from_jar(&jar),
        })
    }
}

pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                tracing::error!("Failed to render template: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

/// Renders a full page. A displayed flash message is cleared in the same response.
pub fn page<T: Template>(ctx: &PageContext, template: T) -> Response {
    let response = HtmlTemplate(template).into_response();

    if ctx.flash.is_some() {
        let jar = CookieJar::new().add(cookie::expired(FLASH_COOKIE));
        return (jar, response).into_response();
    }

    response
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPage<'a> {
    ctx: &'a PageContext,
    title: &'a str,
    status: u16,
    message: &'a str,
}

pub fn error_page(status: StatusCode, message: &str) -> Response {
    let ctx = PageContext::default();

    HtmlTemplate(ErrorPage {
        ctx: &ctx,
        title: status.canonical_reason().unwrap_or("Error"),
        status: status.as_u16(),
        message,
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::header};

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn page_with_flash_clears_cookie() {
        let ctx = PageContext {
            user: None,
            flash: Some(Flash::success("Saved")),
        };
        let response = pages::donate(&ctx);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("flash=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn page_without_flash_sets_no_cookie() {
        let response = pages::donate(&PageContext::default());
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn flash_message_is_shown_and_escaped() {
        let ctx = PageContext {
            user: None,
            flash: Some(Flash::error("<b>bad</b> input")),
        };
        let body = body_text(pages::login(&ctx)).await;

        assert!(body.contains(r#"class="flash flash-error""#));
        assert!(body.contains("&lt;b&gt;bad"));
    }

    #[tokio::test]
    async fn nav_escapes_username() {
        let ctx = PageContext {
            user: Some(SessionUser {
                id: 1,
                username: "<b>eve</b>".to_string(),
            }),
            flash: None,
        };
        let body = body_text(pages::donate(&ctx)).await;

        assert!(!body.contains("<b>eve</b>"));
        assert!(body.contains("&lt;b&gt;eve"));
        assert!(body.contains(r#"href="/logout""#));
    }

    #[tokio::test]
    async fn error_page_carries_status_and_message() {
        let response = (StatusCode::NOT_FOUND, error_page(StatusCode::NOT_FOUND, "Test not found"))
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_text(response).await;
        assert!(body.contains("<h1>404</h1>"));
        assert!(body.contains("Test not found"));
    }
}
