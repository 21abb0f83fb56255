// src/routes.rs

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{auth, papers, profile, submission},
    state::AppState,
    utils::session::{login_required, session_middleware},
};

/// Assembles the main application router.
///
/// * Public pages: landing, auth forms, browsing, taking and submitting tests.
/// * Pages behind `login_required`: logout, profile, stored result review.
/// * Global middleware: request tracing, then session decoding.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(auth::index))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/test/dashboard", get(papers::dashboard))
        .route("/test/select_year/{category}", get(papers::select_year))
        .route(
            "/test/select_paper/{category}/{year}",
            get(papers::select_paper),
        )
        .route("/test/take_test/{test_id}", get(papers::take_test))
        .route("/test/submit_test/{test_id}", post(submission::submit_test))
        .route("/test/donate", get(papers::donate));

    let protected_routes = Router::new()
        .route("/logout", get(auth::logout))
        .route("/test/profile", get(profile::profile))
        .route("/test/view_result/{result_id}", get(submission::view_result))
        .layer(middleware::from_fn(login_required));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/static", ServeDir::new("static"))
        .fallback(papers::not_found)
        // Applied outside in: trace every request, then resolve the session.
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    session_middleware,
                )),
        )
        .with_state(state)
}
