// src/views/pages.rs

use askama::Template;
use axum::response::Response;

use crate::{
    models::{
        test_paper::{PaperSummary, Question, TestPaper},
        test_result::{AnswerRecord, ResultHistoryEntry},
    },
    utils::html::path_segment,
    views::{PageContext, page},
};

#[derive(Template)]
#[template(path = "index.html")]
struct IndexPage<'a> {
    ctx: &'a PageContext,
}

#[derive(Template)]
#[template(path = "register.html")]
struct RegisterPage<'a> {
    ctx: &'a PageContext,
}

#[derive(Template)]
#[template(path = "login.html")]
struct LoginPage<'a> {
    ctx: &'a PageContext,
}

/// A link label with its already percent-encoded path segment.
struct Link {
    label: String,
    segment: String,
}

impl Link {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            segment: path_segment(label),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardPage<'a> {
    ctx: &'a PageContext,
    categories: Vec<Link>,
}

#[derive(Template)]
#[template(path = "select_year.html")]
struct SelectYearPage<'a> {
    ctx: &'a PageContext,
    category: Link,
    years: &'a [i64],
}

#[derive(Template)]
#[template(path = "select_paper.html")]
struct SelectPaperPage<'a> {
    ctx: &'a PageContext,
    category: Link,
    year: i64,
    papers: &'a [PaperSummary],
}

struct OptionView<'a> {
    value: &'a str,
    /// Shown next to the English option when it differs.
    hindi: Option<&'a str>,
}

struct QuestionView<'a> {
    id: i64,
    question: &'a str,
    question_hindi: &'a str,
    options: Vec<OptionView<'a>>,
}

impl<'a> QuestionView<'a> {
    fn new(q: &'a Question) -> Self {
        let options = q
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| OptionView {
                value: option,
                hindi: q
                    .options_hindi
                    .get(i)
                    .filter(|h| *h != option)
                    .map(String::as_str),
            })
            .collect();

        Self {
            id: q.id,
            question: &q.question,
            question_hindi: &q.question_hindi,
            options,
        }
    }
}

#[derive(Template)]
#[template(path = "take_test.html")]
struct TakeTestPage<'a> {
    ctx: &'a PageContext,
    test: &'a TestPaper,
    questions: Vec<QuestionView<'a>>,
}

#[derive(Template)]
#[template(path = "result.html")]
struct ResultPage<'a> {
    ctx: &'a PageContext,
    test: &'a TestPaper,
    score: i64,
    total_questions: i64,
    percentage: String,
    results: &'a [AnswerRecord],
    is_review: bool,
    /// A fresh attempt by an anonymous visitor: graded, not stored.
    unsaved: bool,
}

#[derive(Template)]
#[template(path = "profile.html")]
struct ProfilePage<'a> {
    ctx: &'a PageContext,
    username: &'a str,
    history: &'a [ResultHistoryEntry],
}

#[derive(Template)]
#[template(path = "donate.html")]
struct DonatePage<'a> {
    ctx: &'a PageContext,
}

pub fn index(ctx: &PageContext) -> Response {
    page(ctx, IndexPage { ctx })
}

pub fn register(ctx: &PageContext) -> Response {
    page(ctx, RegisterPage { ctx })
}

pub fn login(ctx: &PageContext) -> Response {
    page(ctx, LoginPage { ctx })
}

pub fn dashboard(ctx: &PageContext, categories: &[String]) -> Response {
    let categories = categories.iter().map(|c| Link::new(c)).collect();
    page(ctx, DashboardPage { ctx, categories })
}

pub fn select_year(ctx: &PageContext, category: &str, years: &[i64]) -> Response {
    page(
        ctx,
        SelectYearPage {
            ctx,
            category: Link::new(category),
            years,
        },
    )
}

pub fn select_paper(
    ctx: &PageContext,
    category: &str,
    year: i64,
    papers: &[PaperSummary],
) -> Response {
    page(
        ctx,
        SelectPaperPage {
            ctx,
            category: Link::new(category),
            year,
            papers,
        },
    )
}

pub fn take_test(ctx: &PageContext, test: &TestPaper, questions: &[Question]) -> Response {
    let questions = questions.iter().map(QuestionView::new).collect();
    page(
        ctx,
        TakeTestPage {
            ctx,
            test,
            questions,
        },
    )
}

/// Score page for a fresh submission (`is_review == false`) or a stored result.
pub fn result(
    ctx: &PageContext,
    test: &TestPaper,
    score: i64,
    total_questions: i64,
    results: &[AnswerRecord],
    is_review: bool,
) -> Response {
    let percentage = if total_questions > 0 {
        (score as f64 / total_questions as f64) * 100.0
    } else {
        0.0
    };

    page(
        ctx,
        ResultPage {
            ctx,
            test,
            score,
            total_questions,
            percentage: format!("{:.1}", percentage),
            results,
            is_review,
            unsaved: !is_review && ctx.user.is_none(),
        },
    )
}

pub fn profile(ctx: &PageContext, username: &str, history: &[ResultHistoryEntry]) -> Response {
    page(
        ctx,
        ProfilePage {
            ctx,
            username,
            history,
        },
    )
}

pub fn donate(ctx: &PageContext) -> Response {
    page(ctx, DonatePage { ctx })
}
