// tests/import_tests.rs

use std::fs;
use std::path::Path;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use testprep::{
    db,
    services::{
        bootstrap,
        importer::{self, ImportOutcome, ImportStats},
    },
};

const PAPER_A: &str = r#"{"name":"Paper A","category":"PRT","year":2023,"section":"Hindi","duration":30,"questions":[{"question":"2+2?","options":["3","4"],"answer":"4"}]}"#;

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");
    db::migrate(&pool).await.expect("Failed to migrate database");
    pool
}

fn write(dir: &Path, relative: &str, contents: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

async fn import(pool: &SqlitePool, dir: &Path) -> ImportStats {
    match importer::import_directory(pool, dir).await.unwrap() {
        ImportOutcome::Completed(stats) => stats,
        other => panic!("expected a completed import, got {:?}", other),
    }
}

async fn counts(pool: &SqlitePool) -> (i64, i64) {
    sqlx::query_as("SELECT (SELECT COUNT(*) FROM tests), (SELECT COUNT(*) FROM questions)")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn flat_document_creates_test_and_normalized_question() {
    // Arrange
    let pool = test_pool().await;
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "prt/2023/hindi.json", PAPER_A);

    // Act
    let stats = import(&pool, dir.path()).await;

    // Assert
    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.files_failed, 0);
    assert_eq!(stats.tests_created, 1);
    assert_eq!(stats.questions_created, 1);
    assert_eq!(counts(&pool).await, (1, 1));

    let (name, category, year, section, duration): (String, String, i64, String, i64) =
        sqlx::query_as("SELECT name, category, year, section, duration FROM tests")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(
        (name.as_str(), category.as_str(), year, section.as_str(), duration),
        ("Paper A", "PRT", 2023, "Hindi", 30)
    );

    let (question_hindi, options_hindi, correct_answer): (String, String, String) =
        sqlx::query_as("SELECT question_hindi, options_hindi, correct_answer FROM questions")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(question_hindi, "2+2?");
    let options_hindi: Vec<String> = serde_json::from_str(&options_hindi).unwrap();
    assert_eq!(options_hindi, vec!["3", "4"]);
    assert_eq!(correct_answer, "4");
}

#[tokio::test]
async fn reimport_is_idempotent() {
    let pool = test_pool().await;
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "paper_a.json", PAPER_A);

    import(&pool, dir.path()).await;
    let second = import(&pool, dir.path()).await;

    assert_eq!(second.files_processed, 1);
    assert_eq!(second.files_failed, 0);
    assert_eq!(second.tests_created, 0);
    assert_eq!(second.tests_existing, 1);
    assert_eq!(second.questions_created, 0);
    assert_eq!(counts(&pool).await, (1, 1));
}

#[tokio::test]
async fn same_paper_in_two_files_is_created_once() {
    let pool = test_pool().await;
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.json", PAPER_A);
    write(dir.path(), "copy/a.json", PAPER_A);

    let stats = import(&pool, dir.path()).await;

    assert_eq!(stats.files_processed, 2);
    assert_eq!(stats.tests_created, 1);
    assert_eq!(stats.tests_existing, 1);
    assert_eq!(counts(&pool).await, (1, 1));
}

#[tokio::test]
async fn nested_document_creates_every_part() {
    let pool = test_pool().await;
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "tgt.json",
        r#"{
            "part1": {"name": "General", "category": "TGT", "year": 2024, "section": "General", "duration": 20,
                      "questions": [{"question": "Q1", "options": ["a", "b"], "answer": "a"}]},
            "part2": {"name": "Pedagogy", "category": "TGT", "year": 2024, "section": "Pedagogy", "duration": 20,
                      "questions": [{"question": "Q2", "options": ["c", "d"], "answer": "d"},
                                    {"question": "Q3", "options": ["e", "f"], "answer": "e"}]}
        }"#,
    );

    let stats = import(&pool, dir.path()).await;

    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.tests_created, 2);
    assert_eq!(stats.questions_created, 3);
    assert_eq!(stats.categories.iter().collect::<Vec<_>>(), vec!["TGT"]);
    assert_eq!(stats.years.iter().copied().collect::<Vec<_>>(), vec![2024]);
    assert_eq!(
        stats.sections.iter().collect::<Vec<_>>(),
        vec!["General", "Pedagogy"]
    );
    assert_eq!(counts(&pool).await, (2, 3));
}

#[tokio::test]
async fn malformed_files_fail_in_isolation() {
    let pool = test_pool().await;
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "1_good.json", PAPER_A);
    write(dir.path(), "2_broken.json", "{ not json");
    write(dir.path(), "3_no_papers.json", r#"{"meta": {"source": "board"}, "note": "x"}"#);
    write(
        dir.path(),
        "4_only_bad_parts.json",
        r#"{
            "part1": {"name": "Broken", "category": "PGT", "year": "last year", "section": "Math", "duration": 10, "questions": []}
        }"#,
    );
    write(dir.path(), "notes.txt", "not an import file");

    let stats = import(&pool, dir.path()).await;

    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.files_failed, 3);
    assert_eq!(stats.tests_created, 1);

    let pgt: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tests WHERE category = 'PGT'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(pgt, 0);
    assert_eq!(counts(&pool).await, (1, 1));
}

#[tokio::test]
async fn nested_file_keeps_valid_parts_when_one_is_badly_typed() {
    let pool = test_pool().await;
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "pgt.json",
        r#"{
            "part1": {"name": "Fine", "category": "PGT", "year": 2022, "section": "Math", "duration": 10,
                      "questions": [{"question": "1+1?", "options": ["1", "2"], "answer": "2"}]},
            "part2": {"name": "Broken", "category": "PGT", "year": 2022, "section": "Math", "duration": "ten", "questions": []}
        }"#,
    );

    let stats = import(&pool, dir.path()).await;

    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.files_failed, 0);
    assert_eq!(stats.tests_created, 1);

    let names: Vec<String> = sqlx::query_scalar("SELECT name FROM tests")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(names, vec!["Fine"]);
    assert_eq!(counts(&pool).await, (1, 1));
}

#[tokio::test]
async fn quoted_year_and_duration_are_imported_as_integers() {
    let pool = test_pool().await;
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "quoted.json",
        &PAPER_A
            .replace("\"year\":2023", "\"year\":\"2023\"")
            .replace("\"duration\":30", "\"duration\":\"30\""),
    );

    let stats = import(&pool, dir.path()).await;
    assert_eq!(stats.tests_created, 1);

    let (year, duration): (i64, i64) = sqlx::query_as("SELECT year, duration FROM tests")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!((year, duration), (2023, 30));

    // Same natural key as the unquoted document
    write(dir.path(), "plain.json", PAPER_A);
    let stats = import(&pool, dir.path()).await;
    assert_eq!(stats.tests_created, 0);
    assert_eq!(stats.tests_existing, 2);
}

#[tokio::test]
async fn incomplete_questions_are_dropped_without_failing() {
    let pool = test_pool().await;
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "paper.json",
        r#"{"name": "Partial", "category": "PRT", "year": 2021, "section": "English", "duration": 15,
            "questions": [
                {"question": "kept", "options": ["a", "b"], "answer": "b", "question_hindi": "रखा"},
                {"question": "no answer", "options": ["a"]},
                {"options": ["a"], "answer": "a"}
            ]}"#,
    );

    let stats = import(&pool, dir.path()).await;

    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.files_failed, 0);
    assert_eq!(stats.questions_created, 1);

    let (question, question_hindi): (String, String) =
        sqlx::query_as("SELECT question, question_hindi FROM questions")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(question, "kept");
    assert_eq!(question_hindi, "रखा");
}

#[tokio::test]
async fn empty_and_missing_directories_are_reported() {
    let pool = test_pool().await;
    let dir = tempfile::tempdir().unwrap();

    let outcome = importer::import_directory(&pool, dir.path()).await.unwrap();
    assert_eq!(outcome, ImportOutcome::NoFiles);

    let missing = dir.path().join("does_not_exist");
    let outcome = importer::import_directory(&pool, &missing).await.unwrap();
    assert_eq!(outcome, ImportOutcome::MissingDirectory(missing.clone()));
    assert!(!missing.exists());

    // The bootstrap wrapper creates it for the next run
    bootstrap::run_import(&pool, &missing).await.unwrap();
    assert!(missing.is_dir());
}

#[tokio::test]
async fn startup_seed_runs_only_on_an_empty_store() {
    let pool = test_pool().await;
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "paper_a.json", PAPER_A);

    bootstrap::seed_if_empty(&pool, dir.path()).await.unwrap();
    assert_eq!(counts(&pool).await, (1, 1));

    // A new file is not picked up while data exists
    write(
        dir.path(),
        "paper_b.json",
        &PAPER_A.replace("Paper A", "Paper B"),
    );
    bootstrap::seed_if_empty(&pool, dir.path()).await.unwrap();
    assert_eq!(counts(&pool).await, (1, 1));

    // An explicit run does import it
    bootstrap::run_import(&pool, dir.path()).await.unwrap();
    assert_eq!(counts(&pool).await, (2, 2));

    let store = bootstrap::store_counts(&pool).await.unwrap();
    assert_eq!((store.tests, store.questions, store.users), (2, 2, 0));
}

#[tokio::test]
async fn deleting_a_test_cascades_to_questions_but_not_results() {
    let pool = test_pool().await;
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "paper_a.json", PAPER_A);
    import(&pool, dir.path()).await;

    let test_id: i64 = sqlx::query_scalar("SELECT id FROM tests")
        .fetch_one(&pool)
        .await
        .unwrap();
    let user_id: i64 = sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash) VALUES ('x', 'x@example.com', 'h') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO test_results (user_id, test_id, score, total_questions, answers_data) VALUES (?, ?, 0, 1, '[]')",
    )
    .bind(user_id)
    .bind(test_id)
    .execute(&pool)
    .await
    .unwrap();

    // History blocks the delete
    let blocked = sqlx::query("DELETE FROM tests WHERE id = ?")
        .bind(test_id)
        .execute(&pool)
        .await;
    assert!(blocked.is_err());

    // Without history the questions go with the test
    sqlx::query("DELETE FROM test_results").execute(&pool).await.unwrap();
    sqlx::query("DELETE FROM tests WHERE id = ?")
        .bind(test_id)
        .execute(&pool)
        .await
        .unwrap();
    assert_eq!(counts(&pool).await, (0, 0));
}

#[tokio::test]
async fn seed_user_is_created_once() {
    let pool = test_pool().await;
    let seed = testprep::config::SeedUser {
        username: "admin".to_string(),
        email: "admin@example.com".to_string(),
        password: "adminpassword".to_string(),
    };

    bootstrap::seed_user(&pool, &seed).await.unwrap();
    bootstrap::seed_user(&pool, &seed).await.unwrap();

    let hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE username = 'admin'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(testprep::utils::hash::verify_password("adminpassword", &hash).unwrap());

    let store = bootstrap::store_counts(&pool).await.unwrap();
    assert_eq!(store.users, 1);
}
