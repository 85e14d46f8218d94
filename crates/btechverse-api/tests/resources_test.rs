//! Resource catalogue and deletion tests.
//!
//! Run with: `cargo test -p btechverse-api --test resources_test`

mod helpers;

use axum::http::StatusCode;
use btechverse_core::models::{DeleteOutcome, ResourceResponse, ResourceStats};
use helpers::{bearer, setup_test_app};
use uuid::Uuid;

#[tokio::test]
async fn test_health() {
    let app = setup_test_app();
    let response = app.client().get("/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_list_filters_by_branch_and_category() {
    let app = setup_test_app();
    app.seed("DBMS Notes", "CSE", "Notes", "resources/CSE/Notes/1_DBMS_Notes.pdf");
    app.seed("Signals PYQ", "ECE", "PYQ", "resources/ECE/PYQ/2_Signals_PYQ.pdf");
    app.seed("OS Notes", "CSE", "Notes", "resources/CSE/Notes/3_OS_Notes.pdf");

    let all: Vec<ResourceResponse> = app.client().get("/api/resources").await.json();
    assert_eq!(all.len(), 3);

    let cse: Vec<ResourceResponse> = app
        .client()
        .get("/api/resources")
        .add_query_param("branch", "CSE")
        .await
        .json();
    assert_eq!(cse.len(), 2);
    assert!(cse.iter().all(|r| r.branches.contains(&"CSE".to_string())));

    let pyq: Vec<ResourceResponse> = app
        .client()
        .get("/api/resources")
        .add_query_param("category", "PYQ")
        .await
        .json();
    assert_eq!(pyq.len(), 1);
    assert_eq!(pyq[0].title, "Signals PYQ");
}

#[tokio::test]
async fn test_recent_returns_newest_first() {
    let app = setup_test_app();
    app.seed("First", "CSE", "Notes", "resources/CSE/Notes/1_First.pdf");
    app.seed("Second", "CSE", "Notes", "resources/CSE/Notes/2_Second.pdf");
    app.seed("Third", "CSE", "Notes", "resources/CSE/Notes/3_Third.pdf");

    let recent: Vec<ResourceResponse> = app
        .client()
        .get("/api/resources")
        .add_query_param("recent", 2)
        .await
        .json();
    let titles: Vec<&str> = recent.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Third", "Second"]);
}

#[tokio::test]
async fn test_search_matches_title_case_insensitively() {
    let app = setup_test_app();
    app.seed("Database Systems", "CSE", "Notes", "resources/CSE/Notes/1_Database.pdf");
    app.seed("Digital Electronics", "ECE", "Notes", "resources/ECE/Notes/2_Digital.pdf");

    let found: Vec<ResourceResponse> = app
        .client()
        .get("/api/resources/search")
        .add_query_param("q", "DATABASE")
        .await
        .json();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Database Systems");

    let blank: Vec<ResourceResponse> = app
        .client()
        .get("/api/resources/search")
        .add_query_param("q", "  ")
        .await
        .json();
    assert_eq!(blank.len(), 2);
}

#[tokio::test]
async fn test_stats_counts_branches() {
    let app = setup_test_app();
    app.seed("A", "CSE", "Notes", "resources/CSE/Notes/1_A.pdf");
    app.seed("B", "CSE", "PYQ", "resources/CSE/PYQ/2_B.pdf");
    app.seed("C", "ECE", "Notes", "resources/ECE/Notes/3_C.pdf");

    let stats: ResourceStats = app.client().get("/api/resources/stats").await.json();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_branch.get("CSE"), Some(&2));
    assert_eq!(stats.by_branch.get("ECE"), Some(&1));
}

#[tokio::test]
async fn test_get_unknown_resource_is_404() {
    let app = setup_test_app();
    let response = app
        .client()
        .get(&format!("/api/resources/{}", Uuid::new_v4()))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_requires_token() {
    let app = setup_test_app();
    let record = app.seed("A", "CSE", "Notes", "resources/CSE/Notes/1_A.pdf");

    let response = app
        .client()
        .delete(&format!("/api/resources/{}", record.id))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(app.resources.len(), 1);
}

#[tokio::test]
async fn test_delete_by_non_admin_is_forbidden() {
    let app = setup_test_app();
    let key = "resources/CSE/Notes/1_A.pdf";
    let record = app.seed("A", "CSE", "Notes", key);

    let response = app
        .client()
        .delete(&format!("/api/resources/{}", record.id))
        .add_header("Authorization", bearer(&app.student_token))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(app.resources.len(), 1);
    assert!(app.storage.contains(key));
}

#[tokio::test]
async fn test_admin_delete_removes_record_then_object() {
    let app = setup_test_app();
    let key = "resources/CSE/Notes/1_A.pdf";
    let record = app.seed("A", "CSE", "Notes", key);

    let response = app
        .client()
        .delete(&format!("/api/resources/{}", record.id))
        .add_header("Authorization", bearer(&app.admin_token))
        .await;
    response.assert_status_ok();
    let outcome: DeleteOutcome = response.json();
    assert_eq!(outcome.record_id, record.id);
    assert!(outcome.object_deleted);
    assert!(app.resources.is_empty());
    assert!(!app.storage.contains(key));
}

#[tokio::test]
async fn test_delete_succeeds_when_object_delete_fails() {
    let app = setup_test_app();
    let key = "resources/CSE/Notes/1_A.pdf";
    let record = app.seed("A", "CSE", "Notes", key);
    app.storage.fail_deletes(true);

    let response = app
        .client()
        .delete(&format!("/api/resources/{}", record.id))
        .add_header("Authorization", bearer(&app.admin_token))
        .await;
    response.assert_status_ok();
    let outcome: DeleteOutcome = response.json();
    assert!(!outcome.object_deleted);
    assert!(app.resources.is_empty());
}

#[tokio::test]
async fn test_student_counter_increments() {
    let app = setup_test_app();
    let first: serde_json::Value = app.client().post("/api/students/visit").await.json();
    let second: serde_json::Value = app.client().post("/api/students/visit").await.json();
    assert_eq!(first["count"], 1);
    assert_eq!(second["count"], 2);

    let count: serde_json::Value = app.client().get("/api/students/count").await.json();
    assert_eq!(count["count"], 2);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app();
    let response = app.client().get("/api/openapi.json").await;
    response.assert_status_ok();
    let spec: serde_json::Value = response.json();
    assert!(spec["paths"]["/api/resources/{id}/view"].is_object());
}
