//! Multipart upload tests.
//!
//! Run with: `cargo test -p btechverse-api --test upload_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use btechverse_core::models::{BatchUploadResult, ResourceResponse};
use helpers::{bearer, setup_test_app};

fn pdf(name: &str) -> Part {
    Part::bytes(b"%PDF-1.4 uploaded".to_vec())
        .file_name(name.to_string())
        .mime_type("application/pdf")
}

fn form(title: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("title", title.to_string())
        .add_text("branch", "CSE")
        .add_text("branch", "IT")
        .add_text("category", "Notes")
        .add_text("subject", "Databases")
}

#[tokio::test]
async fn test_admin_upload_creates_record_and_object() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/resources")
        .add_header("Authorization", bearer(&app.admin_token))
        .multipart(form("DBMS Unit 1").add_part("file", pdf("unit1.pdf")))
        .await;
    response.assert_status(StatusCode::CREATED);

    let created: ResourceResponse = response.json();
    assert_eq!(created.title, "DBMS Unit 1");
    assert_eq!(created.branches, vec!["CSE".to_string(), "IT".to_string()]);
    assert_eq!(created.subject.as_deref(), Some("Databases"));
    assert_eq!(created.file_type, "application/pdf");

    let keys = app.storage.keys();
    assert_eq!(keys.len(), 1);
    let key = &keys[0];
    assert!(key.starts_with("resources/CSE/Notes/"), "unexpected key {}", key);
    assert!(key.ends_with("_DBMS_Unit_1.pdf"), "unexpected key {}", key);
    assert_eq!(app.resources.len(), 1);
}

#[tokio::test]
async fn test_upload_requires_token() {
    let app = setup_test_app();
    let response = app
        .client()
        .post("/api/resources")
        .multipart(form("DBMS").add_part("file", pdf("a.pdf")))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert!(app.storage.keys().is_empty());
}

#[tokio::test]
async fn test_upload_by_non_admin_is_forbidden() {
    let app = setup_test_app();
    let response = app
        .client()
        .post("/api/resources")
        .add_header("Authorization", bearer(&app.student_token))
        .multipart(form("DBMS").add_part("file", pdf("a.pdf")))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert!(app.storage.keys().is_empty());
    assert!(app.resources.is_empty());
}

#[tokio::test]
async fn test_upload_rejects_disallowed_type() {
    let app = setup_test_app();
    let zip = Part::bytes(b"PK\x03\x04".to_vec())
        .file_name("notes.zip")
        .mime_type("application/zip");

    let response = app
        .client()
        .post("/api/resources")
        .add_header("Authorization", bearer(&app.admin_token))
        .multipart(form("Zipped").add_part("file", zip))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(app.storage.keys().is_empty());
}

#[tokio::test]
async fn test_upload_without_file_is_rejected() {
    let app = setup_test_app();
    let response = app
        .client()
        .post("/api/resources")
        .add_header("Authorization", bearer(&app.admin_token))
        .multipart(form("Nothing"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_missing_title_is_rejected() {
    let app = setup_test_app();
    let response = app
        .client()
        .post("/api/resources")
        .add_header("Authorization", bearer(&app.admin_token))
        .multipart(
            MultipartForm::new()
                .add_text("branch", "CSE")
                .add_text("category", "Notes")
                .add_part("file", pdf("a.pdf")),
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(app.storage.keys().is_empty());
}

#[tokio::test]
async fn test_batch_upload_reports_each_file() {
    let app = setup_test_app();
    let bad = Part::bytes(Vec::new())
        .file_name("empty.pdf")
        .mime_type("application/pdf");

    let response = app
        .client()
        .post("/api/resources/batch")
        .add_header("Authorization", bearer(&app.admin_token))
        .multipart(
            form("Unit")
                .add_part("file", pdf("u1.pdf"))
                .add_part("file", bad)
                .add_part("file", pdf("u3.pdf")),
        )
        .await;
    response.assert_status_ok();

    let results: Vec<BatchUploadResult> = response.json();
    assert_eq!(results.len(), 3);
    assert!(results[0].success);
    assert!(!results[1].success);
    assert_eq!(results[1].file_name, "empty.pdf");
    assert!(results[1].error.is_some());
    assert!(results[2].success);

    let mut keys = app.storage.keys();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 2);
    assert_eq!(app.resources.len(), 2);
}

#[tokio::test]
async fn test_batch_upload_by_non_admin_is_forbidden() {
    let app = setup_test_app();
    let response = app
        .client()
        .post("/api/resources/batch")
        .add_header("Authorization", bearer(&app.student_token))
        .multipart(form("Unit").add_part("file", pdf("u1.pdf")))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert!(app.storage.keys().is_empty());
}

#[tokio::test]
async fn test_non_admin_rejected_before_form_is_read() {
    let app = setup_test_app();

    for path in ["/api/resources", "/api/resources/batch"] {
        let response = app
            .client()
            .post(path)
            .add_header("Authorization", bearer(&app.student_token))
            .text("not a multipart body")
            .content_type("multipart/form-data; boundary=X")
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = app
            .client()
            .post(path)
            .add_header("Authorization", bearer(&app.admin_token))
            .text("not a multipart body")
            .content_type("multipart/form-data; boundary=X")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
    assert!(app.storage.keys().is_empty());
}

#[tokio::test]
async fn test_batch_upload_accepts_body_over_default_limit() {
    let app = setup_test_app();
    let large_pdf = |name: &str| {
        let mut data = b"%PDF-1.4 ".to_vec();
        data.resize(900 * 1024, b'x');
        Part::bytes(data)
            .file_name(name.to_string())
            .mime_type("application/pdf")
    };

    let response = app
        .client()
        .post("/api/resources/batch")
        .add_header("Authorization", bearer(&app.admin_token))
        .multipart(
            form("Scanned")
                .add_part("file", large_pdf("s1.pdf"))
                .add_part("file", large_pdf("s2.pdf"))
                .add_part("file", large_pdf("s3.pdf")),
        )
        .await;
    response.assert_status_ok();

    let results: Vec<BatchUploadResult> = response.json();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.success));
    assert_eq!(app.resources.len(), 3);
}

#[tokio::test]
async fn test_batch_upload_caps_file_count() {
    let app = setup_test_app();
    let mut many = form("Unit");
    for i in 0..11 {
        many = many.add_part("file", pdf(&format!("u{}.pdf", i)));
    }

    let response = app
        .client()
        .post("/api/resources/batch")
        .add_header("Authorization", bearer(&app.admin_token))
        .multipart(many)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(app.storage.keys().is_empty());
}

#[tokio::test]
async fn test_uploaded_resource_can_be_viewed() {
    let app = setup_test_app();
    let created: ResourceResponse = app
        .client()
        .post("/api/resources")
        .add_header("Authorization", bearer(&app.admin_token))
        .multipart(form("Viewable Notes").add_part("file", pdf("v.pdf")))
        .await
        .json();

    let signed: serde_json::Value = app
        .client()
        .get(&format!("/api/resources/{}/view", created.id))
        .await
        .json();
    let url = signed["url"].as_str().unwrap();
    assert_eq!(
        app.storage.resolve_signed_url(url).as_deref(),
        Some(&b"%PDF-1.4 uploaded"[..])
    );
}
