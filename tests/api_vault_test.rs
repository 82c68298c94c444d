//! Tests for hidden categories and /api/vault endpoints.

mod common;

use axum::http::StatusCode;
use common::{fixtures, TestApp};
use inkframe::models::VAULT_PASSWORD_HEADER;
use pretty_assertions::assert_eq;

const UNLOCKED: [(&str, &str); 1] = [(VAULT_PASSWORD_HEADER, fixtures::VAULT_PASSWORD)];

/// Gallery with `beach` in `travel`, `diary` in hidden `private`, `desk`
/// unassigned
async fn gallery_with_vault() -> TestApp {
    let app = TestApp::new();
    for name in ["beach.png", "diary.png", "desk.png"] {
        app.upload_ok(name, fixtures::png_photo(8, 8)).await;
    }
    app.put_json("/api/images/beach/category", r#"{"category": "travel"}"#)
        .await;
    app.put_json("/api/images/diary/category", r#"{"category": "private"}"#)
        .await;

    let response = app.post("/api/vault/private", &UNLOCKED).await;
    common::assert_ok(&response);
    app
}

fn unlock_body(password: &str) -> String {
    serde_json::json!({ "password": password }).to_string()
}

#[tokio::test]
async fn test_unlock_with_correct_password() {
    let app = gallery_with_vault().await;

    let response = app
        .post_json("/api/vault/unlock", &[], &unlock_body(fixtures::VAULT_PASSWORD))
        .await;
    common::assert_ok(&response);
    let json: serde_json::Value = response.json();
    assert_eq!(json["unlocked"], true);
    assert_eq!(json["hidden"], serde_json::json!(["private"]));
}

#[tokio::test]
async fn test_unlock_with_wrong_password() {
    let app = gallery_with_vault().await;

    let response = app
        .post_json("/api/vault/unlock", &[], &unlock_body("guess"))
        .await;
    let message = common::assert_error(&response, StatusCode::FORBIDDEN);
    assert_eq!(message, "Incorrect vault password");
}

#[tokio::test]
async fn test_unlock_without_configured_password() {
    let app = TestApp::with_config(|config| config.vault.password = None);

    let response = app.post_json("/api/vault/unlock", &[], &unlock_body("")).await;
    common::assert_error(&response, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_hidden_images_not_listed_when_locked() {
    let app = gallery_with_vault().await;

    let names = common::listed_names(&app.get("/api/images").await);
    assert_eq!(names, vec!["beach", "desk"]);

    let categories = common::listed_categories(&app.get("/api/categories").await);
    assert_eq!(categories, vec!["default", "travel"]);
}

#[tokio::test]
async fn test_hidden_images_listed_when_unlocked() {
    let app = gallery_with_vault().await;

    let names = common::listed_names(&app.get_unlocked("/api/images").await);
    assert_eq!(names, vec!["beach", "desk", "diary"]);

    let categories = common::listed_categories(&app.get_unlocked("/api/categories").await);
    assert_eq!(categories, vec!["default", "private", "travel"]);
}

#[tokio::test]
async fn test_wrong_header_password_is_locked() {
    let app = gallery_with_vault().await;

    let response = app
        .get_with_headers("/api/images", &[(VAULT_PASSWORD_HEADER, "nope")])
        .await;
    assert_eq!(common::listed_names(&response), vec!["beach", "desk"]);
}

#[tokio::test]
async fn test_locked_filter_on_hidden_category_falls_back_to_default() {
    let app = gallery_with_vault().await;

    let response = app.get("/api/images?category=private").await;
    assert_eq!(common::listed_names(&response), vec!["desk"]);
    let json: serde_json::Value = response.json();
    assert_eq!(json["category"], "default");

    let response = app.get_unlocked("/api/images?category=private").await;
    assert_eq!(common::listed_names(&response), vec!["diary"]);
}

#[tokio::test]
async fn test_hide_requires_password() {
    let app = gallery_with_vault().await;

    let response = app.post("/api/vault/travel", &[]).await;
    common::assert_error(&response, StatusCode::FORBIDDEN);

    let names = common::listed_names(&app.get("/api/images").await);
    assert!(names.contains(&"beach".to_string()));
}

#[tokio::test]
async fn test_default_category_cannot_be_hidden() {
    let app = TestApp::new();

    let response = app.post("/api/vault/default", &UNLOCKED).await;
    common::assert_error(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unhide_category() {
    let app = gallery_with_vault().await;

    let response = app.delete("/api/vault/private", &UNLOCKED).await;
    common::assert_ok(&response);

    let names = common::listed_names(&app.get("/api/images").await);
    assert_eq!(names, vec!["beach", "desk", "diary"]);
}

#[tokio::test]
async fn test_unhide_requires_password() {
    let app = gallery_with_vault().await;

    let response = app.delete("/api/vault/private", &[]).await;
    common::assert_error(&response, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_vault_document_is_persisted() {
    let app = gallery_with_vault().await;

    let doc = std::fs::read_to_string(app.config.vault_file()).unwrap();
    let hidden: Vec<String> = serde_json::from_str(&doc).unwrap();
    assert_eq!(hidden, vec!["private"]);
}

#[tokio::test]
async fn test_locked_delete_of_hidden_category_is_not_found() {
    let app = gallery_with_vault().await;

    let response = app.delete("/api/categories/private", &[]).await;
    common::assert_error(&response, StatusCode::NOT_FOUND);

    // The vaulted image stays out of public listings
    let names = common::listed_names(&app.get("/api/images").await);
    assert_eq!(names, vec!["beach", "desk"]);
    let names = common::listed_names(&app.get_unlocked("/api/images?category=private").await);
    assert_eq!(names, vec!["diary"]);

    let response = app.delete("/api/categories/private", &UNLOCKED).await;
    common::assert_ok(&response);
    let names = common::listed_names(&app.get("/api/images").await);
    assert_eq!(names, vec!["beach", "desk", "diary"]);
}

#[tokio::test]
async fn test_locked_caller_cannot_touch_vaulted_image() {
    let app = gallery_with_vault().await;

    let response = app
        .put_json("/api/images/diary/category", r#"{"category": "default"}"#)
        .await;
    common::assert_error(&response, StatusCode::NOT_FOUND);

    let response = app.get("/api/images/diary/thumbnail").await;
    common::assert_error(&response, StatusCode::NOT_FOUND);

    let response = app.post("/api/images/diary/show", &[]).await;
    common::assert_error(&response, StatusCode::NOT_FOUND);
    assert!(!app.panel_file("frame.bin").exists());

    let response = app.delete("/api/images/diary", &[]).await;
    common::assert_error(&response, StatusCode::NOT_FOUND);
    assert!(app.image_file("diary").exists());

    let names = common::listed_names(&app.get_unlocked("/api/images?category=private").await);
    assert_eq!(names, vec!["diary"]);
}

#[tokio::test]
async fn test_locked_caller_cannot_move_image_into_vault() {
    let app = gallery_with_vault().await;

    let response = app
        .put_json("/api/images/desk/category", r#"{"category": "private"}"#)
        .await;
    common::assert_error(&response, StatusCode::NOT_FOUND);
    assert_eq!(
        app.gallery.get_category("desk").unwrap().to_string(),
        "default"
    );
}

#[tokio::test]
async fn test_unlocked_caller_manages_vaulted_image() {
    let app = gallery_with_vault().await;

    let response = app.get_with_headers("/api/images/diary/thumbnail", &UNLOCKED).await;
    common::assert_bmp(&response);

    let response = app.post("/api/images/diary/show", &UNLOCKED).await;
    common::assert_ok(&response);

    let response = app
        .put_json_with_headers(
            "/api/images/diary/category",
            &UNLOCKED,
            r#"{"category": "travel"}"#,
        )
        .await;
    common::assert_ok(&response);
    let names = common::listed_names(&app.get("/api/images?category=travel").await);
    assert_eq!(names, vec!["beach", "diary"]);
}
