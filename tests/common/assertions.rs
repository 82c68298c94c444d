//! Assertion helpers for tests.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use super::app::TestResponse;

/// Assert response has expected status code
pub fn assert_status(response: &TestResponse, expected: StatusCode) {
    assert_eq!(
        response.status,
        expected,
        "Expected status {}, got {}. Body: {}",
        expected,
        response.status,
        response.text()
    );
}

/// Assert response is OK (200)
pub fn assert_ok(response: &TestResponse) {
    assert_status(response, StatusCode::OK);
}

/// Assert response is a BMP image with the right content type
pub fn assert_bmp(response: &TestResponse) {
    assert_ok(response);
    assert!(
        response.is_bmp(),
        "Expected BMP image, got {} bytes starting with {:?}",
        response.body.len(),
        &response.body[..2.min(response.body.len())]
    );

    let content_type = response
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok());
    assert_eq!(content_type, Some("image/bmp"), "Expected Content-Type: image/bmp");
}

/// Assert an error body of the form `{"status": <code>, "error": "..."}`
pub fn assert_error(response: &TestResponse, expected: StatusCode) -> String {
    assert_status(response, expected);
    let json: serde_json::Value = response.json();
    assert_eq!(
        json["status"].as_u64(),
        Some(expected.as_u16() as u64),
        "Full response: {}",
        serde_json::to_string_pretty(&json).unwrap()
    );
    json["error"]
        .as_str()
        .expect("error message should be a string")
        .to_string()
}

/// Image names from a `/api/images` listing, in order
pub fn listed_names(response: &TestResponse) -> Vec<String> {
    assert_ok(response);
    let json: serde_json::Value = response.json();
    json["images"]
        .as_array()
        .expect("images should be an array")
        .iter()
        .map(|i| i["name"].as_str().unwrap().to_string())
        .collect()
}

/// Category names from a `/api/categories` listing, in order
pub fn listed_categories(response: &TestResponse) -> Vec<String> {
    assert_ok(response);
    let json: serde_json::Value = response.json();
    json["categories"]
        .as_array()
        .expect("categories should be an array")
        .iter()
        .map(|c| c.as_str().unwrap().to_string())
        .collect()
}
