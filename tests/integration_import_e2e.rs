//! End-to-end checks against a running server.
//!
//! Start the binary first (`E2E_BASE_URL` defaults to http://127.0.0.1:3000),
//! then run with `cargo test -- --ignored`.

use once_cell::sync::Lazy;
use serde_json::{Value, json};
use std::time::{SystemTime, UNIX_EPOCH};

static BASE_URL: Lazy<String> = Lazy::new(|| {
    std::env::var("E2E_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string())
});

// Shared test context
struct TestContext {
    client: reqwest::Client,
    base_url: String,
}

impl TestContext {
    fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BASE_URL.clone(),
        }
    }

    fn get_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    fn csv_form(contents: String) -> reqwest::multipart::Form {
        let part = reqwest::multipart::Part::bytes(contents.into_bytes())
            .file_name("students.csv")
            .mime_str("text/csv")
            .unwrap();
        reqwest::multipart::Form::new().part("file", part)
    }
}

#[tokio::test]
#[ignore = "needs a running server"]
async fn test_admin_login_and_import() {
    let context = TestContext::new();
    let timestamp = TestContext::get_timestamp();
    let student = format!("E2E Student {}", timestamp);

    // Step 1: Admin login
    let login_response = context
        .client
        .post(format!("{}/api/admin/login", context.base_url))
        .json(&json!({ "username": "admin", "password": "admin123" }))
        .send()
        .await
        .unwrap();

    assert_eq!(login_response.status().as_u16(), 200, "Login failed");
    let login_body: Value = login_response.json().await.unwrap();
    let token = login_body["sessionToken"].as_str().unwrap().to_string();

    // Step 2: Admin import appends
    let import_response = context
        .client
        .post(format!("{}/api/admin/students/import", context.base_url))
        .bearer_auth(&token)
        .multipart(TestContext::csv_form(format!("name,course\n{},MBA\n", student)))
        .send()
        .await
        .unwrap();

    assert_eq!(import_response.status().as_u16(), 200, "Admin import failed");
    let import_body: Value = import_response.json().await.unwrap();
    assert_eq!(import_body["count"], 1);
    assert_eq!(import_body["students"][0]["batch"], "2024-2026");

    // Step 3: The student is searchable
    let search_response = context
        .client
        .get(format!("{}/api/students", context.base_url))
        .query(&[("search", student.as_str())])
        .send()
        .await
        .unwrap();

    assert_eq!(search_response.status().as_u16(), 200);
    let found: Value = search_response.json().await.unwrap();
    assert_eq!(found.as_array().unwrap().len(), 1);

    // Step 4: Logout invalidates the token
    let logout_response = context
        .client
        .post(format!("{}/api/admin/logout", context.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(logout_response.status().as_u16(), 200);

    let verify_response = context
        .client
        .get(format!("{}/api/admin/verify", context.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(verify_response.status().as_u16(), 401);
}

#[tokio::test]
#[ignore = "needs a running server"]
async fn test_admin_import_requires_session() {
    let context = TestContext::new();

    let response = context
        .client
        .post(format!("{}/api/admin/students/import", context.base_url))
        .multipart(TestContext::csv_form("name\nNobody\n".to_string()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}
