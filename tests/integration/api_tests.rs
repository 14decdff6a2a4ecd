//! API integration tests

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated client
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@trackit.local",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Helper to create an asset and return its id
async fn create_test_asset(client: &Client, token: &str, name: &str) -> i64 {
    let response = client
        .post(format!("{}/assets", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": name,
            "category": "laptop",
            "condition": "good"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No asset ID")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@trackit.local",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@trackit.local",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/assets", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_create_asset_generates_tag() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/assets", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": "MacBook Pro 14",
            "category": "laptop"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let tag = body["tag"].as_str().expect("No tag in response");
    assert!(tag.starts_with("IT-LT-"), "unexpected tag {}", tag);
    assert_eq!(body["status"], "available");
    assert_eq!(body["condition"], "good");

    // Cleanup
    let asset_id = body["id"].as_i64().expect("No asset ID");
    let _ = client
        .delete(format!("{}/assets/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_create_asset_rejects_bad_tag() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/assets", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": "Bad Tag Asset",
            "category": "laptop",
            "tag": "LAPTOP-42"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["field"], "tag");
}

#[tokio::test]
#[ignore]
async fn test_assign_and_return_asset() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let asset_id = create_test_asset(&client, &token, "Assignment Flow Laptop").await;

    // Assign to the admin user (id 1 in seed data)
    let response = client
        .post(format!("{}/assignments", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "asset_id": asset_id,
            "user_id": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let assignment_id = body["id"].as_i64().expect("No assignment ID");
    assert_eq!(body["is_active"], true);

    // Asset must now be assigned
    let response = client
        .get(format!("{}/assets/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "assigned");

    // Second active assignment on the same asset must conflict
    let response = client
        .post(format!("{}/assignments", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "asset_id": asset_id,
            "user_id": 1
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // Return the assignment
    let response = client
        .post(format!("{}/assignments/{}/return", BASE_URL, assignment_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "actual_return_condition": "good" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["is_active"], false);
    assert_eq!(body["status"], "returned");
    assert!(body["returned_at"].is_string());

    // Asset is available again
    let response = client
        .get(format!("{}/assets/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "available");

    // Cleanup
    let _ = client
        .delete(format!("{}/assets/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_assignment_rejects_past_return_date() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let asset_id = create_test_asset(&client, &token, "Past Date Laptop").await;

    let response = client
        .post(format!("{}/assignments", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "asset_id": asset_id,
            "user_id": 1,
            "expected_return_at": "2020-01-01T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["field"], "expected_return_at");

    let _ = client
        .delete(format!("{}/assets/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_bulk_delete_partial_failure() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let free_id = create_test_asset(&client, &token, "Bulk Free Laptop").await;
    let held_id = create_test_asset(&client, &token, "Bulk Held Laptop").await;

    // Give the second asset an active assignment so its delete fails
    let response = client
        .post(format!("{}/assignments", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "asset_id": held_id, "user_id": 1 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let assignment_id = body["id"].as_i64().expect("No assignment ID");

    let response = client
        .post(format!("{}/assets/bulk", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "operation": "delete",
            "asset_ids": [free_id, held_id]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total_assets"], 2);
    assert_eq!(body["successful_assets"], 1);
    assert_eq!(body["failed_assets"], 1);
    assert_eq!(body["errors"][0]["id"], held_id);

    // Cleanup
    let _ = client
        .post(format!("{}/assignments/{}/return", BASE_URL, assignment_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({}))
        .send()
        .await;
    let _ = client
        .delete(format!("{}/assets/{}", BASE_URL, held_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_bulk_missing_id_rejected_up_front() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let asset_id = create_test_asset(&client, &token, "Bulk Missing Laptop").await;

    let response = client
        .post(format!("{}/assets/bulk", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "operation": "status_change",
            "asset_ids": [asset_id, 999999],
            "data": { "status": "repair" }
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    // The existing asset must be untouched
    let response = client
        .get(format!("{}/assets/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "available");

    let _ = client
        .delete(format!("{}/assets/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_duplicate_tag_conflict_performs_no_write() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/assets", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": "Tag Holder Laptop",
            "category": "laptop",
            "tag": "IT-ZZ-9317"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let asset_id = body["id"].as_i64().expect("No asset ID");

    // Same tag in a different case must conflict on the live-tag index
    let response = client
        .post(format!("{}/assets", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": "Tag Thief Laptop",
            "category": "laptop",
            "tag": "it-zz-9317"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["field"], "tag");

    // The rejected create must not have left a row behind
    let response = client
        .get(format!("{}/assets?search=IT-ZZ-9317", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 1);

    let _ = client
        .delete(format!("{}/assets/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_user_assignment_cap() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let mut asset_ids = Vec::new();
    for i in 0..6 {
        asset_ids.push(create_test_asset(&client, &token, &format!("Cap Laptop {}", i)).await);
    }

    // First five assignments to the same user go through
    let mut assignment_ids = Vec::new();
    for &asset_id in &asset_ids[..5] {
        let response = client
            .post(format!("{}/assignments", BASE_URL))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "asset_id": asset_id, "user_id": 1 }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 201);
        let body: Value = response.json().await.expect("Failed to parse response");
        assignment_ids.push(body["id"].as_i64().expect("No assignment ID"));
    }

    // The sixth hits the per-user cap
    let response = client
        .post(format!("{}/assignments", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "asset_id": asset_ids[5], "user_id": 1 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    // The sixth asset must be untouched
    let response = client
        .get(format!("{}/assets/{}", BASE_URL, asset_ids[5]))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "available");

    // Cleanup
    for assignment_id in assignment_ids {
        let _ = client
            .post(format!("{}/assignments/{}/return", BASE_URL, assignment_id))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({}))
            .send()
            .await;
    }
    for asset_id in asset_ids {
        let _ = client
            .delete(format!("{}/assets/{}", BASE_URL, asset_id))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await;
    }
}

#[tokio::test]
#[ignore]
async fn test_assignment_records_handover_location() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let asset_id = create_test_asset(&client, &token, "Located Laptop").await;

    let response = client
        .post(format!("{}/assignments", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "asset_id": asset_id,
            "user_id": 1,
            "building": "HQ North",
            "room": "B12"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let assignment_id = body["id"].as_i64().expect("No assignment ID");

    // The hand-over location lands on the asset record
    let response = client
        .get(format!("{}/assets/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["building"], "HQ North");
    assert_eq!(body["room"], "B12");

    // Cleanup
    let _ = client
        .post(format!("{}/assignments/{}/return", BASE_URL, assignment_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({}))
        .send()
        .await;
    let _ = client
        .delete(format!("{}/assets/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_list_assets() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/assets?page=1&per_page=10", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["assets"].is_array());
    assert!(body["total"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_get_stats() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/reports/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["assets"]["total"].is_number());
    assert!(body["assignments"]["active"].is_number());
    assert!(body["assignments"]["overdue"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_export_assets_csv() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/reports/assets.csv", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    assert!(response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("text/csv"))
        .unwrap_or(false));

    let body = response.text().await.expect("Failed to read body");
    assert!(body.starts_with("tag,name,category,status,condition"));
}

#[tokio::test]
#[ignore]
async fn test_audit_log_records_create() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let asset_id = create_test_asset(&client, &token, "Audited Laptop").await;

    let response = client
        .get(format!(
            "{}/audit-logs?entity_type=asset&entity_id={}",
            BASE_URL, asset_id
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let logs = body.as_array().expect("Expected an array of entries");
    assert!(logs.iter().any(|l| l["action"] == "create"));

    let _ = client
        .delete(format!("{}/assets/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await;
}
