mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::*;

#[tokio::test]
async fn profile_update_changes_contact_details_only() {
    let app = test_app();
    let token = register(&app, "Binh", "binh@example.com", "secret1").await;

    let (status, body) = put(
        &app,
        "/api/users/profile",
        Some(&token),
        json!({ "name": "Binh Tran", "phone": "0901234567", "address": "12 Le Loi" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("Binh Tran"));
    assert_eq!(body["data"]["phone"], json!("0901234567"));
    assert_eq!(body["data"]["address"], json!("12 Le Loi"));
    // Role is not patchable from the profile endpoint
    assert_eq!(body["data"]["role"], json!("customer"));

    let (status, _) = put(&app, "/api/users/profile", None, json!({ "name": "X" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_directory_is_admin_only() {
    let app = test_app();
    let admin = bootstrap_admin(&app).await;
    let customer = register(&app, "Binh", "binh@example.com", "secret1").await;

    let (status, _) = get(&app, "/api/users", Some(&customer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = get(&app, "/api/users", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(2));
    for user in body["data"].as_array().expect("users") {
        assert!(user.get("passwordHash").is_none());
    }

    let (status, _) = get(&app, &format!("/api/users/{}", Uuid::new_v4()), Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_can_provision_accounts() {
    let app = test_app();
    let admin = bootstrap_admin(&app).await;

    let (status, body) = post(
        &app,
        "/api/users",
        Some(&admin),
        json!({
            "name": "Staff",
            "email": "staff@example.com",
            "password": "staffpass",
            "role": "admin",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], json!("admin"));

    // Provisioned credentials work against the regular login
    let (status, _) = post(
        &app,
        "/api/auth/login",
        None,
        json!({ "email": "staff@example.com", "password": "staffpass" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Duplicate provisioning is refused
    let (status, _) = post(
        &app,
        "/api/users",
        Some(&admin),
        json!({ "name": "Dup", "email": "staff@example.com", "password": "staffpass" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn role_promotion_through_admin_update() {
    let app = test_app();
    let admin = bootstrap_admin(&app).await;
    let token = register(&app, "Binh", "binh@example.com", "secret1").await;

    let (_, body) = get(&app, "/api/auth/me", Some(&token)).await;
    let id = body["data"]["id"].as_str().expect("id").to_string();

    // Customer cannot use the admin panel yet
    let (status, _) = get(&app, "/api/users", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = put(
        &app,
        &format!("/api/users/{}", id),
        Some(&admin),
        json!({ "role": "admin" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], json!("admin"));

    // The role check reads the stored user, so the old token now passes
    let (status, _) = get(&app, "/api/users", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post(
        &app,
        "/api/auth/admin-login",
        None,
        json!({ "email": "binh@example.com", "password": "secret1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_delete_removes_the_account() {
    let app = test_app();
    let admin = bootstrap_admin(&app).await;
    let token = register(&app, "Binh", "binh@example.com", "secret1").await;

    let (_, body) = get(&app, "/api/auth/me", Some(&token)).await;
    let id = body["data"]["id"].as_str().expect("id").to_string();

    let (status, _) = delete(&app, &format!("/api/users/{}", id), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, &format!("/api/users/{}", id), Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete(&app, &format!("/api/users/{}", id), Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(&app, "/api/users", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(1));
}
