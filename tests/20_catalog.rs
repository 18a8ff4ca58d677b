mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::*;

#[tokio::test]
async fn category_mutations_are_admin_only() {
    let app = test_app();
    bootstrap_admin(&app).await;
    let customer_token = register(&app, "Binh", "binh@example.com", "secret1").await;

    let payload = json!({ "name": "Shoes" });
    let (status, _) = post(&app, "/api/categories", None, payload.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = post(&app, "/api/categories", Some(&customer_token), payload).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn category_slug_derivation_and_override() {
    let app = test_app();
    let admin = bootstrap_admin(&app).await;

    let shoes = create_category(&app, &admin, "Shoes").await;
    assert_eq!(shoes["slug"], json!("shoes"));

    // Renaming without an explicit slug re-derives it
    let id = shoes["id"].as_str().expect("id");
    let (status, body) = put(
        &app,
        &format!("/api/categories/{}", id),
        Some(&admin),
        json!({ "name": "Running Shoes" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("Running Shoes"));
    assert_eq!(body["data"]["slug"], json!("running-shoes"));

    // An explicit slug wins over derivation
    let (status, body) = put(
        &app,
        &format!("/api/categories/{}", id),
        Some(&admin),
        json!({ "name": "Trail Shoes", "slug": "trail" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], json!("trail"));

    // A whitespace-only slug counts as absent: the rename re-derives
    let (status, body) = put(
        &app,
        &format!("/api/categories/{}", id),
        Some(&admin),
        json!({ "name": "Hiking Boots", "slug": "  " }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("Hiking Boots"));
    assert_eq!(body["data"]["slug"], json!("hiking-boots"));
}

#[tokio::test]
async fn duplicate_category_slug_is_rejected() {
    let app = test_app();
    let admin = bootstrap_admin(&app).await;
    create_category(&app, &admin, "Shoes").await;

    let (status, body) = post(
        &app,
        "/api/categories",
        Some(&admin),
        json!({ "name": "Other", "slug": "shoes" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn category_list_and_missing_lookup() {
    let app = test_app();
    let admin = bootstrap_admin(&app).await;
    create_category(&app, &admin, "Shoes").await;
    create_category(&app, &admin, "Bags").await;

    let (status, body) = get(&app, "/api/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(2));

    let (status, _) = get(&app, &format!("/api/categories/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_category_clears_product_references() {
    let app = test_app();
    let admin = bootstrap_admin(&app).await;
    let category = create_category(&app, &admin, "Shoes").await;
    let category_id = category["id"].as_str().expect("id");

    let product = create_product(&app, &admin, "Runner", 10, 150000).await;
    let product_id = product["id"].as_str().expect("id");
    let (status, body) = put(
        &app,
        &format!("/api/products/{}", product_id),
        Some(&admin),
        json!({ "category": category_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["category"], json!(category_id));

    let (status, _) = delete(&app, &format!("/api/categories/{}", category_id), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);

    // Product survives with the reference nulled out
    let (status, body) = get(&app, &format!("/api/products/{}", product_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["category"], json!(null));

    let (status, _) = delete(&app, &format!("/api/categories/{}", category_id), Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_validation_rules() {
    let app = test_app();
    let admin = bootstrap_admin(&app).await;

    // No images
    let (status, _) = post(
        &app,
        "/api/products",
        Some(&admin),
        json!({ "name": "Bare", "description": "d", "price": 1000, "images": [], "stock": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Negative stock
    let (status, _) = post(
        &app,
        "/api/products",
        Some(&admin),
        json!({ "name": "Neg", "description": "d", "price": 1000, "images": ["/i.jpg"], "stock": -1 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Name over 100 characters
    let long_name = "x".repeat(101);
    let (status, _) = post(
        &app,
        "/api/products",
        Some(&admin),
        json!({ "name": long_name, "description": "d", "price": 1000, "images": ["/i.jpg"], "stock": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Negative price
    let (status, _) = post(
        &app,
        "/api/products",
        Some(&admin),
        json!({ "name": "Cheap", "description": "d", "price": -5, "images": ["/i.jpg"], "stock": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn product_crud_and_public_reads() {
    let app = test_app();
    let admin = bootstrap_admin(&app).await;

    let product = create_product(&app, &admin, "Runner", 10, 250000).await;
    let id = product["id"].as_str().expect("id");
    assert_eq!(product["stock"], json!(10));
    assert_eq!(product["price"], json!("250000"));
    assert_eq!(product["isFeatured"], json!(false));

    // Anonymous read
    let (status, body) = get(&app, &format!("/api/products/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("Runner"));

    // Admin update
    let (status, body) = put(
        &app,
        &format!("/api/products/{}", id),
        Some(&admin),
        json!({ "price": 199000, "isFeatured": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], json!("199000"));
    assert_eq!(body["data"]["isFeatured"], json!(true));

    // Delete, then the lookup 404s
    let (status, _) = delete(&app, &format!("/api/products/{}", id), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&app, &format!("/api/products/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_filters() {
    let app = test_app();
    let admin = bootstrap_admin(&app).await;
    let category = create_category(&app, &admin, "Shoes").await;
    let category_id = category["id"].as_str().expect("id");

    let runner = create_product(&app, &admin, "Runner", 10, 250000).await;
    create_product(&app, &admin, "Plain", 10, 100000).await;

    let runner_id = runner["id"].as_str().expect("id");
    let (status, _) = put(
        &app,
        &format!("/api/products/{}", runner_id),
        Some(&admin),
        json!({ "category": category_id, "isFeatured": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(2));

    let (status, body) = get(&app, "/api/products/featured", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["data"][0]["name"], json!("Runner"));

    let (status, body) = get(&app, &format!("/api/products/category/{}", category_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(1));

    let (status, body) = get(&app, &format!("/api/products?category={}", category_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(1));

    let (status, body) = get(&app, "/api/products?featured=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(1));
}

#[tokio::test]
async fn product_mutations_are_admin_only() {
    let app = test_app();
    let admin = bootstrap_admin(&app).await;
    let customer = register(&app, "Binh", "binh@example.com", "secret1").await;
    let product = create_product(&app, &admin, "Runner", 10, 250000).await;
    let id = product["id"].as_str().expect("id");

    let (status, _) = put(
        &app,
        &format!("/api/products/{}", id),
        Some(&customer),
        json!({ "price": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = delete(&app, &format!("/api/products/{}", id), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
