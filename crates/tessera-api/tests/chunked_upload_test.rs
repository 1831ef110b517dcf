//! Chunked upload API integration tests.
//!
//! Run with: `cargo test -p tessera-api --test chunked_upload_test`

mod helpers;

use helpers::fixtures::{create_test_jpeg, sha256_hex, split_chunks};
use helpers::setup_test_app;
use serde_json::json;
use tessera_db::UploadRepository;

#[tokio::test]
async fn test_init_is_idempotent() {
    let app = setup_test_app().await;

    let first = app.init_upload("u1", "photo.jpg", 1000, 4, None).await;
    assert_eq!(first.status_code(), 200);
    let body: serde_json::Value = first.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["upload"]["upload_id"], "u1");
    assert_eq!(body["upload"]["total_chunks"], 4);
    assert_eq!(body["upload"]["completed"], false);

    // Re-registering returns the existing row, not a new one
    let second = app.init_upload("u1", "renamed.png", 9, 9, None).await;
    assert_eq!(second.status_code(), 200);
    let body: serde_json::Value = second.json();
    assert_eq!(body["upload"]["filename"], "photo.jpg");
    assert_eq!(body["upload"]["total_chunks"], 4);
}

#[tokio::test]
async fn test_init_rejects_bad_input() {
    let app = setup_test_app().await;

    let response = app.init_upload("../escape", "a.jpg", 10, 1, None).await;
    assert_eq!(response.status_code(), 400);

    let response = app.init_upload("u1", "a.jpg", 10, 0, None).await;
    assert_eq!(response.status_code(), 400);

    let response = app.init_upload("u1", "", 10, 1, None).await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_status_after_out_of_order_and_duplicate_chunks() {
    let app = setup_test_app().await;
    app.init_upload("u1", "photo.jpg", 1000, 5, None).await;

    // Out of order, with a duplicate post of index 0
    for index in ["4", "0", "2", "0"] {
        let response = app.post_chunk("u1", index, "5", b"payload".to_vec()).await;
        assert_eq!(response.status_code(), 200);
    }

    let response = app.server.get("/uploads/status/u1").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["uploaded"], json!([0, 2, 4]));

    // Recount-based accounting: duplicates never inflate the ledger count
    let upload = app.ledger.get_by_upload_id("u1").await.unwrap().unwrap();
    assert_eq!(upload.uploaded_chunks, 3);
}

#[tokio::test]
async fn test_status_of_unknown_upload_is_empty() {
    let app = setup_test_app().await;

    let response = app.server.get("/uploads/status/nope").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["uploaded"], json!([]));
}

#[tokio::test]
async fn test_chunk_rejects_invalid_fields() {
    let app = setup_test_app().await;

    // Negative index fails integer parsing
    let response = app.post_chunk("u1", "-1", "2", b"x".to_vec()).await;
    assert_eq!(response.status_code(), 400);

    // Zero total
    let response = app.post_chunk("u1", "0", "0", b"x".to_vec()).await;
    assert_eq!(response.status_code(), 400);

    // Empty chunk payload
    let response = app.post_chunk("u1", "0", "2", Vec::new()).await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_chunk_for_unregistered_upload_succeeds() {
    let app = setup_test_app().await;

    // No init call: receipt is still accepted, reconciliation is deferred
    let response = app.post_chunk("ghost", "0", "2", b"bytes".to_vec()).await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["index"], 0);

    let response = app.server.get("/uploads/status/ghost").await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["uploaded"], json!([0]));
}

#[tokio::test]
async fn test_complete_unknown_upload_is_404() {
    let app = setup_test_app().await;

    let response = app.complete(json!({ "upload_id": "nope" })).await;
    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_complete_with_missing_chunks_mutates_nothing() {
    let app = setup_test_app().await;
    app.init_upload("u1", "photo.jpg", 1000, 3, None).await;
    app.post_chunk("u1", "0", "3", b"only one".to_vec()).await;

    let response = app.complete(json!({ "upload_id": "u1" })).await;
    assert_eq!(response.status_code(), 422);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "MISSING_CHUNKS");
    assert_eq!(body["recoverable"], true);

    let upload = app.ledger.get_by_upload_id("u1").await.unwrap().unwrap();
    assert!(!upload.completed);
    assert!(app.service.images_for("u1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_checksum_mismatch_removes_scratch_and_stays_retryable() {
    let app = setup_test_app().await;
    let jpeg = create_test_jpeg(300, 200);

    app.init_upload("u1", "photo.jpg", jpeg.len() as i64, 1, None)
        .await;
    app.post_chunk("u1", "0", "1", jpeg.clone()).await;

    // Wrong checksum supplied at completion time
    let response = app
        .complete(json!({ "upload_id": "u1", "checksum": "0".repeat(64) }))
        .await;
    assert_eq!(response.status_code(), 422);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "CHECKSUM_MISMATCH");
    assert_eq!(body["recoverable"], true);

    // Scratch assembly deleted, ledger untouched, nothing published
    assert!(!app.stored("uploads/u1/assembled/photo.jpg").await);
    assert!(!app.stored("images/u1/original.jpg").await);
    let upload = app.ledger.get_by_upload_id("u1").await.unwrap().unwrap();
    assert!(!upload.completed);

    // Retrying with the right checksum succeeds
    let response = app
        .complete(json!({ "upload_id": "u1", "checksum": sha256_hex(&jpeg) }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["path"], "images/u1/original.jpg");
}

#[tokio::test]
async fn test_checksum_from_init_takes_precedence() {
    let app = setup_test_app().await;
    let jpeg = create_test_jpeg(100, 100);
    let good = sha256_hex(&jpeg);

    app.init_upload("u1", "photo.jpg", jpeg.len() as i64, 1, Some(&good))
        .await;
    app.post_chunk("u1", "0", "1", jpeg).await;

    // A bogus request-time checksum is ignored because init stored one
    let response = app
        .complete(json!({ "upload_id": "u1", "checksum": "f".repeat(64) }))
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_completion_is_idempotent() {
    let app = setup_test_app().await;
    let jpeg = create_test_jpeg(400, 300);

    app.init_upload("u1", "photo.jpg", jpeg.len() as i64, 1, None)
        .await;
    app.post_chunk("u1", "0", "1", jpeg).await;

    let first = app.complete(json!({ "upload_id": "u1" })).await;
    assert_eq!(first.status_code(), 200);
    let body: serde_json::Value = first.json();
    assert_eq!(body["message"], "Upload completed");
    assert_eq!(body["path"], "images/u1/original.jpg");

    let images_after_first = app.service.images_for("u1").await.unwrap().len();

    let second = app.complete(json!({ "upload_id": "u1" })).await;
    assert_eq!(second.status_code(), 200);
    let body: serde_json::Value = second.json();
    assert_eq!(body["message"], "Already completed");
    assert!(body.get("path").is_none() || body["path"].is_null());

    // No duplicate image rows
    assert_eq!(
        app.service.images_for("u1").await.unwrap().len(),
        images_after_first
    );
}

#[tokio::test]
async fn test_end_to_end_variant_derivation() {
    let app = setup_test_app().await;
    let jpeg = create_test_jpeg(1200, 800);

    app.init_upload("u1", "test.jpg", jpeg.len() as i64, 1, None)
        .await;
    app.post_chunk("u1", "0", "1", jpeg).await;

    let response = app.complete(json!({ "upload_id": "u1" })).await;
    assert_eq!(response.status_code(), 200);

    let response = app.server.get("/uploads/u1/images").await;
    assert_eq!(response.status_code(), 200);
    let images: Vec<serde_json::Value> = response.json();
    assert_eq!(images.len(), 4);

    let original = images
        .iter()
        .find(|img| img["variant"] == "original")
        .expect("original row");
    assert_eq!(original["width"], 1200);
    assert_eq!(original["height"], 800);
    assert_eq!(original["path"], "images/u1/original.jpg");

    for label in ["1024", "512", "256"] {
        let row = images
            .iter()
            .find(|img| img["variant"] == label)
            .unwrap_or_else(|| panic!("variant {} missing", label));

        let max: u64 = label.parse().unwrap();
        let width = row["width"].as_u64().unwrap();
        let height = row["height"].as_u64().unwrap();
        assert!(width <= max && height <= max);

        // 1200:800 ratio preserved within rounding
        let ratio = width as f64 / height as f64;
        assert!((ratio - 1.5).abs() < 0.01, "variant {} ratio {}", label, ratio);

        // Variant bytes are on the blob store and decode at the recorded size
        let key = format!("images/u1/variant_{}.jpg", label);
        let bytes = app.stored_bytes(&key).await;
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(
            (decoded.width() as u64, decoded.height() as u64),
            (width, height)
        );
    }
}

#[tokio::test]
async fn test_multi_chunk_assembly_preserves_byte_order() {
    let app = setup_test_app().await;
    let jpeg = create_test_jpeg(900, 600);
    let chunks = split_chunks(&jpeg, 3);
    let total = chunks.len().to_string();
    let checksum = sha256_hex(&jpeg);

    app.init_upload(
        "u1",
        "photo.jpg",
        jpeg.len() as i64,
        chunks.len() as i32,
        Some(&checksum),
    )
    .await;

    // Deliver out of order
    for index in [2usize, 0, 1] {
        let response = app
            .post_chunk("u1", &index.to_string(), &total, chunks[index].clone())
            .await;
        assert_eq!(response.status_code(), 200);
    }

    let response = app.complete(json!({ "upload_id": "u1" })).await;
    assert_eq!(response.status_code(), 200);

    let published = app.stored_bytes("images/u1/original.jpg").await;
    assert_eq!(published, jpeg);
}

#[tokio::test]
async fn test_reuploaded_chunk_assembles_second_bytes() {
    let app = setup_test_app().await;
    let first = create_test_jpeg(200, 100);
    let second = create_test_jpeg(500, 250);

    app.init_upload("u1", "photo.jpg", second.len() as i64, 1, None)
        .await;
    app.post_chunk("u1", "0", "1", first).await;
    app.post_chunk("u1", "0", "1", second.clone()).await;

    let response = app.complete(json!({ "upload_id": "u1" })).await;
    assert_eq!(response.status_code(), 200);

    let published = app.stored_bytes("images/u1/original.jpg").await;
    assert_eq!(published, second);
}

#[tokio::test]
async fn test_entity_link_and_primary_flag_recorded() {
    let app = setup_test_app().await;
    let jpeg = create_test_jpeg(300, 300);

    app.init_upload("u1", "avatar.jpg", jpeg.len() as i64, 1, None)
        .await;
    app.post_chunk("u1", "0", "1", jpeg).await;

    let response = app
        .complete(json!({
            "upload_id": "u1",
            "entity_type": "User",
            "entity_id": 42,
            "is_primary": true,
        }))
        .await;
    assert_eq!(response.status_code(), 200);

    let images = app.service.images_for("u1").await.unwrap();
    assert!(!images.is_empty());
    for image in images {
        assert_eq!(image.entity_type.as_deref(), Some("User"));
        assert_eq!(image.entity_id, Some(42));
        assert!(image.is_primary);
    }
}

#[tokio::test]
async fn test_undecodable_source_still_records_original() {
    let app = setup_test_app().await;
    // Valid chunk bytes, but not an image: variants fail, original row remains
    let data = b"this is not a raster image".to_vec();

    app.init_upload("u1", "broken.jpg", data.len() as i64, 1, None)
        .await;
    app.post_chunk("u1", "0", "1", data).await;

    let response = app.complete(json!({ "upload_id": "u1" })).await;
    assert_eq!(response.status_code(), 200);

    let images = app.service.images_for("u1").await.unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].variant, "original");
    assert_eq!(images[0].width, None);
    assert_eq!(images[0].height, None);
}
