// Runs the real reqwest client against a throwaway axum server that mimics the
// inventory backend's four endpoints.

use std::{
    collections::HashMap,
    net::TcpListener,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use catalog_capture::{
    models::{DisplayRegistry, PhotoRecord},
    ClientConfig, HttpInventoryApi, PersistenceClient, ProductDraft, SaveError, UploadError,
    UploadPipeline,
};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
struct ReceivedPart {
    name: String,
    file_name: String,
    content_type: String,
    len: usize,
}

#[derive(Default)]
struct Backend {
    parts: Mutex<Vec<ReceivedPart>>,
    saves: Mutex<Vec<Value>>,
    queries: Mutex<Vec<HashMap<String, String>>>,
}

type Shared = Arc<Backend>;

async fn from_images(State(backend): State<Shared>, mut multipart: Multipart) -> Json<Value> {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let len = field.bytes().await.unwrap().len();
        backend.parts.lock().unwrap().push(ReceivedPart {
            name,
            file_name,
            content_type,
            len,
        });
    }
    Json(json!({
        "product": {"name": "Leche Gloria", "brand": "Gloria", "size": "1L", "price": 4.5},
        "confidence": 0.82,
        "missing_fields": ["barcode"],
        "duplicates": [
            {"name": "Leche Gloria Light", "brand": "Gloria", "similarity": 0.91, "id": 3}
        ]
    }))
}

async fn save(
    State(backend): State<Shared>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    backend.saves.lock().unwrap().push(body.clone());
    match body["barcode"].as_str() {
        Some("0000") => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "A product with this barcode already exists"})),
        )),
        _ => Ok(Json(json!({"id": 42, "product": body, "message": "saved"}))),
    }
}

async fn products(
    State(backend): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    backend.queries.lock().unwrap().push(query);
    Json(json!([{"id": 42, "name": "Leche Gloria", "brand": "Gloria", "size": "1L"}]))
}

async fn voice_confirm(Json(body): Json<Value>) -> Vec<u8> {
    assert_eq!(body["product_name"], "Leche Gloria");
    b"ID3fake".to_vec()
}

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn start_backend() -> (ClientConfig, Shared) {
    let backend = Shared::default();
    let app = Router::new()
        .route("/inventory/from-images", post(from_images))
        .route("/inventory/save", post(save))
        .route("/inventory/products", get(products))
        .route("/inventory/voice/confirm", post(voice_confirm))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ClientConfig {
        api_url: format!("http://127.0.0.1:{port}"),
        ..Default::default()
    };
    (config, backend)
}

fn jpeg(registry: &DisplayRegistry, step: &str) -> PhotoRecord {
    PhotoRecord::new(step, vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0xD9], registry.issue())
}

#[tokio::test]
async fn extraction_upload_is_multipart_named_by_step() {
    let (config, backend) = start_backend().await;
    let api = Arc::new(HttpInventoryApi::new(config.clone()).unwrap());
    let pipeline = UploadPipeline::new(api, config.progress.clone());

    let registry = DisplayRegistry::new();
    let photos: Vec<_> = ["front", "left", "right", "back"]
        .into_iter()
        .map(|step| jpeg(&registry, step))
        .collect();

    let result = pipeline.submit(&photos, config.request_deadline()).await.unwrap();
    assert_eq!(result.product.price.as_deref(), Some("4.5"));
    assert_eq!(result.duplicates[0].similarity_percent(), 91);

    let parts = backend.parts.lock().unwrap().clone();
    let names: Vec<_> = parts.iter().map(|p| (p.name.as_str(), p.file_name.as_str())).collect();
    assert_eq!(
        names,
        [
            ("photo_0", "front.jpg"),
            ("photo_1", "left.jpg"),
            ("photo_2", "right.jpg"),
            ("photo_3", "back.jpg"),
        ]
    );
    assert!(parts.iter().all(|p| p.content_type == "image/jpeg" && p.len == 8));
}

#[tokio::test]
async fn save_sends_nulls_and_surfaces_server_detail() {
    let (config, backend) = start_backend().await;
    let client = PersistenceClient::new(Arc::new(HttpInventoryApi::new(config).unwrap()));

    let draft = ProductDraft {
        name: "Leche Gloria".into(),
        brand: "Gloria".into(),
        size: "1L".into(),
        price: "4,50".into(),
        expiry_date: "31/12/2026".into(),
        ..Default::default()
    };
    let saved = client.save(&draft).await.unwrap();
    assert_eq!(saved.id, 42);

    let body = backend.saves.lock().unwrap()[0].clone();
    assert_eq!(body["price"], json!(4.5));
    assert_eq!(body["expiry_date"], "2026-12-31");
    assert_eq!(body["barcode"], Value::Null);
    assert_eq!(body["description"], Value::Null);

    let duplicate = ProductDraft {
        barcode: "0000".into(),
        ..draft
    };
    assert_eq!(
        client.save(&duplicate).await,
        Err(SaveError::Rejected {
            status: 400,
            message: "A product with this barcode already exists".into()
        })
    );
}

#[tokio::test]
async fn listing_and_voice_confirmation() {
    let (config, backend) = start_backend().await;
    let client = PersistenceClient::new(Arc::new(HttpInventoryApi::new(config).unwrap()));

    let products = client.list_products(0, 100).await.unwrap();
    assert_eq!(products[0].name, "Leche Gloria");
    let query = backend.queries.lock().unwrap()[0].clone();
    assert_eq!(query.get("skip").map(String::as_str), Some("0"));
    assert_eq!(query.get("limit").map(String::as_str), Some("100"));

    assert_eq!(client.voice_confirm("Leche Gloria").await.as_deref(), Some(&b"ID3fake"[..]));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_failure() {
    let config = ClientConfig {
        api_url: format!("http://127.0.0.1:{}", free_port()),
        ..Default::default()
    };
    let api = Arc::new(HttpInventoryApi::new(config.clone()).unwrap());
    let pipeline = UploadPipeline::new(api.clone(), config.progress.clone());

    let registry = DisplayRegistry::new();
    let err = pipeline
        .submit(&[jpeg(&registry, "front")], Duration::from_secs(30))
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::NetworkFailure { .. }), "{err:?}");

    let client = PersistenceClient::new(api);
    assert_eq!(client.voice_confirm("Leche Gloria").await, None);
}
