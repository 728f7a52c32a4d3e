#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reviewcache_core::{ApiClient, LocalStore};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::{Request, ResponseTemplate};

pub fn restaurant_json(id: i64, cuisine: &str, neighborhood: &str, updated_at: i64) -> Value {
    json!({
        "id": id,
        "name": format!("Restaurant {}", id),
        "cuisine_type": cuisine,
        "neighborhood": neighborhood,
        "photograph": id.to_string(),
        "latlng": {"lat": 40.7, "lng": -73.9},
        "createdAt": 1504095563444i64,
        "updatedAt": updated_at,
        "is_favorite": "false"
    })
}

pub fn review_json(id: i64, restaurant_id: i64, comments: &str, updated_at: i64) -> Value {
    json!({
        "id": id,
        "restaurant_id": restaurant_id,
        "name": "Ana",
        "rating": 4,
        "comments": comments,
        "createdAt": updated_at,
        "updatedAt": updated_at
    })
}

pub fn client_for(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, Duration::from_secs(5)).expect("client builds")
}

pub async fn temp_store() -> (TempDir, Arc<LocalStore>) {
    let dir = TempDir::new().expect("temp dir");
    let store = LocalStore::open(dir.path()).await.expect("store opens");
    (dir, Arc::new(store))
}

/// A base URL nothing is listening on, so requests fail at connect time.
pub fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

/// Responder that echoes a posted review back with a fresh server id.
pub fn confirm_review() -> impl Fn(&Request) -> ResponseTemplate + Send + Sync {
    let next_id = AtomicI64::new(100);
    move |request: &Request| {
        let mut review: Value = serde_json::from_slice(&request.body).expect("review body is JSON");
        let id = next_id.fetch_add(1, Ordering::SeqCst);
        review["id"] = json!(id);
        review["createdAt"] = json!(1530000000000i64 + id);
        review["updatedAt"] = json!(1530000000000i64 + id);
        ResponseTemplate::new(201).set_body_json(review)
    }
}
