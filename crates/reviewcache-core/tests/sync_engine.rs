mod common;

use std::time::Duration;

use common::{
    client_for, confirm_review, restaurant_json, review_json, temp_store, unreachable_base_url,
};
use reviewcache_core::sync::query::ALL;
use reviewcache_core::{ApiClient, NewReview, SubmitOutcome, SyncEngine, SyncError, Timestamp};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ids<T>(records: &[T], id: impl Fn(&T) -> i64) -> Vec<i64> {
    let mut ids: Vec<i64> = records.iter().map(id).collect();
    ids.sort_unstable();
    ids
}

#[tokio::test]
async fn test_fetch_restaurants_online_then_offline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/restaurants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            restaurant_json(1, "Asian", "Manhattan", 10),
            restaurant_json(2, "Pizza", "Brooklyn", 10),
            restaurant_json(3, "Asian", "Queens", 10),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, store) = temp_store().await;
    let online = SyncEngine::new(client_for(&server.uri()), store.clone());
    let fetched = online.fetch_restaurants().await.unwrap();
    assert_eq!(fetched.len(), 3);

    let offline = SyncEngine::new(client_for(&unreachable_base_url()), store);
    let cached = offline.fetch_restaurants().await.unwrap();
    assert_eq!(ids(&cached, |r| r.id), ids(&fetched, |r| r.id));
    assert_eq!(cached.iter().find(|r| r.id == 2).unwrap().cuisine_type, "Pizza");
}

#[tokio::test]
async fn test_fetch_restaurants_offline_with_empty_store_is_not_found() {
    let (_dir, store) = temp_store().await;
    let engine = SyncEngine::new(client_for(&unreachable_base_url()), store);

    let err = engine.fetch_restaurants().await.unwrap_err();
    assert!(err.is_not_found(), "expected NotFound, got {:?}", err);
}

#[tokio::test]
async fn test_server_error_falls_back_to_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/restaurants"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (_dir, store) = temp_store().await;
    let cached: reviewcache_core::Restaurant =
        serde_json::from_value(restaurant_json(9, "Mexican", "Queens", 5)).unwrap();
    store.put_restaurants([cached]).await.unwrap();

    let engine = SyncEngine::new(client_for(&server.uri()), store);
    let restaurants = engine.fetch_restaurants().await.unwrap();
    assert_eq!(ids(&restaurants, |r| r.id), vec![9]);
}

#[tokio::test]
async fn test_timeout_takes_failure_branch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/restaurants"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let (_dir, store) = temp_store().await;
    let api = ApiClient::new(server.uri(), Duration::from_millis(200)).unwrap();
    let engine = SyncEngine::new(api, store);

    let err = engine.fetch_restaurants().await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_network_data_does_not_overwrite_newer_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/restaurants/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(restaurant_json(1, "Asian", "Old", 50)),
        )
        .mount(&server)
        .await;

    let (_dir, store) = temp_store().await;
    let newer: reviewcache_core::Restaurant =
        serde_json::from_value(restaurant_json(1, "Asian", "New", 100)).unwrap();
    store.put_restaurants([newer]).await.unwrap();

    let engine = SyncEngine::new(client_for(&server.uri()), store.clone());
    let fetched = engine.fetch_restaurant_by_id(1).await.unwrap();
    assert_eq!(fetched.neighborhood, "Old");

    let stored = store.get_restaurant(1).await.unwrap().unwrap();
    assert_eq!(stored.neighborhood, "New");
    assert_eq!(stored.updated_at, Timestamp(100));
}

#[tokio::test]
async fn test_fetch_restaurant_by_id_fallback_and_miss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/restaurants/4"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(restaurant_json(4, "Pizza", "Brooklyn", 1)),
        )
        .mount(&server)
        .await;

    let (_dir, store) = temp_store().await;
    SyncEngine::new(client_for(&server.uri()), store.clone())
        .fetch_restaurant_by_id(4)
        .await
        .unwrap();

    let offline = SyncEngine::new(client_for(&unreachable_base_url()), store);
    assert_eq!(offline.fetch_restaurant_by_id(4).await.unwrap().id, 4);

    let err = offline.fetch_restaurant_by_id(5).await.unwrap_err();
    assert!(matches!(err, SyncError::NotFound(_)));
}

#[tokio::test]
async fn test_reviews_fallback_reads_reviews_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reviews/"))
        .and(query_param("restaurant_id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            review_json(11, 1, "Great noodles", 5),
            review_json(12, 1, "Too loud", 6),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/restaurants/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(restaurant_json(1, "Asian", "Manhattan", 1)),
        )
        .mount(&server)
        .await;

    let (_dir, store) = temp_store().await;
    let online = SyncEngine::new(client_for(&server.uri()), store.clone());
    online.fetch_restaurant_by_id(1).await.unwrap();
    assert_eq!(online.fetch_reviews_by_restaurant_id(1).await.unwrap().len(), 2);

    let offline = SyncEngine::new(client_for(&unreachable_base_url()), store);
    let reviews = offline.fetch_reviews_by_restaurant_id(1).await.unwrap();
    assert_eq!(ids(&reviews, |r| r.id), vec![11, 12]);
    assert!(reviews.iter().all(|r| r.restaurant_id == 1));

    let err = offline.fetch_reviews_by_restaurant_id(2).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_submit_review_offline_is_queued_not_failed() {
    let (_dir, store) = temp_store().await;
    let engine = SyncEngine::new(client_for(&unreachable_base_url()), store.clone());

    let review = NewReview::new(3, "Sam", 5, "Best ribs in town");
    let outcome = engine.submit_review(review.clone()).await.unwrap();
    assert!(outcome.is_queued());

    let pending = store.get_offline_reviews().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].review, review);
}

#[tokio::test]
async fn test_submit_review_online_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/reviews/"))
        .and(body_partial_json(json!({"restaurant_id": 3, "rating": 5})))
        .respond_with(confirm_review())
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, store) = temp_store().await;
    let engine = SyncEngine::new(client_for(&server.uri()), store.clone());

    let outcome = engine
        .submit_review(NewReview::new(3, "Sam", 5, "Best ribs in town"))
        .await
        .unwrap();
    let SubmitOutcome::Synced(confirmed) = outcome else {
        panic!("expected the review to sync");
    };
    assert_eq!(confirmed.id, 100);

    assert_eq!(store.get_reviews(3).await.unwrap(), vec![confirmed]);
    assert!(store.get_offline_reviews().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_favorite_offline_then_online() {
    let (_dir, store) = temp_store().await;
    let offline = SyncEngine::new(client_for(&unreachable_base_url()), store.clone());
    assert!(offline.submit_favorite(2, true).await.unwrap().is_queued());
    assert_eq!(store.get_offline_favorites().await.unwrap().len(), 1);

    let server = MockServer::start().await;
    let mut confirmed = restaurant_json(2, "Pizza", "Brooklyn", 20);
    confirmed["is_favorite"] = json!(true);
    Mock::given(method("POST"))
        .and(path("/restaurants/2/"))
        .and(query_param("is_favorite", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(confirmed))
        .expect(1)
        .mount(&server)
        .await;

    let online = SyncEngine::new(client_for(&server.uri()), store.clone());
    let outcome = online.submit_favorite(2, true).await.unwrap();
    assert!(!outcome.is_queued());
    assert!(store.get_restaurant(2).await.unwrap().unwrap().is_favorite);
}

#[tokio::test]
async fn test_storage_error_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/restaurants"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([restaurant_json(1, "A", "B", 1)])),
        )
        .mount(&server)
        .await;

    let (dir, store) = temp_store().await;
    std::fs::write(dir.path().join("restaurants.json"), "{truncated").unwrap();

    let engine = SyncEngine::new(client_for(&server.uri()), store);
    let err = engine.fetch_restaurants().await.unwrap_err();
    assert!(matches!(err, SyncError::Storage(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_query_facade_works_offline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/restaurants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            restaurant_json(1, "Asian", "A", 1),
            restaurant_json(2, "Pizza", "B", 1),
            restaurant_json(3, "Pizza", "A", 1),
            restaurant_json(4, "Mexican", "C", 1),
        ])))
        .mount(&server)
        .await;

    let (_dir, store) = temp_store().await;
    SyncEngine::new(client_for(&server.uri()), store.clone())
        .fetch_restaurants()
        .await
        .unwrap();

    let engine = SyncEngine::new(client_for(&unreachable_base_url()), store);
    assert_eq!(engine.fetch_neighborhoods().await.unwrap(), vec!["A", "B", "C"]);
    assert_eq!(engine.fetch_cuisines().await.unwrap(), vec!["Asian", "Pizza", "Mexican"]);

    let in_a = engine
        .fetch_restaurants_by_cuisine_and_neighborhood(ALL, "A")
        .await
        .unwrap();
    assert_eq!(ids(&in_a, |r| r.id), vec![1, 3]);
    assert_eq!(engine.fetch_restaurants_by_cuisine("Pizza").await.unwrap().len(), 2);
    assert_eq!(engine.fetch_restaurants_by_neighborhood("C").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_query_facade_propagates_not_found() {
    let (_dir, store) = temp_store().await;
    let engine = SyncEngine::new(client_for(&unreachable_base_url()), store);
    assert!(engine.fetch_neighborhoods().await.unwrap_err().is_not_found());
}
