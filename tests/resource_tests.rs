//! Integration tests for resource collections and remote-object proxies.
//!
//! These tests verify object fetching and creation, lazy singleton loading
//! with caching, updates, deletes, and the query pagination behavior.

use billogram_api::{ApiError, AuthKey, AuthUser, Config, Connection, OrderDirection};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a connection pointed at the mock server with test credentials.
fn create_connection(server: &MockServer) -> Connection {
    let config = Config::builder()
        .auth_user(AuthUser::new("test-user").unwrap())
        .auth_key(AuthKey::new("test-key").unwrap())
        .api_base(server.uri())
        .build()
        .unwrap();
    Connection::new(config)
}

// ============================================================================
// Collection Tests
// ============================================================================

#[tokio::test]
async fn test_collection_get_returns_loaded_object() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customer/12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "data": {"customer_no": 12345, "name": "ACME"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connection = create_connection(&server);
    let mut customer = connection.customers().get("12345").await.unwrap();

    assert!(customer.is_loaded());
    assert_eq!(customer.field("name").await.unwrap(), json!("ACME"));
}

#[tokio::test]
async fn test_collection_create_posts_fields_and_wraps_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/item"))
        .and(body_json(json!({"title": "Consulting", "price": 1200})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "data": {"item_no": "10", "title": "Consulting", "price": 1200}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connection = create_connection(&server);
    let mut item = connection
        .items()
        .create(&json!({"title": "Consulting", "price": 1200}))
        .await
        .unwrap();

    assert_eq!(item.field("item_no").await.unwrap(), json!("10"));
    assert_eq!(item.url().unwrap(), "item/10");
}

// ============================================================================
// Remote Object Tests
// ============================================================================

#[tokio::test]
async fn test_singleton_fetches_once_then_serves_from_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "data": {"name": "Test Company", "currency": "SEK"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connection = create_connection(&server);
    let mut settings = connection.settings();

    assert!(!settings.is_loaded());
    assert_eq!(settings.field("name").await.unwrap(), json!("Test Company"));
    assert!(settings.is_loaded());
    // Served from the cache; the mock's expect(1) fails on a second fetch.
    assert_eq!(settings.field("currency").await.unwrap(), json!("SEK"));
}

#[tokio::test]
async fn test_field_on_loaded_object_rejects_unknown_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/logotype"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "data": {"file_type": "png"}
        })))
        .mount(&server)
        .await;

    let connection = create_connection(&server);
    let mut logotype = connection.logotype();
    let result = logotype.field("no_such_field").await;

    assert!(matches!(
        result,
        Err(ApiError::UnknownField(m)) if m.contains("no_such_field")
    ));
}

#[tokio::test]
async fn test_update_replaces_cached_data_with_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customer/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "data": {"customer_no": 7, "name": "Old Name"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/customer/7"))
        .and(body_json(json!({"name": "New Name"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "data": {"customer_no": 7, "name": "New Name"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connection = create_connection(&server);
    let mut customer = connection.customers().get("7").await.unwrap();

    customer.update(&json!({"name": "New Name"})).await.unwrap();
    // The response replaced the cache; no extra GET is made.
    assert_eq!(customer.field("name").await.unwrap(), json!("New Name"));
}

#[tokio::test]
async fn test_refresh_refetches_current_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/report/summary.xlsx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "data": {"filename": "summary.xlsx", "state": "done"}
        })))
        .expect(2)
        .mount(&server)
        .await;

    let connection = create_connection(&server);
    let mut report = connection.reports().get("summary.xlsx").await.unwrap();

    report.refresh().await.unwrap();
    assert_eq!(report.field("state").await.unwrap(), json!("done"));
}

#[tokio::test]
async fn test_delete_issues_delete_and_consumes_object() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/item/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "data": {"item_no": "10"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/item/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "data": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connection = create_connection(&server);
    let item = connection.items().get("10").await.unwrap();

    item.delete().await.unwrap();
}

// ============================================================================
// Query Tests
// ============================================================================

#[tokio::test]
async fn test_get_page_sends_pagination_filter_and_order_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/billogram"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "10"))
        .and(query_param("filter_type", "field"))
        .and(query_param("filter_field", "state"))
        .and(query_param("filter_value", "Paid"))
        .and(query_param("order_field", "invoice_date"))
        .and(query_param("order_direction", "desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "data": [{"id": "a1"}, {"id": "a2"}],
            "meta": {"total_count": 17}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connection = create_connection(&server);
    let mut query = connection.billogram().query();
    query
        .filter_field("state", "Paid")
        .order("invoice_date", OrderDirection::Desc)
        .page_size(10);

    let page = query.get_page(2).await.unwrap();
    assert_eq!(page.len(), 2);
}

#[tokio::test]
async fn test_page_objects_are_loaded_with_their_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "data": [{"customer_no": 1, "name": "First"}],
            "meta": {"total_count": 1}
        })))
        .mount(&server)
        .await;

    let connection = create_connection(&server);
    let mut query = connection.customers().query();
    let mut page = query.get_page(1).await.unwrap();

    let customer = page.first_mut().unwrap();
    assert!(customer.is_loaded());
    assert_eq!(customer.field("name").await.unwrap(), json!("First"));
    assert_eq!(customer.url().unwrap(), "customer/1");
}

#[tokio::test]
async fn test_count_is_served_from_cache_after_page_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "data": [{"customer_no": 1}],
            "meta": {"total_count": 42}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connection = create_connection(&server);
    let mut query = connection.customers().query();

    query.get_page(1).await.unwrap();
    assert_eq!(query.count().await.unwrap(), 42);
    assert_eq!(query.count().await.unwrap(), 42);
}

#[tokio::test]
async fn test_count_without_cache_probes_with_single_item_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "data": [{"item_no": "10"}],
            "meta": {"total_count": 9}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connection = create_connection(&server);
    let mut query = connection.items().query();
    query.page_size(50);

    assert_eq!(query.count().await.unwrap(), 9);
    // The probe leaves the configured page size untouched.
    assert_eq!(query.current_page_size(), 50);
}

#[tokio::test]
async fn test_changing_filter_invalidates_cached_count() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customer"))
        .and(query_param("filter_value", "AB"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "data": [],
            "meta": {"total_count": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/customer"))
        .and(query_param("filter_value", "CD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "data": [],
            "meta": {"total_count": 8}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connection = create_connection(&server);
    let mut query = connection.customers().query();

    query.filter_prefix("name", "AB");
    assert_eq!(query.count().await.unwrap(), 3);

    query.filter_prefix("name", "CD");
    assert_eq!(query.count().await.unwrap(), 8);
}

#[tokio::test]
async fn test_total_pages_rounds_up() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "data": [],
            "meta": {"total_count": 25}
        })))
        .mount(&server)
        .await;

    let connection = create_connection(&server);
    let mut query = connection.customers().query();
    query.page_size(10);

    assert_eq!(query.total_pages().await.unwrap(), 3);
}
