use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode as HttpStatus,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tokio::{net::TcpListener, sync::Mutex};

use super::*;

#[derive(Debug, Deserialize)]
struct FilterQuery {
    filter: String,
}

#[derive(Clone, Default)]
struct ServerState {
    seen_filters: Arc<Mutex<Vec<String>>>,
}

async fn handle_listings(
    State(state): State<ServerState>,
    Query(query): Query<FilterQuery>,
) -> impl IntoResponse {
    state.seen_filters.lock().await.push(query.filter.clone());
    let all = serde_json::json!([
        {"price": 450000, "id": "424906", "type": "rent", "img_src": "http://mars.jpl.nasa.gov/a.jpg"},
        {"price": 8000000, "id": "424907", "type": "buy", "img_src": "http://mars.jpl.nasa.gov/b.jpg"}
    ]);
    let body = match query.filter.as_str() {
        "rent" => serde_json::Value::Array(vec![all[0].clone()]),
        "buy" => serde_json::Value::Array(vec![all[1].clone()]),
        _ => all,
    };
    Json(body)
}

async fn spawn_listings_server(router: Router) -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{addr}"))
}

async fn spawn_default_server() -> Result<(String, ServerState)> {
    let state = ServerState::default();
    let router = Router::new()
        .route("/realestate", get(handle_listings))
        .with_state(state.clone());
    Ok((spawn_listings_server(router).await?, state))
}

#[test]
fn endpoint_appends_listings_path_to_base() {
    let source = HttpListingSource::new(DEFAULT_BASE_URL).expect("source");
    assert_eq!(source.endpoint().as_str(), "https://mars.udacity.com/realestate");

    let nested = HttpListingSource::new("http://localhost:8080/api?x=1").expect("source");
    assert_eq!(nested.endpoint().as_str(), "http://localhost:8080/api/realestate");
}

#[test]
fn rejects_unusable_base_urls() {
    assert!(matches!(
        HttpListingSource::new("not a url"),
        Err(FetchError::InvalidBaseUrl { .. })
    ));
    assert!(matches!(
        HttpListingSource::new("ftp://example.com/"),
        Err(FetchError::InvalidBaseUrl { .. })
    ));
}

#[tokio::test]
async fn sends_filter_query_value_and_decodes_array() {
    let (base_url, state) = spawn_default_server().await.expect("spawn server");
    let source = HttpListingSource::new(&base_url).expect("source");

    let rentals = source
        .fetch_listings(ListingFilter::ForRent)
        .await
        .expect("fetch");
    assert_eq!(rentals.len(), 1);
    assert_eq!(rentals[0].id().as_str(), "424906");
    assert!(rentals[0].is_rental());

    let all = source.fetch_listings(ListingFilter::All).await.expect("fetch");
    let ids: Vec<_> = all.iter().map(|l| l.id().as_str().to_string()).collect();
    assert_eq!(ids, ["424906", "424907"]);

    assert_eq!(*state.seen_filters.lock().await, ["rent", "all"]);
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let router = Router::new().route(
        "/realestate",
        get(|| async { (HttpStatus::SERVICE_UNAVAILABLE, "down") }),
    );
    let base_url = spawn_listings_server(router).await.expect("spawn server");
    let source = HttpListingSource::new(&base_url).expect("source");

    let err = source
        .fetch_listings(ListingFilter::All)
        .await
        .expect_err("must fail");
    assert!(matches!(err, FetchError::Status(StatusCode::SERVICE_UNAVAILABLE)));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let router = Router::new().route(
        "/realestate",
        get(|| async { Json(serde_json::json!({"error": "not a list"})) }),
    );
    let base_url = spawn_listings_server(router).await.expect("spawn server");
    let source = HttpListingSource::new(&base_url).expect("source");

    let err = source
        .fetch_listings(ListingFilter::All)
        .await
        .expect_err("must fail");
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let source = HttpListingSource::new(&format!("http://{addr}")).expect("source");
    let err = source
        .fetch_listings(ListingFilter::All)
        .await
        .expect_err("must fail");
    assert!(matches!(err, FetchError::Transport(_)));
}
