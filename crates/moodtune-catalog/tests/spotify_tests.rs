use moodtune_catalog::{CatalogError, CatalogSearch, SpotifyClient};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> SpotifyClient {
    SpotifyClient::builder("client-id", "client-secret")
        .api_base_url(server.uri())
        .token_url(format!("{}/api/token", server.uri()))
        .timeout(Duration::from_secs(2))
        .build()
        .expect("client should build")
}

fn search_body() -> serde_json::Value {
    json!({
        "tracks": {
            "items": [
                {
                    "id": "4u7EnebtmKWzUH433cf5Qv",
                    "name": "Kuzu Kuzu",
                    "artists": [{ "name": "Tarkan" }],
                    "album": { "images": [{ "url": "https://i.scdn.co/image/kuzu", "height": 640, "width": 640 }] },
                    "external_urls": { "spotify": "https://open.spotify.com/track/4u7EnebtmKWzUH433cf5Qv" }
                },
                {
                    "id": "no-url",
                    "name": "Kuzu Kuzu - Remix",
                    "artists": [{ "name": "Tarkan" }, { "name": "DJ" }],
                    "album": { "images": [] }
                }
            ]
        }
    })
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(header_exists("authorization"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-1",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_search_maps_items_and_sends_bearer_and_market() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("type", "track"))
        .and(query_param("limit", "5"))
        .and(query_param("market", "TR"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let items = client
        .search("track:\"Kuzu Kuzu\" artist:\"Tarkan\"", Some("TR"))
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, "4u7EnebtmKWzUH433cf5Qv");
    assert_eq!(items[0].title, "Kuzu Kuzu");
    assert_eq!(items[0].primary_artist(), Some("Tarkan"));
    assert_eq!(
        items[0].canonical_url,
        "https://open.spotify.com/track/4u7EnebtmKWzUH433cf5Qv"
    );
    assert_eq!(
        items[0].thumbnail_url.as_deref(),
        Some("https://i.scdn.co/image/kuzu")
    );
    assert_eq!(items[1].canonical_url, "https://open.spotify.com/track/no-url");
    assert_eq!(items[1].thumbnail_url, None);
}

#[tokio::test]
async fn test_token_is_fetched_once_for_consecutive_searches() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.search("first query", None).await.unwrap();
    client.search("second query", None).await.unwrap();
}

#[tokio::test]
async fn test_repeated_search_is_served_from_cache() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.search("same query", Some("TR")).await.unwrap();
    let second = client.search("same query", Some("TR")).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_token_failure_skips_search() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_client" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.search("query", None).await;
    assert!(matches!(first, Err(CatalogError::TokenAcquisition(_))));

    // Still inside the failure cooldown: no second token request.
    let second = client.search("another query", None).await;
    assert!(matches!(second, Err(CatalogError::TokenAcquisition(_))));
}

#[tokio::test]
async fn test_unauthorized_search_invalidates_token() {
    let server = MockServer::start().await;
    mount_token(&server, 2).await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rejected"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "accepted"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let rejected = client.search("rejected", None).await;
    assert!(matches!(
        rejected,
        Err(CatalogError::ApiError { status: 401, .. })
    ));

    let accepted = client.search("accepted", None).await.unwrap();
    assert_eq!(accepted.len(), 2);
}

#[test]
fn test_missing_credentials_are_rejected() {
    assert!(matches!(
        SpotifyClient::new("", "secret"),
        Err(CatalogError::NotConfigured(_))
    ));
}
