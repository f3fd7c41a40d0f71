mod common;

use common::{unused_url, MockBackend, MockReply};
use serde_json::json;
use shopper_cli::api::credentials::{provider_for, CredentialProvider, TokenEndpoint};
use shopper_cli::api::models::{ConversationMessage, Marketplace, Role, SearchMode, SearchRequest};
use shopper_cli::api::{ClientError, SearchClient, FALLBACK_ERROR_MESSAGE};
use std::sync::Arc;

fn request(query: &str) -> SearchRequest {
    SearchRequest::new(query)
        .unwrap()
        .with_marketplace(Some(Marketplace::India))
        .with_mode(Some(SearchMode::Scraper))
}

#[tokio::test]
async fn test_search_posts_expected_body() {
    let backend = MockBackend::new().spawn().await;
    let client = SearchClient::new(&backend.url);

    let response = client.search(&request("  headphones  ")).await.unwrap();
    assert_eq!(response.products.len(), 2);
    assert_eq!(response.products[0].title, "Sony WH-1000XM4");
    assert_eq!(response.products[0].price, Some(1999.0));

    let recorded = backend.recorded();
    assert_eq!(
        recorded.search_bodies,
        vec![json!({"query": "headphones", "marketplace": "india", "mode": "scraper"})]
    );
    assert_eq!(recorded.search_auth, vec![None]);
}

#[tokio::test]
async fn test_search_sends_history_and_deep_agent_mode() {
    let backend = MockBackend::new().spawn().await;
    let client = SearchClient::new(&backend.url);

    let request = SearchRequest::new("cheaper ones?")
        .unwrap()
        .with_history(vec![
            ConversationMessage::new(Role::User, "headphones"),
            ConversationMessage::new(Role::Assistant, "Two good options."),
        ])
        .with_marketplace(Some(Marketplace::Usa))
        .with_mode(Some(SearchMode::DeepAgent));
    client.search(&request).await.unwrap();

    let recorded = backend.recorded();
    assert_eq!(
        recorded.search_bodies[0],
        json!({
            "query": "cheaper ones?",
            "history": [
                {"role": "user", "content": "headphones"},
                {"role": "assistant", "content": "Two good options."}
            ],
            "marketplace": "usa",
            "mode": "deep-agent"
        })
    );
}

#[tokio::test]
async fn test_search_attaches_bearer_token() {
    let backend = MockBackend::new().spawn().await;
    let client = SearchClient::with_credentials(&backend.url, provider_for(Some("abc123".into()), None));

    client.search(&request("laptop")).await.unwrap();

    assert_eq!(
        backend.recorded().search_auth,
        vec![Some("Bearer abc123".to_string())]
    );
}

#[tokio::test]
async fn test_error_detail_becomes_message() {
    let backend = MockBackend::new()
        .default_search(MockReply::json(503, json!({"detail": "upstream timeout"})))
        .spawn()
        .await;
    let client = SearchClient::new(&backend.url);

    let err = client.search(&request("shoes")).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.user_message(), "upstream timeout");
}

#[tokio::test]
async fn test_error_without_usable_detail_uses_fallback() {
    let backend = MockBackend::new()
        .search_reply(MockReply::raw(500, "<html>Internal Server Error</html>"))
        .search_reply(MockReply::json(400, json!({"detail": [{"msg": "field required"}]})))
        .search_reply(MockReply::json(500, json!({"detail": ""})))
        .spawn()
        .await;
    let client = SearchClient::new(&backend.url);

    for expected_status in [500, 400, 500] {
        let err = client.search(&request("shoes")).await.unwrap_err();
        assert_eq!(err.status(), Some(expected_status));
        assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);
    }
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let backend = MockBackend::new()
        .default_search(MockReply::raw(200, "not json"))
        .spawn()
        .await;
    let client = SearchClient::new(&backend.url);

    let err = client.search(&request("shoes")).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
    assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_missing_fields_default() {
    let backend = MockBackend::new()
        .default_search(MockReply::json(200, json!({"products": [{"title": "Bare"}]})))
        .spawn()
        .await;
    let client = SearchClient::new(&backend.url);

    let response = client.search(&request("bare")).await.unwrap();
    assert_eq!(response.products[0].price, None);
    assert_eq!(response.products[0].rating, None);
    assert_eq!(response.analysis, "");
    assert!(response.clarifying_questions().is_empty());
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client = SearchClient::new(&unused_url().await);

    let err = client.search(&request("shoes")).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(err.status(), None);
    assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_recent_logs_passes_limit() {
    let backend = MockBackend::new().spawn().await;
    let client = SearchClient::new(&format!("{}/", backend.url));

    let lines = client.recent_logs(50).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].message, "ranking 3 products");
    assert_eq!(backend.recorded().log_limits, vec![Some("50".to_string())]);
}

#[tokio::test]
async fn test_recent_logs_failure() {
    let backend = MockBackend::new()
        .logs_reply(MockReply::raw(500, "boom"))
        .spawn()
        .await;
    let client = SearchClient::new(&backend.url);

    let err = client.recent_logs(10).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_token_endpoint_without_session_is_anonymous() {
    let backend = MockBackend::new().spawn().await;
    let provider = TokenEndpoint::new(format!("{}/token", backend.url));

    assert_eq!(provider.access_token().await, None);

    let client = SearchClient::with_credentials(&backend.url, Arc::new(provider));
    client.search(&request("shoes")).await.unwrap();

    let recorded = backend.recorded();
    assert_eq!(recorded.token_requests, 2);
    assert_eq!(recorded.search_auth, vec![None]);
}

#[tokio::test]
async fn test_token_endpoint_with_session() {
    let backend = MockBackend::new()
        .token_reply(MockReply::json(200, json!({"accessToken": "session-token"})))
        .spawn()
        .await;
    let client = SearchClient::with_credentials(
        &backend.url,
        provider_for(None, Some(format!("{}/token", backend.url))),
    );
    assert_eq!(client.credentials_name(), "token-endpoint");

    client.search(&request("shoes")).await.unwrap();

    assert_eq!(
        backend.recorded().search_auth,
        vec![Some("Bearer session-token".to_string())]
    );
}

#[tokio::test]
async fn test_unreachable_token_endpoint_degrades() {
    let provider = TokenEndpoint::new(format!("{}/token", unused_url().await));
    assert_eq!(provider.access_token().await, None);
}
