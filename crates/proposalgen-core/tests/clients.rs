use proposalgen_core::{
    ChatMessage, ChatModel, InternetSearchTool, MODEL_ID, OpenAiCompatibleClient, REQUEST_TIMEOUT,
    SecretValue, SerperClient,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn search_tool_sends_query_with_three_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("X-API-KEY", "serper-test-key"))
        .and(body_partial_json(json!({ "q": "wearable ECG", "num": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "searchParameters": { "q": "wearable ECG" },
            "organic": [
                { "title": "A", "link": "https://a.example/1", "snippet": "first", "position": 1 },
                { "title": "B", "link": "https://b.example/2", "position": 2 },
                { "title": "C", "link": "https://c.example/3", "snippet": "third", "position": 3 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SerperClient::with_endpoint(
        SecretValue::new("serper-test-key"),
        format!("{}/search", server.uri()),
    )
    .expect("client builds");
    let tool = InternetSearchTool::new(Arc::new(client));

    let results = tool.search("wearable ECG").await.expect("search succeeds");
    let links: Vec<_> = results.links().collect();
    assert_eq!(
        links,
        ["https://a.example/1", "https://b.example/2", "https://c.example/3"]
    );
    assert_eq!(results.organic[1].snippet, "");
}

#[tokio::test]
async fn search_errors_surface_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("invalid key"))
        .mount(&server)
        .await;

    let client = SerperClient::with_endpoint(SecretValue::new("bad"), server.uri()).expect("client builds");
    let err = InternetSearchTool::new(Arc::new(client))
        .search("anything")
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("403"), "{message}");
    assert!(message.contains("invalid key"), "{message}");
}

#[tokio::test]
async fn chat_client_posts_fixed_model_and_returns_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("authorization", "Bearer router-key"))
        .and(body_partial_json(json!({
            "model": MODEL_ID,
            "messages": [
                { "role": "system", "content": "You are a tester." },
                { "role": "user", "content": "Say hi" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cmpl-1",
            "choices": [ { "index": 0, "message": { "role": "assistant", "content": "hi" } } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = format!("{}/api/v1/", server.uri());
    let client = OpenAiCompatibleClient::new(&endpoint, SecretValue::new("router-key"))
        .expect("client builds");
    assert_eq!(client.model_id(), MODEL_ID);

    let reply = client
        .complete(&[
            ChatMessage::system("You are a tester."),
            ChatMessage::user("Say hi"),
        ])
        .await
        .expect("completion succeeds");
    assert_eq!(reply, "hi");
}

#[tokio::test]
async fn chat_client_reports_endpoint_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let client = OpenAiCompatibleClient::new(&server.uri(), SecretValue::new("k")).expect("client builds");
    let err = client
        .complete(&[ChatMessage::user("hello")])
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("429"), "{message}");
    assert!(message.contains("rate limited"), "{message}");
}

#[tokio::test]
async fn chat_client_rejects_empty_choices() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = OpenAiCompatibleClient::new(&server.uri(), SecretValue::new("k")).expect("client builds");
    assert!(client.complete(&[ChatMessage::user("hello")]).await.is_err());
}

#[tokio::test]
async fn chat_client_gives_up_after_its_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "choices": [ { "message": { "content": "late" } } ] }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = OpenAiCompatibleClient::with_timeout(
        &server.uri(),
        SecretValue::new("k"),
        Duration::from_millis(200),
    )
    .expect("client builds");

    let err = client
        .complete(&[ChatMessage::user("hello")])
        .await
        .unwrap_err();
    let timed_out = err
        .downcast_ref::<reqwest::Error>()
        .is_some_and(reqwest::Error::is_timeout);
    assert!(timed_out, "{err:#}");
}

#[test]
fn clients_share_the_request_timeout() {
    assert_eq!(REQUEST_TIMEOUT, Duration::from_secs(120));
    assert!(SerperClient::new(SecretValue::new("k")).is_ok());
    assert!(OpenAiCompatibleClient::new("http://localhost:1/v1", SecretValue::new("k")).is_ok());
}
