//! Integration tests for GeminiProvider against a mock Gemini endpoint.

use std::time::Duration;

use llm::GeminiProvider;
use pipeline::{
    Embedder, EmbeddingModelName, GenerationConfig, LlmError, LlmProvider, ModelName, ModelReply,
    RetryPolicy,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn model(name: &str) -> ModelName {
    ModelName::new(name).unwrap()
}

fn provider(server: &MockServer, name: &str) -> GeminiProvider {
    GeminiProvider::new("test-key", model(name)).with_base_url(server.uri())
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    }))
}

#[tokio::test]
async fn generate_sends_prompt_with_fixed_settings() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "Summarise the data"}]}],
            "generationConfig": {"topK": 40, "maxOutputTokens": 2048},
            "safetySettings": [{"category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_NONE"}]
        })))
        .respond_with(text_response("{\"students\": []}"))
        .expect(1)
        .mount(&server)
        .await;

    let reply = provider(&server, "gemini-2.5-flash")
        .generate("Summarise the data", &GenerationConfig::default())
        .await
        .unwrap();

    assert_eq!(reply, ModelReply::Text("{\"students\": []}".into()));
}

#[tokio::test]
async fn generate_reports_prompt_feedback_as_blocked() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let reply = provider(&server, "gemini-2.5-flash")
        .generate("prompt", &GenerationConfig::default())
        .await
        .unwrap();

    assert_eq!(reply, ModelReply::Blocked("block_reason: SAFETY".into()));
}

#[tokio::test]
async fn rate_limit_maps_to_retryable_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "7")
                .set_body_json(json!({
                    "error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}
                })),
        )
        .mount(&server)
        .await;

    let err = provider(&server, "gemini-2.5-flash")
        .generate("prompt", &GenerationConfig::default())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        LlmError::Api {
            status: 429,
            message: "Resource has been exhausted".into(),
            retry_after: Some(Duration::from_secs(7)),
        }
    );
    assert_eq!(
        err.retry_policy(),
        RetryPolicy::Retryable {
            after: Some(Duration::from_secs(7))
        }
    );
}

#[tokio::test]
async fn invalid_key_maps_to_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let err = provider(&server, "gemini-2.5-flash")
        .generate("prompt", &GenerationConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::Auth { status: 403, .. }));
    assert_eq!(err.retry_policy(), RetryPolicy::NonRetryable);
}

#[tokio::test]
async fn malformed_body_maps_to_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = provider(&server, "gemini-2.5-flash")
        .generate("prompt", &GenerationConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::Decode { .. }));
}

#[tokio::test]
async fn embed_returns_one_vector_per_input() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/text-embedding-004:batchEmbedContents"))
        .and(body_partial_json(json!({
            "requests": [
                {"model": "models/text-embedding-004", "content": {"parts": [{"text": "first"}]}},
                {"model": "models/text-embedding-004", "content": {"parts": [{"text": "second"}]}}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [{"values": [1.0, 0.0]}, {"values": [0.0, 1.0]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let vectors = provider(&server, "gemini-2.5-flash")
        .embed(&["first".to_string(), "second".to_string()])
        .await
        .unwrap();

    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}

#[tokio::test]
async fn embed_rejects_count_mismatch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/custom-embedder:batchEmbedContents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [{"values": [1.0]}]
        })))
        .mount(&server)
        .await;

    let err = provider(&server, "gemini-2.5-flash")
        .with_embedding_model(EmbeddingModelName::new("models/custom-embedder").unwrap())
        .embed(&["a".to_string(), "b".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::Decode { .. }));
}

#[tokio::test]
async fn embed_of_nothing_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let vectors = provider(&server, "gemini-2.5-flash").embed(&[]).await.unwrap();
    assert!(vectors.is_empty());
}

#[tokio::test]
async fn select_model_keeps_first_responsive_candidate() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(text_response("Hi there"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-pro-latest:generateContent"))
        .respond_with(text_response("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let selected = provider(&server, "placeholder")
        .select_model(&[
            model("models/gemini-2.5-flash"),
            model("models/gemini-2.0-flash"),
            model("models/gemini-pro-latest"),
        ])
        .await
        .unwrap();

    assert_eq!(selected.model().as_str(), "gemini-2.0-flash");
}

#[tokio::test]
async fn select_model_fails_when_no_candidate_answers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
        .mount(&server)
        .await;

    let err = provider(&server, "placeholder")
        .select_model(&[model("a"), model("b")])
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.starts_with("could not initialize any Gemini model"));
    assert!(message.contains("a: API error (HTTP 404): model not found"));
    assert!(message.contains("b: API error (HTTP 404)"));
}

#[tokio::test]
async fn list_models_follows_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "models/text-embedding-004", "supportedGenerationMethods": ["embedContent"]}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "models/gemini-2.5-flash", "supportedGenerationMethods": ["generateContent", "countTokens"]}],
            "nextPageToken": "page-2"
        })))
        .mount(&server)
        .await;

    let models = provider(&server, "gemini-2.5-flash").list_models().await.unwrap();

    let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["models/gemini-2.5-flash", "models/text-embedding-004"]);
    assert!(models[0].supports_generation());
    assert!(!models[1].supports_generation());
}
