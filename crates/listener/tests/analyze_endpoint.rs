//! Request-level tests for the HTTP routes.

use std::sync::Arc;

use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use async_trait::async_trait;
use listener::{configure, AppState};
use nodes::{LlmGateway, PipelineExecutor};
use pipeline::{
    GenerationConfig, HistoricalSource, HistoryError, LlmError, LlmProvider, ModelReply,
};
use serde_json::{json, Value};

struct EchoProvider;

#[async_trait]
impl LlmProvider for EchoProvider {
    async fn generate(
        &self,
        prompt: &str,
        _config: &GenerationConfig,
    ) -> Result<ModelReply, LlmError> {
        Ok(ModelReply::Text(prompt.to_string()))
    }
}

struct NoHistory;

#[async_trait]
impl HistoricalSource for NoHistory {
    async fn load(&self) -> Result<Option<String>, HistoryError> {
        Ok(None)
    }
}

fn app_state() -> web::Data<AppState> {
    let executor = PipelineExecutor::new(
        LlmGateway::new(Arc::new(EchoProvider)),
        Arc::new(NoHistory),
        None,
    );
    web::Data::new(AppState::new(Arc::new(executor)))
}

macro_rules! service {
    () => {
        test::init_service(App::new().app_data(app_state()).configure(configure)).await
    };
}

#[actix_web::test]
async fn analyze_returns_the_complete_state() {
    let app = service!();
    let req = test::TestRequest::post()
        .uri("/analyze")
        .set_json(json!({ "raw_data_text": "OKR: 60% placement target" }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let object = body.as_object().expect("state should serialize as an object");
    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        [
            "insights",
            "notifications",
            "raw_data_text",
            "recommendations",
            "report",
            "structured_data",
            "trend_comparison",
            "workflow_log",
        ]
    );
    assert_eq!(body["raw_data_text"], "OKR: 60% placement target");
    for key in [
        "structured_data",
        "insights",
        "trend_comparison",
        "recommendations",
        "report",
        "notifications",
    ] {
        let text = body[key].as_str().expect("stage fields are strings");
        assert!(!text.is_empty(), "{key} should be populated");
    }
    assert_eq!(body["workflow_log"].as_array().map(Vec::len), Some(7));
}

#[actix_web::test]
async fn analyze_rejects_missing_field() {
    let app = service!();
    let req = test::TestRequest::post()
        .uri("/analyze")
        .set_json(json!({}))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "No data provided." }));
}

#[actix_web::test]
async fn analyze_rejects_empty_and_blank_text() {
    let app = service!();
    for text in ["", "   \n\t"] {
        let req = test::TestRequest::post()
            .uri("/analyze")
            .set_json(json!({ "raw_data_text": text }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "input {text:?}");

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "No data provided.");
    }
}

#[actix_web::test]
async fn analyze_rejects_null_text() {
    let app = service!();
    let req = test::TestRequest::post()
        .uri("/analyze")
        .set_json(json!({ "raw_data_text": null }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn malformed_json_is_a_bad_request_with_error_body() {
    let app = service!();
    let req = test::TestRequest::post()
        .uri("/analyze")
        .insert_header(ContentType::json())
        .set_payload("{\"raw_data_text\": ")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn health_reports_ok() {
    let app = service!();
    let req = test::TestRequest::get().uri("/health").to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "status": "ok" }));
}
