//! Google Provider Unit Tests (API Key-based)

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::GeminiConfig;
use crate::core::generation::prompts::CRITIQUE_EMPTY_FALLBACK;
use crate::core::generation::{
    CritiqueService, GarmentGenerator, GenerationError, GenerationFailure, PromptEnhancer,
    TryOnGenerator,
};
use crate::core::llm::GoogleProvider;
use crate::tests::common::{png, result_image};

const TEST_KEY: &str = "AIzaTestApiKey";

fn provider_for(server: &MockServer) -> GoogleProvider {
    GoogleProvider::new(TEST_KEY, &GeminiConfig::default())
        .unwrap()
        .with_base_url(format!("{}/v1beta", server.uri()))
}

fn model_path(model: &str) -> String {
    format!("/v1beta/models/{model}:generateContent")
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    }))
}

fn image_response(mime: &str, data: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [
                    { "text": "Here is your image." },
                    { "inlineData": { "mimeType": mime, "data": data } }
                ]
            },
            "finishReason": "STOP"
        }]
    }))
}

// =============================================================================
// Request Formatting
// =============================================================================

#[tokio::test]
async fn test_garment_request_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(model_path("gemini-2.5-flash-image")))
        .and(header("x-goog-api-key", TEST_KEY))
        .and(body_partial_json(json!({
            "generationConfig": { "imageConfig": { "aspectRatio": "1:1" } }
        })))
        .respond_with(image_response("image/png", "R0FSTUVOVA=="))
        .expect(1)
        .mount(&server)
        .await;

    let image = provider_for(&server).generate_garment("silver jacket").await.unwrap();
    assert_eq!(image.mime_type, "image/png");
    assert_eq!(image.data, "R0FSTUVOVA==");
}

#[tokio::test]
async fn test_try_on_sends_both_images_and_size() {
    let server = MockServer::start().await;
    let person = png();
    let clothing = result_image("garment");
    Mock::given(method("POST"))
        .and(path(model_path("gemini-3-pro-image-preview")))
        .and(body_partial_json(json!({
            "generationConfig": { "imageConfig": { "aspectRatio": "3:4", "imageSize": "1K" } }
        })))
        .respond_with(image_response("image/jpeg", "VFJZT04="))
        .expect(1)
        .mount(&server)
        .await;

    let image = provider_for(&server)
        .generate_try_on(&person, &clothing)
        .await
        .unwrap();
    assert_eq!(image.mime_type, "image/jpeg");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let parts = body["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0]["inlineData"]["data"], json!(person.data));
    assert_eq!(parts[1]["inlineData"]["data"], json!(clothing.data));
    assert!(parts[2]["text"].is_string());
}

#[tokio::test]
async fn test_enhance_uses_text_model_and_trims() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(model_path("gemini-2.5-flash")))
        .respond_with(text_response("  A cropped silver bomber jacket.\n"))
        .expect(1)
        .mount(&server)
        .await;

    let enhanced = provider_for(&server).enhance("silver jacket").await.unwrap();
    assert_eq!(enhanced, "A cropped silver bomber jacket.");
}

// =============================================================================
// Response Handling
// =============================================================================

#[tokio::test]
async fn test_missing_image_part_is_no_image() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(text_response("I can't draw that."))
        .mount(&server)
        .await;

    let err = provider_for(&server).generate_garment("anything").await.unwrap_err();
    assert!(matches!(err, GenerationError::NoImage));
    assert!(!err.is_entitlement());
}

#[tokio::test]
async fn test_empty_critique_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let critique = provider_for(&server).critique(&png(), &png()).await.unwrap();
    assert_eq!(critique, CRITIQUE_EMPTY_FALLBACK);
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = provider_for(&server).enhance("x").await.unwrap_err();
    assert!(matches!(err, GenerationError::Json(_)));
}

// =============================================================================
// Error Classification
// =============================================================================

#[tokio::test]
async fn test_not_found_model_is_entitlement() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND" }
        })))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .generate_try_on(&png(), &png())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.is_entitlement());
    assert!(GenerationFailure::from(&err).is_entitlement());
}

#[tokio::test]
async fn test_forbidden_is_entitlement() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("{}"))
        .mount(&server)
        .await;

    let err = provider_for(&server).generate_garment("x").await.unwrap_err();
    assert!(err.is_entitlement());
}

#[tokio::test]
async fn test_server_error_is_generic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend unavailable"))
        .mount(&server)
        .await;

    let err = provider_for(&server).generate_garment("x").await.unwrap_err();
    match &err {
        GenerationError::Api { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "backend unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_entitlement());
}

#[tokio::test]
async fn test_empty_key_never_reaches_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = GoogleProvider::new("   ", &GeminiConfig::default())
        .unwrap()
        .with_base_url(format!("{}/v1beta", server.uri()));
    let err = provider.generate_garment("x").await.unwrap_err();
    assert!(matches!(err, GenerationError::MissingCredential));
}
