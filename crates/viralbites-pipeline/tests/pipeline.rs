//! End-to-end tests for `SearchPipeline` and diagnostics against a mocked
//! generation API.

use serde_json::{json, Value};
use viralbites_core::{AppConfig, Coordinates, Environment, UserSettings};
use viralbites_gemini::GeminiClient;
use viralbites_pipeline::{run_diagnostics, PipelineError, SearchPipeline, TestStatus};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DISCOVERY_PATH: &str = "/v1beta/models/gemini-3-flash-preview:generateContent";
const VERIFICATION_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";
const ORIGIN: Coordinates = Coordinates::new(40.7580, -73.9855);

fn pipeline(server: &MockServer) -> SearchPipeline {
    let client = GeminiClient::with_base_url("test-key", 30, &server.uri())
        .expect("client construction should not fail");
    SearchPipeline::new(client, "gemini-3-flash-preview", "gemini-2.5-flash")
}

fn model_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

fn discovery_reply(candidates: &Value, citations: &[(&str, &str)]) -> Value {
    let chunks: Vec<Value> = citations
        .iter()
        .map(|(uri, title)| json!({"web": {"uri": uri, "title": title}}))
        .collect();
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": candidates.to_string()}]},
            "groundingMetadata": {"groundingChunks": chunks}
        }]
    })
}

async fn mount_discovery(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path(DISCOVERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_verification(server: &MockServer, name: &str, place: &Value) {
    Mock::given(method("POST"))
        .and(path(VERIFICATION_PATH))
        .and(body_string_contains(name))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(&place.to_string())))
        .expect(1)
        .mount(server)
        .await;
}

fn leaked_key_body() -> Value {
    json!({
        "error": {
            "code": 403,
            "message": "Your API key was reported as leaked. Please use another API key.",
            "status": "PERMISSION_DENIED"
        }
    })
}

#[tokio::test]
async fn zero_candidates_skip_verification() {
    let server = MockServer::start().await;
    mount_discovery(&server, discovery_reply(&json!([]), &[])).await;

    Mock::given(method("POST"))
        .and(path(VERIFICATION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply("{}")))
        .expect(0)
        .mount(&server)
        .await;

    let err = pipeline(&server)
        .search(&ORIGIN, "", &UserSettings::default())
        .await
        .expect_err("empty discovery should fail");

    assert!(matches!(err, PipelineError::NoPlacesFound), "got {err:?}");
    assert_eq!(err.to_string(), "No viral places found matching your criteria.");
}

#[tokio::test]
async fn search_orders_verified_first_and_drops_distant_places() {
    let server = MockServer::start().await;

    let candidates = json!([
        {"name": "Noodle Nook", "viralReason": "Hand-pulled noodles", "cuisine": "Chinese"},
        {"name": "Birria Bros", "viralReason": "Cheese pull", "cuisine": "Mexican"},
        {"name": "Far Pho", "cuisine": "Vietnamese"},
        {"name": "Dumpling Den", "cuisine": "Chinese"}
    ]);
    mount_discovery(
        &server,
        discovery_reply(
            &candidates,
            &[
                ("https://www.instagram.com/reel/xyz/", "Birria Bros cheese pull"),
                ("https://eater.com/nyc-birria", "Best birria in NYC"),
            ],
        ),
    )
    .await;

    mount_verification(
        &server,
        "Noodle Nook",
        &json!({"verifiedName": "Noodle Nook", "address": "9 Elm St"}),
    )
    .await;
    mount_verification(
        &server,
        "Birria Bros",
        &json!({
            "verifiedName": "Birria Bros Taqueria",
            "address": "1 Main St",
            "latitude": 40.7600,
            "longitude": -73.9800,
            "rating": 4.7,
            "userRatingCount": 1520,
            "photoUri": "https://lh3.googleusercontent.com/p/AF1QipBirria"
        }),
    )
    .await;
    mount_verification(
        &server,
        "Far Pho",
        &json!({"verifiedName": "Far Pho", "latitude": 40.9828, "longitude": -73.9855}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(VERIFICATION_PATH))
        .and(body_string_contains("Dumpling Den"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": 500, "message": "internal error", "status": "INTERNAL"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = pipeline(&server)
        .search(&ORIGIN, "tacos", &UserSettings::default())
        .await
        .expect("search should succeed");

    let names: Vec<&str> = results.places.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Birria Bros Taqueria", "Noodle Nook", "Dumpling Den"]);

    let birria = &results.places[0];
    assert!(birria.verified);
    assert_eq!(birria.distance, "0.5 km");
    assert_eq!(
        birria.image_url.as_deref(),
        Some("https://lh3.googleusercontent.com/p/AF1QipBirria=w400-h300-k-no")
    );
    assert_eq!(birria.video_links.len(), 1);
    assert_eq!(birria.video_links[0].url, "https://www.instagram.com/reel/xyz/");

    let noodle = &results.places[1];
    assert!(!noodle.verified);
    assert_eq!(noodle.distance, "Unknown");

    let dumpling = &results.places[2];
    assert!(!dumpling.verified);
    assert_eq!(dumpling.sentiment_summary, "Verification unavailable");
    assert!(dumpling.address.is_none());

    assert!(results.places.iter().all(|p| !p.video_links.is_empty()));
    assert_eq!(results.sources.len(), 2);
    assert!(results.places.iter().all(|p| p.sources == results.sources));
}

#[tokio::test]
async fn leaked_key_during_verification_is_fatal() {
    let server = MockServer::start().await;
    mount_discovery(
        &server,
        discovery_reply(&json!([{"name": "Birria Bros"}]), &[]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path(VERIFICATION_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(leaked_key_body()))
        .mount(&server)
        .await;

    let err = pipeline(&server)
        .search(&ORIGIN, "", &UserSettings::default())
        .await
        .expect_err("leaked key must not degrade");

    assert!(err.is_unauthorized(), "got {err:?}");
}

#[tokio::test]
async fn leaked_key_during_discovery_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DISCOVERY_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(leaked_key_body()))
        .expect(1)
        .mount(&server)
        .await;

    let err = pipeline(&server)
        .search(&ORIGIN, "", &UserSettings::default())
        .await
        .expect_err("should fail");

    assert!(err.is_unauthorized());
    assert!(err.to_string().contains("GEMINI_API_KEY"));
}

#[tokio::test]
async fn discovery_server_error_is_generic_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DISCOVERY_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = pipeline(&server)
        .search(&ORIGIN, "", &UserSettings::default())
        .await
        .expect_err("should fail");

    assert!(matches!(err, PipelineError::Discovery(_)), "got {err:?}");
    assert_eq!(err.to_string(), "Failed to discover viral trends. Please try again.");
}

#[tokio::test]
async fn malformed_discovery_output_fails_loud() {
    let server = MockServer::start().await;
    mount_discovery(&server, model_reply("Sorry, I could not find anything.")).await;

    let err = pipeline(&server)
        .search(&ORIGIN, "", &UserSettings::default())
        .await
        .expect_err("should fail");

    assert!(matches!(err, PipelineError::Discovery(_)), "got {err:?}");
}

#[tokio::test]
async fn malformed_verification_output_degrades_one_candidate() {
    let server = MockServer::start().await;
    mount_discovery(
        &server,
        discovery_reply(&json!([{"name": "Birria Bros"}]), &[]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(VERIFICATION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply("no json here")))
        .expect(1)
        .mount(&server)
        .await;

    let results = pipeline(&server)
        .search(&ORIGIN, "", &UserSettings::default())
        .await
        .expect("degraded record should be returned");

    assert_eq!(results.places.len(), 1);
    assert_eq!(
        results.places[0].sentiment_summary,
        "Verification unavailable"
    );
}

#[tokio::test]
async fn all_candidates_out_of_range_means_no_places() {
    let server = MockServer::start().await;
    mount_discovery(&server, discovery_reply(&json!([{"name": "Far Pho"}]), &[])).await;
    mount_verification(
        &server,
        "Far Pho",
        &json!({"verifiedName": "Far Pho", "latitude": 41.5, "longitude": -73.9855}),
    )
    .await;

    let err = pipeline(&server)
        .search(&ORIGIN, "", &UserSettings::default())
        .await
        .expect_err("should fail");
    assert!(matches!(err, PipelineError::NoPlacesFound));
}

#[tokio::test]
async fn diagnostics_pass_against_healthy_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(VERIFICATION_PATH))
        .and(body_string_contains("\"Ping\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply("Pong")))
        .expect(1)
        .mount(&server)
        .await;
    mount_verification(
        &server,
        "Starbucks",
        &json!({
            "verifiedName": "Starbucks Times Square",
            "latitude": 40.7585,
            "longitude": -73.9850,
            "photoUri": "https://images.example.com/starbucks-times-square.jpg"
        }),
    )
    .await;

    let results = run_diagnostics(&pipeline(&server)).await;

    let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Distance Algorithm", "Gemini API Connection", "Maps Image Fetch"]
    );
    assert!(results.iter().all(|r| r.status == TestStatus::Pass), "{results:?}");
    assert_eq!(
        results[2].message,
        "Found image: https://images.example.com/sta..."
    );
}

#[tokio::test]
async fn diagnostics_keep_running_after_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(VERIFICATION_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(leaked_key_body()))
        .mount(&server)
        .await;

    let results = run_diagnostics(&pipeline(&server)).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].status, TestStatus::Pass);
    assert_eq!(results[1].status, TestStatus::Fail);
    assert_eq!(results[1].message, "API Key Invalid/Leaked (403)");
    assert_eq!(results[2].status, TestStatus::Fail);
}

#[test]
fn from_config_requires_api_key() {
    let config = AppConfig {
        env: Environment::Test,
        bind_addr: "127.0.0.1:3000".parse().unwrap(),
        log_level: "info".to_string(),
        public_url: "http://localhost:3000".to_string(),
        frontend_origin: "http://localhost:5173".to_string(),
        gemini_api_key: None,
        gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
        discovery_model: "gemini-3-flash-preview".to_string(),
        verification_model: "gemini-2.5-flash".to_string(),
        request_timeout_secs: 60,
        connect_timeout_secs: 300,
        instagram: None,
        google: None,
    };

    let err = SearchPipeline::from_config(&config).expect_err("missing key should fail");
    assert!(matches!(err, PipelineError::Config(_)));
    assert!(err.to_string().contains("GEMINI_API_KEY"));
}
