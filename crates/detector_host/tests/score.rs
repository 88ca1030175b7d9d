use std::time::Duration;

use detector_host::{HttpScoreService, ScoreError, ScoreService, ScoreSettings};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(server: &MockServer) -> HttpScoreService {
    HttpScoreService::new(ScoreSettings::new(server.uri())).expect("client")
}

#[tokio::test]
async fn posts_raw_text_and_parses_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/score"))
        .and(body_json(serde_json::json!({ "text": " raw selection " })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "prob_ai": 0.63,
            "n_tokens": 512,
            "model": "mock-detector",
            "version": "1.0.0",
            "latency": 0.042,
        })))
        .mount(&server)
        .await;

    let outcome = service(&server).score(" raw selection ").await.expect("score ok");
    assert_eq!(outcome.prob_ai, 0.63);
    assert_eq!(outcome.n_tokens, Some(512));
    assert_eq!(outcome.model.as_deref(), Some("mock-detector"));
    assert_eq!(outcome.ci_low, None);
    assert_eq!(outcome.version.as_deref(), Some("1.0.0"));
}

#[tokio::test]
async fn missing_optional_fields_stay_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/score"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "prob_ai": 0.2 })),
        )
        .mount(&server)
        .await;

    let outcome = service(&server).score("text").await.expect("score ok");
    assert_eq!(outcome.prob_ai, 0.2);
    assert_eq!(outcome.n_tokens, None);
    assert_eq!(outcome.model, None);
}

#[tokio::test]
async fn upstream_detail_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/score"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(serde_json::json!({ "detail": "model_unavailable" })),
        )
        .mount(&server)
        .await;

    let err = service(&server).score("text").await.unwrap_err();
    assert_eq!(
        err,
        ScoreError::Upstream {
            status: 500,
            detail: "model_unavailable".to_string(),
        }
    );
}

#[tokio::test]
async fn unreadable_error_body_falls_back_to_status_label() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/score"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = service(&server).score("text").await.unwrap_err();
    assert_eq!(
        err,
        ScoreError::Upstream {
            status: 503,
            detail: "HTTP 503".to_string(),
        }
    );
}

#[tokio::test]
async fn success_body_without_probability_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/score"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "model": "x" })),
        )
        .mount(&server)
        .await;

    let err = service(&server).score("text").await.unwrap_err();
    assert!(matches!(err, ScoreError::Upstream { status: 200, .. }));
}

#[tokio::test]
async fn slow_service_times_out_as_network_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/score"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(serde_json::json!({ "prob_ai": 0.5 })),
        )
        .mount(&server)
        .await;

    let settings = ScoreSettings {
        request_timeout: Duration::from_millis(50),
        ..ScoreSettings::new(server.uri())
    };
    let service = HttpScoreService::new(settings).expect("client");

    let err = service.score("text").await.unwrap_err();
    assert!(matches!(err, ScoreError::Network(_)));
}
