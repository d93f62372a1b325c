use std::{sync::Arc, time::Duration};

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use shared::{domain::Language, error::GENERIC_REQUEST_FAILURE};
use tokio::{net::TcpListener, sync::Mutex};

use crate::gateway::{Endpoint, Gateway, GatewayConfig, GatewayError, HttpGateway};

type Captured = Arc<Mutex<Vec<Value>>>;

async fn spawn_server(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn gateway_for(base_url: &str) -> HttpGateway {
    let config = GatewayConfig::new(base_url)
        .expect("config")
        .with_timeout(Duration::from_secs(5));
    HttpGateway::new(config).expect("gateway")
}

fn echo_route(path: &str, captured: Captured, reply: Value) -> Router {
    Router::new().route(
        path,
        post(move |Json(body): Json<Value>| {
            let captured = captured.clone();
            let reply = reply.clone();
            async move {
                captured.lock().await.push(body);
                Json(reply)
            }
        }),
    )
}

#[tokio::test]
async fn fact_check_posts_statement_and_decodes_verdict() {
    let captured: Captured = Arc::default();
    let app = echo_route(
        "/api/fact-check",
        captured.clone(),
        json!({
            "classification": "FALSE",
            "explanation": "Contradicted by evidence",
            "fragments": ["Satellite imagery..."],
            "sources": {"nasa.gov": true}
        }),
    );
    let gateway = gateway_for(&spawn_server(app).await);

    let verification = gateway
        .fact_check("The earth is flat")
        .await
        .expect("verdict");

    assert_eq!(verification.classification, "FALSE");
    assert_eq!(verification.source_status("nasa.gov"), Some(true));
    assert_eq!(
        *captured.lock().await,
        vec![json!({"statement": "The earth is flat"})]
    );
}

#[tokio::test]
async fn summarize_and_translate_use_their_own_endpoints() {
    let summaries: Captured = Arc::default();
    let translations: Captured = Arc::default();
    let app = echo_route(
        "/api/summarize-source",
        summaries.clone(),
        json!({"source": "nasa.gov", "target_language": "Spanish", "summary": "Resumen"}),
    )
    .merge(echo_route(
        "/api/translate",
        translations.clone(),
        json!({"target_language": "French", "translated_text": "Bonjour", "source_text": "Hello"}),
    ));
    let gateway = gateway_for(&spawn_server(app).await);

    let summary = gateway
        .summarize_source("nasa.gov", Language::Spanish)
        .await
        .expect("summary");
    assert_eq!(summary.summary, "Resumen");

    let translation = gateway
        .translate("Hello", Language::French)
        .await
        .expect("translation");
    assert_eq!(translation.translated_text, "Bonjour");
    assert_eq!(translation.source_text.as_deref(), Some("Hello"));

    assert_eq!(
        *summaries.lock().await,
        vec![json!({"source": "nasa.gov", "target_language": "Spanish"})]
    );
    assert_eq!(
        *translations.lock().await,
        vec![json!({"text": "Hello", "target_language": "French"})]
    );
}

#[tokio::test]
async fn non_success_status_carries_body_text() {
    let app = Router::new().route(
        "/api/fact-check",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "internal error") }),
    );
    let gateway = gateway_for(&spawn_server(app).await);

    let err = gateway
        .call(Endpoint::FactCheck, json!({"statement": "X"}))
        .await
        .expect_err("must fail");

    assert_eq!(
        err,
        GatewayError::Remote {
            status: 500,
            message: "internal error".into()
        }
    );
    assert_eq!(err.to_string(), "internal error");
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn non_success_status_prefers_json_error_field() {
    let app = Router::new().route(
        "/api/fact-check",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Missing statement in request"})),
            )
        }),
    );
    let gateway = gateway_for(&spawn_server(app).await);

    let err = gateway
        .call(Endpoint::FactCheck, json!({}))
        .await
        .expect_err("must fail");
    assert_eq!(err.to_string(), "Missing statement in request");
}

#[tokio::test]
async fn empty_failure_body_uses_generic_reason() {
    let app = Router::new().route(
        "/api/translate",
        post(|| async { StatusCode::BAD_GATEWAY }),
    );
    let gateway = gateway_for(&spawn_server(app).await);

    let err = gateway
        .translate("Hello", Language::German)
        .await
        .expect_err("must fail");
    assert_eq!(
        err,
        GatewayError::Remote {
            status: 502,
            message: GENERIC_REQUEST_FAILURE.into()
        }
    );
}

#[tokio::test]
async fn success_without_json_is_an_invalid_response() {
    let app = Router::new().route("/api/fact-check", post(|| async { "not json" }));
    let gateway = gateway_for(&spawn_server(app).await);

    let err = gateway
        .fact_check("X")
        .await
        .expect_err("must fail");
    assert!(matches!(err, GatewayError::InvalidResponse(_)), "{err:?}");
}

#[tokio::test]
async fn unexpected_response_shape_is_an_invalid_response() {
    let app = echo_route(
        "/api/summarize-source",
        Arc::default(),
        json!({"unexpected": true}),
    );
    let gateway = gateway_for(&spawn_server(app).await);

    let err = gateway
        .summarize_source("nasa.gov", Language::English)
        .await
        .expect_err("must fail");
    assert!(matches!(err, GatewayError::InvalidResponse(_)), "{err:?}");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let gateway = gateway_for(&format!("http://{addr}"));

    let err = gateway
        .fact_check("X")
        .await
        .expect_err("must fail");
    assert!(matches!(err, GatewayError::Transport(_)), "{err:?}");
    assert_eq!(err.status(), None);
}

#[test]
fn endpoint_urls_keep_base_path_prefix() {
    let config = GatewayConfig::new("http://checker.local:5000/proxy").expect("config");
    assert_eq!(
        config
            .endpoint_url(Endpoint::SummarizeSource)
            .expect("url")
            .as_str(),
        "http://checker.local:5000/proxy/api/summarize-source"
    );

    let config = GatewayConfig::new("http://127.0.0.1:5000/").expect("config");
    assert_eq!(
        config.endpoint_url(Endpoint::FactCheck).expect("url").as_str(),
        "http://127.0.0.1:5000/api/fact-check"
    );
}

#[test]
fn rejects_malformed_base_url() {
    assert!(GatewayConfig::new("not a url").is_err());
}
