//! Synapse-Architect Gateway — Neuro-Lab UI and trace API.
//! One form, one model call per trace, validated JSON rendered as cards plus a Mermaid flowchart.

mod render;

use axum::{
    body::Body,
    extract::{ConnectInfo, Form, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use synapse_core::{build_backend, reference, run_trace, SynapseConfig, TraceBackend, TraceError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use render::NoticeKind;

#[derive(Clone)]
struct AppState {
    config: Arc<SynapseConfig>,
    backend: Arc<dyn TraceBackend>,
}

#[derive(Deserialize)]
struct TraceRequest {
    #[serde(default)]
    stimulus: String,
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[synapse-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match SynapseConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[synapse-gateway] configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if config.llm_mode == synapse_core::LlmMode::Live && config.api_key().is_none() {
        tracing::warn!(
            "[SYNAPSE] No API key found. Set SYNAPSE_API_KEY, GITHUB_TOKEN or OPENAI_API_KEY in .env; traces will fail until then."
        );
    }

    let bind_addr = config.bind_addr.clone();
    let backend = build_backend(&config);
    tracing::info!(
        "[SYNAPSE] Neuro-Lab starting on {} (mode {:?}, backend {})",
        bind_addr,
        config.llm_mode,
        backend.label()
    );

    let state = AppState {
        config: Arc::new(config),
        backend,
    };

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("[synapse-gateway] cannot bind {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(
        listener,
        build_router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        tracing::error!("[SYNAPSE] server stopped: {}", e);
    }
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(serve_landing))
        .route("/static/neuro_lab.css", get(serve_stylesheet))
        .route("/trace", post(trace_form_handler))
        .route("/api/v1/trace", post(trace_api_handler))
        .route("/api/v1/reference", get(reference_handler))
        .with_state(state)
        .layer(axum::middleware::from_fn(log_lab_traffic))
}

async fn log_lab_traffic(request: Request<Body>, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    tracing::info!("[SYNAPSE] {} {} from {}", request.method(), request.uri().path(), peer);
    next.run(request).await
}

async fn health() -> &'static str {
    "OK"
}

async fn serve_landing() -> Html<String> {
    Html(render::landing_page(None))
}

async fn serve_stylesheet() -> impl IntoResponse {
    const CSS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/neuro_lab.css"));
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], CSS)
}

/// POST /trace: form submit from the Neuro-Lab page. Always answers with a full page;
/// problems show up as inline notices.
async fn trace_form_handler(
    State(state): State<AppState>,
    Form(form): Form<TraceRequest>,
) -> Html<String> {
    if form.stimulus.trim().is_empty() {
        return Html(render::landing_page(Some((
            NoticeKind::Warning,
            "Enter a stimulus to trace, or pick one from Quick Stimuli.",
        ))));
    }

    match run_trace(
        state.backend.as_ref(),
        &form.stimulus,
        state.config.max_stimulus_chars,
    )
    .await
    {
        Ok(outcome) if outcome.is_valid() => Html(render::result_page(&outcome)),
        Ok(outcome) => Html(render::rejected_page(&outcome)),
        Err(e) => {
            tracing::error!("[SYNAPSE] trace failed: {}", e);
            Html(render::failure_page(form.stimulus.trim(), &e))
        }
    }
}

/// POST /api/v1/trace: JSON in, `TraceOutcome` out. Invalid replies still return 200
/// with `validation.valid = false`.
async fn trace_api_handler(
    State(state): State<AppState>,
    Json(body): Json<TraceRequest>,
) -> Result<Response, (StatusCode, Json<serde_json::Value>)> {
    let outcome = run_trace(
        state.backend.as_ref(),
        &body.stimulus,
        state.config.max_stimulus_chars,
    )
    .await
    .map_err(|e| {
        tracing::error!("[SYNAPSE] trace failed: {}", e);
        (status_for(&e), Json(serde_json::json!({ "error": e.to_string() })))
    })?;

    Ok(Json(outcome).into_response())
}

fn status_for(err: &TraceError) -> StatusCode {
    match err {
        TraceError::EmptyStimulus | TraceError::StimulusTooLong { .. } => StatusCode::BAD_REQUEST,
        TraceError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
        TraceError::Http(_)
        | TraceError::Upstream(..)
        | TraceError::Envelope(_)
        | TraceError::EmptyCompletion
        | TraceError::UnparseableOutput => StatusCode::BAD_GATEWAY,
    }
}

async fn reference_handler() -> Json<serde_json::Value> {
    Json(serde_json::to_value(reference()).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use synapse_core::{LlmMode, MockBackend};
    use tower::ServiceExt;

    /// Answers every prompt with a fixed reply or a fixed error.
    struct Canned(Result<&'static str, fn() -> TraceError>);

    #[async_trait]
    impl TraceBackend for Canned {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, TraceError> {
            match &self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(make) => Err(make()),
            }
        }

        fn label(&self) -> &str {
            "canned"
        }
    }

    fn test_state(backend: Arc<dyn TraceBackend>) -> AppState {
        AppState {
            config: Arc::new(SynapseConfig {
                llm_mode: LlmMode::Mock,
                max_stimulus_chars: 40,
                ..SynapseConfig::default()
            }),
            backend,
        }
    }

    fn form_request(stimulus: &str) -> Request<Body> {
        let encoded: String = stimulus
            .chars()
            .map(|c| if c == ' ' { '+' } else { c })
            .collect();
        Request::builder()
            .method("POST")
            .uri("/trace")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("stimulus={}", encoded)))
            .unwrap()
    }

    fn json_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/trace")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(res: Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_ok() {
        let app = build_router(test_state(Arc::new(MockBackend)));
        let res = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "OK");
    }

    #[tokio::test]
    async fn landing_and_stylesheet_are_served() {
        let app = build_router(test_state(Arc::new(MockBackend)));
        let res = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains("SYNAPSE-ARCHITECT"));

        let res = app
            .oneshot(
                Request::builder()
                    .uri("/static/neuro_lab.css")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/css; charset=utf-8"
        );
        assert!(body_text(res).await.contains("--neon-green"));
    }

    #[tokio::test]
    async fn form_trace_renders_result_page() {
        let app = build_router(test_state(Arc::new(MockBackend)));
        let res = app.oneshot(form_request("Stubbing a toe")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.contains("Signal Trace: <em>Stubbing a toe</em>"));
        assert!(html.contains(r#"<pre class="mermaid">"#));
    }

    #[tokio::test]
    async fn blank_form_shows_warning_on_landing() {
        let app = build_router(test_state(Arc::new(MockBackend)));
        let res = app.oneshot(form_request("   ")).await.unwrap();
        let html = body_text(res).await;
        assert!(html.contains("notice warning"));
        assert!(html.contains("5-Step Reasoning"));
    }

    #[tokio::test]
    async fn invalid_reply_renders_rejection() {
        let app = build_router(test_state(Arc::new(Canned(Ok(r#"{"stimulus": "x", "steps": []}"#)))));
        let res = app.oneshot(form_request("Stubbing a toe")).await.unwrap();
        let html = body_text(res).await;
        assert!(html.contains("Response validation failed"));
        assert!(html.contains("Missing required key: &#39;mermaid_flowchart&#39;"));
    }

    #[tokio::test]
    async fn backend_failure_renders_key_hint() {
        let app = build_router(test_state(Arc::new(Canned(Err(|| TraceError::MissingApiKey)))));
        let res = app.oneshot(form_request("Stubbing a toe")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.contains("Error during neural trace"));
        assert!(html.contains("notice info"));
    }

    #[tokio::test]
    async fn api_returns_outcome() {
        let app = build_router(test_state(Arc::new(MockBackend)));
        let res = app
            .oneshot(json_request(serde_json::json!({"stimulus": "Hearing a loud bang"})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
        assert_eq!(json["validation"]["valid"], true);
        assert_eq!(json["trace"]["steps"].as_array().unwrap().len(), 5);
        assert_eq!(json["backend"], "mock");
        assert!(json["traced_at"].is_string());
    }

    #[tokio::test]
    async fn api_maps_errors_to_status() {
        let app = build_router(test_state(Arc::new(MockBackend)));
        let res = app
            .clone()
            .oneshot(json_request(serde_json::json!({"stimulus": ""})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = app
            .oneshot(json_request(serde_json::json!({"stimulus": "x".repeat(41)})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
        assert!(json["error"].as_str().unwrap().contains("limit is 40"));

        let app = build_router(test_state(Arc::new(Canned(Err(|| TraceError::MissingApiKey)))));
        let res = app
            .clone()
            .oneshot(json_request(serde_json::json!({"stimulus": "x"})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

        let app = build_router(test_state(Arc::new(Canned(Ok("no json here")))));
        let res = app
            .oneshot(json_request(serde_json::json!({"stimulus": "x"})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn reference_endpoint_serves_table() {
        let app = build_router(test_state(Arc::new(MockBackend)));
        let res = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/reference")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
        assert_eq!(json["key_brain_regions"]["hypothalamus"], "Regulates temperature, hunger, thirst");
    }
}
