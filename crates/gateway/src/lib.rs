//! HTTP API gateway for ReAgent.
//!
//! Exposes the execution engine over REST: blocking chat, SSE streaming
//! chat, out-of-band interruption, and a health check.
//!
//! Built on Axum for high performance async HTTP.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use reagent_agent::{AgentExecutor, ReactStep, SessionRegistry, ToolCallStep};
use reagent_backends::OpenAiCompatBackend;
use reagent_core::error::AgentError;

/// Shared application state for the gateway.
pub struct GatewayState {
    /// The shared step implementation; each session gets its own executor
    /// driving this step.
    pub step: Arc<dyn ReactStep>,

    /// Loop iteration ceiling applied to every session.
    pub max_steps: u32,

    /// Live sessions, for interrupt routing.
    pub sessions: Arc<SessionRegistry>,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/chat", post(chat_handler))
        .route("/v1/chat/stream", post(chat_stream_handler))
        .route("/v1/chat/interrupt", post(interrupt_handler))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(config: reagent_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let state = Arc::new(build_state(&config)?);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, build_router(state)).await?;

    Ok(())
}

/// Build the shared gateway state from configuration: one backend, one
/// tool registry, one step implementation, shared by all sessions.
pub fn build_state(
    config: &reagent_config::AppConfig,
) -> Result<GatewayState, Box<dyn std::error::Error>> {
    let api_key = config.backend.api_key.clone().ok_or(
        "No API key configured — set backend.api_key in config.toml or the REAGENT_API_KEY env var",
    )?;

    let backend = OpenAiCompatBackend::new(
        "openai-compat",
        &config.backend.base_url,
        api_key,
        &config.backend.model,
    )?
    .with_temperature(config.backend.temperature);

    let sandbox_dir = config.tools.resolve_sandbox_dir();
    std::fs::create_dir_all(&sandbox_dir)?;
    let registry = Arc::new(reagent_tools::default_registry(&sandbox_dir));
    let tool_definitions = registry.definitions();
    let tool_executor = Arc::new(reagent_tools::RegistryExecutor::new(registry));

    let step = ToolCallStep::new(Arc::new(backend), tool_executor, tool_definitions)
        .with_system_prompt(&config.agent.system_prompt)
        .with_next_step_prompt(&config.agent.next_step_prompt);

    Ok(GatewayState {
        step: Arc::new(step),
        max_steps: config.agent.max_steps,
        sessions: Arc::new(SessionRegistry::new()),
    })
}

/// Removes the session entry when the response stream is dropped, whether
/// the run completed, the client disconnected, or the transport timed out.
struct SessionGuard {
    sessions: Arc<SessionRegistry>,
    session_id: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let sessions = self.sessions.clone();
        let session_id = std::mem::take(&mut self.session_id);
        tokio::spawn(async move {
            sessions.remove(&session_id).await;
        });
    }
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,

    /// Caller-chosen session id; generated when absent.
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    session_id: String,
    response: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn agent_error_status(e: &AgentError) -> StatusCode {
    match e {
        AgentError::EmptyInput => StatusCode::BAD_REQUEST,
        AgentError::InvalidState { .. } => StatusCode::CONFLICT,
    }
}

/// `POST /v1/chat` — run a message to completion, return the full result.
async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let session_id = payload
        .session_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    info!(session = %session_id, "v1/chat request");

    let agent = Arc::new(
        AgentExecutor::new(&session_id, state.step.clone()).with_max_steps(state.max_steps),
    );

    // Registered for the duration of the run so interrupts can reach it.
    state.sessions.insert(&session_id, agent.clone()).await;
    let result = agent.run(&payload.message).await;
    state.sessions.remove(&session_id).await;

    match result {
        Ok(response) => Ok(Json(ChatResponse {
            session_id,
            response,
        })),
        Err(e) => {
            error!(session = %session_id, error = %e, "chat request rejected");
            Err((
                agent_error_status(&e),
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

/// `POST /v1/chat/stream` — run a message, receive an SSE stream of
/// fragments as each step completes.
async fn chat_stream_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Sse<impl futures::Stream<Item = Result<SseEvent, Infallible>>> {
    let session_id = payload
        .session_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    info!(session = %session_id, "v1/chat/stream SSE request");

    let agent = Arc::new(
        AgentExecutor::new(&session_id, state.step.clone()).with_max_steps(state.max_steps),
    );
    state.sessions.insert(&session_id, agent.clone()).await;

    let guard = SessionGuard {
        sessions: state.sessions.clone(),
        session_id,
    };

    let rx = agent.run_stream(&payload.message);
    let stream = ReceiverStream::new(rx).map(move |fragment| {
        let _ = &guard;
        let event_type = fragment.event_type().to_string();
        let data = serde_json::to_string(&fragment).unwrap_or_default();
        Ok(SseEvent::default().event(event_type).data(data))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[derive(Deserialize)]
struct InterruptRequest {
    session_id: String,
}

#[derive(Serialize)]
struct InterruptResponse {
    session_id: String,
    interrupted: bool,
}

/// `POST /v1/chat/interrupt` — request cooperative interruption of a
/// running session. The run stops at its next step boundary.
async fn interrupt_handler(
    State(state): State<SharedState>,
    Json(payload): Json<InterruptRequest>,
) -> Result<Json<InterruptResponse>, (StatusCode, Json<ErrorResponse>)> {
    if state.sessions.interrupt(&payload.session_id).await {
        info!(session = %payload.session_id, "interrupt delivered");
        Ok(Json(InterruptResponse {
            session_id: payload.session_id,
            interrupted: true,
        }))
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("no active session: {}", payload.session_id),
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use reagent_core::backend::{Reasoning, ReasoningBackend, TERMINATE_TOOL};
    use reagent_core::error::BackendError;
    use reagent_core::message::{Conversation, MessageToolCall};
    use reagent_core::tool::ToolDefinition;
    use std::collections::VecDeque;
    use tower::ServiceExt;

    /// A backend that plays back a fixed script of reasoning outcomes.
    struct ScriptedBackend {
        script: std::sync::Mutex<VecDeque<Reasoning>>,
    }

    impl ScriptedBackend {
        fn new(outcomes: Vec<Reasoning>) -> Self {
            Self {
                script: std::sync::Mutex::new(outcomes.into()),
            }
        }

        fn terminate_immediately() -> Self {
            Self::new(vec![Reasoning {
                reply: "done".into(),
                tool_calls: vec![MessageToolCall {
                    id: "call_1".into(),
                    name: TERMINATE_TOOL.into(),
                    arguments: "{}".into(),
                }],
            }])
        }
    }

    #[async_trait]
    impl ReasoningBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn reason(
            &self,
            _conversation: &Conversation,
            _system_prompt: &str,
            _tools: &[ToolDefinition],
        ) -> Result<Reasoning, BackendError> {
            let next = self.script.lock().unwrap().pop_front();
            Ok(next.unwrap_or(Reasoning {
                reply: "out of script".into(),
                tool_calls: vec![],
            }))
        }
    }

    fn test_state(backend: ScriptedBackend) -> SharedState {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(reagent_tools::default_registry(dir.path()));
        let definitions = registry.definitions();
        let executor = Arc::new(reagent_tools::RegistryExecutor::new(registry));
        let step = ToolCallStep::new(Arc::new(backend), executor, definitions);

        Arc::new(GatewayState {
            step: Arc::new(step),
            max_steps: 3,
            sessions: Arc::new(SessionRegistry::new()),
        })
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state(ScriptedBackend::new(vec![])));

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn chat_runs_to_termination() {
        let app = build_router(test_state(ScriptedBackend::terminate_immediately()));

        let req = Request::builder()
            .method("POST")
            .uri("/v1/chat")
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"message": "finish the task"}"#))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(
            parsed["response"]
                .as_str()
                .unwrap()
                .starts_with("Step 1:")
        );
        assert!(!parsed["session_id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn chat_blank_message_is_bad_request() {
        let app = build_router(test_state(ScriptedBackend::new(vec![])));

        let req = Request::builder()
            .method("POST")
            .uri("/v1/chat")
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"message": "   "}"#))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn interrupt_unknown_session_is_not_found() {
        let app = build_router(test_state(ScriptedBackend::new(vec![])));

        let req = Request::builder()
            .method("POST")
            .uri("/v1/chat/interrupt")
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"session_id": "ghost"}"#))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stream_responds_with_event_stream() {
        let app = build_router(test_state(ScriptedBackend::terminate_immediately()));

        let req = Request::builder()
            .method("POST")
            .uri("/v1/chat/stream")
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"message": "go", "session_id": "s1"}"#))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("text/event-stream")
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("event: thinking"));
        assert!(text.contains("event: done"));
    }
}
