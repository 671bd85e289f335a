//! API route handlers for the gateway.
//!
//! Request bodies are typed. A body that does not parse is treated the same
//! way as a body with the field missing, so the client always gets the
//! documented JSON shape back.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use bidgpt_channels::FeedbackMessage;
use bidgpt_core::error::{BidGptError, ErrorKind};
use bidgpt_core::traits::Mailer;
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

use super::server::AppState;

/// Reply for an empty `/chat` message.
pub const EMPTY_CHAT_REPLY: &str = "Please ask a question.";

/// `/feedback` error when no mailer is configured.
pub const MISSING_CREDENTIALS: &str = "Email credentials not set";

type ApiResponse = (StatusCode, Json<Value>);

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub target_lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Star rating as sent by the front-end: a number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Rating {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n:?}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

fn status_for(err: &BidGptError) -> StatusCode {
    match err.kind() {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `{success:false, error}` with the status matching the error kind.
fn failure(err: &BidGptError) -> ApiResponse {
    (
        status_for(err),
        Json(json!({"success": false, "error": err.to_string()})),
    )
}

/// First `n` characters, for log lines.
fn preview(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let (documents, vocabulary) = state.assistant.knowledge().stats();
    Json(json!({
        "status": "ok",
        "service": "bidgpt-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "documents": documents,
        "vocabulary": vocabulary,
        "provider": state.assistant.provider_name(),
        "model": state.assistant.model(),
        "feedback_configured": state.mailer.is_some(),
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "started_at": state.started_at.to_rfc3339(),
    }))
}

/// `POST /chat`: answer a question with knowledge-base context.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResponse {
    let message = match body {
        Ok(Json(req)) => req.message.unwrap_or_default(),
        Err(e) => {
            tracing::debug!("Unparsable /chat body: {}", e.body_text());
            String::new()
        }
    };

    if message.trim().is_empty() {
        return (StatusCode::OK, Json(json!({"response": EMPTY_CHAT_REPLY})));
    }

    let request_id = uuid::Uuid::new_v4();
    tracing::info!(%request_id, "💬 Chat: '{}…'", preview(&message, 30));

    match state.assistant.answer(&message).await {
        Ok(answer) => (StatusCode::OK, Json(json!({"response": answer}))),
        Err(e) => {
            tracing::error!(%request_id, "❌ Chat failed: {e}");
            (status_for(&e), Json(json!({"error": e.to_string()})))
        }
    }
}

/// `POST /translate`: proxy a translation to the LLM.
pub async fn translate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TranslateRequest>, JsonRejection>,
) -> ApiResponse {
    let req = match body {
        Ok(Json(req)) => req,
        Err(e) => {
            tracing::debug!("Unparsable /translate body: {}", e.body_text());
            TranslateRequest::default()
        }
    };
    let text = req.text.unwrap_or_default();
    let request_id = uuid::Uuid::new_v4();
    tracing::info!(
        %request_id,
        "🌍 Translate request: text='{}...', target_lang='{}'",
        preview(&text, 30),
        req.target_lang
            .as_deref()
            .unwrap_or(state.assistant.default_target_lang())
    );

    if text.trim().is_empty() {
        tracing::info!(%request_id, "No text provided.");
        return failure(&BidGptError::Validation("No text provided".into()));
    }

    match state
        .assistant
        .translate(&text, req.target_lang.as_deref())
        .await
    {
        Ok(translated) => (
            StatusCode::OK,
            Json(json!({"success": true, "translated": translated})),
        ),
        Err(e) => {
            tracing::error!(%request_id, "❌ Translate failed: {e}");
            failure(&e)
        }
    }
}

/// `POST /feedback`: e-mail a rating and comment to the team.
pub async fn feedback(
    State(state): State<Arc<AppState>>,
    body: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResponse {
    let Some(mailer) = state.mailer.as_ref() else {
        tracing::warn!("⚠️ Feedback rejected: {MISSING_CREDENTIALS}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "error": MISSING_CREDENTIALS})),
        );
    };

    let req = match body {
        Ok(Json(req)) => req,
        Err(e) => {
            return failure(&BidGptError::Validation(format!(
                "Invalid feedback payload: {}",
                e.body_text()
            )));
        }
    };

    let rating = req
        .rating
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".into());
    let message = FeedbackMessage::new(&rating, req.feedback.as_deref().unwrap_or(""));

    match mailer.send(&message.subject, &message.body).await {
        Ok(()) => {
            tracing::info!("⭐ Feedback delivered (rating={rating})");
            (StatusCode::OK, Json(json!({"success": true})))
        }
        Err(e) => {
            tracing::error!("❌ Feedback delivery via {} failed: {e}", mailer.name());
            failure(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{Features, build_router};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use bidgpt_agent::Assistant;
    use bidgpt_core::traits::identity::Identity;
    use bidgpt_core::traits::{GenerateParams, Mailer, Provider};
    use bidgpt_core::types::{Message, ProviderResponse};
    use bidgpt_knowledge::KnowledgeStore;
    use std::sync::Mutex;
    use tower::ServiceExt;

    // ---- Fakes ----

    struct FakeProvider {
        calls: Mutex<Vec<Vec<Message>>>,
        reply: std::result::Result<String, String>,
    }

    impl FakeProvider {
        fn ok(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(vec![]),
                reply: Ok(reply.into()),
            })
        }

        fn failing(reason: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(vec![]),
                reply: Err(reason.into()),
            })
        }

        fn calls(&self) -> Vec<Vec<Message>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Provider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        async fn chat(
            &self,
            messages: &[Message],
            _params: &GenerateParams,
        ) -> bidgpt_core::Result<ProviderResponse> {
            self.calls.lock().unwrap().push(messages.to_vec());
            match &self.reply {
                Ok(text) => Ok(ProviderResponse {
                    content: Some(text.clone()),
                    ..ProviderResponse::default()
                }),
                Err(reason) => Err(BidGptError::Timeout(reason.clone())),
            }
        }
    }

    struct FakeMailer {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl FakeMailer {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(vec![]),
                fail,
            })
        }
    }

    #[async_trait]
    impl Mailer for FakeMailer {
        fn name(&self) -> &str {
            "fake"
        }

        async fn send(&self, subject: &str, body: &str) -> bidgpt_core::Result<()> {
            if self.fail {
                return Err(BidGptError::Mail("535 authentication failed".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn test_state(provider: Arc<FakeProvider>, static_dir: &std::path::Path) -> AppState {
        let knowledge = Arc::new(
            KnowledgeStore::from_documents(
                vec![
                    "Tenders must be submitted by 5pm.".into(),
                    "Bids require a deposit.".into(),
                ],
                0.2,
            )
            .unwrap(),
        );
        let assistant = Assistant::new(
            Identity::default(),
            knowledge,
            provider,
            GenerateParams::default(),
        );
        AppState::new(Arc::new(assistant), static_dir.to_path_buf())
    }

    fn no_static() -> std::path::PathBuf {
        std::env::temp_dir().join("bidgpt-test-no-static-dir")
    }

    async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
        post_raw(app, uri, body.to_string()).await
    }

    async fn post_raw(app: axum::Router, uri: &str, body: String) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    // ---- /chat ----

    #[tokio::test]
    async fn test_chat_empty_message_skips_gateway() {
        let provider = FakeProvider::ok("unused");
        let app = build_router(test_state(provider.clone(), &no_static()), &Features::default());

        for body in [json!({"message": ""}), json!({"message": "   "}), json!({})] {
            let (status, json) = post_json(app.clone(), "/chat", body).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["response"], "Please ask a question.");
        }
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_chat_unparsable_body_gets_canned_reply() {
        let provider = FakeProvider::ok("unused");
        let app = build_router(test_state(provider.clone(), &no_static()), &Features::default());

        let (status, json) = post_raw(app, "/chat", "not json".into()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["response"], EMPTY_CHAT_REPLY);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_chat_injects_matching_knowledge() {
        let provider = FakeProvider::ok("Submit before 5pm.");
        let app = build_router(test_state(provider.clone(), &no_static()), &Features::default());

        let (status, json) = post_json(
            app,
            "/chat",
            json!({"message": "When is the tender deadline?"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["response"], "Submit before 5pm.");

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert!(
            calls[0][0]
                .content
                .contains("Knowledge base: Tenders must be submitted by 5pm.")
        );
        assert_eq!(calls[0][1].content, "When is the tender deadline?");
    }

    #[tokio::test]
    async fn test_chat_gateway_failure_is_500() {
        let provider = FakeProvider::failing("groq did not answer in time");
        let app = build_router(test_state(provider, &no_static()), &Features::default());

        let (status, json) = post_json(app, "/chat", json!({"message": "Deposit?"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().contains("did not answer in time"));
    }

    // ---- /translate ----

    #[tokio::test]
    async fn test_translate_empty_text_is_400() {
        let provider = FakeProvider::ok("unused");
        let app = build_router(test_state(provider.clone(), &no_static()), &Features::default());

        let (status, json) = post_json(app.clone(), "/translate", json!({"text": ""})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({"success": false, "error": "No text provided"}));

        let (status, _) = post_raw(app, "/translate", "{".into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_translate_defaults_to_hi() {
        let provider = FakeProvider::ok(" नमस्ते ");
        let app = build_router(test_state(provider.clone(), &no_static()), &Features::default());

        let (status, json) = post_json(app, "/translate", json!({"text": "Hello"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"success": true, "translated": "नमस्ते"}));

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0][1].content.contains("hi"));
        assert_eq!(calls[0][1].content, "Translate the following text to hi: Hello");
    }

    #[tokio::test]
    async fn test_translate_explicit_language() {
        let provider = FakeProvider::ok("Bonjour");
        let app = build_router(test_state(provider.clone(), &no_static()), &Features::default());

        post_json(app, "/translate", json!({"text": "Hello", "target_lang": "fr"})).await;
        assert!(provider.calls()[0][1].content.contains(" to fr: Hello"));
    }

    #[tokio::test]
    async fn test_translate_gateway_failure_is_500() {
        let provider = FakeProvider::failing("upstream timeout");
        let app = build_router(test_state(provider, &no_static()), &Features::default());

        let (status, json) = post_json(app, "/translate", json!({"text": "Hello"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("upstream timeout"));
    }

    // ---- /feedback ----

    #[tokio::test]
    async fn test_feedback_without_credentials_is_500() {
        let provider = FakeProvider::ok("unused");
        let app = build_router(test_state(provider, &no_static()), &Features::default());

        let (status, json) =
            post_json(app, "/feedback", json!({"rating": 5, "feedback": "nice"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Email credentials not set");
    }

    #[tokio::test]
    async fn test_feedback_sends_formatted_mail() {
        let mailer = FakeMailer::new(false);
        let state = test_state(FakeProvider::ok("unused"), &no_static()).with_mailer(mailer.clone());
        let app = build_router(state, &Features::default());

        let (status, json) = post_json(
            app.clone(),
            "/feedback",
            json!({"rating": 5, "feedback": "Very helpful"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"success": true}));

        post_json(app, "/feedback", json!({"rating": "4", "feedback": "ok"})).await;

        let sent = mailer.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, "BidGPT Feedback - Rating: 5");
        assert_eq!(sent[0].1, "Rating: 5\nFeedback: Very helpful");
        assert_eq!(sent[1].0, "BidGPT Feedback - Rating: 4");
    }

    #[tokio::test]
    async fn test_feedback_send_failure_is_500() {
        let state = test_state(FakeProvider::ok("unused"), &no_static())
            .with_mailer(FakeMailer::new(true));
        let app = build_router(state, &Features::default());

        let (status, json) = post_json(app, "/feedback", json!({"rating": 1})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().contains("535"));
    }

    #[test]
    fn test_rating_display() {
        let r: Rating = serde_json::from_value(json!(5)).unwrap();
        assert_eq!(r.to_string(), "5");
        let r: Rating = serde_json::from_value(json!(4.5)).unwrap();
        assert_eq!(r.to_string(), "4.5");
        let r: Rating = serde_json::from_value(json!(5.0)).unwrap();
        assert_eq!(r, Rating::Float(5.0));
        assert_eq!(r.to_string(), "5.0");
        let r: Rating = serde_json::from_value(json!("great")).unwrap();
        assert_eq!(r.to_string(), "great");
    }

    // ---- Feature flags ----

    #[tokio::test]
    async fn test_disabled_routes_are_not_mounted() {
        let provider = FakeProvider::ok("unused");
        let features = Features {
            translation: false,
            feedback: false,
            ..Features::default()
        };
        let mailer = FakeMailer::new(false);
        let state = test_state(provider.clone(), &no_static()).with_mailer(mailer.clone());
        let app = build_router(state, &features);

        let (status, _) = post_json(app.clone(), "/translate", json!({"text": "Hello"})).await;
        assert!(
            status == StatusCode::NOT_FOUND || status == StatusCode::METHOD_NOT_ALLOWED,
            "got {status}"
        );
        assert!(provider.calls().is_empty());

        let (status, _) =
            post_json(app.clone(), "/feedback", json!({"rating": 5, "feedback": "nice"})).await;
        assert!(
            status == StatusCode::NOT_FOUND || status == StatusCode::METHOD_NOT_ALLOWED,
            "got {status}"
        );
        assert!(mailer.sent.lock().unwrap().is_empty());

        let (status, json) = post_json(app, "/chat", json!({"message": ""})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["response"], EMPTY_CHAT_REPLY);
    }

    #[tokio::test]
    async fn test_feedback_only_mounts_independently() {
        let features = Features {
            translation: false,
            ..Features::default()
        };
        let mailer = FakeMailer::new(false);
        let state =
            test_state(FakeProvider::ok("unused"), &no_static()).with_mailer(mailer.clone());
        let app = build_router(state, &features);

        let (status, _) = post_json(app, "/feedback", json!({"rating": 3})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(mailer.sent.lock().unwrap()[0].0, "BidGPT Feedback - Rating: 3");
    }

    // ---- Health & static ----

    #[tokio::test]
    async fn test_health_check() {
        let app = build_router(
            test_state(FakeProvider::ok("unused"), &no_static()),
            &Features::default(),
        );
        let (status, body) = get(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["documents"], 2);
        assert_eq!(json["provider"], "fake");
        assert_eq!(json["feedback_configured"], false);
    }

    #[tokio::test]
    async fn test_static_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>BidGPT</h1>").unwrap();
        std::fs::write(dir.path().join("script.js"), "console.log('hi');").unwrap();
        let app = build_router(
            test_state(FakeProvider::ok("unused"), dir.path()),
            &Features::default(),
        );

        let (status, body) = get(app.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("BidGPT"));

        let (status, body) = get(app.clone(), "/script.js").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("console.log"));

        let (status, _) = get(app, "/missing.css").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
