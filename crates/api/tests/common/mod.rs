#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chromance_llm::{
    ChatBackend, ChatCompletion, ChatMessage, EmbeddingConfig, Embedder, LlmConfig, LlmError, Usage,
};
use chromance_db::models::user::CreateUser;
use chromance_db::repositories::UserRepo;
use http_body_util::BodyExt;
use mongodb::Database;
use tower::ServiceExt;

use chromance_api::auth::jwt::{generate_access_token, JwtConfig};
use chromance_api::config::ServerConfig;
use chromance_api::router::build_app_router;
use chromance_api::state::AppState;

pub const TEST_JWT_SECRET: &str = "test-secret-for-integration-tests";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:4200".to_string()],
        request_timeout_secs: 30,
        mongo_uri: "mongodb://127.0.0.1:27017".to_string(),
        mongo_db: "chromance_test".to_string(),
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        llm: LlmConfig::new("http://127.0.0.1:1", None),
        embedding: EmbeddingConfig {
            dimensions: FAKE_DIMENSIONS,
            ..EmbeddingConfig::new("http://127.0.0.1:1", None)
        },
    }
}

// ---------------------------------------------------------------------------
// Fake chat backend
// ---------------------------------------------------------------------------

/// Scripted [`ChatBackend`]: answers every call with `reply`, or fails with
/// a 500 upstream error when `reply` is `None`.
pub struct FakeBackend {
    reply: Option<String>,
    pub calls: AtomicUsize,
    pub last_messages: Mutex<Vec<ChatMessage>>,
}

impl FakeBackend {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
            last_messages: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: AtomicUsize::new(0),
            last_messages: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_messages(&self) -> Vec<ChatMessage> {
        self.last_messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    fn model(&self) -> &str {
        "fake-narrator"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = messages.to_vec();
        match &self.reply {
            Some(reply) => Ok(ChatCompletion {
                content: reply.clone(),
                model: "fake-narrator".to_string(),
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 20,
                    total_tokens: 30,
                }),
            }),
            None => Err(LlmError::Upstream {
                status: 500,
                body: "boom".to_string(),
            }),
        }
    }

    async fn ping(&self) -> Result<(), LlmError> {
        match self.reply {
            Some(_) => Ok(()),
            None => Err(LlmError::NotConfigured),
        }
    }
}

// ---------------------------------------------------------------------------
// Fake embedder
// ---------------------------------------------------------------------------

pub const FAKE_DIMENSIONS: usize = 4;

/// Deterministic [`Embedder`]: maps text to a small vector derived from its
/// length, or fails with a 503 upstream error.
pub struct FakeEmbedder {
    fail: bool,
    pub calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn working() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    fn dimensions(&self) -> usize {
        FAKE_DIMENSIONS
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(LlmError::Upstream {
                status: 503,
                body: "embeddings down".to_string(),
            });
        }
        Ok(inputs
            .iter()
            .map(|text| vec![1.0, text.chars().count() as f32, 0.0, 0.5])
            .collect())
    }
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

/// Build the full application router over `db` and `llm`.
///
/// Uses the same [`build_app_router`] as `main.rs`, so integration tests
/// exercise the production middleware stack.
pub fn build_test_app(db: Database, llm: Arc<dyn ChatBackend>) -> Router {
    build_test_app_with(db, llm, FakeEmbedder::working())
}

/// [`build_test_app`] with a chosen embedder.
pub fn build_test_app_with(
    db: Database,
    llm: Arc<dyn ChatBackend>,
    embedder: Arc<dyn Embedder>,
) -> Router {
    let config = test_config();
    let state = AppState {
        db,
        config: Arc::new(config.clone()),
        llm,
        embedder,
    };
    build_app_router(state, &config)
}

/// An app whose database handle points at a closed port. Only routes that
/// never reach MongoDB behave normally.
pub async fn offline_app(llm: Arc<dyn ChatBackend>) -> Router {
    let db = chromance_db::connect(
        "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200",
        "chromance_offline",
    )
    .await
    .expect("parse offline URI");
    build_test_app(db, llm)
}

/// Connect to a fresh database, or `None` when `MONGO_TEST_URI` is unset.
pub async fn test_db() -> Option<Database> {
    let uri = std::env::var("MONGO_TEST_URI").ok()?;
    let name = format!("chromance_api_test_{}", uuid::Uuid::new_v4().simple());
    let db = chromance_db::connect(&uri, &name)
        .await
        .expect("connect to test MongoDB");
    chromance_db::ensure_indexes(&db)
        .await
        .expect("create indexes");
    Some(db)
}

pub async fn teardown(db: Database) {
    db.drop().await.expect("drop test database");
}

/// A valid access token for `user_id`, signed with the test secret.
pub fn access_token(user_id: &str) -> String {
    generate_access_token(user_id, &test_config().jwt).expect("token generation")
}

/// Insert an active user straight into `db`; returns its id and an access token.
pub async fn seed_user(db: &Database, email: &str) -> (String, String) {
    let user = UserRepo::create(
        db,
        &CreateUser {
            name: "Kai Vega".to_string(),
            email: email.to_string(),
            password_hash: "unused".to_string(),
        },
    )
    .await
    .expect("insert test user");
    let id = user.id.to_hex();
    let token = access_token(&id);
    (id, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(json)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    json: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(json)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    json: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(json)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
