//! In-process stand-in for the search backend used by the integration tests

#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One canned answer
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl MockReply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Everything the backend saw
#[derive(Debug, Default)]
pub struct Recorded {
    pub search_bodies: Vec<Value>,
    pub search_auth: Vec<Option<String>>,
    pub log_limits: Vec<Option<String>>,
    pub token_requests: usize,
}

#[derive(Clone)]
struct MockState {
    query_replies: Arc<HashMap<String, MockReply>>,
    search_replies: Arc<Mutex<VecDeque<MockReply>>>,
    default_search: MockReply,
    logs_reply: MockReply,
    token_reply: MockReply,
    recorded: Arc<Mutex<Recorded>>,
}

impl MockState {
    fn next_search_reply(&self, query: Option<&str>) -> MockReply {
        if let Some(reply) = query.and_then(|q| self.query_replies.get(q)) {
            return reply.clone();
        }
        self.search_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_search.clone())
    }
}

pub struct MockBackend {
    query_replies: HashMap<String, MockReply>,
    search_replies: VecDeque<MockReply>,
    default_search: MockReply,
    logs_reply: MockReply,
    token_reply: MockReply,
}

/// A running mock backend
pub struct RunningBackend {
    pub url: String,
    recorded: Arc<Mutex<Recorded>>,
}

impl RunningBackend {
    pub fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            query_replies: HashMap::new(),
            search_replies: VecDeque::new(),
            default_search: MockReply::json(200, sample_response()),
            logs_reply: MockReply::json(
                200,
                json!({"logs": [
                    {"timestamp": "12:00:01", "message": "scraping flipkart"},
                    {"timestamp": "12:00:02", "message": "ranking 3 products"}
                ]}),
            ),
            token_reply: MockReply::json(401, json!({"error": "Unauthorized"})),
        }
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply used whenever the request's query is exactly `query`
    pub fn reply_for(mut self, query: &str, reply: MockReply) -> Self {
        self.query_replies.insert(query.to_string(), reply);
        self
    }

    /// Replies handed out to successive searches; once used up the default applies
    pub fn search_reply(mut self, reply: MockReply) -> Self {
        self.search_replies.push_back(reply);
        self
    }

    pub fn default_search(mut self, reply: MockReply) -> Self {
        self.default_search = reply;
        self
    }

    pub fn logs_reply(mut self, reply: MockReply) -> Self {
        self.logs_reply = reply;
        self
    }

    pub fn token_reply(mut self, reply: MockReply) -> Self {
        self.token_reply = reply;
        self
    }

    pub async fn spawn(self) -> RunningBackend {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let state = MockState {
            query_replies: Arc::new(self.query_replies),
            search_replies: Arc::new(Mutex::new(self.search_replies)),
            default_search: self.default_search,
            logs_reply: self.logs_reply,
            token_reply: self.token_reply,
            recorded: recorded.clone(),
        };

        let app = Router::new()
            .route("/search", post(search_handler))
            .route("/logs", get(logs_handler))
            .route("/token", get(token_handler))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        RunningBackend {
            url: format!("http://{}", addr),
            recorded,
        }
    }
}

/// An address nothing listens on
pub async fn unused_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn sample_response() -> Value {
    json!({
        "products": [
            {
                "title": "Sony WH-1000XM4",
                "price": 1999,
                "rating": 4.5,
                "url": "https://example.com/sony",
                "image_url": "https://example.com/sony.jpg",
                "source": "Flipkart",
                "currency": "INR"
            },
            {
                "title": "boAt Rockerz 450",
                "price": 1499.5,
                "rating": 0,
                "url": "https://example.com/boat",
                "source": ""
            }
        ],
        "analysis": "Two good options under your budget.",
        "quick_notes": "- **Best value:** boAt\n- Sony has better ANC",
        "action": "search"
    })
}

fn reply(reply: MockReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap();
    (status, [(CONTENT_TYPE, "application/json")], reply.body).into_response()
}

async fn search_handler(State(state): State<MockState>, headers: HeaderMap, body: String) -> Response {
    let value: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    let query = value.get("query").and_then(Value::as_str).map(str::to_string);
    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.search_bodies.push(value.clone());
        recorded.search_auth.push(
            headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
    }

    let next = state.next_search_reply(query.as_deref());
    if !next.delay.is_zero() {
        tokio::time::sleep(next.delay).await;
    }
    reply(next)
}

async fn logs_handler(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state
        .recorded
        .lock()
        .unwrap()
        .log_limits
        .push(params.get("limit").cloned());
    reply(state.logs_reply.clone())
}

async fn token_handler(State(state): State<MockState>) -> Response {
    state.recorded.lock().unwrap().token_requests += 1;
    reply(state.token_reply.clone())
}
