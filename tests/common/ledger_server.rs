//! Stub ledger service on a loopback port, for exercising the HTTP client.
//!
//! Token requests (`/o/token/`) and API requests are answered from separate
//! queues, so a test only scripts the replies it cares about.

#![allow(dead_code)]

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, Response, StatusCode};
use axum::routing::any;
use axum::Router;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

const TOKEN_PATH: &str = "/o/token/";

/// One request as the service saw it. `path` is still percent-encoded.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn is_token_request(&self) -> bool {
        self.path == TOKEN_PATH
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }

    /// Decoded `key=value` pairs of a form body.
    pub fn form(&self) -> Vec<(String, String)> {
        url_pairs(&self.body)
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        url_pairs(&self.query)
    }
}

fn url_pairs(encoded: &str) -> Vec<(String, String)> {
    reqwest::Url::parse(&format!("http://stub/?{}", encoded))
        .map(|url| url.query_pairs().into_owned().collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn ok(body: &str) -> Self {
        Self::json(200, body)
    }

    pub fn status(status: u16) -> Self {
        Self::json(status, "{}")
    }
}

#[derive(Clone, Default)]
struct StubState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    grants: Arc<Mutex<VecDeque<Reply>>>,
    replies: Arc<Mutex<VecDeque<Reply>>>,
    grants_issued: Arc<Mutex<usize>>,
}

pub struct LedgerServer {
    pub addr: SocketAddr,
    state: StubState,
    shutdown: tokio::sync::watch::Sender<bool>,
}

impl LedgerServer {
    pub async fn start() -> Self {
        let state = StubState::default();
        let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

        let app = Router::new()
            .route("/{*path}", any(answer))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub ledger");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.changed().await;
                })
                .await
                .ok();
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        Self {
            addr,
            state,
            shutdown: shutdown_tx,
        }
    }

    /// Root to put in `api.base_url`.
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Answer for the next token request. Unscripted token requests get
    /// `tok<n>`/`ref<n>`, valid for an hour, where `n` counts token requests.
    pub async fn grant(&self, reply: Reply) {
        self.state.grants.lock().await.push_back(reply);
    }

    /// Answer for the next API request. Unscripted ones get `200 []`.
    pub async fn reply(&self, reply: Reply) {
        self.state.replies.lock().await.push_back(reply);
    }

    pub async fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().await.clone()
    }

    /// Requests other than token grants.
    pub async fn api_requests(&self) -> Vec<Recorded> {
        self.requests()
            .await
            .into_iter()
            .filter(|request| !request.is_token_request())
            .collect()
    }

    pub async fn token_requests(&self) -> Vec<Recorded> {
        self.requests()
            .await
            .into_iter()
            .filter(Recorded::is_token_request)
            .collect()
    }
}

impl Drop for LedgerServer {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

async fn answer(State(state): State<StubState>, req: Request<Body>) -> Response<Body> {
    let recorded = Recorded {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        query: req.uri().query().unwrap_or_default().to_string(),
        authorization: req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body: String::new(),
    };
    let body = axum::body::to_bytes(req.into_body(), 1024 * 1024)
        .await
        .unwrap_or_default();
    let recorded = Recorded {
        body: String::from_utf8_lossy(&body).into_owned(),
        ..recorded
    };

    let reply = if recorded.is_token_request() {
        let issued = {
            let mut issued = state.grants_issued.lock().await;
            *issued += 1;
            *issued
        };
        state.grants.lock().await.pop_front().unwrap_or_else(|| {
            Reply::ok(&format!(
                r#"{{"access_token": "tok{issued}", "refresh_token": "ref{issued}", "expires_in": 3600}}"#
            ))
        })
    } else {
        state
            .replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Reply::ok("[]"))
    };
    state.requests.lock().await.push(recorded);

    Response::builder()
        .status(StatusCode::from_u16(reply.status).unwrap())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(reply.body))
        .unwrap()
}
