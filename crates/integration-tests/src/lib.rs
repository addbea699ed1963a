//! Integration tests for Presto.
//!
//! Tests drive the storefront router in-process with `tower::ServiceExt`, so
//! no server or network is needed except for the `wiremock` order endpoint.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p presto-integration-tests
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{self, Body};
use axum::http::{Method, Request, StatusCode, header};
use presto_core::Order;
use presto_storefront::config::{ConfigError, StorefrontConfig};
use presto_storefront::routes;
use presto_storefront::services::submission::{OrderSubmitter, SubmissionError, SubmissionReceipt};
use presto_storefront::state::AppState;
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;
use url::Url;

/// Build a configuration from key/value pairs on top of a Telegram default.
///
/// # Errors
///
/// Returns `ConfigError` if the variables do not form a valid configuration.
pub fn config(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
    let mut map: HashMap<String, String> = HashMap::from([(
        "TELEGRAM_BOT_USERNAME".to_string(),
        "presto_pizza_bot".to_string(),
    )]);
    for (key, value) in vars {
        map.insert((*key).to_string(), (*value).to_string());
    }
    StorefrontConfig::from_lookup(move |key| map.get(key).cloned())
}

/// Submitter that replays scripted results and records what it was given.
#[derive(Default)]
pub struct ScriptedSubmitter {
    script: Mutex<VecDeque<Result<SubmissionReceipt, SubmissionError>>>,
    received: Mutex<Vec<Order>>,
}

impl ScriptedSubmitter {
    /// Create a submitter that answers with `results` in order, then accepts.
    #[must_use]
    pub fn new(results: Vec<Result<SubmissionReceipt, SubmissionError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(results.into()),
            received: Mutex::new(Vec::new()),
        })
    }

    /// Orders submitted so far.
    pub async fn received(&self) -> Vec<Order> {
        self.received.lock().await.clone()
    }
}

#[async_trait]
impl OrderSubmitter for ScriptedSubmitter {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn submit(&self, order: &Order) -> Result<SubmissionReceipt, SubmissionError> {
        self.received.lock().await.push(order.clone());
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(SubmissionReceipt::default()))
    }
}

/// A response reduced to what tests assert on.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// One browser: a router plus the session cookie it was handed.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    /// Create a client for `state`.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            app: routes::app(state),
            cookie: None,
        }
    }

    /// Another browser against the same application.
    #[must_use]
    pub fn fresh(&self) -> Self {
        Self {
            app: self.app.clone(),
            cookie: None,
        }
    }

    /// Send a GET request.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be served.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    /// Send a POST request with an optional JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be served.
    pub async fn post(&mut self, uri: &str, json: Option<Value>) -> TestResponse {
        self.send(Method::POST, uri, json).await
    }

    async fn send(&mut self, method: Method, uri: &str, json: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match json {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("request");

        let response = self.app.clone().oneshot(request).await.expect("response");
        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            && let Some(pair) = set_cookie.split(';').next()
        {
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        TestResponse { status, body }
    }
}

/// Receipt redirecting to `url`.
///
/// # Panics
///
/// Panics if `url` is not absolute.
#[must_use]
pub fn redirect_to(url: &str) -> SubmissionReceipt {
    SubmissionReceipt {
        redirect_url: Some(Url::parse(url).expect("absolute url")),
    }
}
