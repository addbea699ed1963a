//! Per-visitor order sessions.
//!
//! The browser session (a `tower-sessions` cookie) carries only an opaque
//! order-session id. The [`OrderSession`] itself lives in a `moka` cache keyed
//! by that id and is evicted after the configured idle time, so an abandoned
//! cart disappears with its visitor.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use presto_core::{OrderSession, PhonePolicy};
use tokio::sync::Mutex;
use tower_sessions::Session;
use uuid::Uuid;

/// Session key holding the visitor's order-session id.
pub const ORDER_SESSION_KEY: &str = "order_session_id";

/// Upper bound on concurrently cached order sessions and session records.
pub const MAX_SESSIONS: u64 = 10_000;

/// Shared handle to one visitor's order session.
pub type SharedOrderSession = Arc<Mutex<OrderSession>>;

/// Registry of live order sessions.
#[derive(Clone)]
pub struct SessionRegistry {
    cache: Cache<Uuid, SharedOrderSession>,
    policy: PhonePolicy,
}

impl SessionRegistry {
    /// Create a registry whose sessions expire after `idle` without use.
    #[must_use]
    pub fn new(policy: PhonePolicy, idle: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_idle(idle)
            .build();
        Self { cache, policy }
    }

    /// Resolve the order session for a browser session, creating both the id
    /// and the order session on first use.
    ///
    /// # Errors
    ///
    /// Returns error if the session store cannot be read or written.
    pub async fn resolve(
        &self,
        session: &Session,
    ) -> Result<SharedOrderSession, tower_sessions::session::Error> {
        let id = match session.get::<Uuid>(ORDER_SESSION_KEY).await? {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4();
                session.insert(ORDER_SESSION_KEY, id).await?;
                tracing::debug!(order_session = %id, "Started order session");
                id
            }
        };
        Ok(self.get_or_create(id).await)
    }

    /// Fetch the order session `id`, creating an empty one if it is unknown
    /// or has expired.
    pub async fn get_or_create(&self, id: Uuid) -> SharedOrderSession {
        let policy = self.policy.clone();
        self.cache
            .get_with(id, async move { Arc::new(Mutex::new(OrderSession::new(policy))) })
            .await
    }
}
