//! Pluggable order submission.
//!
//! A submitter takes a confirmed [`Order`] and hands it to whatever fulfils
//! it. Submitters never touch session state; the checkout service applies
//! their result through the checkout state machine.
//!
//! # Submitters
//!
//! - [`TelegramSubmitter`] - builds a deep link into a Telegram bot's mini app
//! - [`HttpSubmitter`] - POSTs the order as JSON to an endpoint

mod http;
mod telegram;

use std::sync::Arc;

use async_trait::async_trait;
use presto_core::Order;
use thiserror::Error;
use url::Url;

use crate::config::{SubmissionChannel, SubmissionConfig};

pub use http::HttpSubmitter;
pub use telegram::TelegramSubmitter;

/// Errors a submitter can report.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    /// The receiving side refused the order.
    #[error("order rejected: {status} - {message}")]
    Rejected { status: u16, message: String },

    /// A hand-off link could not be built.
    #[error("invalid hand-off link: {0}")]
    InvalidLink(#[from] url::ParseError),

    /// The submitter did not answer in time.
    #[error("submission timed out")]
    Timeout,

    /// The submitter is misconfigured.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl SubmissionError {
    /// Short reason that is safe to show to the visitor.
    ///
    /// Endpoint URLs and response bodies stay in logs.
    #[must_use]
    pub const fn client_reason(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Rejected { .. } => "rejected",
            Self::Request(_) | Self::InvalidLink(_) | Self::Configuration(_) => "unavailable",
        }
    }
}

/// What a successful submission produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionReceipt {
    /// Where the client should go to finish the hand-off, if anywhere.
    pub redirect_url: Option<Url>,
}

/// Hands confirmed orders to their destination.
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Submit one order.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError`] if the order was not accepted.
    async fn submit(&self, order: &Order) -> Result<SubmissionReceipt, SubmissionError>;
}

/// Build the submitter selected by configuration.
///
/// # Errors
///
/// Returns an error if the HTTP submitter cannot be built.
pub fn from_config(config: &SubmissionConfig) -> Result<Arc<dyn OrderSubmitter>, SubmissionError> {
    let submitter: Arc<dyn OrderSubmitter> = match &config.channel {
        SubmissionChannel::Telegram { bot_username } => {
            Arc::new(TelegramSubmitter::new(bot_username.clone()))
        }
        SubmissionChannel::Http(endpoint) => Arc::new(HttpSubmitter::new(endpoint, config.timeout)?),
    };
    Ok(submitter)
}
