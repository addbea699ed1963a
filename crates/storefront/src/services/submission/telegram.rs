//! Telegram mini-app hand-off.
//!
//! The order is encoded as `name=quantity` pairs joined by `&`, then passed
//! to the bot through the `startapp` parameter of a `t.me` deep link. The bot
//! takes the conversation from there, so submission itself never fails once
//! the link is built.

use async_trait::async_trait;
use presto_core::Order;
use url::Url;

use super::{OrderSubmitter, SubmissionError, SubmissionReceipt};

/// Telegram deep-link base.
const TELEGRAM_BASE_URL: &str = "https://t.me";

/// Submits orders by redirecting the client to a Telegram bot.
#[derive(Debug, Clone)]
pub struct TelegramSubmitter {
    bot_username: String,
}

impl TelegramSubmitter {
    /// Create a submitter for the bot `bot_username` (without the `@`).
    #[must_use]
    pub const fn new(bot_username: String) -> Self {
        Self { bot_username }
    }

    /// The `startapp` payload for an order, before link encoding.
    #[must_use]
    pub fn start_payload(order: &Order) -> String {
        let mut pairs: Vec<String> = order
            .lines()
            .iter()
            .map(|line| format!("{}={}", urlencoding::encode(&line.name), line.quantity))
            .collect();
        if let Some(phone) = order.phone() {
            pairs.push(format!("phone={}", urlencoding::encode(&phone.international())));
        }
        pairs.join("&")
    }

    /// The deep link that hands `order` to the bot.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::InvalidLink`] if the link does not parse.
    pub fn link(&self, order: &Order) -> Result<Url, SubmissionError> {
        let payload = Self::start_payload(order);
        let link = format!(
            "{TELEGRAM_BASE_URL}/{}?startapp={}",
            self.bot_username,
            urlencoding::encode(&payload)
        );
        Ok(Url::parse(&link)?)
    }
}

#[async_trait]
impl OrderSubmitter for TelegramSubmitter {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn submit(&self, order: &Order) -> Result<SubmissionReceipt, SubmissionError> {
        let link = self.link(order)?;
        tracing::debug!(
            bot = %self.bot_username,
            items = order.lines().len(),
            "Built Telegram hand-off link"
        );
        Ok(SubmissionReceipt {
            redirect_url: Some(link),
        })
    }
}
