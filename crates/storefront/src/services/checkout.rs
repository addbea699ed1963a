//! Order confirmation and submission.
//!
//! [`CheckoutService::confirm`] runs the submitter without holding the order
//! session lock, so the visitor can keep browsing, edit the cart, or cancel the
//! dialog while the order is on its way. The outcome is applied afterwards
//! through the checkout state machine, which discards it if the ticket is
//! stale.
//!
//! The submission runs in its own task: if the client disconnects mid-request
//! the order still completes and the session is still updated.

use std::sync::Arc;
use std::time::Duration;

use presto_core::{Notice, PendingSubmission, SubmissionOutcome, SubmissionTicket};
use tracing::instrument;

use crate::error::{AppError, add_breadcrumb};
use crate::services::sessions::SharedOrderSession;
use crate::services::submission::{OrderSubmitter, SubmissionError};

/// Runs confirmed orders through the configured submitter.
#[derive(Clone)]
pub struct CheckoutService {
    submitter: Arc<dyn OrderSubmitter>,
    timeout: Duration,
}

impl CheckoutService {
    /// Create a service that gives each submission at most `timeout`.
    #[must_use]
    pub fn new(submitter: Arc<dyn OrderSubmitter>, timeout: Duration) -> Self {
        Self { submitter, timeout }
    }

    /// Name of the submitter in use.
    #[must_use]
    pub fn submitter_name(&self) -> &'static str {
        self.submitter.name()
    }

    /// Confirm the session's order and wait for the submission outcome.
    ///
    /// Returns the notice produced by applying the outcome, or `None` if the
    /// outcome was discarded because the submission had been superseded.
    ///
    /// # Errors
    ///
    /// - [`AppError::Checkout`] if the order cannot be confirmed right now
    /// - [`AppError::Internal`] if the submission task was lost
    #[instrument(skip_all, fields(submitter = self.submitter.name()))]
    pub async fn confirm(&self, session: SharedOrderSession) -> Result<Option<Notice>, AppError> {
        let pending = session.lock().await.begin_submission()?;
        let ticket = pending.ticket.to_string();
        add_breadcrumb("checkout", "Order confirmed", Some(&[("ticket", ticket.as_str())]));

        let submitter = Arc::clone(&self.submitter);
        let timeout = self.timeout;
        let task = tokio::spawn(async move {
            let ticket = pending.ticket;
            let outcome = run_submission(submitter, pending, timeout).await;
            apply_outcome(&session, ticket, outcome).await
        });

        task.await
            .map_err(|e| AppError::Internal(format!("submission task failed: {e}")))
    }
}

/// Run one submission, mapping timeouts and panics to a failed outcome.
async fn run_submission(
    submitter: Arc<dyn OrderSubmitter>,
    pending: PendingSubmission,
    timeout: Duration,
) -> SubmissionOutcome {
    let name = submitter.name();
    let order = pending.order;
    let mut handle = tokio::spawn(async move { submitter.submit(&order).await });

    let result = match tokio::time::timeout(timeout, &mut handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => {
            tracing::error!(submitter = name, error = %join_error, "Submitter task panicked");
            return SubmissionOutcome::Failed {
                reason: "unavailable".to_string(),
            };
        }
        Err(_) => {
            handle.abort();
            Err(SubmissionError::Timeout)
        }
    };

    match result {
        Ok(receipt) => {
            tracing::info!(submitter = name, ticket = %pending.ticket, "Order submitted");
            SubmissionOutcome::Submitted {
                redirect_url: receipt.redirect_url.map(String::from),
            }
        }
        Err(error) => {
            tracing::warn!(submitter = name, ticket = %pending.ticket, error = %error, "Order submission failed");
            let ticket = pending.ticket.to_string();
            let detail = error.to_string();
            add_breadcrumb(
                "checkout",
                "Order submission failed",
                Some(&[("ticket", ticket.as_str()), ("error", detail.as_str())]),
            );
            SubmissionOutcome::Failed {
                reason: error.client_reason().to_string(),
            }
        }
    }
}

/// Apply a submission outcome to the session it came from.
async fn apply_outcome(
    session: &SharedOrderSession,
    ticket: SubmissionTicket,
    outcome: SubmissionOutcome,
) -> Option<Notice> {
    let notice = session.lock().await.complete_submission(ticket, outcome);
    if notice.is_none() {
        tracing::debug!(%ticket, "Discarded outcome of superseded submission");
    }
    notice
}
