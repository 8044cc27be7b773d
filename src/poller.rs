//! The fetch-validate-notify polling loop
//!
//! One cycle: fetch -> validate -> (if anything new) extract -> notify ->
//! advance the cursor. Any error inside a cycle is reported to the chat
//! under the same duplicate-suppression rule as a status message, and the
//! fixed sleep happens after every cycle no matter how it ended.

use crate::api::{ApiError, HomeworkApi};
use crate::notify::{MessageSender, Notifier};
use crate::status::{self, StatusError};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

/// Any error a single poll cycle can produce
#[derive(Debug, Error)]
pub enum CycleError {
    /// The API client failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The response or the homework record failed validation.
    #[error(transparent)]
    Status(#[from] StatusError),
}

/// Ties the client and the notifier together and owns the poll cursor
pub struct Poller<A, S> {
    api: A,
    notifier: Notifier<S>,
    interval: Duration,
    cursor: i64,
}

impl<A: HomeworkApi, S: MessageSender> Poller<A, S> {
    /// Build a poller starting its query window at `from_date`.
    pub const fn new(api: A, notifier: Notifier<S>, interval: Duration, from_date: i64) -> Self {
        Self {
            api,
            notifier,
            interval,
            cursor: from_date,
        }
    }

    /// Lower bound of the next poll window.
    #[must_use]
    pub const fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Run one cycle and surface its error, if any.
    ///
    /// The cursor advances only when the cycle completed without error and
    /// the response carried a `current_date`; it never moves backwards.
    ///
    /// # Errors
    ///
    /// Returns a [`CycleError`] from the client or the validator; a notify
    /// failure is not an error here, it only leaves the duplicate-suppression
    /// state untouched.
    pub async fn poll_once(&mut self) -> Result<(), CycleError> {
        let body = self.api.fetch(self.cursor).await?;
        let homeworks = status::validate(&body)?;

        match homeworks.first() {
            Some(record) => {
                let text = status::parse_status(record)?;
                self.notifier.notify(&text).await;
            }
            None => debug!("no new homework statuses"),
        }

        if let Some(date) = body.get("current_date").and_then(Value::as_i64) {
            self.cursor = self.cursor.max(date);
        }

        Ok(())
    }

    /// Run one cycle, reporting any error to the chat instead of crashing.
    pub async fn run_cycle(&mut self) {
        if let Err(e) = self.poll_once().await {
            error!("poll cycle failed: {e}");
            let report = format!("Сбой в работе программы: {e}");
            self.notifier.notify(&report).await;
        }
    }

    /// Poll forever. The sleep runs after every cycle, success or failure,
    /// so the cadence survives sustained errors. Cancellation is external
    /// only (process signal).
    pub async fn run(&mut self) {
        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.interval).await;
        }
    }
}
