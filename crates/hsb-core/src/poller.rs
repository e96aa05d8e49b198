//! The polling loop.
//!
//! Every iteration runs fetch → validate → format → notify → advance-cursor.
//! Recoverable failures are reported to the chat once per distinct error
//! text; everything else is only logged. The loop sleeps a fixed interval
//! after each iteration whatever happened in it.

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, Instrument, Span};

use crate::{
    config::Config,
    domain::Cursor,
    errors::{Error, ErrorKind},
    homework::{check_response, parse_status, HomeworkStatus},
    notifier::Notifier,
    ports::HomeworkApi,
    Result,
};

#[derive(Clone, Copy, Debug)]
pub struct PollerConfig {
    pub interval: Duration,
    /// End `run` after an `approved` status has been delivered.
    pub stop_on_approved: bool,
}

impl From<&Config> for PollerConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            interval: cfg.retry_interval,
            stop_on_approved: cfg.stop_on_approved,
        }
    }
}

/// What a single iteration ended with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// A status change was sent to the chat.
    Notified(HomeworkStatus),
    NoUpdates,
    /// A recoverable error was sent to the chat.
    ErrorReported(ErrorKind),
    /// A recoverable error identical to the last reported one.
    ErrorSuppressed(ErrorKind),
    /// Logged only: unexpected errors, send failures.
    Failed(ErrorKind),
}

/// State owned by the loop between iterations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollState {
    pub cursor: Cursor,
    /// Text of the last error that reached the chat. Never reset on success.
    pub last_error: Option<String>,
}

impl PollState {
    pub fn starting_at(cursor: Cursor) -> Self {
        Self {
            cursor,
            last_error: None,
        }
    }
}

pub struct Poller {
    api: Arc<dyn HomeworkApi>,
    notifier: Notifier,
    cfg: PollerConfig,
    state: PollState,
    span: Span,
}

impl Poller {
    pub fn new(
        api: Arc<dyn HomeworkApi>,
        notifier: Notifier,
        cfg: PollerConfig,
        start: Cursor,
    ) -> Self {
        let span = info_span!("poller", endpoint = %api.endpoint(), chat = notifier.chat_id().0);
        Self {
            api,
            notifier,
            cfg,
            state: PollState::starting_at(start),
            span,
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Polls until `cancel` fires (or, with `stop_on_approved`, until an
    /// approval has been delivered).
    pub async fn run(mut self, cancel: CancellationToken) -> PollState {
        let span = self.span.clone();
        async {
            info!(
                interval_secs = self.cfg.interval.as_secs(),
                cursor = %self.state.cursor,
                "Poll loop started"
            );

            loop {
                let outcome = tokio::select! {
                    outcome = self.poll_once() => outcome,
                    _ = cancel.cancelled() => break,
                };

                if self.cfg.stop_on_approved
                    && outcome == PollOutcome::Notified(HomeworkStatus::Approved)
                {
                    info!("Homework approved, stopping");
                    break;
                }

                tokio::select! {
                    _ = sleep(self.cfg.interval) => {}
                    _ = cancel.cancelled() => break,
                }
            }

            info!(cursor = %self.state.cursor, "Poll loop stopped");
        }
        .instrument(span)
        .await;

        self.state
    }

    /// Runs one iteration without sleeping.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let span = self.span.clone();
        async {
            match self.check_updates().await {
                Ok(Some(status)) => PollOutcome::Notified(status),
                Ok(None) => PollOutcome::NoUpdates,
                Err(e) => self.handle_error(e).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn check_updates(&mut self) -> Result<Option<HomeworkStatus>> {
        debug!(from_date = %self.state.cursor, "Requesting homework statuses");
        let response = self.api.fetch_statuses(self.state.cursor).await?;
        let batch = check_response(response)?;

        let delivered = match batch.homeworks.first() {
            Some(latest) => {
                let update = parse_status(latest)?;
                self.notifier.send(&update.message).await?;
                Some(update.status)
            }
            None => {
                debug!("No new records");
                None
            }
        };

        if let Some(next) = batch.current_date {
            if next != self.state.cursor {
                info!(from = %self.state.cursor, to = %next, "Cursor advanced");
            }
            self.state.cursor = next;
        }

        Ok(delivered)
    }

    async fn handle_error(&mut self, e: Error) -> PollOutcome {
        let kind = e.kind();
        if !kind.is_notifiable() {
            error!(?kind, "Poll failed: {e}");
            return PollOutcome::Failed(kind);
        }

        let text = e.to_string();
        error!(?kind, "{text}");

        if self.state.last_error.as_deref() == Some(text.as_str()) {
            debug!("Same error already reported, not sending again");
            return PollOutcome::ErrorSuppressed(kind);
        }

        match self.notifier.send(&text).await {
            Ok(_) => {
                self.state.last_error = Some(text);
                PollOutcome::ErrorReported(kind)
            }
            Err(send_err) => {
                error!("Could not report error to chat: {send_err}");
                PollOutcome::Failed(send_err.kind())
            }
        }
    }
}
