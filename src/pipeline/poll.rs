//! Async parse poller: drive a server-side parse job to a terminal state.
//!
//! The poll loop is an explicit `loop` with a non-blocking
//! [`tokio::time::sleep`] between attempts — no recursive timers, no busy
//! waiting — so it stays cancellable between attempts and unit-testable
//! under tokio's paused clock.
//!
//! Terminal states are cached: re-polling a finished job returns the same
//! outcome without another network call, which keeps UI re-renders that
//! re-invoke the check harmless. One poll in flight per job is guaranteed
//! by `&mut self`.

use crate::api::{ParsePhase, ProfileApi};
use crate::config::FlowConfig;
use crate::error::{is_extraction_failure_message, ProfileAiError};
use crate::profile::{DraftProfile, Eligibility};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// A completed extraction: the draft plus the server's eligibility verdict.
#[derive(Debug, Clone)]
pub struct ParsedBundle {
    pub draft: DraftProfile,
    pub eligibility: Option<Eligibility>,
}

/// Cooperative cancellation for the poll loop, checked between attempts.
///
/// There is no server-side cancel call — an abandoned job harmlessly runs
/// to completion or timeout on the server — so cancelling only stops
/// further status requests from this client.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    inner: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }
}

// What the job ended as; cached so repeat polls are pure lookups.
#[derive(Debug, Clone)]
enum Terminal {
    Completed(ParsedBundle),
    Failed { detail: String },
    TimedOut { attempts: u32, waited_secs: u64 },
}

impl Terminal {
    fn to_result(&self) -> Result<ParsedBundle, ProfileAiError> {
        match self {
            Terminal::Completed(bundle) => Ok(bundle.clone()),
            Terminal::Failed { detail } => Err(classify_failure(detail.clone())),
            Terminal::TimedOut {
                attempts,
                waited_secs,
            } => Err(ProfileAiError::PollTimeout {
                attempts: *attempts,
                waited_secs: *waited_secs,
            }),
        }
    }
}

/// A terminal `failed` whose message matches an extraction marker invites
/// the paste-text fallback; anything else is a plain terminal job failure.
fn classify_failure(detail: String) -> ProfileAiError {
    if is_extraction_failure_message(&detail) {
        ProfileAiError::ExtractionFailed { detail }
    } else {
        ProfileAiError::ParseJobFailed { detail }
    }
}

/// Polls one parse job until completion, failure, or timeout.
pub struct ParsePoller {
    api: Arc<dyn ProfileApi>,
    source_file_id: String,
    interval: Duration,
    max_attempts: u32,
    terminal: Option<Terminal>,
}

impl ParsePoller {
    pub fn new(api: Arc<dyn ProfileApi>, source_file_id: impl Into<String>, config: &FlowConfig) -> Self {
        Self {
            api,
            source_file_id: source_file_id.into(),
            interval: Duration::from_millis(config.poll_interval_ms),
            max_attempts: config.max_poll_attempts,
            terminal: None,
        }
    }

    /// True once the job has reached a terminal state (including timeout).
    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    /// Poll the status endpoint every `interval` until the job completes,
    /// fails, or the attempt budget runs out.
    ///
    /// After a terminal state, further calls return the cached outcome and
    /// issue no network requests. Transport errors propagate without
    /// consuming the terminal slot — they are retryable, the job is not
    /// known to be done.
    pub async fn poll_until_complete(
        &mut self,
        cancel: &CancelFlag,
        config: &FlowConfig,
    ) -> Result<ParsedBundle, ProfileAiError> {
        if let Some(ref terminal) = self.terminal {
            debug!("Re-poll of finished job {}", self.source_file_id);
            return terminal.to_result();
        }

        for attempt in 1..=self.max_attempts {
            if cancel.is_cancelled() {
                info!("Polling cancelled for {}", self.source_file_id);
                return Err(ProfileAiError::Cancelled);
            }

            if let Some(ref cb) = config.progress_callback {
                let percent = (attempt as u64 * 100 / self.max_attempts as u64) as u8;
                cb.on_poll_attempt(attempt, self.max_attempts, percent);
            }

            let status = self.api.parse_status(&self.source_file_id).await?;
            match status.parsing_status {
                ParsePhase::Completed => {
                    let bundle = ParsedBundle {
                        draft: status.parsed_data.unwrap_or_default(),
                        eligibility: status.eligibility,
                    };
                    info!(
                        "Parse completed for {} after {} checks",
                        self.source_file_id, attempt
                    );
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_parse_complete();
                    }
                    self.terminal = Some(Terminal::Completed(bundle.clone()));
                    return Ok(bundle);
                }
                ParsePhase::Failed => {
                    let detail = status
                        .parsing_error
                        .unwrap_or_else(|| "parsing failed with no detail".to_string());
                    warn!("Parse failed for {}: {}", self.source_file_id, detail);
                    let err = classify_failure(detail.clone());
                    if err.invites_paste_fallback() {
                        if let Some(ref cb) = config.progress_callback {
                            cb.on_fallback_suggested(detail.clone());
                        }
                    }
                    self.terminal = Some(Terminal::Failed { detail });
                    return Err(err);
                }
                ParsePhase::Pending | ParsePhase::Processing => {
                    debug!(
                        "Job {} still processing (check {}/{})",
                        self.source_file_id, attempt, self.max_attempts
                    );
                    if attempt == self.max_attempts {
                        break;
                    }
                    sleep(self.interval).await;
                }
            }
        }

        let waited_secs = self.max_attempts as u64 * self.interval.as_millis() as u64 / 1000;
        warn!(
            "Gave up on {} after {} checks",
            self.source_file_id, self.max_attempts
        );
        self.terminal = Some(Terminal::TimedOut {
            attempts: self.max_attempts,
            waited_secs,
        });
        Err(ProfileAiError::PollTimeout {
            attempts: self.max_attempts,
            waited_secs,
        })
    }
}

/// Fire the background parse trigger on a detached task.
///
/// Best-effort by contract: the response is discarded and failure is only
/// logged, because the status endpoint — not this call — is the authority
/// on whether the job finishes.
pub fn spawn_background_trigger(
    api: Arc<dyn ProfileApi>,
    source_file_id: String,
    user_id: String,
) {
    tokio::spawn(async move {
        if let Err(e) = api.trigger_background_parse(&source_file_id, &user_id).await {
            warn!("Background parse trigger failed (non-fatal): {e}");
        }
    });
}
