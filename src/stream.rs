//! Streaming poll-status API: emit one update per status check.
//!
//! The eager [`crate::import::import_cv`] blocks until the parse job ends.
//! For hosts that render live progress — a web socket, a TUI — this module
//! exposes the same loop as a `Stream`: one [`PollUpdate`] per status
//! request, ending after the first terminal update. The percentage is the
//! same linear UI estimate the progress callback gets; job state only ever
//! comes from the `status` field.

use crate::api::{ParsePhase, ProfileApi};
use crate::config::FlowConfig;
use crate::error::is_extraction_failure_message;
use crate::pipeline::poll::ParsedBundle;
use futures::stream;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::Stream;
use tracing::debug;

/// A boxed stream of poll updates.
pub type PollUpdateStream = Pin<Box<dyn Stream<Item = PollUpdate> + Send>>;

/// One status check's outcome.
#[derive(Debug, Clone)]
pub struct PollUpdate {
    /// 1-indexed attempt number.
    pub attempt: u32,
    pub max_attempts: u32,
    /// Display-only estimate, mapped linearly across the attempt budget.
    pub percent: u8,
    pub status: PollStatus,
}

/// Job state as of one status check. `Completed`, `Failed`, and `TimedOut`
/// are terminal: the stream ends after emitting them.
#[derive(Debug, Clone)]
pub enum PollStatus {
    Processing,
    Completed(Box<ParsedBundle>),
    /// Terminal failure; `invites_paste_fallback` mirrors the error
    /// classification of the eager path.
    Failed {
        detail: String,
        invites_paste_fallback: bool,
    },
    TimedOut,
}

impl PollStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollStatus::Processing)
    }
}

struct PollState {
    api: Arc<dyn ProfileApi>,
    source_file_id: String,
    interval: Duration,
    max_attempts: u32,
    attempt: u32,
    done: bool,
}

/// Poll the parse status on the configured cadence, yielding one update per
/// check. Ends after a terminal update; dropping the stream stops polling
/// (abandonment needs no server-side call).
pub fn poll_status_stream(
    api: Arc<dyn ProfileApi>,
    source_file_id: impl Into<String>,
    config: &FlowConfig,
) -> PollUpdateStream {
    let state = PollState {
        api,
        source_file_id: source_file_id.into(),
        interval: Duration::from_millis(config.poll_interval_ms),
        max_attempts: config.max_poll_attempts,
        attempt: 0,
        done: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        if state.done || state.attempt >= state.max_attempts {
            return None;
        }
        if state.attempt > 0 {
            tokio::time::sleep(state.interval).await;
        }
        state.attempt += 1;
        let attempt = state.attempt;
        let percent = (attempt as u64 * 100 / state.max_attempts as u64) as u8;

        let status = match state.api.parse_status(&state.source_file_id).await {
            Ok(response) => match response.parsing_status {
                ParsePhase::Completed => PollStatus::Completed(Box::new(ParsedBundle {
                    draft: response.parsed_data.unwrap_or_default(),
                    eligibility: response.eligibility,
                })),
                ParsePhase::Failed => {
                    let detail = response
                        .parsing_error
                        .unwrap_or_else(|| "parsing failed with no detail".to_string());
                    PollStatus::Failed {
                        invites_paste_fallback: is_extraction_failure_message(&detail),
                        detail,
                    }
                }
                ParsePhase::Pending | ParsePhase::Processing => {
                    if attempt == state.max_attempts {
                        PollStatus::TimedOut
                    } else {
                        PollStatus::Processing
                    }
                }
            },
            // Transport errors are terminal for the stream; the caller can
            // open a fresh stream to retry.
            Err(e) => PollStatus::Failed {
                detail: e.to_string(),
                invites_paste_fallback: false,
            },
        };

        debug!(
            "Poll stream {}: attempt {}/{} → {:?}",
            state.source_file_id,
            attempt,
            state.max_attempts,
            std::mem::discriminant(&status)
        );
        state.done = status.is_terminal();

        Some((
            PollUpdate {
                attempt,
                max_attempts: state.max_attempts,
                percent,
                status,
            },
            state,
        ))
    }))
}
