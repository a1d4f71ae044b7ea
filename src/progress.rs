//! Progress-callback trait for import-flow events.
//!
//! Inject an [`Arc<dyn ImportProgressCallback>`] via
//! [`crate::config::FlowConfigBuilder::progress_callback`] to receive
//! real-time events as a CV moves through upload → parse trigger → polling.
//!
//! The callback approach keeps the library agnostic about how the host
//! application communicates: forward events to a channel, a WebSocket, or a
//! terminal progress bar as needed. The trait is `Send + Sync` because the
//! background parse trigger runs on a spawned task.
//!
//! The poll percentage is a UI estimate mapped linearly across the attempt
//! budget. It carries no correctness guarantee and must not be used to infer
//! job state — the status endpoint is the only authority on completion.

use std::sync::Arc;

/// Called by the import flow as it progresses.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ImportProgressCallback: Send + Sync {
    /// Called once before the upload request is sent.
    fn on_upload_start(&self, file_name: &str, size_bytes: u64) {
        let _ = (file_name, size_bytes);
    }

    /// Called when the upload has been accepted and a source file id exists.
    fn on_upload_complete(&self, source_file_id: &str) {
        let _ = source_file_id;
    }

    /// Called before each status check while the parse job is running.
    ///
    /// `percent` increases monotonically from 0 toward 100 across the
    /// attempt budget; it is display-only.
    fn on_poll_attempt(&self, attempt: u32, max_attempts: u32, percent: u8) {
        let _ = (attempt, max_attempts, percent);
    }

    /// Called once when the parse job reports completion.
    fn on_parse_complete(&self) {}

    /// Called when the flow fails in a way that invites the paste-text
    /// fallback rather than a plain error display.
    fn on_fallback_suggested(&self, reason: String) {
        let _ = reason;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ImportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::FlowConfig`].
pub type ProgressCallback = Arc<dyn ImportProgressCallback>;
