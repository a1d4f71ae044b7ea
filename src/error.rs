//! Error types for the gigexecs-profile-ai library.
//!
//! One enum, [`ProfileAiError`], covers the whole flow, but its variants fall
//! into distinct recovery classes the caller is expected to branch on:
//!
//! * **Precondition** (`FileTooLarge`, `UnsupportedFileType`, `TextTooShort`,
//!   `TextTooLong`, `AuthMissing`) — rejected before any network call.
//! * **Transient** (`Http`, `Api`) — the request may simply be retried;
//!   state has already been rolled back to before the failed call.
//! * **Extraction failure** (`ExtractionFailed`) — a distinguished subtype of
//!   server error detected by message pattern. Callers should offer the
//!   paste-text fallback instead of a bare error display; check
//!   [`ProfileAiError::invites_paste_fallback`].
//! * **Terminal** (`ParseJobFailed`, `Unauthorized`) — retrying the same
//!   request will not help; the flow must be restarted (or the user must
//!   re-authenticate).
//! * **Timeout** (`PollTimeout`) — the job may still be running server-side;
//!   distinct from `ParseJobFailed` so the UI can suggest "try again" rather
//!   than implying the document itself was rejected.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Server error messages that indicate the document could not be extracted
/// (as opposed to an ordinary upload/network failure). The marker set is a
/// compatibility contract with the extraction service; every classification
/// site in the crate goes through [`is_extraction_failure_message`].
static EXTRACTION_FAILURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)bad xref|corrupted|encoding issues|illegal character|unsupported format")
        .expect("extraction-failure pattern is valid")
});

/// True when a server error message matches a known extraction-failure marker.
pub fn is_extraction_failure_message(message: &str) -> bool {
    EXTRACTION_FAILURE.is_match(message)
}

/// All errors returned by the gigexecs-profile-ai library.
#[derive(Debug, Error)]
pub enum ProfileAiError {
    // ── Precondition violations (no network call was made) ───────────────
    /// The selected file exceeds the upload limit.
    #[error("File is {size} bytes but the limit is {limit} bytes\nPick a smaller file or export the CV as PDF.")]
    FileTooLarge { size: u64, limit: u64 },

    /// The file's MIME type is not accepted for this upload purpose.
    #[error("File type '{mime}' is not supported here.\nAccepted: {accepted}")]
    UnsupportedFileType { mime: String, accepted: String },

    /// Pasted text is too short to parse meaningfully.
    #[error("Pasted text is {len} characters; at least {min} are required")]
    TextTooShort { len: usize, min: usize },

    /// Pasted text exceeds the parser's input limit.
    #[error("Pasted text is {len} characters; the limit is {max}")]
    TextTooLong { len: usize, max: usize },

    // ── Auth ──────────────────────────────────────────────────────────────
    /// No session token was available. Fatal to the whole flow.
    #[error("No auth token available.\nLog in again, or set GIGEXECS_AUTH_TOKEN.")]
    AuthMissing,

    /// The server rejected the session token (401/403).
    #[error("Authentication rejected by the server: {message}")]
    Unauthorized { message: String },

    // ── Network / server ──────────────────────────────────────────────────
    /// Transport-level failure (connection refused, timeout, TLS, ...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned a non-success status with a message body.
    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    // ── Extraction / parse job ────────────────────────────────────────────
    /// The document could not be extracted (detected by message pattern).
    ///
    /// The caller should switch to the paste-text fallback rather than ask
    /// the user to re-upload the same file.
    #[error("The document could not be read: {detail}\nPaste the CV text instead.")]
    ExtractionFailed { detail: String },

    /// The parse job reported `failed`. Terminal for this job.
    #[error("CV parsing failed: {detail}")]
    ParseJobFailed { detail: String },

    /// The poller exhausted its attempt budget without a terminal status.
    #[error("Parsing did not finish after {attempts} checks (~{waited_secs}s).\nThe job may still complete server-side; try again in a moment.")]
    PollTimeout { attempts: u32, waited_secs: u64 },

    // ── Flow guards ───────────────────────────────────────────────────────
    /// A chat message is already in flight; the new send was not issued.
    #[error("A message is already being sent; wait for it to finish")]
    SendInFlight,

    /// A publish request is already in flight.
    #[error("A publish is already in progress")]
    PublishInFlight,

    /// The flow was cancelled by the caller; no further requests were made.
    #[error("Cancelled")]
    Cancelled,

    // ── Config ────────────────────────────────────────────────────────────
    /// Builder validation failed, or no backend could be resolved.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ProfileAiError {
    /// True when the right recovery is the paste-text fallback (the
    /// extraction service could not read the uploaded document).
    pub fn invites_paste_fallback(&self) -> bool {
        matches!(self, ProfileAiError::ExtractionFailed { .. })
    }

    /// True when retrying the same operation may succeed (transient network
    /// or server trouble). Precondition, auth, and terminal-job errors are
    /// not retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProfileAiError::Http(_) | ProfileAiError::Api { .. } | ProfileAiError::PollTimeout { .. }
        )
    }

    /// Classify a server error message: extraction failures become
    /// [`ProfileAiError::ExtractionFailed`], auth statuses become
    /// [`ProfileAiError::Unauthorized`], everything else stays an ordinary
    /// [`ProfileAiError::Api`] error.
    pub fn from_server_message(status: u16, message: String) -> Self {
        if is_extraction_failure_message(&message) {
            ProfileAiError::ExtractionFailed { detail: message }
        } else if status == 401 || status == 403 {
            ProfileAiError::Unauthorized { message }
        } else {
            ProfileAiError::Api { status, message }
        }
    }
}
