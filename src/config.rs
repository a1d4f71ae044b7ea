//! Configuration for the import and chat flows.
//!
//! All flow behaviour is controlled through [`FlowConfig`], built via its
//! [`FlowConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share a config across the upload, poll, chat, and publish stages, and
//! to log it when diagnosing a stuck flow.

use crate::api::ProfileApi;
use crate::error::ProfileAiError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;

/// Default poll cadence: one status check every 2 seconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
/// Default poll budget: 60 attempts ≈ 120 seconds worst case.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 60;
/// Upload size limit: 10 MiB.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;
/// Pasted text must be at least this many characters.
pub const DEFAULT_MIN_TEXT_CHARS: usize = 100;
/// Pasted text is capped at this many characters.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 30_000;

/// Configuration for one profile flow (CV import or AI chat).
///
/// Built via [`FlowConfig::builder()`] or [`FlowConfig::default()`].
///
/// # Example
/// ```rust
/// use gigexecs_profile_ai::FlowConfig;
///
/// let config = FlowConfig::builder()
///     .api_base_url("https://gigexecs.com/.netlify/functions")
///     .auth_token("eyJ...")
///     .max_poll_attempts(30)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct FlowConfig {
    /// API base URL the serverless function names are appended to.
    /// If `None`, resolution falls back to the `GIGEXECS_API_BASE` env var.
    pub api_base_url: Option<String>,

    /// Bearer token of the active session. If `None`, resolution falls back
    /// to `GIGEXECS_AUTH_TOKEN`; with neither present every operation fails
    /// up front with an auth error.
    pub auth_token: Option<String>,

    /// Pre-constructed backend. Takes precedence over `api_base_url`;
    /// this is the injection point for tests and custom middleware.
    pub backend: Option<Arc<dyn ProfileApi>>,

    /// Delay between parse-status checks, in milliseconds. Default: 2000.
    pub poll_interval_ms: u64,

    /// Maximum status checks before giving up with a timeout. Default: 60.
    ///
    /// 60 × 2 s bounds the worst-case wait to about two minutes, which is
    /// the only cancellation safety net the flow has — there is no
    /// server-side cancel call.
    pub max_poll_attempts: u32,

    /// Upload size limit in bytes. Default: 10 MiB.
    pub max_file_bytes: u64,

    /// Minimum pasted-text length in characters. Default: 100.
    pub min_text_chars: usize,

    /// Maximum pasted-text length in characters. Default: 30 000.
    pub max_text_chars: usize,

    /// Per-request HTTP timeout in seconds. Default: 60.
    pub request_timeout_secs: u64,

    /// Optional progress callback for upload/poll events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            auth_token: None,
            backend: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            request_timeout_secs: 60,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for FlowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowConfig")
            .field("api_base_url", &self.api_base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("backend", &self.backend.as_ref().map(|_| "<dyn ProfileApi>"))
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .field("max_file_bytes", &self.max_file_bytes)
            .field("min_text_chars", &self.min_text_chars)
            .field("max_text_chars", &self.max_text_chars)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl FlowConfig {
    /// Create a new builder for `FlowConfig`.
    pub fn builder() -> FlowConfigBuilder {
        FlowConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`FlowConfig`].
#[derive(Debug)]
pub struct FlowConfigBuilder {
    config: FlowConfig,
}

impl FlowConfigBuilder {
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.config.auth_token = Some(token.into());
        self
    }

    pub fn backend(mut self, backend: Arc<dyn ProfileApi>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms.max(100);
        self
    }

    pub fn max_poll_attempts(mut self, n: u32) -> Self {
        self.config.max_poll_attempts = n.max(1);
        self
    }

    pub fn max_file_bytes(mut self, bytes: u64) -> Self {
        self.config.max_file_bytes = bytes;
        self
    }

    pub fn min_text_chars(mut self, n: usize) -> Self {
        self.config.min_text_chars = n;
        self
    }

    pub fn max_text_chars(mut self, n: usize) -> Self {
        self.config.max_text_chars = n;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<FlowConfig, ProfileAiError> {
        let c = &self.config;
        if c.max_poll_attempts == 0 {
            return Err(ProfileAiError::InvalidConfig(
                "max_poll_attempts must be ≥ 1".into(),
            ));
        }
        if c.min_text_chars >= c.max_text_chars {
            return Err(ProfileAiError::InvalidConfig(format!(
                "text bounds are inverted: min {} ≥ max {}",
                c.min_text_chars, c.max_text_chars
            )));
        }
        Ok(self.config)
    }
}
