//! Eager CV-import entry points.
//!
//! [`import_cv`] runs the whole pipeline — validate → upload → trigger →
//! poll → reconcile — and returns a [`ReviewSession`] ready for editing and
//! publish. [`import_pasted_text`] is the fallback path for documents the
//! extraction service cannot read: when an error's
//! [`invites_paste_fallback`](crate::error::ProfileAiError::invites_paste_fallback)
//! is true, ask the user for raw text and call it instead of re-uploading.

use crate::api::{HttpProfileApi, ParsePhase, ProfileApi};
use crate::config::FlowConfig;
use crate::error::ProfileAiError;
use crate::pipeline::poll::{spawn_background_trigger, CancelFlag, ParsePoller, ParsedBundle};
use crate::pipeline::upload::upload_document;
use crate::pipeline::validate::{self, CvFile, UploadPurpose};
use crate::review::{PublishTarget, ReviewSession};
use std::sync::Arc;
use tracing::{debug, info};

/// Resolve the backend, from most-specific to least-specific:
///
/// 1. **Pre-built backend** (`config.backend`) — used as-is. This is the
///    test seam and the hook for custom middleware.
/// 2. **Configured URL + token** (`config.api_base_url`,
///    `config.auth_token`) — an [`HttpProfileApi`] is built from them.
/// 3. **Environment** — `GIGEXECS_API_BASE` and `GIGEXECS_AUTH_TOKEN` fill
///    whichever of the two is missing.
///
/// A missing token is [`ProfileAiError::AuthMissing`] — every operation in
/// this crate requires a session, so there is no anonymous mode to fall
/// back to.
pub fn resolve_backend(config: &FlowConfig) -> Result<Arc<dyn ProfileApi>, ProfileAiError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }

    let base_url = config
        .api_base_url
        .clone()
        .or_else(|| std::env::var("GIGEXECS_API_BASE").ok().filter(|s| !s.is_empty()))
        .ok_or_else(|| {
            ProfileAiError::InvalidConfig(
                "no API base URL: set api_base_url or GIGEXECS_API_BASE".into(),
            )
        })?;

    let token = config
        .auth_token
        .clone()
        .or_else(|| std::env::var("GIGEXECS_AUTH_TOKEN").ok().filter(|s| !s.is_empty()))
        .ok_or(ProfileAiError::AuthMissing)?;

    let api = HttpProfileApi::new(base_url, token, config.request_timeout_secs)?;
    Ok(Arc::new(api))
}

/// Import a CV file: upload, parse (inline or via the background worker),
/// reconcile, and return the draft for review.
///
/// # Errors
/// * Precondition errors (type/size) before any network call.
/// * [`ProfileAiError::ExtractionFailed`] when the document cannot be read
///   — switch to [`import_pasted_text`].
/// * [`ProfileAiError::ParseJobFailed`] / [`ProfileAiError::PollTimeout`]
///   for terminal job failure and an exhausted poll budget respectively.
pub async fn import_cv(
    file: CvFile,
    config: &FlowConfig,
) -> Result<ReviewSession, ProfileAiError> {
    import_cv_with_cancel(file, config, &CancelFlag::new()).await
}

/// [`import_cv`] with a cancellation flag checked between poll attempts.
pub async fn import_cv_with_cancel(
    file: CvFile,
    config: &FlowConfig,
    cancel: &CancelFlag,
) -> Result<ReviewSession, ProfileAiError> {
    let api = resolve_backend(config)?;
    info!("Importing CV: {} ({} bytes)", file.file_name, file.size());

    // ── Step 1: Upload ───────────────────────────────────────────────────
    let uploaded = notify_fallback(
        config,
        upload_document(&api, &file, UploadPurpose::Cv, config).await,
    )?;
    let source_file_id = uploaded.source_file_id;

    // ── Step 2: Trigger parsing ──────────────────────────────────────────
    let trigger = notify_fallback(config, api.trigger_parse(&source_file_id).await)?;

    let bundle = match trigger.status {
        ParsePhase::Completed => {
            debug!("Parse completed inline for {source_file_id}");
            if let Some(ref cb) = config.progress_callback {
                cb.on_parse_complete();
            }
            ParsedBundle {
                draft: trigger.parsed_data.unwrap_or_default(),
                eligibility: trigger.eligibility,
            }
        }
        ParsePhase::Failed => {
            return Err(ProfileAiError::ParseJobFailed {
                detail: "parse trigger reported failure".into(),
            });
        }
        ParsePhase::Pending | ParsePhase::Processing => {
            // ── Step 3: Background worker + poll ─────────────────────────
            if let Some(user_id) = trigger.user_id {
                spawn_background_trigger(Arc::clone(&api), source_file_id.clone(), user_id);
            }
            let mut poller = ParsePoller::new(Arc::clone(&api), source_file_id.clone(), config);
            notify_fallback(config, poller.poll_until_complete(cancel, config).await)?
        }
    };

    // ── Step 4: Reconcile and hand to review ─────────────────────────────
    Ok(ReviewSession::new(
        PublishTarget::ParsedCv { source_file_id },
        bundle.draft,
        bundle.eligibility,
    ))
}

/// Parse pasted CV text — the guided fallback when extraction fails.
///
/// Text must be between the configured minimum (100 characters) and
/// maximum (30 000); both are checked before the network call.
pub async fn import_pasted_text(
    text: &str,
    config: &FlowConfig,
) -> Result<ReviewSession, ProfileAiError> {
    validate::validate_pasted_text(text, config)?;
    let api = resolve_backend(config)?;
    info!("Parsing {} characters of pasted text", text.chars().count());

    let response = api.parse_text(text).await?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_parse_complete();
    }

    // The text endpoint mints its own source-file record. If a deployment
    // omits the id, publish will be rejected server-side with a clear
    // message rather than silently targeting the wrong record.
    let source_file_id = response.source_file_id.unwrap_or_default();
    Ok(ReviewSession::new(
        PublishTarget::ParsedCv { source_file_id },
        response.parsed_data,
        response.eligibility,
    ))
}

// Fire the fallback-suggested progress event alongside any error that
// invites the paste path; the error itself is returned unchanged.
fn notify_fallback<T>(
    config: &FlowConfig,
    result: Result<T, ProfileAiError>,
) -> Result<T, ProfileAiError> {
    if let Err(ref e) = result {
        if e.invites_paste_fallback() {
            if let Some(ref cb) = config.progress_callback {
                cb.on_fallback_suggested(e.to_string());
            }
        }
    }
    result
}
