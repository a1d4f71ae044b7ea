//! The platform backend: one trait, nine endpoints.
//!
//! No other module in this crate issues HTTP requests directly — every
//! network interaction goes through [`ProfileApi`]. The production
//! implementation is [`HttpProfileApi`] (reqwest + bearer token); tests
//! inject a scripted implementation through
//! [`crate::config::FlowConfigBuilder::backend`], the same seam the flow
//! itself uses.
//!
//! Implementation detail of each endpoint is out of scope here; only the
//! consumed contract matters. Field names mirror the server's camelCase
//! JSON exactly.

use crate::chat::{ChatMessage, ChatStep};
use crate::error::ProfileAiError;
use crate::profile::{DraftProfile, Eligibility};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

// Serverless function names, relative to the configured API base URL.
const FN_AI_START: &str = "profile-ai-start";
const FN_AI_CONTINUE: &str = "profile-ai-continue";
const FN_AI_PUBLISH: &str = "profile-ai-publish";
const FN_CV_UPLOAD: &str = "profile-cv-upload";
const FN_PARSE_CV: &str = "profile-parse-cv";
const FN_PARSE_CV_BACKGROUND: &str = "profile-parse-cv-background";
const FN_PARSE_CV_STATUS: &str = "profile-parse-cv-status";
const FN_PARSE_TEXT: &str = "profile-parse-text";
const FN_SAVE_PARSED: &str = "profile-save-parsed";

// ── Wire types ───────────────────────────────────────────────────────────

/// Body of the CV upload request. `file_data` is standard base64.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub file_data: String,
    pub file_name: String,
    pub mime_type: String,
    pub file_type: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub source_file_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub extraction_status: Option<String>,
}

/// Lifecycle phase of a server-side parse job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePhase {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Response of the parse trigger: either the parse finished inline
/// (`completed` + payload) or it was deferred to the background worker
/// (`processing` + the user id the background trigger needs).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerParseResponse {
    pub status: ParsePhase,
    #[serde(default)]
    pub parsed_data: Option<DraftProfile>,
    #[serde(default)]
    pub eligibility: Option<Eligibility>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseStatusResponse {
    pub parsing_status: ParsePhase,
    #[serde(default)]
    pub parsed_data: Option<DraftProfile>,
    #[serde(default)]
    pub eligibility: Option<Eligibility>,
    #[serde(default)]
    pub parsing_error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseTextResponse {
    #[serde(default)]
    pub source_file_id: Option<String>,
    pub parsed_data: DraftProfile,
    #[serde(default)]
    pub eligibility: Option<Eligibility>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStartResponse {
    pub draft_id: String,
    #[serde(default)]
    pub assistant_message: Option<String>,
    #[serde(default)]
    pub draft_profile: DraftProfile,
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
    #[serde(default)]
    pub next_step: ChatStep,
    #[serde(default)]
    pub eligibility: Option<Eligibility>,
    #[serde(default)]
    pub is_resume: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContinueResponse {
    pub assistant_message: String,
    #[serde(default)]
    pub draft_profile: Option<DraftProfile>,
    #[serde(default)]
    pub next_step: ChatStep,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub eligibility: Option<Eligibility>,
}

/// Result of a publish/save call, for both the chat-draft and the parsed-CV
/// variants. Unmatched skills were not saved and are not retried
/// automatically; surface them to the user for manual re-entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    #[serde(default)]
    pub profile_completeness: Option<u8>,
    #[serde(default)]
    pub unmatched_skills: Vec<String>,
    #[serde(default)]
    pub results: Option<SaveReport>,
}

/// Per-section save counts reported by the parsed-CV save endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReport {
    #[serde(default)]
    pub work_experience: SavedCount,
    #[serde(default)]
    pub education: SavedCount,
    #[serde(default)]
    pub skills: SkillMatchCount,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SavedCount {
    #[serde(default)]
    pub saved: u32,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SkillMatchCount {
    #[serde(default)]
    pub matched: u32,
    #[serde(default)]
    pub unmatched: u32,
}

// Error bodies come back as `{ "message": ... }` or `{ "error": ... }`
// depending on the function; accept either.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// ── The trait ────────────────────────────────────────────────────────────

/// Everything the profile flows need from the platform.
///
/// All operations require a valid session; implementations must attach the
/// bearer token to every request. [`ProfileApi::trigger_background_parse`]
/// is *best-effort*: callers fire it on a spawned task and discard the
/// response, and its failure is never fatal — the status endpoint is the
/// authority on job completion.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// Establish or resume an AI chat session.
    async fn start_chat(&self) -> Result<ChatStartResponse, ProfileAiError>;

    /// Send one user message and receive the assistant's turn.
    async fn continue_chat(
        &self,
        draft_id: &str,
        user_message: &str,
    ) -> Result<ChatContinueResponse, ProfileAiError>;

    /// Publish the edited chat draft.
    async fn publish_chat_draft(
        &self,
        draft_id: &str,
        edited_profile: &DraftProfile,
    ) -> Result<PublishResponse, ProfileAiError>;

    /// Upload a CV (base64 body); returns the source-file id.
    async fn upload_cv(&self, request: &UploadRequest) -> Result<UploadResponse, ProfileAiError>;

    /// Kick off parsing; may complete inline or defer to the background worker.
    async fn trigger_parse(
        &self,
        source_file_id: &str,
    ) -> Result<TriggerParseResponse, ProfileAiError>;

    /// Best-effort nudge for the background worker. Response discarded by
    /// callers; errors are logged and ignored.
    async fn trigger_background_parse(
        &self,
        source_file_id: &str,
        user_id: &str,
    ) -> Result<(), ProfileAiError>;

    /// Current status of a parse job.
    async fn parse_status(
        &self,
        source_file_id: &str,
    ) -> Result<ParseStatusResponse, ProfileAiError>;

    /// Parse pasted CV text (the extraction-failure fallback path).
    async fn parse_text(&self, raw_text: &str) -> Result<ParseTextResponse, ProfileAiError>;

    /// Save a reviewed parsed-CV draft to the live profile.
    async fn save_parsed(
        &self,
        source_file_id: &str,
        parsed_data: &DraftProfile,
        eligibility: Option<&Eligibility>,
    ) -> Result<PublishResponse, ProfileAiError>;
}

// ── HTTP implementation ──────────────────────────────────────────────────

/// [`ProfileApi`] over HTTPS with bearer authentication.
pub struct HttpProfileApi {
    client: reqwest::Client,
    base_url: String,
    auth_token: String,
}

impl HttpProfileApi {
    /// Build a client for the given API base URL (trailing slashes trimmed).
    pub fn new(
        base_url: impl Into<String>,
        auth_token: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ProfileAiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            auth_token: auth_token.into(),
        })
    }

    fn url(&self, function: &str) -> String {
        format!("{}/{}", self.base_url, function)
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        function: &str,
        body: &B,
    ) -> Result<T, ProfileAiError> {
        debug!(function, "POST");
        let response = self
            .client
            .post(self.url(function))
            .bearer_auth(&self.auth_token)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProfileAiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|e| e.message.or(e.error))
                .unwrap_or(body);
            return Err(ProfileAiError::from_server_message(status.as_u16(), message));
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ProfileApi for HttpProfileApi {
    async fn start_chat(&self) -> Result<ChatStartResponse, ProfileAiError> {
        self.post_json(FN_AI_START, &serde_json::json!({})).await
    }

    async fn continue_chat(
        &self,
        draft_id: &str,
        user_message: &str,
    ) -> Result<ChatContinueResponse, ProfileAiError> {
        self.post_json(
            FN_AI_CONTINUE,
            &serde_json::json!({ "draftId": draft_id, "userMessage": user_message }),
        )
        .await
    }

    async fn publish_chat_draft(
        &self,
        draft_id: &str,
        edited_profile: &DraftProfile,
    ) -> Result<PublishResponse, ProfileAiError> {
        self.post_json(
            FN_AI_PUBLISH,
            &serde_json::json!({ "draftId": draft_id, "editedProfile": edited_profile }),
        )
        .await
    }

    async fn upload_cv(&self, request: &UploadRequest) -> Result<UploadResponse, ProfileAiError> {
        self.post_json(FN_CV_UPLOAD, request).await
    }

    async fn trigger_parse(
        &self,
        source_file_id: &str,
    ) -> Result<TriggerParseResponse, ProfileAiError> {
        self.post_json(
            FN_PARSE_CV,
            &serde_json::json!({ "sourceFileId": source_file_id }),
        )
        .await
    }

    async fn trigger_background_parse(
        &self,
        source_file_id: &str,
        user_id: &str,
    ) -> Result<(), ProfileAiError> {
        // Response body intentionally ignored; only transport/status errors
        // are reported, and the caller ignores those too.
        let response = self
            .client
            .post(self.url(FN_PARSE_CV_BACKGROUND))
            .bearer_auth(&self.auth_token)
            .json(&serde_json::json!({ "sourceFileId": source_file_id, "userId": user_id }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProfileAiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(())
    }

    async fn parse_status(
        &self,
        source_file_id: &str,
    ) -> Result<ParseStatusResponse, ProfileAiError> {
        debug!(source_file_id, "GET parse status");
        let response = self
            .client
            .get(self.url(FN_PARSE_CV_STATUS))
            .query(&[("sourceFileId", source_file_id)])
            .bearer_auth(&self.auth_token)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn parse_text(&self, raw_text: &str) -> Result<ParseTextResponse, ProfileAiError> {
        self.post_json(FN_PARSE_TEXT, &serde_json::json!({ "rawText": raw_text }))
            .await
    }

    async fn save_parsed(
        &self,
        source_file_id: &str,
        parsed_data: &DraftProfile,
        eligibility: Option<&Eligibility>,
    ) -> Result<PublishResponse, ProfileAiError> {
        self.post_json(
            FN_SAVE_PARSED,
            &serde_json::json!({
                "sourceFileId": source_file_id,
                "parsedData": parsed_data,
                "eligibility": eligibility,
            }),
        )
        .await
    }
}
