//! Integration tests for the import and chat flows.
//!
//! All tests run against [`MockApi`], a scripted [`ProfileApi`] injected
//! through `FlowConfig::backend` — the same seam the production HTTP
//! backend plugs into. Poll-timing tests run under tokio's paused clock
//! (`start_paused = true`), so the 2-second cadence costs no wall time.

use gigexecs_profile_ai::{
    api::{
        ChatContinueResponse, ChatStartResponse, ParseStatusResponse, ParseTextResponse,
        ProfileApi, PublishResponse, TriggerParseResponse, UploadRequest, UploadResponse,
    },
    chat::ChatStep,
    import_cv, import_pasted_text, minimum_viable_draft, BasicInfo, CancelFlag, ChatSession,
    CvFile, DraftProfile, FlowConfig, ImportProgressCallback, ParsePoller, ProfileAiError,
    PublishTarget, ReviewSession, WorkExperience,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio_test::{assert_err, assert_ok};

// ── Scripted backend ─────────────────────────────────────────────────────────

#[derive(Default)]
struct MockApi {
    // Scripts, consumed front-to-back. An empty script falls back to a
    // benign default (processing / ok).
    statuses: Mutex<VecDeque<ParseStatusResponse>>,
    continues: Mutex<VecDeque<Result<ChatContinueResponse, (u16, String)>>>,
    publishes: Mutex<VecDeque<Result<PublishResponse, (u16, String)>>>,
    upload_error: Mutex<Option<(u16, String)>>,
    trigger: Mutex<Option<TriggerParseResponse>>,
    background_error: Mutex<Option<(u16, String)>>,
    parse_text_response: Mutex<Option<ParseTextResponse>>,
    start_response: Mutex<Option<ChatStartResponse>>,
    // Optional gate: continue_chat blocks on it until notified.
    continue_gate: Mutex<Option<Arc<Notify>>>,

    status_calls: AtomicU32,
    continue_calls: AtomicU32,
    upload_calls: AtomicU32,
    trigger_calls: AtomicU32,
    background_calls: AtomicU32,
    publish_chat_calls: AtomicU32,
    save_parsed_calls: AtomicU32,
    parse_text_calls: AtomicU32,
}

fn processing_status() -> ParseStatusResponse {
    serde_json::from_value(serde_json::json!({ "parsingStatus": "processing" })).unwrap()
}

fn completed_status(draft: serde_json::Value) -> ParseStatusResponse {
    serde_json::from_value(serde_json::json!({
        "parsingStatus": "completed",
        "parsedData": draft
    }))
    .unwrap()
}

fn failed_status(message: &str) -> ParseStatusResponse {
    serde_json::from_value(serde_json::json!({
        "parsingStatus": "failed",
        "parsingError": message
    }))
    .unwrap()
}

impl MockApi {
    fn script_statuses(&self, statuses: impl IntoIterator<Item = ParseStatusResponse>) {
        self.statuses.lock().unwrap().extend(statuses);
    }

    fn script_trigger_processing(&self, user_id: &str) {
        *self.trigger.lock().unwrap() = Some(
            serde_json::from_value(serde_json::json!({
                "status": "processing",
                "userId": user_id
            }))
            .unwrap(),
        );
    }

    fn script_trigger_completed(&self, draft: serde_json::Value) {
        *self.trigger.lock().unwrap() = Some(
            serde_json::from_value(serde_json::json!({
                "status": "completed",
                "parsedData": draft
            }))
            .unwrap(),
        );
    }

    fn script_continue_ok(&self, response: serde_json::Value) {
        self.continues
            .lock()
            .unwrap()
            .push_back(Ok(serde_json::from_value(response).unwrap()));
    }

    fn script_continue_err(&self, status: u16, message: &str) {
        self.continues
            .lock()
            .unwrap()
            .push_back(Err((status, message.to_string())));
    }

    fn script_publish(&self, result: Result<serde_json::Value, (u16, String)>) {
        self.publishes
            .lock()
            .unwrap()
            .push_back(result.map(|v| serde_json::from_value(v).unwrap()));
    }

    fn default_start_response() -> ChatStartResponse {
        serde_json::from_value(serde_json::json!({
            "draftId": "d_1",
            "assistantMessage": "Hi! Let's build your profile. What's your name?"
        }))
        .unwrap()
    }
}

#[async_trait]
impl ProfileApi for MockApi {
    async fn start_chat(&self) -> Result<ChatStartResponse, ProfileAiError> {
        Ok(self
            .start_response
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(Self::default_start_response))
    }

    async fn continue_chat(
        &self,
        _draft_id: &str,
        _user_message: &str,
    ) -> Result<ChatContinueResponse, ProfileAiError> {
        self.continue_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.continue_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.continues.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err((status, message))) => {
                Err(ProfileAiError::from_server_message(status, message))
            }
            None => Ok(serde_json::from_value(serde_json::json!({
                "assistantMessage": "Noted.",
                "nextStep": "experience"
            }))
            .unwrap()),
        }
    }

    async fn publish_chat_draft(
        &self,
        _draft_id: &str,
        _edited_profile: &DraftProfile,
    ) -> Result<PublishResponse, ProfileAiError> {
        self.publish_chat_calls.fetch_add(1, Ordering::SeqCst);
        match self.publishes.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err((status, message))) => {
                Err(ProfileAiError::from_server_message(status, message))
            }
            None => Ok(PublishResponse::default()),
        }
    }

    async fn upload_cv(&self, _request: &UploadRequest) -> Result<UploadResponse, ProfileAiError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if let Some((status, message)) = self.upload_error.lock().unwrap().take() {
            return Err(ProfileAiError::from_server_message(status, message));
        }
        Ok(serde_json::from_value(serde_json::json!({ "sourceFileId": "sf_1" })).unwrap())
    }

    async fn trigger_parse(
        &self,
        _source_file_id: &str,
    ) -> Result<TriggerParseResponse, ProfileAiError> {
        self.trigger_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.trigger.lock().unwrap().take().unwrap_or_else(|| {
            serde_json::from_value(serde_json::json!({
                "status": "processing",
                "userId": "u_1"
            }))
            .unwrap()
        }))
    }

    async fn trigger_background_parse(
        &self,
        _source_file_id: &str,
        _user_id: &str,
    ) -> Result<(), ProfileAiError> {
        self.background_calls.fetch_add(1, Ordering::SeqCst);
        if let Some((status, message)) = self.background_error.lock().unwrap().take() {
            return Err(ProfileAiError::Api { status, message });
        }
        Ok(())
    }

    async fn parse_status(
        &self,
        _source_file_id: &str,
    ) -> Result<ParseStatusResponse, ProfileAiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(processing_status))
    }

    async fn parse_text(&self, _raw_text: &str) -> Result<ParseTextResponse, ProfileAiError> {
        self.parse_text_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .parse_text_response
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| {
                serde_json::from_value(serde_json::json!({
                    "sourceFileId": "sf_text_1",
                    "parsedData": { "skills": ["Rust"] }
                }))
                .unwrap()
            }))
    }

    async fn save_parsed(
        &self,
        _source_file_id: &str,
        _parsed_data: &DraftProfile,
        _eligibility: Option<&gigexecs_profile_ai::Eligibility>,
    ) -> Result<PublishResponse, ProfileAiError> {
        self.save_parsed_calls.fetch_add(1, Ordering::SeqCst);
        match self.publishes.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err((status, message))) => {
                Err(ProfileAiError::from_server_message(status, message))
            }
            None => Ok(PublishResponse::default()),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn config_with(api: &Arc<MockApi>) -> FlowConfig {
    FlowConfig::builder()
        .backend(Arc::clone(api) as Arc<dyn ProfileApi>)
        .build()
        .unwrap()
}

fn small_pdf() -> CvFile {
    CvFile::new("cv.pdf", "application/pdf", b"%PDF-1.7 tiny".to_vec())
}

fn sample_draft_json() -> serde_json::Value {
    serde_json::json!({
        "basicInfo": { "firstName": "Ada", "lastName": "Lovelace" },
        "workExperience": [{
            "company": "Analytical Engines Ltd",
            "title": "Chief Engineer",
            "startYear": 1840,
            "currentlyWorking": true,
            "endYear": 1843
        }],
        "skills": ["Mathematics", "Programming"]
    })
}

// ── Poller properties ────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn poller_returns_payload_after_exactly_six_status_calls() {
    let api = Arc::new(MockApi::default());
    api.script_statuses(
        (0..5)
            .map(|_| processing_status())
            .chain(std::iter::once(completed_status(sample_draft_json()))),
    );
    let config = config_with(&api);
    let dyn_api: Arc<dyn ProfileApi> = Arc::clone(&api) as Arc<dyn ProfileApi>;

    let mut poller = ParsePoller::new(dyn_api, "sf_1", &config);
    let bundle = poller
        .poll_until_complete(&CancelFlag::new(), &config)
        .await
        .expect("completed job must yield a bundle");

    assert_eq!(api.status_calls.load(Ordering::SeqCst), 6);
    assert_eq!(bundle.draft.skills, vec!["Mathematics", "Programming"]);
}

#[tokio::test(start_paused = true)]
async fn poller_times_out_after_exactly_sixty_calls() {
    let api = Arc::new(MockApi::default());
    // No script: every check reports processing.
    let config = config_with(&api);
    let dyn_api: Arc<dyn ProfileApi> = Arc::clone(&api) as Arc<dyn ProfileApi>;

    let mut poller = ParsePoller::new(dyn_api, "sf_1", &config);
    let err = poller
        .poll_until_complete(&CancelFlag::new(), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, ProfileAiError::PollTimeout { attempts: 60, .. }));
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 60);
}

#[tokio::test(start_paused = true)]
async fn poller_terminal_result_is_idempotent() {
    let api = Arc::new(MockApi::default());
    api.script_statuses([completed_status(sample_draft_json())]);
    let config = config_with(&api);
    let dyn_api: Arc<dyn ProfileApi> = Arc::clone(&api) as Arc<dyn ProfileApi>;

    let mut poller = ParsePoller::new(dyn_api, "sf_1", &config);
    let first = poller
        .poll_until_complete(&CancelFlag::new(), &config)
        .await
        .unwrap();
    // Re-render re-invokes the check: same result, no new request.
    let second = poller
        .poll_until_complete(&CancelFlag::new(), &config)
        .await
        .unwrap();

    assert_eq!(api.status_calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.draft, second.draft);
    assert!(poller.is_terminal());
}

#[tokio::test(start_paused = true)]
async fn poller_timeout_is_also_idempotent() {
    let api = Arc::new(MockApi::default());
    let config = config_with(&api);
    let dyn_api: Arc<dyn ProfileApi> = Arc::clone(&api) as Arc<dyn ProfileApi>;

    let mut poller = ParsePoller::new(dyn_api, "sf_1", &config);
    let cancel = CancelFlag::new();
    assert!(poller.poll_until_complete(&cancel, &config).await.is_err());
    let again = poller.poll_until_complete(&cancel, &config).await.unwrap_err();

    assert!(matches!(again, ProfileAiError::PollTimeout { .. }));
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 60);
}

#[tokio::test(start_paused = true)]
async fn cancelled_poller_issues_no_requests() {
    let api = Arc::new(MockApi::default());
    let config = config_with(&api);
    let dyn_api: Arc<dyn ProfileApi> = Arc::clone(&api) as Arc<dyn ProfileApi>;

    let cancel = CancelFlag::new();
    cancel.cancel();
    let mut poller = ParsePoller::new(dyn_api, "sf_1", &config);
    let err = poller.poll_until_complete(&cancel, &config).await.unwrap_err();

    assert!(matches!(err, ProfileAiError::Cancelled));
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn poll_progress_percent_is_monotone() {
    struct PercentLog(Mutex<Vec<u8>>);
    impl ImportProgressCallback for PercentLog {
        fn on_poll_attempt(&self, _attempt: u32, _max: u32, percent: u8) {
            self.0.lock().unwrap().push(percent);
        }
    }

    let api = Arc::new(MockApi::default());
    let log = Arc::new(PercentLog(Mutex::new(Vec::new())));
    let config = FlowConfig::builder()
        .backend(Arc::clone(&api) as Arc<dyn ProfileApi>)
        .progress_callback(Arc::clone(&log) as Arc<dyn ImportProgressCallback>)
        .build()
        .unwrap();
    let dyn_api: Arc<dyn ProfileApi> = Arc::clone(&api) as Arc<dyn ProfileApi>;

    let mut poller = ParsePoller::new(dyn_api, "sf_1", &config);
    let _ = poller.poll_until_complete(&CancelFlag::new(), &config).await;

    let percents = log.0.lock().unwrap().clone();
    assert_eq!(percents.len(), 60);
    assert!(percents.windows(2).all(|w| w[0] <= w[1]), "not monotone: {percents:?}");
    assert_eq!(*percents.last().unwrap(), 100);
}

// ── Gateway classification ───────────────────────────────────────────────────

#[tokio::test]
async fn bad_xref_upload_error_invites_paste_fallback() {
    let api = Arc::new(MockApi::default());
    *api.upload_error.lock().unwrap() =
        Some((500, "PDF parsing failed: bad XRef entry".to_string()));
    let config = config_with(&api);

    let err = import_cv(small_pdf(), &config).await.unwrap_err();
    assert!(err.invites_paste_fallback(), "got: {err}");
}

#[tokio::test]
async fn unmatched_upload_error_stays_generic() {
    let api = Arc::new(MockApi::default());
    *api.upload_error.lock().unwrap() = Some((500, "network timeout".to_string()));
    let config = config_with(&api);

    let err = import_cv(small_pdf(), &config).await.unwrap_err();
    assert!(!err.invites_paste_fallback());
    assert!(matches!(err, ProfileAiError::Api { status: 500, .. }));
}

#[tokio::test]
async fn oversized_file_is_rejected_before_any_network_call() {
    let api = Arc::new(MockApi::default());
    let config = config_with(&api);
    let file = CvFile::new("cv.pdf", "application/pdf", vec![0u8; 11 * 1024 * 1024]);

    let err = import_cv(file, &config).await.unwrap_err();
    assert!(matches!(err, ProfileAiError::FileTooLarge { .. }));
    assert_eq!(api.upload_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn terminal_parse_failure_with_marker_becomes_extraction_failure() {
    let api = Arc::new(MockApi::default());
    api.script_trigger_processing("u_1");
    api.script_statuses([failed_status("PDF has encoding issues, characters lost")]);
    let config = config_with(&api);

    let err = import_cv(small_pdf(), &config).await.unwrap_err();
    assert!(err.invites_paste_fallback());
}

// ── Import orchestration ─────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn deferred_import_polls_and_fires_background_trigger_once() {
    let api = Arc::new(MockApi::default());
    api.script_trigger_processing("u_1");
    api.script_statuses([processing_status(), completed_status(sample_draft_json())]);
    let config = config_with(&api);

    let review = import_cv(small_pdf(), &config).await.unwrap();

    // Let the detached background-trigger task run to completion.
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(api.background_calls.load(Ordering::SeqCst), 1);
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        review.target(),
        &PublishTarget::ParsedCv {
            source_file_id: "sf_1".into()
        }
    );
}

#[tokio::test]
async fn inline_completion_skips_polling_and_reconciles() {
    let api = Arc::new(MockApi::default());
    api.script_trigger_completed(sample_draft_json());
    let config = config_with(&api);

    let review = import_cv(small_pdf(), &config).await.unwrap();

    assert_eq!(api.status_calls.load(Ordering::SeqCst), 0);
    let exp = &review.draft().work_experience[0];
    // Legacy names folded into canonical ones on entry into review.
    assert_eq!(exp.job_title.as_deref(), Some("Chief Engineer"));
    assert_eq!(exp.title, None);
    assert_eq!(exp.start_date_year, Some(1840));
    // currentlyWorking entry carries no end year, stored or legacy.
    assert_eq!(exp.end_date_year, None);
    assert_eq!(exp.end_year, None);
}

#[tokio::test(start_paused = true)]
async fn background_trigger_failure_is_not_fatal() {
    let api = Arc::new(MockApi::default());
    api.script_trigger_processing("u_1");
    *api.background_error.lock().unwrap() = Some((502, "worker cold start".to_string()));
    api.script_statuses([completed_status(sample_draft_json())]);
    let config = config_with(&api);

    assert_ok!(import_cv(small_pdf(), &config).await);
}

#[tokio::test]
async fn pasted_text_fallback_parses_and_targets_save() {
    let api = Arc::new(MockApi::default());
    let config = config_with(&api);

    let text = "x".repeat(150);
    let review = import_pasted_text(&text, &config).await.unwrap();
    assert_eq!(api.parse_text_calls.load(Ordering::SeqCst), 1);
    assert_eq!(review.draft().skills, vec!["Rust"]);
    assert_eq!(
        review.target(),
        &PublishTarget::ParsedCv {
            source_file_id: "sf_text_1".into()
        }
    );
}

#[tokio::test]
async fn short_pasted_text_is_rejected_locally() {
    let api = Arc::new(MockApi::default());
    let config = config_with(&api);

    let err = assert_err!(import_pasted_text("too short", &config).await);
    assert!(matches!(err, ProfileAiError::TextTooShort { .. }));
    assert_eq!(api.parse_text_calls.load(Ordering::SeqCst), 0);
}

// ── Chat session ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_send_failure_rolls_back_the_optimistic_message() {
    let api = Arc::new(MockApi::default());
    api.script_continue_err(500, "model overloaded");
    let config = config_with(&api);

    let session = ChatSession::start(&config).await.unwrap();
    assert_eq!(session.transcript().len(), 1); // opening assistant message

    let err = session.send("I'm Ada").await.unwrap_err();
    assert!(err.is_retryable());
    // The transcript must not show a user message the server never accepted.
    assert_eq!(session.transcript().len(), 1);

    // Manual retry works and both turns land.
    api.script_continue_ok(serde_json::json!({
        "assistantMessage": "Nice to meet you, Ada!",
        "nextStep": "experience"
    }));
    let turn = session.send("I'm Ada").await.unwrap();
    assert_eq!(turn.step, ChatStep::Experience);
    let transcript = session.transcript();
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[1].content, "I'm Ada");
}

#[tokio::test]
async fn concurrent_send_is_rejected_without_a_second_request() {
    let api = Arc::new(MockApi::default());
    let gate = Arc::new(Notify::new());
    *api.continue_gate.lock().unwrap() = Some(Arc::clone(&gate));
    let config = config_with(&api);

    let session = Arc::new(ChatSession::start(&config).await.unwrap());

    let first = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.send("first").await })
    };
    // Let the first send reach the (gated) backend call.
    while api.continue_calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    assert!(session.is_busy());

    let err = session.send("second").await.unwrap_err();
    assert!(matches!(err, ProfileAiError::SendInFlight));

    gate.notify_one();
    first.await.unwrap().unwrap();

    // Exactly one continuation request fired.
    assert_eq!(api.continue_calls.load(Ordering::SeqCst), 1);
    assert!(!session.is_busy());
}

#[tokio::test]
async fn readiness_flips_without_a_server_completion_flag() {
    let api = Arc::new(MockApi::default());
    let config = config_with(&api);
    let session = ChatSession::start(&config).await.unwrap();
    assert!(!session.ready_for_review());

    api.script_continue_ok(serde_json::json!({
        "assistantMessage": "Got it — one experience and one skill recorded.",
        "draftProfile": sample_draft_json(),
        "nextStep": "education",
        "isComplete": false
    }));
    session.send("Chief Engineer at Analytical Engines").await.unwrap();

    // No explicit completion, but name + 1 experience + 1 skill are present.
    assert!(session.ready_for_review());
    assert!(minimum_viable_draft(&session.draft()));
}

#[tokio::test]
async fn chat_resume_restores_transcript_and_step() {
    let api = Arc::new(MockApi::default());
    *api.start_response.lock().unwrap() = Some(
        serde_json::from_value(serde_json::json!({
            "draftId": "d_9",
            "isResume": true,
            "assistantMessage": "Welcome back!",
            "conversationHistory": [
                { "role": "assistant", "content": "What's your name?" },
                { "role": "user", "content": "Ada" },
                { "role": "assistant", "content": "Where do you work?" }
            ],
            "nextStep": "experience",
            "draftProfile": { "basicInfo": { "firstName": "Ada", "lastName": "Lovelace" } }
        }))
        .unwrap(),
    );
    let config = config_with(&api);

    let session = ChatSession::start(&config).await.unwrap();
    assert_eq!(session.transcript().len(), 3);
    assert_eq!(session.step(), ChatStep::Experience);
    assert_eq!(
        session.draft().basic_info.unwrap().first_name.as_deref(),
        Some("Ada")
    );
}

#[tokio::test]
async fn chat_review_publishes_through_the_chat_endpoint() {
    let api = Arc::new(MockApi::default());
    api.script_publish(Ok(serde_json::json!({
        "profileCompleteness": 85,
        "unmatchedSkills": ["Difference Engines"]
    })));
    let config = config_with(&api);

    let session = ChatSession::start(&config).await.unwrap();
    let mut review = session.into_review();

    let dyn_api: Arc<dyn ProfileApi> = Arc::clone(&api) as Arc<dyn ProfileApi>;
    let receipt = review.publish(&dyn_api).await.unwrap();

    assert_eq!(api.publish_chat_calls.load(Ordering::SeqCst), 1);
    assert_eq!(api.save_parsed_calls.load(Ordering::SeqCst), 0);
    assert_eq!(receipt.completeness, Some(85));
    assert_eq!(receipt.unmatched_skills, vec!["Difference Engines"]);
}

// ── Review / publish ─────────────────────────────────────────────────────────

fn review_from(draft: serde_json::Value) -> ReviewSession {
    ReviewSession::new(
        PublishTarget::ParsedCv {
            source_file_id: "sf_1".into(),
        },
        serde_json::from_value(draft).unwrap(),
        None,
    )
}

#[tokio::test]
async fn publish_failure_leaves_the_draft_intact() {
    let api = Arc::new(MockApi::default());
    api.script_publish(Err((500, "internal error".to_string())));
    let mut review = review_from(sample_draft_json());
    let before = review.draft().clone();

    let dyn_api: Arc<dyn ProfileApi> = Arc::clone(&api) as Arc<dyn ProfileApi>;
    let err = review.publish(&dyn_api).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(review.draft(), &before);

    // Retry succeeds against the intact draft.
    api.script_publish(Ok(serde_json::json!({ "profileCompleteness": 70 })));
    let receipt = review.publish(&dyn_api).await.unwrap();
    assert_eq!(receipt.completeness, Some(70));
    assert_eq!(api.save_parsed_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn removal_and_edit_surface_matches_the_review_contract() {
    let mut review = review_from(serde_json::json!({
        "skills": ["a", "b", "c", "d", "e"],
        "languages": [
            { "language": "English", "proficiency": "native" },
            { "language": "French", "proficiency": "fluent" }
        ],
        "industries": ["Fintech", "Aerospace"]
    }));

    assert_eq!(review.remove_skill(2).as_deref(), Some("c"));
    assert_eq!(review.draft().skills, vec!["a", "b", "d", "e"]);

    assert_eq!(review.remove_language(0).unwrap().language, "English");
    assert_eq!(review.draft().languages.len(), 1);

    assert_eq!(review.remove_industry(1).as_deref(), Some("Aerospace"));
    assert_eq!(review.draft().industries, vec!["Fintech"]);
}

// ── Streaming poll API ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn poll_stream_emits_one_update_per_check_then_ends() {
    use futures::StreamExt;
    use gigexecs_profile_ai::{poll_status_stream, PollStatus};

    let api = Arc::new(MockApi::default());
    api.script_statuses([
        processing_status(),
        processing_status(),
        completed_status(sample_draft_json()),
    ]);
    let config = config_with(&api);

    let updates: Vec<_> = poll_status_stream(
        Arc::clone(&api) as Arc<dyn ProfileApi>,
        "sf_1",
        &config,
    )
    .collect()
    .await;

    assert_eq!(updates.len(), 3);
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 3);
    assert!(!updates[0].status.is_terminal());
    assert!(updates[2].status.is_terminal());
    match &updates[2].status {
        PollStatus::Completed(bundle) => {
            assert_eq!(bundle.draft.skills, vec!["Mathematics", "Programming"]);
        }
        other => panic!("expected completion, got {other:?}"),
    }
    assert_eq!(updates[0].attempt, 1);
    assert_eq!(updates[2].attempt, 3);
}

#[tokio::test(start_paused = true)]
async fn poll_stream_times_out_at_the_attempt_budget() {
    use futures::StreamExt;
    use gigexecs_profile_ai::{poll_status_stream, PollStatus};

    let api = Arc::new(MockApi::default());
    let config = FlowConfig::builder()
        .backend(Arc::clone(&api) as Arc<dyn ProfileApi>)
        .max_poll_attempts(3)
        .build()
        .unwrap();

    let updates: Vec<_> = poll_status_stream(
        Arc::clone(&api) as Arc<dyn ProfileApi>,
        "sf_1",
        &config,
    )
    .collect()
    .await;

    assert_eq!(updates.len(), 3);
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 3);
    assert!(matches!(updates[2].status, PollStatus::TimedOut));
    assert_eq!(updates[2].percent, 100);
}

#[test]
fn minimum_viable_draft_requires_all_three_signals() {
    let mut draft = DraftProfile {
        basic_info: Some(BasicInfo {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            ..Default::default()
        }),
        ..Default::default()
    };
    assert!(!minimum_viable_draft(&draft));

    draft.work_experience.push(WorkExperience {
        company: "Analytical Engines Ltd".into(),
        ..Default::default()
    });
    assert!(!minimum_viable_draft(&draft));

    draft.skills.push("Mathematics".into());
    assert!(minimum_viable_draft(&draft));
}
