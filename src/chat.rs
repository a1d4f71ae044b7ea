//! Conversational draft builder: the AI chat state machine.
//!
//! The client never self-advances the step — every transition comes from
//! the assistant's response to a user message. [`ChatSession::start`]
//! resumes an existing in-progress session when the server has one;
//! [`ChatSession::send`] appends the user message optimistically, calls the
//! continuation endpoint, and replaces draft/step/eligibility wholesale
//! with the response's versions. If the call fails outright, the optimistic
//! message is rolled back so the transcript never shows a user message the
//! server did not accept.
//!
//! Concurrency: one send at a time. The in-flight guard is an atomic
//! compare-exchange, so a second `send` while one is outstanding returns
//! [`ProfileAiError::SendInFlight`] without issuing a request. Session
//! state sits behind a `std::sync::Mutex` that is locked only around
//! mutations — never across an await — so the transcript stays readable
//! while a send is in flight (the UI renders the optimistic message from
//! exactly that window).

use crate::api::ProfileApi;
use crate::config::FlowConfig;
use crate::error::ProfileAiError;
use crate::import::resolve_backend;
use crate::profile::{DraftProfile, Eligibility};
use crate::review::{PublishTarget, ReviewSession};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Author of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Position in the fixed profile-building sequence. The server owns the
/// transitions; `Unknown` absorbs step names this client predates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStep {
    #[default]
    BasicInfo,
    Experience,
    Education,
    Skills,
    Industries,
    Certifications,
    Languages,
    HourlyRate,
    Summary,
    EligibilityReview,
    Complete,
    #[serde(other)]
    Unknown,
}

impl ChatStep {
    /// Human-readable label for progress badges.
    pub fn label(&self) -> &'static str {
        match self {
            ChatStep::BasicInfo => "Basic Information",
            ChatStep::Experience => "Work Experience",
            ChatStep::Education => "Education",
            ChatStep::Skills => "Skills",
            ChatStep::Industries => "Industries",
            ChatStep::Certifications => "Certifications",
            ChatStep::Languages => "Languages",
            ChatStep::HourlyRate => "Hourly Rate",
            ChatStep::Summary => "Summary",
            ChatStep::EligibilityReview => "Eligibility Review",
            ChatStep::Complete => "Complete",
            ChatStep::Unknown => "In Progress",
        }
    }
}

/// Snapshot of a chat session: transcript, draft, step, completion.
#[derive(Debug, Clone)]
pub struct ConversationState {
    pub draft_id: String,
    pub transcript: Vec<ChatMessage>,
    pub draft: DraftProfile,
    pub step: ChatStep,
    pub eligibility: Option<Eligibility>,
    pub complete: bool,
}

/// What one successful send produced.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub assistant_message: String,
    pub step: ChatStep,
    pub complete: bool,
}

/// The minimum-viable check behind [`ChatSession::ready_for_review`]:
/// first and last name present, at least one work experience, at least one
/// skill. A safety net for when the assistant stalls without signalling
/// completion — not a replacement for the server's flag.
pub fn minimum_viable_draft(draft: &DraftProfile) -> bool {
    let named = draft
        .basic_info
        .as_ref()
        .map(|b| {
            b.first_name.as_deref().is_some_and(|s| !s.trim().is_empty())
                && b.last_name.as_deref().is_some_and(|s| !s.trim().is_empty())
        })
        .unwrap_or(false);
    named && !draft.work_experience.is_empty() && !draft.skills.is_empty()
}

/// An AI profile-building conversation.
pub struct ChatSession {
    api: Arc<dyn ProfileApi>,
    state: Mutex<ConversationState>,
    in_flight: AtomicBool,
}

// Clears the in-flight flag even if the send future is dropped mid-await.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ChatSession {
    /// Establish or resume a session.
    ///
    /// Fails with [`ProfileAiError::AuthMissing`] /
    /// [`ProfileAiError::Unauthorized`] when no valid session token is
    /// available — fatal to the whole flow; prompt re-authentication, do
    /// not retry.
    pub async fn start(config: &FlowConfig) -> Result<Self, ProfileAiError> {
        let api = resolve_backend(config)?;
        let response = api.start_chat().await?;

        let transcript = if response.conversation_history.is_empty() {
            response
                .assistant_message
                .map(|m| vec![ChatMessage::assistant(m)])
                .unwrap_or_default()
        } else {
            response.conversation_history
        };

        if response.is_resume {
            info!(
                "Resumed chat draft {} at step {:?}",
                response.draft_id, response.next_step
            );
        } else {
            info!("Started chat draft {}", response.draft_id);
        }

        Ok(Self {
            api,
            state: Mutex::new(ConversationState {
                draft_id: response.draft_id,
                transcript,
                draft: response.draft_profile,
                step: response.next_step,
                eligibility: response.eligibility,
                complete: false,
            }),
            in_flight: AtomicBool::new(false),
        })
    }

    /// Send one user message and apply the assistant's turn.
    ///
    /// The message appears in the transcript immediately; if the call fails
    /// it is removed again and the error surfaced. A send while another is
    /// outstanding returns [`ProfileAiError::SendInFlight`] and fires no
    /// request.
    pub async fn send(&self, text: impl Into<String>) -> Result<ChatTurn, ProfileAiError> {
        let text = text.into();

        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| ProfileAiError::SendInFlight)?;
        let _guard = InFlightGuard(&self.in_flight);

        let draft_id = {
            let mut state = self.state.lock().expect("chat state poisoned");
            state.transcript.push(ChatMessage::user(text.clone()));
            state.draft_id.clone()
        };

        match self.api.continue_chat(&draft_id, &text).await {
            Ok(response) => {
                let mut state = self.state.lock().expect("chat state poisoned");
                state
                    .transcript
                    .push(ChatMessage::assistant(response.assistant_message.clone()));
                if let Some(draft) = response.draft_profile {
                    state.draft = draft;
                }
                state.step = response.next_step;
                state.complete = response.is_complete;
                if response.eligibility.is_some() {
                    state.eligibility = response.eligibility;
                }
                debug!(
                    "Chat turn ok: step {:?}, complete = {}",
                    state.step, state.complete
                );
                Ok(ChatTurn {
                    assistant_message: response.assistant_message,
                    step: state.step,
                    complete: state.complete,
                })
            }
            Err(e) => {
                let mut state = self.state.lock().expect("chat state poisoned");
                // The in-flight guard means the optimistic message is still
                // the last entry; remove it so the transcript only shows
                // what the server accepted.
                match state.transcript.last() {
                    Some(last) if last.role == Role::User => {
                        state.transcript.pop();
                    }
                    _ => warn!("rollback found no optimistic message to remove"),
                }
                Err(e)
            }
        }
    }

    /// True while a send is outstanding (disable the send affordance).
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// A snapshot of the full session state.
    pub fn state(&self) -> ConversationState {
        self.state.lock().expect("chat state poisoned").clone()
    }

    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.state.lock().expect("chat state poisoned").transcript.clone()
    }

    pub fn draft(&self) -> DraftProfile {
        self.state.lock().expect("chat state poisoned").draft.clone()
    }

    pub fn step(&self) -> ChatStep {
        self.state.lock().expect("chat state poisoned").step
    }

    /// Ready when the server signals completion OR the local
    /// minimum-viable check passes ([`minimum_viable_draft`]).
    pub fn ready_for_review(&self) -> bool {
        let state = self.state.lock().expect("chat state poisoned");
        state.complete || minimum_viable_draft(&state.draft)
    }

    /// Hand the draft to the review step, targeting the chat publish
    /// endpoint.
    pub fn into_review(self) -> ReviewSession {
        let state = self.state.into_inner().expect("chat state poisoned");
        ReviewSession::new(
            PublishTarget::ChatDraft {
                draft_id: state.draft_id,
            },
            state.draft,
            state.eligibility,
        )
    }
}
