//! # gigexecs-profile-ai
//!
//! Client-side orchestration for GigExecs' AI-assisted profile creation:
//! upload a CV (or paste its text), drive the asynchronous extraction job,
//! converse with the profile assistant, reconcile the assistant's loosely
//! named output into one canonical shape, and publish the reviewed draft.
//!
//! The platform endpoints do the heavy lifting (storage, extraction, the
//! LLM); this crate owns the flow around them — validation before the
//! network, bounded polling, optimistic chat turns with rollback, and the
//! atomic-publish guarantee.
//!
//! ## Flow Overview
//!
//! ```text
//! CV file / pasted text
//!  │
//!  ├─ 1. Validate   MIME type, size, text length (no network yet)
//!  ├─ 2. Upload     base64 body → sourceFileId
//!  ├─ 3. Trigger    inline result, or handoff to the background worker
//!  ├─ 4. Poll       2 s cadence, ≤ 60 checks, cancellable between attempts
//!  ├─ 5. Reconcile  jobTitle|title, startDateYear|startYear, … → canonical
//!  └─ 6. Review     edit, delete entries, publish (or chat first: start →
//!                   send* → ready_for_review → review)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gigexecs_profile_ai::{import_cv, CvFile, FlowConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FlowConfig::builder()
//!         .api_base_url("https://gigexecs.com/.netlify/functions")
//!         .auth_token(std::env::var("GIGEXECS_AUTH_TOKEN")?)
//!         .build()?;
//!
//!     let file = CvFile::from_path("cv.pdf").await?;
//!     let mut review = import_cv(file, &config).await?;
//!     review.remove_skill(3);
//!
//!     let api = gigexecs_profile_ai::import::resolve_backend(&config)?;
//!     let receipt = review.publish(&api).await?;
//!     println!("profile {}% complete", receipt.completeness.unwrap_or(0));
//!     Ok(())
//! }
//! ```
//!
//! ## Error recovery
//!
//! | Error | What to do |
//! |-------|------------|
//! | precondition (`FileTooLarge`, …) | fix the input; nothing was sent |
//! | `ExtractionFailed` | offer the paste-text fallback ([`import_pasted_text`]) |
//! | `ParseJobFailed` | restart the upload flow |
//! | `PollTimeout` | job may still finish server-side; try again |
//! | `Http` / `Api` | transient; retry manually |
//! | `AuthMissing` / `Unauthorized` | re-authenticate; fatal to the flow |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod import;
pub mod pipeline;
pub mod profile;
pub mod progress;
pub mod reconcile;
pub mod review;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use api::{
    HttpProfileApi, ParsePhase, ProfileApi, PublishResponse, SaveReport, UploadRequest,
    UploadResponse,
};
pub use chat::{
    minimum_viable_draft, ChatMessage, ChatSession, ChatStep, ChatTurn, ConversationState, Role,
};
pub use config::{FlowConfig, FlowConfigBuilder};
pub use error::ProfileAiError;
pub use import::{import_cv, import_cv_with_cancel, import_pasted_text};
pub use pipeline::poll::{CancelFlag, ParsePoller, ParsedBundle};
pub use pipeline::validate::{CvFile, UploadPurpose};
pub use profile::{
    BasicInfo, Certification, Confidence, DraftProfile, Education, Eligibility, HourlyRate,
    LanguageSkill, Proficiency, WorkExperience,
};
pub use progress::{ImportProgressCallback, NoopProgressCallback, ProgressCallback};
pub use review::{PublishReceipt, PublishTarget, ReviewSession};
pub use stream::{poll_status_stream, PollStatus, PollUpdate, PollUpdateStream};
