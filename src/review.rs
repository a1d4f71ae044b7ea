//! Review and publish: edit the reconciled draft, then submit it.
//!
//! A [`ReviewSession`] is built from either flow — the chat draft or the
//! parsed CV — and offers the same editing surface for both: field edits
//! routed through the reconciler for the ambiguous names, and
//! order-preserving removal by index for every entry kind. Publish failure
//! leaves the draft exactly as it was, so the user retries without losing
//! edits; the publish endpoint is atomic and no partial-publish state ever
//! reaches the caller.

use crate::api::{ProfileApi, PublishResponse, SaveReport};
use crate::error::ProfileAiError;
use crate::profile::{
    BasicInfo, Certification, DraftProfile, Education, Eligibility, LanguageSkill, WorkExperience,
};
use crate::reconcile;
use std::sync::Arc;
use tracing::info;

/// Where the draft goes on publish: the chat-draft endpoint or the
/// parsed-CV save endpoint. The two flows are mutually exclusive per
/// session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishTarget {
    ChatDraft { draft_id: String },
    ParsedCv { source_file_id: String },
}

/// What a successful publish reported back.
///
/// `unmatched_skills` could not be matched to the platform's skill
/// taxonomy; they were not saved and are not retried — show them to the
/// user for manual re-entry later.
#[derive(Debug, Clone, Default)]
pub struct PublishReceipt {
    pub completeness: Option<u8>,
    pub unmatched_skills: Vec<String>,
    pub sections: Option<SaveReport>,
}

impl From<PublishResponse> for PublishReceipt {
    fn from(r: PublishResponse) -> Self {
        Self {
            completeness: r.profile_completeness,
            unmatched_skills: r.unmatched_skills,
            sections: r.results,
        }
    }
}

/// An editable draft awaiting publish.
#[derive(Debug)]
pub struct ReviewSession {
    target: PublishTarget,
    draft: DraftProfile,
    eligibility: Option<Eligibility>,
    publishing: bool,
}

impl ReviewSession {
    /// Build a session; the draft is normalised on entry so every display
    /// value already went through the reconciler.
    pub fn new(
        target: PublishTarget,
        mut draft: DraftProfile,
        eligibility: Option<Eligibility>,
    ) -> Self {
        reconcile::normalize(&mut draft);
        Self {
            target,
            draft,
            eligibility,
            publishing: false,
        }
    }

    pub fn target(&self) -> &PublishTarget {
        &self.target
    }

    pub fn draft(&self) -> &DraftProfile {
        &self.draft
    }

    /// Direct mutable access for unambiguous fields (summary, rate,
    /// descriptions...). The ambiguous ones have dedicated setters below.
    pub fn draft_mut(&mut self) -> &mut DraftProfile {
        &mut self.draft
    }

    pub fn eligibility(&self) -> Option<&Eligibility> {
        self.eligibility.as_ref()
    }

    pub fn basic_info_mut(&mut self) -> &mut BasicInfo {
        self.draft.basic_info.get_or_insert_with(BasicInfo::default)
    }

    // ── Reconciler-routed edits ───────────────────────────────────────────
    // Each returns false when the index is out of range (no-op).

    pub fn set_job_title(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.draft.work_experience.get_mut(index) {
            Some(exp) => {
                reconcile::set_job_title(exp, value);
                true
            }
            None => false,
        }
    }

    pub fn set_start_year(&mut self, index: usize, year: Option<i32>) -> bool {
        match self.draft.work_experience.get_mut(index) {
            Some(exp) => {
                reconcile::set_start_year(exp, year);
                true
            }
            None => false,
        }
    }

    pub fn set_end_year(&mut self, index: usize, year: Option<i32>) -> bool {
        match self.draft.work_experience.get_mut(index) {
            Some(exp) => {
                reconcile::set_end_year(exp, year);
                true
            }
            None => false,
        }
    }

    pub fn set_institution(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.draft.education.get_mut(index) {
            Some(edu) => {
                reconcile::set_institution(edu, value);
                true
            }
            None => false,
        }
    }

    pub fn set_degree(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.draft.education.get_mut(index) {
            Some(edu) => {
                reconcile::set_degree(edu, value);
                true
            }
            None => false,
        }
    }

    // ── Entry removal (order-preserving, out-of-range is a no-op) ─────────

    pub fn remove_work_experience(&mut self, index: usize) -> Option<WorkExperience> {
        bounded_remove(&mut self.draft.work_experience, index)
    }

    pub fn remove_education(&mut self, index: usize) -> Option<Education> {
        bounded_remove(&mut self.draft.education, index)
    }

    pub fn remove_skill(&mut self, index: usize) -> Option<String> {
        bounded_remove(&mut self.draft.skills, index)
    }

    pub fn remove_industry(&mut self, index: usize) -> Option<String> {
        bounded_remove(&mut self.draft.industries, index)
    }

    pub fn remove_certification(&mut self, index: usize) -> Option<Certification> {
        bounded_remove(&mut self.draft.certifications, index)
    }

    pub fn remove_language(&mut self, index: usize) -> Option<LanguageSkill> {
        bounded_remove(&mut self.draft.languages, index)
    }

    // ── Publish ───────────────────────────────────────────────────────────

    /// Submit the edited draft (plus any previously computed eligibility)
    /// to the endpoint for this session's flow.
    ///
    /// On failure the draft is untouched and the session stays editable for
    /// a manual retry.
    pub async fn publish(
        &mut self,
        api: &Arc<dyn ProfileApi>,
    ) -> Result<PublishReceipt, ProfileAiError> {
        if self.publishing {
            return Err(ProfileAiError::PublishInFlight);
        }
        self.publishing = true;

        let payload = reconcile::normalized(&self.draft);
        let result = match &self.target {
            PublishTarget::ChatDraft { draft_id } => {
                api.publish_chat_draft(draft_id, &payload).await
            }
            PublishTarget::ParsedCv { source_file_id } => {
                api.save_parsed(source_file_id, &payload, self.eligibility.as_ref())
                    .await
            }
        };
        self.publishing = false;

        let response = result?;
        let receipt = PublishReceipt::from(response);
        info!(
            "Published draft: completeness {:?}, {} unmatched skills",
            receipt.completeness,
            receipt.unmatched_skills.len()
        );
        Ok(receipt)
    }
}

fn bounded_remove<T>(items: &mut Vec<T>, index: usize) -> Option<T> {
    if index < items.len() {
        Some(items.remove(index))
    } else {
        None
    }
}
