//! Field-name reconciliation for assistant-produced drafts.
//!
//! The assistant emits some fields under either of two names (`jobTitle` vs
//! `title`, `startDateYear` vs `startYear`, `institutionName` vs
//! `institution`, `degreeLevel` vs `degree`). This module is the single
//! source of truth for the precedence between them: the canonical (newer)
//! name wins when present, the legacy name is the fallback. Every read site
//! uses these accessors, every write site goes through the setters — which
//! store under the canonical name only and clear the legacy one.
//!
//! Everything here is a pure function over the structs in
//! [`crate::profile`]; no network, no side effects. [`normalize`] applies
//! the whole rule set in place and is idempotent, so it is safe to run both
//! after every server response and immediately before publish.

use crate::profile::{DraftProfile, Education, WorkExperience};

// ── Work experience ──────────────────────────────────────────────────────

/// The entry's job title: `job_title` wins, `title` is the fallback.
pub fn job_title(exp: &WorkExperience) -> Option<&str> {
    exp.job_title.as_deref().or(exp.title.as_deref())
}

/// The entry's start year: `start_date_year` wins, `start_year` falls back.
pub fn start_year(exp: &WorkExperience) -> Option<i32> {
    exp.start_date_year.or(exp.start_year)
}

/// The entry's end year, or `None` while `currently_working` is set —
/// a stored end year on a current position is not meaningful and must be
/// ignored even if present.
pub fn end_year(exp: &WorkExperience) -> Option<i32> {
    if exp.currently_working {
        None
    } else {
        exp.end_date_year.or(exp.end_year)
    }
}

/// Display form of the end date: `"Present"` for a current position, the
/// year otherwise, empty when unknown.
pub fn end_label(exp: &WorkExperience) -> String {
    if exp.currently_working {
        "Present".to_string()
    } else {
        end_year(exp).map(|y| y.to_string()).unwrap_or_default()
    }
}

/// Write the job title under the canonical name, clearing the legacy field.
pub fn set_job_title(exp: &mut WorkExperience, value: impl Into<String>) {
    exp.job_title = Some(value.into());
    exp.title = None;
}

/// Write the start year under the canonical name, clearing the legacy field.
pub fn set_start_year(exp: &mut WorkExperience, value: Option<i32>) {
    exp.start_date_year = value;
    exp.start_year = None;
}

/// Write the end year under the canonical name, clearing the legacy field.
pub fn set_end_year(exp: &mut WorkExperience, value: Option<i32>) {
    exp.end_date_year = value;
    exp.end_year = None;
}

// ── Education ────────────────────────────────────────────────────────────

/// The entry's institution: `institution_name` wins, `institution` falls back.
pub fn institution(edu: &Education) -> Option<&str> {
    edu.institution_name.as_deref().or(edu.institution.as_deref())
}

/// The entry's degree: `degree_level` wins, `degree` falls back.
pub fn degree(edu: &Education) -> Option<&str> {
    edu.degree_level.as_deref().or(edu.degree.as_deref())
}

/// Write the institution under the canonical name, clearing the legacy field.
pub fn set_institution(edu: &mut Education, value: impl Into<String>) {
    edu.institution_name = Some(value.into());
    edu.institution = None;
}

/// Write the degree under the canonical name, clearing the legacy field.
pub fn set_degree(edu: &mut Education, value: impl Into<String>) {
    edu.degree_level = Some(value.into());
    edu.degree = None;
}

// ── Whole-draft normalisation ────────────────────────────────────────────

/// Fold every legacy field into its canonical counterpart, in place.
///
/// After this runs:
/// * `title` / `start_year` / `end_year` / `institution` / `degree` are all
///   `None`, their values (if any) moved into the canonical fields;
/// * entries with `currently_working` carry no end year at all;
/// * the legacy education `year` is folded into `end_date` when `end_date`
///   is absent, and dropped otherwise.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(draft: &mut DraftProfile) {
    for exp in &mut draft.work_experience {
        if exp.job_title.is_none() {
            exp.job_title = exp.title.take();
        }
        exp.title = None;

        if exp.start_date_year.is_none() {
            exp.start_date_year = exp.start_year.take();
        }
        exp.start_year = None;

        if exp.currently_working {
            exp.end_date_year = None;
            exp.end_date_month = None;
        } else if exp.end_date_year.is_none() {
            exp.end_date_year = exp.end_year.take();
        }
        exp.end_year = None;
    }

    for edu in &mut draft.education {
        if edu.institution_name.is_none() {
            edu.institution_name = edu.institution.take();
        }
        edu.institution = None;

        if edu.degree_level.is_none() {
            edu.degree_level = edu.degree.take();
        }
        edu.degree = None;

        if edu.end_date.is_none() {
            edu.end_date = edu.year.take().map(|y| y.to_string());
        }
        edu.year = None;
    }
}

/// Convenience: return a normalised copy, leaving the input untouched.
pub fn normalized(draft: &DraftProfile) -> DraftProfile {
    let mut out = draft.clone();
    normalize(&mut out);
    out
}
