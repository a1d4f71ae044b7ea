//! The draft-profile data model.
//!
//! [`DraftProfile`] is the accumulating structure every flow in this crate
//! produces and consumes: the CV import fills it from extraction, the chat
//! flow fills it turn by turn, and the review step edits and publishes it.
//! All fields are optional until publish-time validation server-side.
//!
//! The assistant behind the chat endpoints does not emit a stable schema:
//! a work-experience title may arrive as `jobTitle` or `title`, years as
//! `startDateYear` or `startYear`, and so on. Both spellings are kept as
//! real struct fields here so nothing is lost on deserialisation; the fixed
//! precedence between them lives in [`crate::reconcile`], nowhere else.

use serde::{Deserialize, Deserializer, Serialize};

/// The in-progress, partially-filled professional profile.
///
/// Created empty at flow start, enriched monotonically (fields added or
/// overwritten, never proactively nulled except by explicit user deletion of
/// an entry), and consumed by a successful publish.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_info: Option<BasicInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub work_experience: Vec<WorkExperience>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub education: Vec<Education>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub industries: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<Certification>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<LanguageSkill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<HourlyRate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_years_experience: Option<f64>,
}

impl DraftProfile {
    /// True when no section holds any data yet.
    pub fn is_empty(&self) -> bool {
        self.basic_info.is_none()
            && self.work_experience.is_empty()
            && self.education.is_empty()
            && self.skills.is_empty()
            && self.industries.is_empty()
            && self.certifications.is_empty()
            && self.languages.is_empty()
            && self.hourly_rate.is_none()
            && self.summary.is_none()
            && self.estimated_years_experience.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
}

/// One work-experience entry. `company` is the only field the extraction
/// service treats as required.
///
/// `title`, `start_year`, and `end_year` are the legacy spellings the
/// assistant sometimes emits; read them through [`crate::reconcile`] only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkExperience {
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date_month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date_month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_year: Option<i32>,
    pub currently_working: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// One education entry. `institution` and `degree` are the legacy assistant
/// spellings of `institution_name` and `degree_level`; `year` is a legacy
/// single-year stand-in for `end_date`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certification {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awarding_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageSkill {
    pub language: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_proficiency"
    )]
    pub proficiency: Option<Proficiency>,
}

/// Language proficiency, a closed enumeration on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Fluent,
    Native,
}

/// Deserialise a proficiency level, mapping unknown strings to `None`
/// instead of failing the whole draft — the level comes from a model, not
/// from validated user input.
fn lenient_proficiency<'de, D>(de: D) -> Result<Option<Proficiency>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(de)?;
    Ok(raw.and_then(|s| match s.to_lowercase().as_str() {
        "beginner" => Some(Proficiency::Beginner),
        "intermediate" => Some(Proficiency::Intermediate),
        "fluent" => Some(Proficiency::Fluent),
        "native" => Some(Proficiency::Native),
        _ => None,
    }))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HourlyRate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// A derived, read-only eligibility verdict attached to a draft.
///
/// Produced server-side once per extraction or chat turn. Never recomputed
/// locally — only replaced wholesale by a newer server response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    pub years_of_experience_estimate: f64,
    pub meets_threshold: bool,
    pub confidence: Confidence,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub seniority_indicators: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_draft_serialises_to_empty_object() {
        let json = serde_json::to_value(DraftProfile::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn legacy_field_names_deserialize() {
        let raw = serde_json::json!({
            "workExperience": [{
                "company": "Initech",
                "title": "CTO",
                "startYear": 2001,
                "endYear": 2009
            }],
            "education": [{
                "institution": "MIT",
                "degree": "MSc",
                "year": 1999
            }]
        });
        let draft: DraftProfile = serde_json::from_value(raw).unwrap();
        let exp = &draft.work_experience[0];
        assert_eq!(exp.title.as_deref(), Some("CTO"));
        assert!(exp.job_title.is_none());
        assert_eq!(exp.start_year, Some(2001));
        let edu = &draft.education[0];
        assert_eq!(edu.institution.as_deref(), Some("MIT"));
        assert_eq!(edu.year, Some(1999));
    }

    #[test]
    fn unknown_proficiency_becomes_none() {
        let raw = serde_json::json!({ "language": "Dutch", "proficiency": "conversational" });
        let lang: LanguageSkill = serde_json::from_value(raw).unwrap();
        assert_eq!(lang.proficiency, None);

        let raw = serde_json::json!({ "language": "French", "proficiency": "Fluent" });
        let lang: LanguageSkill = serde_json::from_value(raw).unwrap();
        assert_eq!(lang.proficiency, Some(Proficiency::Fluent));
    }

    #[test]
    fn eligibility_round_trips() {
        let raw = serde_json::json!({
            "yearsOfExperienceEstimate": 17.5,
            "meetsThreshold": true,
            "confidence": "high",
            "reasons": ["held VP roles"],
            "seniorityIndicators": ["VP", "Director"]
        });
        let e: Eligibility = serde_json::from_value(raw.clone()).unwrap();
        assert!(e.meets_threshold);
        assert_eq!(e.confidence, Confidence::High);
        assert_eq!(serde_json::to_value(&e).unwrap(), raw);
    }
}
