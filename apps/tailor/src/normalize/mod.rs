//! Response normalization: decodes the loosely-shaped bodies returned by the tailoring
//! service into one canonical value per response kind.
//!
//! Every extractor here is pure and total over `serde_json::Value`. The service has shipped
//! several field names for the same datum over time, so each response type carries a fixed
//! precedence table: the first field in the table that holds a usable value wins.
//!
//! # Precedence tables
//! - Identifier (resume): `id` → `resumeId` → `resumeID`
//! - Identifier (job):    `id` → `jobId` → `jobID`
//! - Score:               `detailedScore` → `basicScore` → `atsScore` → `score` (else `0`)
//! - Tailor score:        `atsScore` → `score` (else absent)
//! - Tailored text:       `tailoredText` → whole payload as text

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::models::EntityId;

/// Prefix the service puts in an otherwise successful tailoring payload when the
/// underlying generation backend failed.
pub const UPSTREAM_ERROR_MARKER: &str = "HF API error";

const SCORE_FIELDS: [&str; 4] = ["detailedScore", "basicScore", "atsScore", "score"];
const TAILOR_SCORE_FIELDS: [&str; 2] = ["atsScore", "score"];
const TAILORED_TEXT_FIELD: &str = "tailoredText";

// ────────────────────────────────────────────────────────────────────────────
// Identifiers
// ────────────────────────────────────────────────────────────────────────────

/// Which stored entity an identifier refers to. Selects the alias table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Resume,
    Job,
}

impl EntityKind {
    /// Field names probed for this kind, highest precedence first.
    pub fn id_fields(self) -> [&'static str; 3] {
        match self {
            EntityKind::Resume => ["id", "resumeId", "resumeID"],
            EntityKind::Job => ["id", "jobId", "jobID"],
        }
    }

    /// Field under which a tailoring response echoes this kind's id.
    fn echo_field(self) -> &'static str {
        match self {
            EntityKind::Resume => "resumeId",
            EntityKind::Job => "jobId",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Resume => f.write_str("resume"),
            EntityKind::Job => f.write_str("job description"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("{kind} response missing id")]
    MissingIdentifier { kind: EntityKind },
}

/// Decoded upload / save-job response.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierResponse {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl IdentifierResponse {
    /// Takes the first non-null alias, then requires it to be a usable id.
    ///
    /// A falsy value in a higher-precedence field is not skipped in favour of a later one:
    /// the first non-null field decides.
    pub fn decode(kind: EntityKind, body: &Value) -> Result<Self, NormalizeError> {
        kind.id_fields()
            .iter()
            .find_map(|field| body.get(field).filter(|v| !v.is_null()))
            .and_then(EntityId::from_value)
            .map(|id| IdentifierResponse { kind, id })
            .ok_or(NormalizeError::MissingIdentifier { kind })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scores
// ────────────────────────────────────────────────────────────────────────────

/// Decoded score-fetch response. Each slot holds the field's value only if it was numeric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreResponse {
    pub detailed_score: Option<f64>,
    pub basic_score: Option<f64>,
    pub ats_score: Option<f64>,
    pub score: Option<f64>,
}

impl ScoreResponse {
    pub fn decode(body: &Value) -> Self {
        let [detailed, basic, ats, legacy] = SCORE_FIELDS;
        ScoreResponse {
            detailed_score: numeric_field(body, detailed),
            basic_score: numeric_field(body, basic),
            ats_score: numeric_field(body, ats),
            score: numeric_field(body, legacy),
        }
    }

    /// The AI-enhanced score when present, then the keyword score, then the legacy aliases.
    /// Absence of every field yields `0` rather than an error.
    pub fn score(&self) -> f64 {
        self.detailed_score
            .or(self.basic_score)
            .or(self.ats_score)
            .or(self.score)
            .unwrap_or(0.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tailoring
// ────────────────────────────────────────────────────────────────────────────

/// Decoded tailoring response.
#[derive(Debug, Clone, PartialEq)]
pub struct TailorResponse {
    /// Echoed by the service, or the id that was sent.
    pub resume_id: EntityId,
    /// Echoed by the service, or the id that was sent.
    pub job_id: EntityId,
    pub ats_score: Option<f64>,
    pub tailored_text: String,
}

impl TailorResponse {
    pub fn decode(body: &Value, sent_resume: &EntityId, sent_job: &EntityId) -> Self {
        let echoed = |kind: EntityKind, sent: &EntityId| {
            body.get(kind.echo_field())
                .and_then(EntityId::from_value)
                .unwrap_or_else(|| sent.clone())
        };

        TailorResponse {
            resume_id: echoed(EntityKind::Resume, sent_resume),
            job_id: echoed(EntityKind::Job, sent_job),
            ats_score: TAILOR_SCORE_FIELDS
                .iter()
                .find_map(|field| numeric_field(body, field)),
            tailored_text: extract_tailored_text(body),
        }
    }

    /// True when the service embedded its generation backend's failure in the text.
    pub fn is_upstream_error(&self) -> bool {
        self.tailored_text.starts_with(UPSTREAM_ERROR_MARKER)
    }
}

/// Returns the dedicated text field when present, otherwise the whole body as text.
/// Covers services that reply with a bare string instead of an object.
pub fn extract_tailored_text(body: &Value) -> String {
    match body.get(TAILORED_TEXT_FIELD) {
        Some(field) if !field.is_null() => coerce_text(field),
        _ => coerce_text(body),
    }
}

fn numeric_field(body: &Value, field: &str) -> Option<f64> {
    body.get(field).filter(|v| v.is_number()).and_then(Value::as_f64)
}

fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── identifiers ─────────────────────────────────────────────────────────

    #[test]
    fn test_identifier_prefers_canonical_id() {
        let body = json!({ "id": 7, "resumeId": 9 });
        let decoded = IdentifierResponse::decode(EntityKind::Resume, &body).unwrap();
        assert_eq!(decoded.id, EntityId::from(7));
    }

    #[test]
    fn test_identifier_falls_back_to_kind_alias_then_legacy() {
        let job = json!({ "jobId": "jd-42", "description": "..." });
        let decoded = IdentifierResponse::decode(EntityKind::Job, &job).unwrap();
        assert_eq!(decoded.id, EntityId::from("jd-42"));

        let legacy = json!({ "resumeID": 3 });
        let decoded = IdentifierResponse::decode(EntityKind::Resume, &legacy).unwrap();
        assert_eq!(decoded.id, EntityId::from(3));
    }

    #[test]
    fn test_identifier_skips_null_fields() {
        let body = json!({ "id": null, "resumeId": 12 });
        let decoded = IdentifierResponse::decode(EntityKind::Resume, &body).unwrap();
        assert_eq!(decoded.id.to_string(), "12");
    }

    #[test]
    fn test_identifier_missing_everywhere_fails() {
        for body in [json!({ "fileName": "cv.pdf" }), json!({}), json!("ok"), Value::Null] {
            let err = IdentifierResponse::decode(EntityKind::Resume, &body).unwrap_err();
            assert_eq!(
                err,
                NormalizeError::MissingIdentifier {
                    kind: EntityKind::Resume
                }
            );
        }
    }

    #[test]
    fn test_identifier_from_other_kind_is_not_accepted() {
        let body = json!({ "jobId": 5 });
        assert!(IdentifierResponse::decode(EntityKind::Resume, &body).is_err());
    }

    #[test]
    fn test_falsy_identifier_is_rejected() {
        assert!(IdentifierResponse::decode(EntityKind::Job, &json!({ "id": 0 })).is_err());
        assert!(IdentifierResponse::decode(EntityKind::Job, &json!({ "id": "" })).is_err());
        assert!(IdentifierResponse::decode(EntityKind::Job, &json!({ "id": true })).is_err());
    }

    #[test]
    fn test_entity_id_serializes_as_received() {
        assert_eq!(serde_json::to_value(EntityId::from(5)).unwrap(), json!(5));
        assert_eq!(serde_json::to_value(EntityId::from("a1")).unwrap(), json!("a1"));
    }

    // ── scores ──────────────────────────────────────────────────────────────

    #[test]
    fn test_detailed_score_wins_over_all_others() {
        let body = json!({ "detailedScore": 81, "basicScore": 40, "atsScore": 30, "score": 20 });
        assert_eq!(ScoreResponse::decode(&body).score(), 81.0);
    }

    #[test]
    fn test_score_precedence_chain() {
        let basic = json!({ "basicScore": 55, "atsScore": 30, "score": 20 });
        assert_eq!(ScoreResponse::decode(&basic).score(), 55.0);

        let ats = json!({ "atsScore": 30.5, "score": 20 });
        assert_eq!(ScoreResponse::decode(&ats).score(), 30.5);

        let legacy = json!({ "score": 20 });
        assert_eq!(ScoreResponse::decode(&legacy).score(), 20.0);
    }

    #[test]
    fn test_non_numeric_score_fields_are_skipped() {
        let body = json!({ "detailedScore": null, "basicScore": "64", "atsScore": 48 });
        assert_eq!(ScoreResponse::decode(&body).score(), 48.0);
    }

    #[test]
    fn test_missing_score_defaults_to_zero() {
        let body = json!({ "status": "success", "message": "ATS score calculated" });
        assert_eq!(ScoreResponse::decode(&body).score(), 0.0);
        assert_eq!(ScoreResponse::decode(&json!("72")).score(), 0.0);
    }

    // ── tailoring ───────────────────────────────────────────────────────────

    #[test]
    fn test_tailor_response_full_payload() {
        let body = json!({
            "resumeId": 1,
            "jobId": 2,
            "atsScore": 77,
            "tailoredText": "Jane Doe\nRust engineer"
        });
        let decoded = TailorResponse::decode(&body, &EntityId::from(1), &EntityId::from(2));
        assert_eq!(decoded.ats_score, Some(77.0));
        assert_eq!(decoded.tailored_text, "Jane Doe\nRust engineer");
        assert!(!decoded.is_upstream_error());
    }

    #[test]
    fn test_tailor_response_defaults_ids_to_sent_values() {
        let body = json!({ "tailoredText": "x" });
        let decoded = TailorResponse::decode(&body, &EntityId::from(10), &EntityId::from("j"));
        assert_eq!(decoded.resume_id, EntityId::from(10));
        assert_eq!(decoded.job_id, EntityId::from("j"));
        assert_eq!(decoded.ats_score, None);
    }

    #[test]
    fn test_tailor_score_falls_back_to_score_field() {
        let body = json!({ "score": 64, "tailoredText": "x" });
        let decoded = TailorResponse::decode(&body, &EntityId::from(1), &EntityId::from(2));
        assert_eq!(decoded.ats_score, Some(64.0));
    }

    #[test]
    fn test_bare_string_body_becomes_text() {
        let body = json!("Plain rewritten resume");
        assert_eq!(extract_tailored_text(&body), "Plain rewritten resume");
    }

    #[test]
    fn test_object_without_text_field_is_serialized() {
        let body = json!({ "status": "error" });
        assert_eq!(extract_tailored_text(&body), r#"{"status":"error"}"#);
        assert_eq!(extract_tailored_text(&Value::Null), "");
    }

    #[test]
    fn test_upstream_error_marker_detection() {
        let body = json!({ "tailoredText": "HF API error: timeout" });
        let decoded = TailorResponse::decode(&body, &EntityId::from(1), &EntityId::from(2));
        assert!(decoded.is_upstream_error());

        let body = json!({ "tailoredText": "Summary: no HF API error here" });
        let decoded = TailorResponse::decode(&body, &EntityId::from(1), &EntityId::from(2));
        assert!(!decoded.is_upstream_error());
    }
}
