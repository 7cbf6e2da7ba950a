//! Diagnosis extractor — free-text model reply → validated `DiagnosisRecord`.
//!
//! DESIGN
//! ======
//! Model output is untrusted text. It may carry prose around the JSON,
//! markdown fences, missing fields, or numbers encoded as strings. The
//! pipeline is split so each stage can fail on its own terms:
//!
//! 1. `strip_fences` removes ```` ``` ```` markers (and a language tag).
//! 2. `locate_object` finds the span from the first `{` to the last `}`.
//! 3. `serde_json` parses that span; syntax errors are `MalformedJson`.
//! 4. `isPlantLeaf` decides rejection vs. diagnosis. Missing or
//!    non-boolean counts as `false`.
//! 5. `DiagnosisRecord::from_object` coerces every field leniently.
//!
//! The output is always a fully-shaped record, a rejection, or a
//! classified error.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ErrorCode;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractionError {
    #[error("no JSON object found in model response")]
    NoJsonFound,

    #[error("model response JSON is malformed: {0}")]
    MalformedJson(String),
}

impl ErrorCode for ExtractionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NoJsonFound => "E_NO_JSON_FOUND",
            Self::MalformedJson(_) => "E_MALFORMED_JSON",
        }
    }

    fn retryable(&self) -> bool {
        true
    }
}

/// Outcome of a successful extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnosis {
    /// The image is a plant leaf; the record is fully populated.
    Leaf(DiagnosisRecord),
    /// The model says the image is not a plant leaf.
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    pub immediate: Vec<String>,
    pub remedies: Vec<String>,
    pub duration: String,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CareGuide {
    pub watering: String,
    pub sunlight: String,
    pub soil: String,
    pub fertilizer: String,
    pub temperature: String,
}

/// Canonical diagnosis shape returned to clients. Keys match the template
/// embedded in the vision prompt.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRecord {
    pub is_plant_leaf: bool,
    pub plant_name: String,
    pub scientific_name: String,
    pub family: String,
    pub confidence: f64,
    pub health_score: f64,
    pub risk_level: String,
    pub disease: String,
    pub severity: String,
    pub affected_parts: Vec<String>,
    pub disease_duration: String,
    pub symptoms: Vec<String>,
    pub treatment: Treatment,
    pub care_guide: CareGuide,
    pub prevention_tips: Vec<String>,
    pub notes: String,
}

// =============================================================================
// PIPELINE
// =============================================================================

/// Run the full extraction pipeline over raw model text.
///
/// # Errors
///
/// `NoJsonFound` when no `{...}` span exists, `MalformedJson` when the span
/// does not parse.
pub fn extract(raw_text: &str) -> Result<Diagnosis, ExtractionError> {
    let cleaned = strip_fences(raw_text);
    let span = locate_object(&cleaned).ok_or(ExtractionError::NoJsonFound)?;
    let parsed: Value = serde_json::from_str(span).map_err(|e| ExtractionError::MalformedJson(e.to_string()))?;
    let Value::Object(object) = parsed else {
        return Err(ExtractionError::MalformedJson("top-level value is not an object".into()));
    };

    if object.get("isPlantLeaf").and_then(Value::as_bool) != Some(true) {
        return Ok(Diagnosis::Rejected);
    }

    Ok(Diagnosis::Leaf(DiagnosisRecord::from_object(&object)))
}

/// Remove every markdown fence marker, including a language tag glued to
/// it (```` ```json ````).
#[must_use]
pub fn strip_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        rest = &rest[tag_len..];
    }
    out.push_str(rest);
    out
}

/// Span from the first `{` through the last `}`; `None` if either is absent
/// or they are out of order.
#[must_use]
pub fn locate_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

// =============================================================================
// COERCION
// =============================================================================

impl DiagnosisRecord {
    fn from_object(obj: &Map<String, Value>) -> Self {
        let empty = Map::new();
        let treatment = obj
            .get("treatment")
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let care = obj
            .get("careGuide")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        Self {
            is_plant_leaf: true,
            plant_name: text(obj.get("plantName")),
            scientific_name: text(obj.get("scientificName")),
            family: text(obj.get("family")),
            confidence: percent(obj.get("confidence")),
            health_score: percent(obj.get("healthScore")),
            risk_level: text(obj.get("riskLevel")),
            disease: text(obj.get("disease")),
            severity: text(obj.get("severity")),
            affected_parts: text_list(obj.get("affectedParts")),
            disease_duration: text(obj.get("diseaseDuration")),
            symptoms: text_list(obj.get("symptoms")),
            treatment: Treatment {
                immediate: text_list(treatment.get("immediate")),
                remedies: text_list(treatment.get("remedies")),
                duration: text(treatment.get("duration")),
                success_rate: percent(treatment.get("successRate")),
            },
            care_guide: CareGuide {
                watering: text(care.get("watering")),
                sunlight: text(care.get("sunlight")),
                soil: text(care.get("soil")),
                fertilizer: text(care.get("fertilizer")),
                temperature: text(care.get("temperature")),
            },
            prevention_tips: text_list(obj.get("preventionTips")),
            notes: text(obj.get("notes")),
        }
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Numeric score in `[0, 100]`. Accepts `85`, `"85"`, `"85%"`.
fn percent(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(v) if v.is_finite() => v.clamp(0.0, 100.0),
        _ => 0.0,
    }
}

fn text_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "diagnosis_test.rs"]
mod tests;
