//! Prompt text for chat and vision calls.
//!
//! `ReportContext` arrives from the client with any subset of fields set.
//! `summary()` applies the sentinel defaults in one place; prompt builders
//! only ever see the filled-in `ReportSummary`.

use std::fmt::Write;

use serde::Deserialize;
use serde_json::Value;

const UNKNOWN: &str = "Unknown";
const NOT_AVAILABLE: &str = "N/A";
const DEFAULT_LANGUAGE: &str = "en";

pub const OFF_TOPIC_REPLY: &str = "I can only help with plant health questions.";

/// Empty response template shown to the model. Keys are the
/// `DiagnosisRecord` wire names.
const DIAGNOSIS_TEMPLATE: &str = r#"{
  "isPlantLeaf": false,
  "plantName": "",
  "scientificName": "",
  "family": "",
  "confidence": 0,
  "healthScore": 0,
  "riskLevel": "",
  "disease": "",
  "severity": "",
  "affectedParts": [],
  "diseaseDuration": "",
  "symptoms": [],
  "treatment": {
    "immediate": [],
    "remedies": [],
    "duration": "",
    "successRate": 0
  },
  "careGuide": {
    "watering": "",
    "sunlight": "",
    "soil": "",
    "fertilizer": "",
    "temperature": ""
  },
  "preventionTips": [],
  "notes": ""
}"#;

// =============================================================================
// REPORT CONTEXT
// =============================================================================

/// Diagnosis the client is chatting about. Never persisted.
///
/// Every field is kept as raw JSON: clients send numbers, strings, or
/// nothing, and a mistyped field falls back to its sentinel instead of
/// failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Value")]
pub struct ReportContext {
    pub plant_name: Option<Value>,
    pub disease: Option<Value>,
    pub severity: Option<Value>,
    pub health_score: Option<Value>,
}

impl From<Value> for ReportContext {
    fn from(raw: Value) -> Self {
        let Value::Object(mut obj) = raw else {
            return Self::default();
        };
        Self {
            plant_name: obj.remove("plantName"),
            disease: obj.remove("disease"),
            severity: obj.remove("severity"),
            health_score: obj.remove("healthScore"),
        }
    }
}

/// `ReportContext` with every field resolved to display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub plant_name: String,
    pub disease: String,
    pub severity: String,
    pub health_score: String,
}

impl ReportContext {
    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            plant_name: display(self.plant_name.as_ref(), UNKNOWN),
            disease: display(self.disease.as_ref(), UNKNOWN),
            severity: display(self.severity.as_ref(), NOT_AVAILABLE),
            health_score: display(self.health_score.as_ref(), NOT_AVAILABLE),
        }
    }
}

/// Non-blank strings and numbers render as text; anything else is `fallback`.
fn display(value: Option<&Value>, fallback: &str) -> String {
    match value {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => non_empty(Some(s)).unwrap_or(fallback).to_owned(),
        _ => fallback.to_owned(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// BUILDERS
// =============================================================================

/// System instruction for the plant-doctor chat.
#[must_use]
pub fn chat_system_instruction(report: &ReportSummary) -> String {
    let mut out = String::from("You are an expert AI Plant Doctor.\n\n");
    let _ = writeln!(out, "Plant: {}", report.plant_name);
    let _ = writeln!(out, "Disease: {}", report.disease);
    let _ = writeln!(out, "Severity: {}", report.severity);
    if report.health_score == NOT_AVAILABLE {
        let _ = writeln!(out, "Health Score: {NOT_AVAILABLE}");
    } else {
        let _ = writeln!(out, "Health Score: {}%", report.health_score);
    }
    out.push_str("\nRules:\n");
    out.push_str("- Only answer plant-health related questions.\n");
    let _ = writeln!(out, "- If unrelated, say: \"{OFF_TOPIC_REPLY}\"");
    out.push_str("- Use simple markdown formatting.");
    out
}

/// Resolve the advisory `language` form field. Blank means English.
#[must_use]
pub fn resolve_language(language: Option<&str>) -> &str {
    non_empty(language).unwrap_or(DEFAULT_LANGUAGE)
}

/// Prompt that accompanies the leaf image.
#[must_use]
pub fn diagnosis_prompt(language: &str) -> String {
    let mut out = String::from(
        "You are a plant disease AI. Analyze this leaf image and return ONLY JSON in the structure below, \
         with no markdown and no commentary.\n",
    );
    out.push_str(
        "If the image is not of a plant leaf, respond with empty values and \"isPlantLeaf\": false.\n",
    );
    let _ = writeln!(
        out,
        "Write every text value (disease name, care tips, etc.) in language \"{language}\", \
         but keep the keys in English."
    );
    out.push_str("Scores (confidence, healthScore, successRate) are numbers from 0 to 100.\n\n");
    out.push_str(DIAGNOSIS_TEMPLATE);
    out
}

#[cfg(test)]
#[path = "prompts_test.rs"]
mod tests;
