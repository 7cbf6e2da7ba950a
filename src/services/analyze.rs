//! Analyze service — leaf image → diagnosis or rejection.
//!
//! DESIGN
//! ======
//! One vision call, then the extractor. The raw model text is logged when
//! extraction fails (tagged with the request id) so prompt problems can
//! be diagnosed; it never leaves this module otherwise.

use tracing::{info, warn};
use uuid::Uuid;

use super::diagnosis::{self, Diagnosis, ExtractionError};
use super::prompts::diagnosis_prompt;
use crate::error::ErrorCode;
use crate::llm::{CompletionGateway, GatewayError};

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("gateway: {0}")]
    Gateway(#[from] GatewayError),
    #[error("extraction: {0}")]
    Extraction(#[from] ExtractionError),
}

impl ErrorCode for AnalyzeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Gateway(e) => e.error_code(),
            Self::Extraction(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Gateway(e) => e.retryable(),
            Self::Extraction(e) => e.retryable(),
        }
    }
}

/// A leaf image as received from the client. Dropped when the request ends.
#[derive(Debug, Clone)]
pub struct LeafImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Run one image through the model and the extractor.
///
/// # Errors
///
/// `Gateway` if the vision call fails, `Extraction` if the reply has no
/// usable JSON.
pub async fn analyze(
    gateway: &dyn CompletionGateway,
    image: &LeafImage,
    language: &str,
) -> Result<Diagnosis, AnalyzeError> {
    let request_id = Uuid::new_v4();
    info!(%request_id, image_bytes = image.bytes.len(), mime = %image.mime_type, %language, "analyze: image received");

    let prompt = diagnosis_prompt(language);
    let raw = gateway
        .complete_vision(&prompt, &image.bytes, &image.mime_type)
        .await?;

    match diagnosis::extract(&raw) {
        Ok(Diagnosis::Leaf(record)) => {
            info!(%request_id, plant = %record.plant_name, disease = %record.disease, "analyze: diagnosis ready");
            Ok(Diagnosis::Leaf(record))
        }
        Ok(Diagnosis::Rejected) => {
            info!(%request_id, "analyze: not a plant leaf");
            Ok(Diagnosis::Rejected)
        }
        Err(e) => {
            warn!(%request_id, error = %e, raw = %raw, "analyze: could not extract diagnosis");
            Err(e.into())
        }
    }
}

#[cfg(test)]
#[path = "analyze_test.rs"]
mod tests;
