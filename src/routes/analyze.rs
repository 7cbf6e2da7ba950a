//! `POST /analyze` — multipart leaf image → diagnosis.

use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::error::{ApiError, ErrorBody};
use crate::services::analyze::{self as analyze_svc, LeafImage};
use crate::services::diagnosis::Diagnosis;
use crate::services::prompts::resolve_language;
use crate::state::AppState;

const NO_IMAGE: &str = "No image file uploaded";
const NOT_A_LEAF: &str = "Not a plant leaf image";
const FALLBACK_MIME: &str = "image/jpeg";

pub async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let multipart = multipart.map_err(|rejection| {
        warn!(error = %rejection, "analyze: not a multipart request");
        ApiError::Validation(NO_IMAGE.into())
    })?;

    let (image, language) = read_form(multipart).await?;
    let image = image.ok_or_else(|| ApiError::Validation(NO_IMAGE.into()))?;
    let language = resolve_language(language.as_deref());

    match analyze_svc::analyze(state.gateway.as_ref(), &image, language).await? {
        Diagnosis::Leaf(record) => Ok((StatusCode::OK, Json(record)).into_response()),
        Diagnosis::Rejected => Ok((StatusCode::CONFLICT, Json(ErrorBody { error: NOT_A_LEAF.into() })).into_response()),
    }
}

/// Pull the `image` file and optional `language` field. A field that fails
/// to read, or an empty file, leaves the image unset. Exceeding the body
/// limit is the one read failure reported as its own error.
async fn read_form(mut multipart: Multipart) -> Result<(Option<LeafImage>, Option<String>), ApiError> {
    let mut image = None;
    let mut language = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                check_size(&e)?;
                warn!(error = %e, "analyze: multipart read failed");
                break;
            }
        };

        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" if image.is_none() => {
                let mime_type = mime_for(field.content_type(), field.file_name());
                match field.bytes().await {
                    Ok(bytes) if !bytes.is_empty() => image = Some(LeafImage { bytes: bytes.to_vec(), mime_type }),
                    Ok(_) => {}
                    Err(e) => {
                        check_size(&e)?;
                        warn!(error = %e, "analyze: failed to read image bytes");
                    }
                }
            }
            "language" => language = field.text().await.ok(),
            _ => {}
        }
    }

    Ok((image, language))
}

fn check_size(err: &MultipartError) -> Result<(), ApiError> {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return Err(ApiError::PayloadTooLarge(err.body_text()));
    }
    Ok(())
}

/// Part content type, else a guess from the filename extension.
pub(crate) fn mime_for(content_type: Option<&str>, file_name: Option<&str>) -> String {
    if let Some(ct) = content_type.map(str::trim).filter(|ct| ct.starts_with("image/")) {
        return ct.to_string();
    }
    let ext = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    let guessed = match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => FALLBACK_MIME,
    };
    guessed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_prefers_image_content_type() {
        assert_eq!(mime_for(Some("image/png"), Some("leaf.jpg")), "image/png");
    }

    #[test]
    fn mime_guesses_from_extension() {
        assert_eq!(mime_for(None, Some("leaf.WEBP")), "image/webp");
        assert_eq!(mime_for(Some("application/octet-stream"), Some("leaf.heic")), "image/heic");
    }

    #[test]
    fn mime_falls_back_to_jpeg() {
        assert_eq!(mime_for(None, None), "image/jpeg");
        assert_eq!(mime_for(None, Some("leaf")), "image/jpeg");
    }
}
