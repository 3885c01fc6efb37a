//! Handler for `POST /generate`.
//!
//! Reads the multipart form, validates it, submits one vendor job, and holds
//! the request open until the job reaches a terminal status.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use clipforge_core::{GenerationRequest, ImagePayload, ImageUpload};
use clipforge_vendor::poll_until_complete;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Successful generation result.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub video_url: String,
}

/// Raw form fields, before validation.
struct GenerateForm {
    prompt: Option<String>,
    duration: Option<String>,
    image: ImageUpload,
}

impl GenerateForm {
    fn empty() -> Self {
        Self {
            prompt: None,
            duration: None,
            image: ImageUpload::Missing,
        }
    }
}

/// POST /generate
///
/// Fields: `prompt` (text), `duration` (`15` or `25`), `image` (file).
/// Responds with `{"video_url": ...}` once the vendor reports completion.
pub async fn generate(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<GenerateResponse>> {
    let form = read_form(multipart).await?;

    let request = GenerationRequest::from_form(
        form.prompt.as_deref(),
        form.duration.as_deref(),
        form.image,
        state.provider.requires_prompt(),
    )?;

    tracing::info!(
        provider = state.provider.name(),
        duration_secs = request.duration.as_secs(),
        image_bytes = request.image.size(),
        image_mime = %request.image.mime_type,
        "Submitting video generation job"
    );

    let job_id = state.provider.create_job(&request).await?;
    tracing::info!(job_id = %job_id, "Video generation job created");

    let video_url =
        poll_until_complete(state.provider.as_ref(), &job_id, &state.config.poll).await?;

    Ok(Json(GenerateResponse { video_url }))
}

/// Collect the known fields. A body that is not multipart reads as an empty
/// form so that validation reports the first missing field. A text field
/// whose body cannot be read rejects the request outright.
async fn read_form(multipart: Result<Multipart, MultipartRejection>) -> AppResult<GenerateForm> {
    let mut form = GenerateForm::empty();

    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Request body is not multipart");
            return Ok(form);
        }
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                // Truncated or oversized body. Whatever arrived intact is kept.
                tracing::warn!(error = %err, "Failed to read multipart body");
                if matches!(form.image, ImageUpload::Missing) {
                    form.image = ImageUpload::Unreadable;
                }
                break;
            }
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(text_field @ ("prompt" | "duration")) => {
                let value = match field.text().await {
                    Ok(value) => value,
                    Err(err) => {
                        tracing::warn!(field = text_field, error = %err, "Failed to read form field");
                        return Err(AppError::BadRequest(format!(
                            "Failed to read {text_field} field"
                        )));
                    }
                };
                if text_field == "prompt" {
                    form.prompt = Some(value);
                } else {
                    form.duration = Some(value);
                }
            }
            Some("image") if matches!(form.image, ImageUpload::Missing) => {
                let content_type = field.content_type().map(str::to_string);
                match field.bytes().await {
                    Ok(bytes) if bytes.is_empty() => {}
                    Ok(bytes) => {
                        form.image = ImageUpload::Received(ImagePayload::new(
                            bytes.to_vec(),
                            content_type.as_deref(),
                        ));
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "Failed to read image upload");
                        form.image = ImageUpload::Unreadable;
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    Ok(form)
}
