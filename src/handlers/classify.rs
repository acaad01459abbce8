use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};

use crate::AppState;
use crate::api::error::AppError;
use crate::models::Prediction;
use crate::utils::validation::{sanitize_filename, validate_image};

/// Sequences one classification request: extract the upload, persist it to
/// scratch storage, run the classifier on the stored path, and reply. The
/// scratch file is removed when its guard goes out of scope, on success and
/// on every error return alike.
#[utoipa::path(
    post,
    path = "/classify",
    request_body(content = Multipart, description = "Image upload (field name: image)"),
    responses(
        (status = 200, description = "Classification result", body = Prediction),
        (status = 400, description = "Missing or malformed image upload"),
        (status = 500, description = "Storage or classification failure")
    ),
    tag = "classify"
)]
pub async fn classify_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Prediction>, AppError> {
    let mut multipart = multipart
        .map_err(|e| AppError::BadRequest(format!("Expected a multipart form upload: {}", e)))?;

    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart request: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let original_filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(|s| s.to_string());

        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Could not read image field: {}", e)))?;

        if state.config.require_image_content {
            validate_image(&content, content_type.as_deref())
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
        }

        upload = Some((sanitize_filename(&original_filename), content.to_vec()));
        break;
    }

    let (filename, content) =
        upload.ok_or_else(|| AppError::BadRequest("No image file found in request".to_string()))?;

    let scratch_file = state.scratch.acquire(&filename, &content).await?;

    let prediction = state.classifier.classify(scratch_file.path()).await?;

    Ok(Json(prediction))
}
