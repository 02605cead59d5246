// Submission handlers
// Feedback and image uploads, relayed to the task board

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::info;

use crate::{
    app::AppState,
    error::ApiError,
    extract::ValidJson,
    models::{FeedbackRequest, ImageSubmission},
};

/// Forward user feedback
/// POST /api/feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<FeedbackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let submission = request.validate().map_err(ApiError::Validation)?;
    info!("Forwarding feedback from: {}", submission.name);

    state.forwarder.forward_feedback(&submission).await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Feedback has been forwarded successfully" })),
    ))
}

/// Submit an image for a recipe
/// PUT /api/submit/image (multipart: `recipeId`, `image`)
pub async fn submit_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::validation(e.body_text()))?;

    let mut recipe_id = None;
    let mut file_name = None;
    let mut content_type = None;
    let mut bytes = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "recipeId" => recipe_id = Some(field.text().await.map_err(multipart_error)?),
            "image" => {
                file_name = field.file_name().map(str::to_string);
                content_type = field.content_type().map(str::to_string);
                bytes = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
            }
            _ => {}
        }
    }

    let submission = ImageSubmission::new(recipe_id, file_name, content_type, bytes)
        .map_err(ApiError::Validation)?;
    info!(
        "Submitting image for recipe {} ({}, {} bytes)",
        submission.recipe_id,
        submission.content_type,
        submission.size()
    );

    state.forwarder.submit_image(&submission).await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Image submitted for review" })),
    ))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::validation("Image must be 2 MB or smaller")
    } else {
        ApiError::validation(err.body_text())
    }
}
