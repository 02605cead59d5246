use serde::Deserialize;

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_FEEDBACK_CHARS: usize = 1000;
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Body of `POST /api/feedback`
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub name: Option<String>,
    pub feedback: Option<String>,
}

/// Feedback that passed validation and can be forwarded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackSubmission {
    pub name: String,
    pub feedback: String,
}

impl FeedbackRequest {
    /// Validate the feedback request
    pub fn validate(self) -> Result<FeedbackSubmission, String> {
        let (name, feedback) = match (self.name, self.feedback) {
            (Some(name), Some(feedback)) if !name.is_empty() && !feedback.is_empty() => {
                (name, feedback)
            }
            _ => return Err("Name and feedback are required.".to_string()),
        };

        if name.chars().count() > MAX_NAME_CHARS {
            return Err(format!("Name must be {} characters or fewer.", MAX_NAME_CHARS));
        }

        if feedback.chars().count() > MAX_FEEDBACK_CHARS {
            return Err(format!(
                "Feedback must be {} characters or fewer.",
                MAX_FEEDBACK_CHARS
            ));
        }

        Ok(FeedbackSubmission { name, feedback })
    }
}

/// An uploaded image for a recipe, checked for id format, type and size
#[derive(Debug, Clone)]
pub struct ImageSubmission {
    pub recipe_id: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageSubmission {
    pub fn new(
        recipe_id: Option<String>,
        file_name: Option<String>,
        content_type: Option<String>,
        bytes: Option<Vec<u8>>,
    ) -> Result<Self, String> {
        let recipe_id = recipe_id.unwrap_or_default();
        if !is_numeric_id(&recipe_id) {
            return Err("Missing or invalid recipeId".to_string());
        }

        let bytes = bytes.ok_or_else(|| "No image file received".to_string())?;

        let content_type = content_type.unwrap_or_default();
        if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
            return Err("Only JPEG, PNG and WebP images are allowed".to_string());
        }

        if bytes.len() > MAX_IMAGE_BYTES {
            return Err("Image must be 2 MB or smaller".to_string());
        }

        Ok(ImageSubmission {
            recipe_id,
            file_name: file_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| "upload".to_string()),
            content_type,
            bytes,
        })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

fn is_numeric_id(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
