use serde::{Deserialize, Serialize};

/// A catalogue entry as stored in the recipes file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    /// Preparation time in minutes
    pub time: u32,
    pub image_path: String,
    pub image_alt: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    /// Older files carry a single `tags` list, which is read as the public tags
    #[serde(rename = "tags_public", alias = "tags", default)]
    pub tags_public: Vec<String>,
    #[serde(rename = "tags_internal", default)]
    pub tags_internal: Vec<String>,
    #[serde(default)]
    pub upvotes: u64,
    #[serde(default)]
    pub downvotes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<String>,
}

/// A recipe together with the public URLs of its images
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeWithImages {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub image_url: String,
    pub fullsize_url: String,
}

#[cfg(test)]
pub(crate) fn sample_recipe(id: &str, time: u32) -> Recipe {
    Recipe {
        id: id.to_string(),
        title: format!("Recipe {}", id),
        time,
        image_path: "cover.jpg".to_string(),
        image_alt: format!("Photo of recipe {}", id),
        ingredients: vec!["flour".to_string(), "water".to_string()],
        instructions: vec!["Mix".to_string(), "Bake".to_string()],
        tags_public: vec!["vegetarian".to_string()],
        tags_internal: Vec::new(),
        upvotes: 0,
        downvotes: 0,
        submitted_by: None,
    }
}
