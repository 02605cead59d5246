// Public image URLs for recipes.
// Images are served from `/api/images/{id}/{imagePath}`; the full-size
// variant shares the name with a `_fullsize` suffix before `.jpg`.

use crate::models::{Recipe, RecipeWithImages};

const IMAGE_ROUTE: &str = "/api/images";
const FULLSIZE_SUFFIX: &str = "_fullsize.jpg";

#[derive(Debug, Clone)]
pub struct ImageUrlResolver {
    base_url: String,
}

impl ImageUrlResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        ImageUrlResolver {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn image_url(&self, id: &str, image_path: &str) -> String {
        format!("{}{}/{}/{}", self.base_url, IMAGE_ROUTE, id, image_path)
    }

    /// Naming convention only: the full-size file is not checked for existence.
    pub fn fullsize_url(&self, id: &str, image_path: &str) -> String {
        self.image_url(id, &fullsize_path(image_path))
    }

    pub fn decorate(&self, recipe: Recipe) -> RecipeWithImages {
        let image_url = self.image_url(&recipe.id, &recipe.image_path);
        let fullsize_url = self.fullsize_url(&recipe.id, &recipe.image_path);
        RecipeWithImages {
            recipe,
            image_url,
            fullsize_url,
        }
    }
}

fn fullsize_path(image_path: &str) -> String {
    match image_path.strip_suffix(".jpg") {
        Some(stem) => format!("{}{}", stem, FULLSIZE_SUFFIX),
        None => image_path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recipe::sample_recipe;

    #[test]
    fn test_image_urls() {
        let resolver = ImageUrlResolver::new("https://food.example.com/");

        assert_eq!(
            resolver.image_url("12", "lasagne.jpg"),
            "https://food.example.com/api/images/12/lasagne.jpg"
        );
        assert_eq!(
            resolver.fullsize_url("12", "lasagne.jpg"),
            "https://food.example.com/api/images/12/lasagne_fullsize.jpg"
        );
    }

    #[test]
    fn test_only_trailing_jpg_is_rewritten() {
        assert_eq!(fullsize_path("my.jpg.dish.jpg"), "my.jpg.dish_fullsize.jpg");
        assert_eq!(fullsize_path("dish.png"), "dish.png");
        assert_eq!(fullsize_path("nested/dir/dish.jpg"), "nested/dir/dish_fullsize.jpg");
    }

    #[test]
    fn test_decorate() {
        let resolver = ImageUrlResolver::new("http://localhost:3000");
        let decorated = resolver.decorate(sample_recipe("5", 25));

        assert_eq!(decorated.recipe.id, "5");
        assert_eq!(decorated.image_url, "http://localhost:3000/api/images/5/cover.jpg");
        assert_eq!(
            decorated.fullsize_url,
            "http://localhost:3000/api/images/5/cover_fullsize.jpg"
        );
    }
}
