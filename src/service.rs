use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    error::ApiError,
    models::{Recipe, VoteCounts, VoteRequest},
    store::RecipeRepository,
};

/// Named preparation-time categories for random picks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// 0 to 20 minutes
    Quick,
    /// 21 to 45 minutes
    Ordinary,
    /// 46 minutes and up
    Extensive,
}

impl Bucket {
    /// `quick` and `ordinary` name their buckets; any other value means extensive
    pub fn from_segment(segment: &str) -> Self {
        match segment {
            "quick" => Bucket::Quick,
            "ordinary" => Bucket::Ordinary,
            _ => Bucket::Extensive,
        }
    }

    /// Inclusive minute bounds
    pub fn time_range(self) -> (u32, u32) {
        match self {
            Bucket::Quick => (0, 20),
            Bucket::Ordinary => (21, 45),
            Bucket::Extensive => (46, u32::MAX),
        }
    }
}

/// Read and vote operations over any recipe repository
#[derive(Clone)]
pub struct RecipeService {
    repo: Arc<dyn RecipeRepository>,
}

impl RecipeService {
    pub fn new(repo: Arc<dyn RecipeRepository>) -> Self {
        RecipeService { repo }
    }

    pub async fn list(&self) -> Vec<Recipe> {
        self.repo.all().await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Recipe, ApiError> {
        self.repo
            .find_by_id(id)
            .await
            .ok_or_else(|| ApiError::not_found(format!("Recipe with id {}", id)))
    }

    /// Pick one recipe uniformly at random from the bucket's time range
    pub async fn random_by_complexity(&self, bucket: Bucket) -> Result<Recipe, ApiError> {
        let (min, max) = bucket.time_range();
        let candidates = self.repo.filter_by_time_range(min, max).await;
        debug!("{} recipes match bucket {:?}", candidates.len(), bucket);

        candidates
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("Recipe for bucket {:?}", bucket)))
    }

    /// Validate a vote request and apply it
    pub async fn vote(&self, request: VoteRequest) -> Result<VoteCounts, ApiError> {
        let (id, vote_type) = request.validate().map_err(ApiError::Validation)?;

        let recipe = self.repo.record_vote(&id, vote_type).await?;

        info!("Vote '{}' applied to recipe {}", vote_type, id);
        Ok(VoteCounts::from(&recipe))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recipe::sample_recipe;
    use crate::store::JsonFileStore;
    use tempfile::TempDir;

    async fn service_with(recipes: &[Recipe]) -> (TempDir, RecipeService) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        std::fs::write(&path, serde_json::to_vec(recipes).unwrap()).unwrap();
        let store = JsonFileStore::load(&path).await.unwrap();
        (dir, RecipeService::new(Arc::new(store)))
    }

    fn vote_request(id: Option<&str>, vote_type: Option<&str>) -> VoteRequest {
        VoteRequest {
            id: id.map(str::to_string),
            vote_type: vote_type.map(str::to_string),
        }
    }

    fn mixed_catalogue() -> Vec<Recipe> {
        [0, 5, 20, 21, 30, 45, 46, 90, 240]
            .iter()
            .enumerate()
            .map(|(i, time)| sample_recipe(&(i + 1).to_string(), *time))
            .collect()
    }

    #[test]
    fn test_bucket_parsing() {
        assert_eq!(Bucket::from_segment("quick"), Bucket::Quick);
        assert_eq!(Bucket::from_segment("ordinary"), Bucket::Ordinary);
        assert_eq!(Bucket::from_segment("extensive"), Bucket::Extensive);
        assert_eq!(Bucket::from_segment("whatever"), Bucket::Extensive);
        assert_eq!(Bucket::from_segment("Quick"), Bucket::Extensive);
    }

    #[tokio::test]
    async fn test_get_by_id_returns_requested_recipe() {
        let (_dir, service) = service_with(&mixed_catalogue()).await;

        for recipe in service.list().await {
            let found = service.get_by_id(&recipe.id).await.unwrap();
            assert_eq!(found.id, recipe.id);
        }
        assert!(matches!(
            service.get_by_id("999").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_random_stays_within_bucket() {
        let (_dir, service) = service_with(&mixed_catalogue()).await;

        for _ in 0..50 {
            let quick = service.random_by_complexity(Bucket::Quick).await.unwrap();
            assert!(quick.time <= 20);

            let ordinary = service.random_by_complexity(Bucket::Ordinary).await.unwrap();
            assert!((21..=45).contains(&ordinary.time));

            let extensive = service.random_by_complexity(Bucket::Extensive).await.unwrap();
            assert!(extensive.time >= 46);
        }
    }

    #[tokio::test]
    async fn test_random_sole_match() {
        let (_dir, service) = service_with(&[sample_recipe("1", 15)]).await;

        let recipe = service.random_by_complexity(Bucket::Quick).await.unwrap();
        assert_eq!(recipe.id, "1");
    }

    #[tokio::test]
    async fn test_random_empty_bucket_is_not_found() {
        let (_dir, service) = service_with(&[sample_recipe("1", 15)]).await;

        let result = service.random_by_complexity(Bucket::Extensive).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_vote_counts() {
        let (_dir, service) = service_with(&[sample_recipe("1", 15)]).await;

        let counts = service.vote(vote_request(Some("1"), Some("upvote"))).await.unwrap();
        assert_eq!(
            counts,
            VoteCounts {
                id: "1".to_string(),
                upvotes: 1,
                downvotes: 0
            }
        );

        let counts = service.vote(vote_request(Some("1"), Some("downvote"))).await.unwrap();
        assert_eq!((counts.upvotes, counts.downvotes), (1, 1));
    }

    #[tokio::test]
    async fn test_invalid_vote_type_changes_nothing() {
        let (_dir, service) = service_with(&[sample_recipe("1", 15)]).await;

        let result = service.vote(vote_request(Some("1"), Some("superlike"))).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));

        let recipe = service.get_by_id("1").await.unwrap();
        assert_eq!((recipe.upvotes, recipe.downvotes), (0, 0));
    }

    #[tokio::test]
    async fn test_vote_unknown_id() {
        let (_dir, service) = service_with(&[sample_recipe("1", 15)]).await;

        let result = service.vote(vote_request(Some("999"), Some("upvote"))).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
