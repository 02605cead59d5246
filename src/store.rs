use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::error::ApiError;
use crate::models::{Recipe, VoteType};

/// Data-access seam between the query layer and wherever recipes live.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Every recipe, in stored order
    async fn all(&self) -> Vec<Recipe>;

    async fn find_by_id(&self, id: &str) -> Option<Recipe>;

    /// Recipes whose `time` lies within `min..=max`, in stored order
    async fn filter_by_time_range(&self, min: u32, max: u32) -> Vec<Recipe>;

    /// Increment one vote counter and persist the collection.
    /// Returns the updated recipe.
    async fn record_vote(&self, id: &str, vote_type: VoteType) -> Result<Recipe, ApiError>;
}

/// Recipe collection held in memory and mirrored to a single JSON file.
///
/// Votes take the write lock for the whole increment-and-rewrite sequence,
/// so concurrent votes are applied one after another and none is lost.
/// A failed rewrite leaves the incremented counter in memory.
pub struct JsonFileStore {
    path: PathBuf,
    recipes: RwLock<Vec<Recipe>>,
}

impl JsonFileStore {
    /// Read the whole collection from `path`.
    /// A missing or malformed file, or duplicate ids, is an error.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        info!("Loading recipes from {}", path.display());

        let raw = tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read recipe file {}", path.display()))?;

        let recipes: Vec<Recipe> = serde_json::from_slice(&raw)
            .with_context(|| format!("recipe file {} is not a valid recipe list", path.display()))?;

        let mut seen = HashSet::with_capacity(recipes.len());
        for recipe in &recipes {
            if !seen.insert(recipe.id.as_str()) {
                bail!(
                    "recipe file {} contains duplicate id '{}'",
                    path.display(),
                    recipe.id
                );
            }
        }

        info!("Loaded {} recipes", recipes.len());
        Ok(JsonFileStore {
            path,
            recipes: RwLock::new(recipes),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn len(&self) -> usize {
        self.recipes.read().await.len()
    }

    /// Rewrite the file from `recipes`: write a sibling temp file, then rename it over the original.
    async fn persist(&self, recipes: &[Recipe]) -> Result<(), ApiError> {
        let serialized = serde_json::to_vec_pretty(recipes)
            .map_err(|e| ApiError::persistence(format!("failed to serialize recipes: {}", e)))?;

        let tmp_path = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp_path, &serialized).await.map_err(|e| {
            error!("Failed to write {}: {}", tmp_path.display(), e);
            ApiError::persistence(format!("failed to write recipe file: {}", e))
        })?;

        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            error!(
                "Failed to replace {} with {}: {}",
                self.path.display(),
                tmp_path.display(),
                e
            );
            // Best effort; the original file is untouched either way
            if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
                error!("Failed to remove {}: {}", tmp_path.display(), cleanup);
            }
            return Err(ApiError::persistence(format!(
                "failed to replace recipe file: {}",
                e
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl RecipeRepository for JsonFileStore {
    async fn all(&self) -> Vec<Recipe> {
        self.recipes.read().await.clone()
    }

    async fn find_by_id(&self, id: &str) -> Option<Recipe> {
        self.recipes
            .read()
            .await
            .iter()
            .find(|recipe| recipe.id == id)
            .cloned()
    }

    async fn filter_by_time_range(&self, min: u32, max: u32) -> Vec<Recipe> {
        self.recipes
            .read()
            .await
            .iter()
            .filter(|recipe| (min..=max).contains(&recipe.time))
            .cloned()
            .collect()
    }

    async fn record_vote(&self, id: &str, vote_type: VoteType) -> Result<Recipe, ApiError> {
        let mut recipes = self.recipes.write().await;

        let recipe = recipes
            .iter_mut()
            .find(|recipe| recipe.id == id)
            .ok_or_else(|| ApiError::not_found(format!("Recipe with id {}", id)))?;

        match vote_type {
            VoteType::Upvote => recipe.upvotes = recipe.upvotes.saturating_add(1),
            VoteType::Downvote => recipe.downvotes = recipe.downvotes.saturating_add(1),
        }
        let updated = recipe.clone();

        self.persist(&recipes).await?;

        info!(
            "Recorded {} for recipe {} (up: {}, down: {})",
            vote_type, updated.id, updated.upvotes, updated.downvotes
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recipe::sample_recipe;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn store_with(recipes: &[Recipe]) -> (TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        std::fs::write(&path, serde_json::to_vec_pretty(recipes).unwrap()).unwrap();
        let store = JsonFileStore::load(&path).await.expect("store should load");
        (dir, store)
    }

    fn read_back(path: &Path) -> Vec<Recipe> {
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_load_preserves_order() {
        let (_dir, store) = store_with(&[
            sample_recipe("3", 10),
            sample_recipe("1", 50),
            sample_recipe("2", 30),
        ])
        .await;

        let ids: Vec<String> = store.all().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = JsonFileStore::load(dir.path().join("nope.json")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        std::fs::write(&path, b"{\"not\": \"a list\"}").unwrap();
        assert!(JsonFileStore::load(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_load_duplicate_ids_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        let recipes = vec![sample_recipe("1", 10), sample_recipe("1", 20)];
        std::fs::write(&path, serde_json::to_vec(&recipes).unwrap()).unwrap();

        let err = JsonFileStore::load(&path).await.err().expect("duplicate ids must fail");
        assert!(err.to_string().contains("duplicate id '1'"));
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let (_dir, store) = store_with(&[sample_recipe("1", 10), sample_recipe("2", 30)]).await;

        for id in ["1", "2"] {
            assert_eq!(store.find_by_id(id).await.map(|r| r.id), Some(id.to_string()));
        }
        assert!(store.find_by_id("999").await.is_none());
    }

    #[tokio::test]
    async fn test_filter_bounds_are_inclusive() {
        let (_dir, store) = store_with(&[
            sample_recipe("a", 20),
            sample_recipe("b", 21),
            sample_recipe("c", 45),
            sample_recipe("d", 46),
        ])
        .await;

        let ids: Vec<String> = store
            .filter_by_time_range(21, 45)
            .await
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert!(store.filter_by_time_range(100, u32::MAX).await.is_empty());
    }

    #[tokio::test]
    async fn test_upvote_increments_and_persists() {
        let (_dir, store) = store_with(&[sample_recipe("1", 10), sample_recipe("2", 30)]).await;

        let updated = store.record_vote("1", VoteType::Upvote).await.unwrap();
        assert_eq!(updated.upvotes, 1);
        assert_eq!(updated.downvotes, 0);

        let on_disk = read_back(store.path());
        assert_eq!(on_disk, store.all().await);
        assert_eq!(on_disk[0].upvotes, 1);
        assert_eq!(on_disk[1].upvotes, 0);
    }

    #[tokio::test]
    async fn test_downvote_leaves_upvotes_alone() {
        let mut recipe = sample_recipe("1", 10);
        recipe.upvotes = 4;
        recipe.downvotes = 2;
        let (_dir, store) = store_with(&[recipe]).await;

        let updated = store.record_vote("1", VoteType::Downvote).await.unwrap();
        assert_eq!(updated.upvotes, 4);
        assert_eq!(updated.downvotes, 3);
    }

    #[tokio::test]
    async fn test_vote_on_unknown_id_leaves_file_untouched() {
        let (_dir, store) = store_with(&[sample_recipe("1", 10)]).await;
        let before = std::fs::read(store.path()).unwrap();

        let err = store.record_vote("999", VoteType::Upvote).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(std::fs::read(store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_in_memory_vote() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        std::fs::create_dir(&data_dir).unwrap();
        let path = data_dir.join("recipes.json");
        std::fs::write(&path, serde_json::to_vec(&vec![sample_recipe("1", 10)]).unwrap()).unwrap();
        let store = JsonFileStore::load(&path).await.unwrap();

        std::fs::remove_dir_all(&data_dir).unwrap();

        let err = store.record_vote("1", VoteType::Upvote).await.unwrap_err();
        assert!(matches!(err, ApiError::Persistence(_)));
        assert_eq!(store.find_by_id("1").await.unwrap().upvotes, 1);
    }

    #[tokio::test]
    async fn test_failed_rename_removes_temp_file() {
        let (_dir, store) = store_with(&[sample_recipe("1", 10)]).await;
        let path = store.path().to_path_buf();

        // A non-empty directory where the file was makes the rename fail
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();

        let err = store.record_vote("1", VoteType::Upvote).await.unwrap_err();
        assert!(matches!(err, ApiError::Persistence(_)));
        assert!(!path.with_extension("json.tmp").exists());
        assert!(path.join("keep").exists());
    }

    #[tokio::test]
    async fn test_concurrent_votes_are_not_lost() {
        let (_dir, store) = store_with(&[sample_recipe("1", 10)]).await;
        let store = Arc::new(store);

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let vote = if i % 2 == 0 { VoteType::Upvote } else { VoteType::Downvote };
                    store.record_vote("1", vote).await
                })
            })
            .collect();

        for handle in handles {
            tokio_test::assert_ok!(handle.await.unwrap());
        }

        let recipe = store.find_by_id("1").await.unwrap();
        assert_eq!(recipe.upvotes, 10);
        assert_eq!(recipe.downvotes, 10);
        assert_eq!(read_back(store.path())[0], recipe);
    }
}
