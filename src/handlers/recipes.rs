// Recipe handlers
// HTTP handlers for browsing and voting on recipes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::{
    app::AppState,
    error::ApiError,
    extract::ValidJson,
    models::VoteRequest,
    service::Bucket,
};

/// Get all recipes
/// GET /api/recipes
pub async fn get_all_recipes(State(state): State<AppState>) -> impl IntoResponse {
    info!("Fetching all recipes");

    let recipes = state.recipes.list().await;

    info!("Retrieved {} recipes", recipes.len());
    (StatusCode::OK, Json(recipes))
}

/// Get recipe by ID
/// GET /api/recipes/:id
pub async fn get_recipe_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Fetching recipe with id: {}", id);

    let recipe = state.recipes.get_by_id(&id).await?;

    Ok((StatusCode::OK, Json(recipe)))
}

/// Get a random recipe from a time bucket, with its image URLs
/// GET /api/recipes/random/:bucket
pub async fn get_random_recipe(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bucket = Bucket::from_segment(&bucket);
    info!("Fetching random recipe for bucket {:?}", bucket);

    let recipe = state.recipes.random_by_complexity(bucket).await?;

    info!("Picked recipe {} ({} min)", recipe.id, recipe.time);
    Ok((StatusCode::OK, Json(state.images.decorate(recipe))))
}

/// Up- or downvote a recipe
/// PATCH /api/recipes/vote
pub async fn vote_recipe(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<VoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        "Vote request for recipe {:?}: {:?}",
        request.id, request.vote_type
    );

    let counts = state.recipes.vote(request).await?;

    Ok((StatusCode::OK, Json(counts)))
}
