use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
    Router,
};
use std::{path::Path, sync::Arc};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;

use crate::{
    forwarder::Forwarder,
    handlers::{
        health_check,
        recipes::{get_all_recipes, get_random_recipe, get_recipe_by_id, vote_recipe},
        submissions::{submit_feedback, submit_image},
    },
    images::ImageUrlResolver,
    middleware::create_middleware_stack,
    rate_limit::{enforce_rate_limit, RateLimiter, DEFAULT_WINDOW},
    service::RecipeService,
};

/// JSON bodies are small; anything larger is rejected before parsing
pub const MAX_JSON_BODY_BYTES: usize = 10 * 1024;
/// Room for a 2 MB image plus multipart framing
pub const MAX_UPLOAD_BODY_BYTES: usize = 3 * 1024 * 1024;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub recipes: RecipeService,
    pub images: ImageUrlResolver,
    pub forwarder: Arc<dyn Forwarder>,
}

impl AppState {
    pub fn new(
        recipes: RecipeService,
        images: ImageUrlResolver,
        forwarder: Arc<dyn Forwarder>,
    ) -> Self {
        Self {
            recipes,
            images,
            forwarder,
        }
    }
}

/// Create the Axum router with all endpoints and middleware
pub fn create_router(state: AppState, images_dir: &Path, allowed_origins: &[String]) -> Router {
    let global_limiter = RateLimiter::new(
        100,
        DEFAULT_WINDOW,
        "Too many requests, please try again later.",
    );
    let feedback_limiter = RateLimiter::new(
        5,
        DEFAULT_WINDOW,
        "Too many feedback submissions, please try again later.",
    );
    let submit_limiter = RateLimiter::new(
        3,
        DEFAULT_WINDOW,
        "Too many submissions, please try again later.",
    );

    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/api/health", get(health_check))
        // Recipe endpoints
        .route("/api/recipes", get(get_all_recipes))
        .route("/api/recipes/vote", patch(vote_recipe))
        .route("/api/recipes/random/:bucket", get(get_random_recipe))
        .route("/api/recipes/:id", get(get_recipe_by_id))
        // Submissions forwarded to the task board
        .route(
            "/api/feedback",
            post(submit_feedback).layer(from_fn_with_state(feedback_limiter, enforce_rate_limit)),
        )
        .route(
            "/api/submit/image",
            put(submit_image).layer(
                ServiceBuilder::new()
                    .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES))
                    .layer(from_fn_with_state(submit_limiter, enforce_rate_limit)),
            ),
        )
        // Recipe images, laid out as {images_dir}/{id}/{imagePath}
        .nest_service("/api/images", ServeDir::new(images_dir))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_JSON_BODY_BYTES))
        .layer(from_fn_with_state(global_limiter, enforce_rate_limit))
        .layer(create_middleware_stack(allowed_origins))
}
