// Library root for the recipe API

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod forwarder;
pub mod handlers;
pub mod images;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use app::{create_router, AppState};
pub use error::ApiError;
pub use models::{Recipe, VoteRequest, VoteType};
pub use service::{Bucket, RecipeService};
pub use store::{JsonFileStore, RecipeRepository};
