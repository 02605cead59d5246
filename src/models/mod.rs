// Models module

pub mod recipe;
pub mod submission;
pub mod vote;

// Re-export commonly used types
pub use recipe::{Recipe, RecipeWithImages};
pub use submission::{FeedbackRequest, FeedbackSubmission, ImageSubmission};
pub use vote::{VoteCounts, VoteRequest, VoteType};
