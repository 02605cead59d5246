use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::recipe::Recipe;

/// Which counter a vote increments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl FromStr for VoteType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "upvote" => Ok(VoteType::Upvote),
            "downvote" => Ok(VoteType::Downvote),
            other => Err(format!(
                "Invalid voteType '{}', expected 'upvote' or 'downvote'",
                other
            )),
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteType::Upvote => f.write_str("upvote"),
            VoteType::Downvote => f.write_str("downvote"),
        }
    }
}

/// Body of `PATCH /api/recipes/vote`.
/// Fields are optional so that missing values surface as validation errors.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub id: Option<String>,
    pub vote_type: Option<String>,
}

impl VoteRequest {
    /// Validate the request and return the recipe id and vote type.
    /// The id is returned as sent; lookups match it exactly.
    pub fn validate(&self) -> Result<(String, VoteType), String> {
        let id = match self.id.as_deref() {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => return Err("Recipe id is required".to_string()),
        };

        let vote_type = match self.vote_type.as_deref() {
            Some(raw) => raw.parse::<VoteType>()?,
            None => return Err("voteType is required".to_string()),
        };

        Ok((id, vote_type))
    }
}

/// Vote counters returned after a successful vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteCounts {
    pub id: String,
    pub upvotes: u64,
    pub downvotes: u64,
}

impl From<&Recipe> for VoteCounts {
    fn from(recipe: &Recipe) -> Self {
        VoteCounts {
            id: recipe.id.clone(),
            upvotes: recipe.upvotes,
            downvotes: recipe.downvotes,
        }
    }
}
