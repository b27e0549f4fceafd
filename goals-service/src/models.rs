//! Goal entity and request/response bodies

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A persisted goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// Store-assigned identifier
    pub id: String,
    /// Text as supplied by the caller
    pub text: String,
}

/// Create goal request
#[derive(Debug, Default, Deserialize)]
pub struct CreateGoalRequest {
    pub text: Option<String>,
}

impl CreateGoalRequest {
    /// Validate the request and return the text to persist
    ///
    /// The text is returned untrimmed; trimming only decides whether it is blank.
    pub fn validate(self) -> Result<String> {
        match self.text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(Error::InvalidInput),
        }
    }
}

/// Create goal response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGoalResponse {
    pub message: String,
    pub goal: Goal,
}

impl CreateGoalResponse {
    pub fn saved(goal: Goal) -> Self {
        Self {
            message: "Goal saved".to_string(),
            goal,
        }
    }
}

/// List goals response
#[derive(Debug, Serialize, Deserialize)]
pub struct ListGoalsResponse {
    pub goals: Vec<Goal>,
}
