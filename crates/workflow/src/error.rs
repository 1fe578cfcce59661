// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors the workflow engine raises (spec.md §4.5, §7). Parser errors are
//! structural; interpreter errors surface as ASL-style `States.*` error
//! codes carried in [`WorkflowError::States`] so a caller can match on them
//! the way a real state machine's `Catch` blocks do.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("state machine {0:?} not found")]
    NotFound(String),

    #[error("state machine {0:?} already exists")]
    AlreadyExists(String),

    #[error("malformed state machine definition: {0}")]
    Parse(String),

    #[error("execution {0:?} not found")]
    ExecutionNotFound(String),

    #[error("no compute bridge configured for task resource {0:?}")]
    NoComputeBridge(String),

    #[error("{error}: {cause}")]
    States { error: String, cause: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl WorkflowError {
    /// The ASL error code this failure would present as at `$.Error`,
    /// e.g. `States.TaskFailed`, `States.NoChoiceMatched`.
    pub fn error_code(&self) -> String {
        match self {
            WorkflowError::States { error, .. } => error.clone(),
            WorkflowError::Json(_) => "States.Runtime".to_string(),
            _ => "States.Runtime".to_string(),
        }
    }

    pub fn cause(&self) -> String {
        match self {
            WorkflowError::States { cause, .. } => cause.clone(),
            other => other.to_string(),
        }
    }

    pub fn task_failed(cause: impl Into<String>) -> Self {
        WorkflowError::States { error: "States.TaskFailed".to_string(), cause: cause.into() }
    }

    pub fn no_choice_matched() -> Self {
        WorkflowError::States {
            error: "States.NoChoiceMatched".to_string(),
            cause: "no choice rule matched and no Default was given".to_string(),
        }
    }

    pub fn branch_failed(cause: impl Into<String>) -> Self {
        WorkflowError::States { error: "States.BranchFailed".to_string(), cause: cause.into() }
    }

    pub fn timeout(cause: impl Into<String>) -> Self {
        WorkflowError::States { error: "States.Timeout".to_string(), cause: cause.into() }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
