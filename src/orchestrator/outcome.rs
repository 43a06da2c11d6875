//! Validate-procedure outcome normalization.
//!
//! A validate procedure can signal an unusable session several ways: by
//! returning `false`, or by failing with an error (its own, or one bubbled
//! up from a nested driver call). All of them collapse into one tagged
//! outcome so the orchestrator has a single failure edge to reason about.

/// Normalized result of running a validate procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateOutcome {
    Ok,
    Failed(String),
}

impl ValidateOutcome {
    pub fn from_result(result: anyhow::Result<bool>) -> Self {
        match result {
            Ok(true) => ValidateOutcome::Ok,
            Ok(false) => ValidateOutcome::Failed("validate returned false".to_string()),
            Err(err) => ValidateOutcome::Failed(format!("validate failed: {err:#}")),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ValidateOutcome::Failed(_))
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            ValidateOutcome::Ok => None,
            ValidateOutcome::Failed(reason) => Some(reason),
        }
    }
}
