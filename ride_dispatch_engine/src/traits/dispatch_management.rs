use thiserror::Error;

use crate::{helpers::DispatchPolicy, traits::DispatchOutcome};

#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Ride {0} was assigned by another pass before this one could commit")]
    AssignmentConflict(i64),
}

impl From<sqlx::Error> for DispatchError {
    fn from(e: sqlx::Error) -> Self {
        DispatchError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait DispatchManagement {
    /// Runs one matching pass.
    ///
    /// Implementations must load the unmatched rides, the eligible chairs and the chairs' current rides, plan the
    /// assignments with [`crate::helpers::plan_assignments`], and write them, all inside a single write-locked
    /// transaction. If any write fails, nothing is committed.
    ///
    /// Returns the assignments that were committed, together with each ride's latest status.
    async fn run_matching_pass(&self, policy: &DispatchPolicy) -> Result<Vec<DispatchOutcome>, DispatchError>;
}
