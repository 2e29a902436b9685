use std::fmt::Debug;

use log::*;

use crate::{
    events::{ChairEvent, NotificationHub},
    helpers::DispatchPolicy,
    traits::{DispatchError, DispatchManagement, DispatchOutcome},
};

/// `MatchingApi` assigns waiting rides to free chairs.
///
/// Assignments are committed by the backend in a single transaction. Only once that transaction has committed is each
/// new assignment announced to its chair through the notification hub.
pub struct MatchingApi<B> {
    db: B,
    hub: NotificationHub,
    policy: DispatchPolicy,
}

impl<B> Debug for MatchingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MatchingApi ({:?})", self.policy)
    }
}

impl<B> MatchingApi<B>
where B: DispatchManagement
{
    pub fn new(db: B, hub: NotificationHub, policy: DispatchPolicy) -> Self {
        Self { db, hub, policy }
    }

    pub fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }

    /// Runs a single matching pass and returns the assignments it committed.
    pub async fn run_matching_pass(&self) -> Result<Vec<DispatchOutcome>, DispatchError> {
        let outcomes = self.db.run_matching_pass(&self.policy).await?;
        for outcome in &outcomes {
            info!("🚕️ {} assigned to {} at cost {}", outcome.ride_id, outcome.chair_id, outcome.cost);
            self.hub.publish(outcome.chair_id, ChairEvent::from(&outcome.latest_status));
        }
        Ok(outcomes)
    }
}
