use std::collections::HashSet;

use log::*;

use super::cost_model::{assignment_cost, distance, effective_speed, Cost};
use crate::db_types::{ChairId, Coordinate, Ride, RideId};

pub const DEFAULT_MAX_DISPATCH_RADIUS: i64 = 400;
pub const DEFAULT_CHAIR_SPEED: i64 = 1;

/// Tuning knobs for a matching pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    /// Chairs further than this from the pickup are never dispatched to it. Zero means no limit.
    pub max_dispatch_radius: i64,
    /// Speed assumed for chairs whose model is unknown.
    pub default_speed: i64,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self { max_dispatch_radius: DEFAULT_MAX_DISPATCH_RADIUS, default_speed: DEFAULT_CHAIR_SPEED }
    }
}

impl DispatchPolicy {
    pub fn within_radius(&self, pickup_distance: i64) -> bool {
        self.max_dispatch_radius <= 0 || pickup_distance <= self.max_dispatch_radius
    }
}

/// An active chair with a known position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateChair {
    pub chair_id: ChairId,
    pub location: Coordinate,
    /// The rated speed of the chair's model, if the model is known.
    pub model_speed: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAssignment {
    pub ride_id: RideId,
    pub chair_id: ChairId,
    pub cost: Cost,
}

/// Greedy, speed-weighted assignment of chairs to unmatched rides.
///
/// Rides are served oldest first. Each ride gets the cheapest chair that is not `busy`, has not already been claimed in
/// this plan, and is within the dispatch radius of the pickup. Ties go to the lowest chair id. Rides with no such chair
/// are left out of the plan.
pub fn plan_assignments(
    rides: &[Ride],
    chairs: &[CandidateChair],
    busy: &HashSet<ChairId>,
    policy: &DispatchPolicy,
) -> Vec<PlannedAssignment> {
    let mut queue = rides.iter().filter(|r| r.chair_id.is_none()).collect::<Vec<_>>();
    queue.sort_by_key(|r| (r.created_at, r.id));
    let mut claimed = HashSet::new();
    let mut plan = Vec::new();
    for ride in queue {
        let best = chairs
            .iter()
            .filter(|c| !busy.contains(&c.chair_id) && !claimed.contains(&c.chair_id))
            .filter(|c| policy.within_radius(distance(c.location, ride.pickup)))
            .map(|c| {
                let speed = effective_speed(c.model_speed, policy.default_speed);
                (assignment_cost(c.location, ride.pickup, ride.destination, speed), c.chair_id)
            })
            .min();
        match best {
            Some((cost, chair_id)) => {
                trace!("🚕️ {} -> {chair_id} at cost {cost}", ride.id);
                claimed.insert(chair_id);
                plan.push(PlannedAssignment { ride_id: ride.id, chair_id, cost });
            },
            None => trace!("🚕️ No chair available for {} this pass", ride.id),
        }
    }
    plan
}
