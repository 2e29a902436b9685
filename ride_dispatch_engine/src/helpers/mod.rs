//! Pure dispatch logic: the distance and cost model, the ride state table, and the matching planner.
//!
//! Nothing in here touches the database, so the rules can be exercised directly in unit tests.
mod cost_model;
mod dispatch_planner;
mod ride_state;

pub use cost_model::{
    assignment_cost,
    distance,
    effective_speed,
    estimate_fare,
    Cost,
    FARE_PER_DISTANCE,
    INITIAL_FARE,
};
pub use dispatch_planner::{
    plan_assignments,
    CandidateChair,
    DispatchPolicy,
    PlannedAssignment,
    DEFAULT_CHAIR_SPEED,
    DEFAULT_MAX_DISPATCH_RADIUS,
};
pub use ride_state::{
    implicit_transition,
    latest_status,
    occupies_chair,
    validate_transition,
    Actor,
    TransitionError,
    EXPECTED_STATUS_COUNT,
    FORWARD_STATUSES,
};
