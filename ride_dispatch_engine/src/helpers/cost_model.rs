use std::{cmp::Ordering, fmt::Display};

use dispatch_common::Fare;

use crate::db_types::Coordinate;

pub const INITIAL_FARE: i64 = 500;
pub const FARE_PER_DISTANCE: i64 = 100;

/// Manhattan distance between two grid positions.
pub fn distance(a: Coordinate, b: Coordinate) -> i64 {
    (a.latitude - b.latitude).abs() + (a.longitude - b.longitude).abs()
}

/// The speed used to score a chair. Unknown models, or models with a nonsensical speed, fall back to the default.
pub fn effective_speed(model_speed: Option<i64>, default_speed: i64) -> i64 {
    match model_speed {
        Some(speed) if speed > 0 => speed,
        _ => default_speed.max(1),
    }
}

/// Scores a chair at `chair` against a ride from `pickup` to `destination`.
pub fn assignment_cost(chair: Coordinate, pickup: Coordinate, destination: Coordinate, speed: i64) -> Cost {
    Cost::new(distance(chair, pickup) + distance(chair, destination), speed)
}

pub fn estimate_fare(pickup: Coordinate, destination: Coordinate) -> Fare {
    Fare::from(INITIAL_FARE) + Fare::from(FARE_PER_DISTANCE) * distance(pickup, destination)
}

//--------------------------------------        Cost         ---------------------------------------------------------
/// The cost of an assignment, `distance / speed`, held as an exact fraction.
///
/// Costs are compared by cross-multiplication, so two chairs with the same travel time always tie.
#[derive(Debug, Clone, Copy)]
pub struct Cost {
    distance: i64,
    speed: i64,
}

impl Cost {
    pub fn new(distance: i64, speed: i64) -> Self {
        Self { distance, speed: speed.max(1) }
    }

    pub fn distance(&self) -> i64 {
        self.distance
    }

    pub fn speed(&self) -> i64 {
        self.speed
    }

    /// Lossy view, for logs and reports only.
    pub fn as_f64(&self) -> f64 {
        self.distance as f64 / self.speed as f64
    }
}

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = i128::from(self.distance) * i128::from(other.speed);
        let rhs = i128::from(other.distance) * i128::from(self.speed);
        lhs.cmp(&rhs)
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({:.2})", self.distance, self.speed, self.as_f64())
    }
}
