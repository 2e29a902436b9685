use chrono::{DateTime, Utc};
use dispatch_common::Fare;
use ride_dispatch_engine::db_types::{Coordinate, RideId, RideStatusType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChairActivityRequest {
    pub is_active: bool,
}

/// Timestamps go over the wire as milliseconds since the Unix epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinateResponse {
    pub recorded_at: i64,
}

impl CoordinateResponse {
    pub fn new(recorded_at: DateTime<Utc>) -> Self {
        Self { recorded_at: recorded_at.timestamp_millis() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideStatusRequest {
    pub status: RideStatusType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideRequest {
    pub pickup_coordinate: Coordinate,
    pub destination_coordinate: Coordinate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideRequestResponse {
    pub ride_id: RideId,
    pub fare: Fare,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub evaluation: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub completed_at: i64,
}

impl EvaluationResponse {
    pub fn new(completed_at: DateTime<Utc>) -> Self {
        Self { completed_at: completed_at.timestamp_millis() }
    }
}
