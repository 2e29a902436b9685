//! Data types stored in, and read back from, the dispatch database.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use dispatch_common::Fare;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row, Type};
use thiserror::Error;

macro_rules! db_id {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", $label, self.0)
            }
        }

        impl $name {
            pub fn value(&self) -> i64 {
                self.0
            }
        }
    };
}

db_id!(RideId, "ride");
db_id!(ChairId, "chair");
db_id!(UserId, "user");

//--------------------------------------     Coordinate      ---------------------------------------------------------
/// A position on the dispatch grid. Both axes are integer grid units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: i64,
    pub longitude: i64,
}

impl Coordinate {
    pub fn new(latitude: i64, longitude: i64) -> Self {
        Self { latitude, longitude }
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

//--------------------------------------   RideStatusType    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatusType {
    /// Waiting for a chair, or matched but the chair has not set off yet.
    Matching,
    /// The chair is on its way to the pickup point.
    Enroute,
    /// The chair is at the pickup point.
    Pickup,
    /// The rider is on board.
    Carrying,
    /// The chair has reached the destination.
    Arrived,
    /// The rider has evaluated the ride and paid.
    Completed,
    Canceled,
}

impl RideStatusType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matching => "MATCHING",
            Self::Enroute => "ENROUTE",
            Self::Pickup => "PICKUP",
            Self::Carrying => "CARRYING",
            Self::Arrived => "ARRIVED",
            Self::Completed => "COMPLETED",
            Self::Canceled => "CANCELED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }
}

impl Display for RideStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid ride status: {0}")]
pub struct RideStatusConversionError(pub String);

impl FromStr for RideStatusType {
    type Err = RideStatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MATCHING" => Ok(Self::Matching),
            "ENROUTE" => Ok(Self::Enroute),
            "PICKUP" => Ok(Self::Pickup),
            "CARRYING" => Ok(Self::Carrying),
            "ARRIVED" => Ok(Self::Arrived),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELED" => Ok(Self::Canceled),
            s => Err(RideStatusConversionError(s.to_string())),
        }
    }
}

impl TryFrom<String> for RideStatusType {
    type Error = RideStatusConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

//--------------------------------------        Ride         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ride {
    pub id: RideId,
    pub user_id: UserId,
    /// Set once by the matching engine, and never changed afterwards.
    pub chair_id: Option<ChairId>,
    pub pickup: Coordinate,
    pub destination: Coordinate,
    pub fare: Fare,
    pub evaluation: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for Ride {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            chair_id: row.try_get("chair_id")?,
            pickup: Coordinate::new(row.try_get("pickup_latitude")?, row.try_get("pickup_longitude")?),
            destination: Coordinate::new(
                row.try_get("destination_latitude")?,
                row.try_get("destination_longitude")?,
            ),
            fare: row.try_get("fare")?,
            evaluation: row.try_get("evaluation")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRide {
    pub user_id: UserId,
    pub pickup: Coordinate,
    pub destination: Coordinate,
    pub fare: Fare,
}

impl NewRide {
    pub fn new(user_id: UserId, pickup: Coordinate, destination: Coordinate, fare: Fare) -> Self {
        Self { user_id, pickup, destination, fare }
    }
}

//--------------------------------------     RideStatus      ---------------------------------------------------------
/// One entry in a ride's append-only status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideStatus {
    pub id: i64,
    pub ride_id: RideId,
    pub status: RideStatusType,
    pub created_at: DateTime<Utc>,
    /// When the status was handed to the assigned chair's notification stream.
    pub chair_sent_at: Option<DateTime<Utc>>,
}

impl RideStatus {
    pub fn is_delivered(&self) -> bool {
        self.chair_sent_at.is_some()
    }
}

impl FromRow<'_, SqliteRow> for RideStatus {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status = RideStatusType::try_from(status)
            .map_err(|e| sqlx::Error::ColumnDecode { index: "status".into(), source: Box::new(e) })?;
        Ok(Self {
            id: row.try_get("id")?,
            ride_id: row.try_get("ride_id")?,
            status,
            created_at: row.try_get("created_at")?,
            chair_sent_at: row.try_get("chair_sent_at")?,
        })
    }
}

//--------------------------------------        Chair        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Chair {
    pub id: ChairId,
    pub owner_id: i64,
    pub name: String,
    pub model: String,
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub total_distance: i64,
    pub total_distance_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChair {
    pub owner_id: i64,
    pub name: String,
    pub model: String,
    pub access_token: String,
}

impl NewChair {
    pub fn new<S: Into<String>>(owner_id: i64, name: S, model: S, access_token: S) -> Self {
        Self { owner_id, name: name.into(), model: model.into(), access_token: access_token.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ChairModel {
    pub name: String,
    pub speed: i64,
}

impl ChairModel {
    pub fn new<S: Into<String>>(name: S, speed: i64) -> Self {
        Self { name: name.into(), speed }
    }
}

//--------------------------------------    ChairLocation    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChairLocation {
    pub id: i64,
    pub chair_id: ChairId,
    pub coordinate: Coordinate,
    pub created_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for ChairLocation {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chair_id: row.try_get("chair_id")?,
            coordinate: Coordinate::new(row.try_get("latitude")?, row.try_get("longitude")?),
            created_at: row.try_get("created_at")?,
        })
    }
}

//--------------------------------------        User         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub access_token: String,
}

impl NewUser {
    pub fn new<S: Into<String>>(username: S, firstname: S, lastname: S, access_token: S) -> Self {
        Self {
            username: username.into(),
            firstname: firstname.into(),
            lastname: lastname.into(),
            access_token: access_token.into(),
        }
    }
}
