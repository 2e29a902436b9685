//! `SqliteDatabase` is the concrete SQLite implementation of a ride dispatch backend.
//!
//! It implements all the traits defined in the [`crate::traits`] module. Every method that evaluates a ride transition
//! opens its transaction with a write, so the SQLite write lock is held before the ride's latest status is read.
use std::{
    collections::{HashMap, HashSet},
    fmt::Debug,
};

use log::*;
use sqlx::{migrate::MigrateError, SqliteConnection, SqlitePool};

use super::db::{chair_locations, chairs, db_url, new_pool, ride_statuses, rides, users};
use crate::{
    db_types::{
        Chair,
        ChairId,
        ChairModel,
        Coordinate,
        NewChair,
        NewRide,
        NewUser,
        Ride,
        RideId,
        RideStatus,
        RideStatusType,
        User,
        UserId,
    },
    events::ChairEvent,
    helpers::{distance, implicit_transition, latest_status, occupies_chair, plan_assignments, validate_transition},
    helpers::{Actor, DispatchPolicy},
    traits::{
        AccountApiError,
        AccountManagement,
        ChairNotice,
        DispatchError,
        DispatchManagement,
        DispatchOutcome,
        LocationUpdate,
        NotificationError,
        NotificationManagement,
        RideFlowError,
        RideFlowManagement,
        RiderNotice,
        StatusChange,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `RDS_DATABASE_URL`, or the default.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }
}

/// Validates and records an explicit transition. The caller must already hold the write lock.
async fn apply_transition(
    ride: Ride,
    actor: Actor,
    requested: RideStatusType,
    conn: &mut SqliteConnection,
) -> Result<StatusChange, RideFlowError> {
    let history = ride_statuses::fetch_for_ride(ride.id, conn).await?;
    let current = latest_status(&history);
    if let Err(e) = validate_transition(actor, current, requested) {
        debug!("🔄️ {actor:?} asked to move {} from {current} to {requested}. Rejected: {e}", ride.id);
        return Err(e.into());
    }
    let status = ride_statuses::insert_status(ride.id, requested, conn).await?;
    debug!("🔄️ {} moved from {current} to {requested}", ride.id);
    Ok(StatusChange::new(ride, status))
}

impl DispatchManagement for SqliteDatabase {
    async fn run_matching_pass(&self, policy: &DispatchPolicy) -> Result<Vec<DispatchOutcome>, DispatchError> {
        let mut tx = self.pool.begin().await?;
        let waiting = rides::lock_unmatched_rides(&mut tx).await?;
        if waiting == 0 {
            trace!("🚕️ No rides are waiting for a chair");
            return Ok(vec![]);
        }
        let unmatched = rides::fetch_unmatched_rides(&mut tx).await?;
        let candidates = chairs::fetch_dispatch_candidates(&mut tx).await?;
        let chair_ids = candidates.iter().map(|c| c.chair_id).collect::<Vec<ChairId>>();
        let assigned = rides::fetch_rides_for_chairs(&chair_ids, &mut tx).await?;
        let ride_ids = assigned.iter().map(|r| r.id).collect::<Vec<RideId>>();
        let mut history = HashMap::<RideId, Vec<RideStatus>>::new();
        for status in ride_statuses::fetch_for_rides(&ride_ids, &mut tx).await? {
            history.entry(status.ride_id).or_default().push(status);
        }
        let busy = assigned
            .iter()
            .filter(|r| occupies_chair(history.get(&r.id).map(Vec::as_slice).unwrap_or_default()))
            .filter_map(|r| r.chair_id)
            .collect::<HashSet<ChairId>>();
        trace!(
            "🚕️ {} rides waiting, {} candidate chairs of which {} are busy",
            unmatched.len(),
            candidates.len(),
            busy.len()
        );
        let plan = plan_assignments(&unmatched, &candidates, &busy, policy);
        let mut outcomes = Vec::with_capacity(plan.len());
        for assignment in plan {
            let ride_id = assignment.ride_id;
            if !rides::assign_chair(ride_id, assignment.chair_id, &mut tx).await? {
                return Err(DispatchError::AssignmentConflict(ride_id.value()));
            }
            let latest_status = ride_statuses::latest_for_ride(ride_id, &mut tx)
                .await?
                .ok_or_else(|| DispatchError::DatabaseError(format!("{ride_id} has no status history")))?;
            outcomes.push(DispatchOutcome {
                ride_id,
                chair_id: assignment.chair_id,
                cost: assignment.cost,
                latest_status,
            });
        }
        tx.commit().await?;
        Ok(outcomes)
    }
}

impl RideFlowManagement for SqliteDatabase {
    async fn insert_ride(&self, ride: NewRide) -> Result<StatusChange, RideFlowError> {
        let mut tx = self.pool.begin().await?;
        let user_id = ride.user_id;
        let ride = rides::insert_ride(ride, &mut tx).await?;
        if rides::count_unfinished_rides(user_id, &mut tx).await? > 1 {
            debug!("🔄️ {user_id} tried to request a second ride while one is still in progress");
            return Err(RideFlowError::RideInProgress);
        }
        let status = ride_statuses::insert_status(ride.id, RideStatusType::Matching, &mut tx).await?;
        tx.commit().await?;
        debug!("🔄️ {} requested by {user_id} for {}", ride.id, ride.fare);
        Ok(StatusChange::new(ride, status))
    }

    async fn record_chair_location(
        &self,
        chair_id: ChairId,
        coordinate: Coordinate,
    ) -> Result<LocationUpdate, RideFlowError> {
        let mut tx = self.pool.begin().await?;
        let location = chair_locations::insert_location(chair_id, coordinate, &mut tx).await?;
        let delta = chair_locations::previous_location(chair_id, location.id, &mut tx)
            .await?
            .map(|prev| distance(prev.coordinate, coordinate))
            .unwrap_or(0);
        chairs::add_distance(chair_id, delta, location.id, &mut tx).await?;
        trace!("🗃️ {chair_id} is at {coordinate}, {delta} units from its last position");
        let mut change = None;
        if let Some(ride) = rides::latest_ride_for_chair(chair_id, &mut tx).await? {
            let history = ride_statuses::fetch_for_ride(ride.id, &mut tx).await?;
            let current = latest_status(&history);
            if let Some(next) = implicit_transition(current, &ride, coordinate) {
                let ride = rides::lock_ride(ride.id, &mut tx).await?.ok_or(RideFlowError::RideNotFound(ride.id))?;
                let status = ride_statuses::insert_status(ride.id, next, &mut tx).await?;
                debug!("🔄️ {chair_id} reached {coordinate}. {} moved from {current} to {next}", ride.id);
                change = Some(StatusChange::new(ride, status));
            }
        }
        tx.commit().await?;
        Ok(LocationUpdate { location, change })
    }

    async fn apply_chair_status(
        &self,
        chair_id: ChairId,
        ride_id: RideId,
        status: RideStatusType,
    ) -> Result<StatusChange, RideFlowError> {
        let mut tx = self.pool.begin().await?;
        let ride = rides::lock_ride(ride_id, &mut tx).await?.ok_or(RideFlowError::RideNotFound(ride_id))?;
        if ride.chair_id != Some(chair_id) {
            return Err(RideFlowError::NotAssigned);
        }
        let change = apply_transition(ride, Actor::Chair, status, &mut tx).await?;
        tx.commit().await?;
        Ok(change)
    }

    async fn complete_ride(
        &self,
        user_id: UserId,
        ride_id: RideId,
        evaluation: i64,
    ) -> Result<StatusChange, RideFlowError> {
        if !(1..=5).contains(&evaluation) {
            return Err(RideFlowError::InvalidEvaluation(evaluation));
        }
        let mut tx = self.pool.begin().await?;
        let ride = rides::lock_ride(ride_id, &mut tx).await?.ok_or(RideFlowError::RideNotFound(ride_id))?;
        if ride.user_id != user_id {
            return Err(RideFlowError::NotOwner);
        }
        let change = apply_transition(ride, Actor::Rider, RideStatusType::Completed, &mut tx).await?;
        let ride = rides::set_evaluation(ride_id, evaluation, &mut tx).await?;
        tx.commit().await?;
        Ok(StatusChange::new(ride, change.status))
    }

    async fn cancel_ride(&self, user_id: UserId, ride_id: RideId) -> Result<StatusChange, RideFlowError> {
        let mut tx = self.pool.begin().await?;
        let ride = rides::lock_ride(ride_id, &mut tx).await?.ok_or(RideFlowError::RideNotFound(ride_id))?;
        if ride.user_id != user_id {
            return Err(RideFlowError::NotOwner);
        }
        let change = apply_transition(ride, Actor::Rider, RideStatusType::Canceled, &mut tx).await?;
        tx.commit().await?;
        Ok(change)
    }

    async fn fetch_ride(&self, ride_id: RideId) -> Result<Option<Ride>, RideFlowError> {
        let mut conn = self.pool.acquire().await?;
        let ride = rides::fetch_ride(ride_id, &mut conn).await?;
        Ok(ride)
    }

    async fn fetch_ride_statuses(&self, ride_id: RideId) -> Result<Vec<RideStatus>, RideFlowError> {
        let mut conn = self.pool.acquire().await?;
        let statuses = ride_statuses::fetch_for_ride(ride_id, &mut conn).await?;
        Ok(statuses)
    }

    async fn fetch_completed_rides(&self, user_id: UserId) -> Result<Vec<Ride>, RideFlowError> {
        let mut conn = self.pool.acquire().await?;
        let rides = rides::fetch_completed_rides(user_id, &mut conn).await?;
        Ok(rides)
    }
}

impl NotificationManagement for SqliteDatabase {
    async fn chair_snapshot(&self, chair_id: ChairId) -> Result<Option<ChairNotice>, NotificationError> {
        let mut tx = self.pool.begin().await?;
        let stamped = ride_statuses::mark_latest_ride_delivered(chair_id, &mut tx).await?;
        let notice = match rides::latest_ride_for_chair(chair_id, &mut tx).await? {
            Some(ride) => load_chair_notice(ride, None, &mut tx).await?,
            None => None,
        };
        tx.commit().await?;
        if !stamped.is_empty() {
            trace!("📬️ Snapshot for {chair_id} acknowledged statuses {stamped:?}");
        }
        Ok(notice)
    }

    async fn deliver_chair_event(
        &self,
        chair_id: ChairId,
        event: &ChairEvent,
    ) -> Result<Option<ChairNotice>, NotificationError> {
        let mut tx = self.pool.begin().await?;
        let stamped = ride_statuses::mark_delivered_up_to(chair_id, event.ride_id, event.status_id, &mut tx).await?;
        if !stamped.contains(&event.status_id) {
            tx.commit().await?;
            trace!("📬️ {} for {} is not pending for {chair_id}", event.status, event.ride_id);
            return Ok(None);
        }
        let notice = match rides::fetch_ride(event.ride_id, &mut tx).await? {
            Some(ride) => load_chair_notice(ride, Some(event.status_id), &mut tx).await?,
            None => None,
        };
        tx.commit().await?;
        Ok(notice)
    }

    async fn rider_snapshot(&self, user_id: UserId) -> Result<Option<RiderNotice>, NotificationError> {
        let mut conn = self.pool.acquire().await?;
        let Some(ride) = rides::latest_ride_for_user(user_id, &mut conn).await? else {
            return Ok(None);
        };
        let Some(status) = ride_statuses::latest_for_ride(ride.id, &mut conn).await? else {
            return Ok(None);
        };
        let chair = match ride.chair_id {
            Some(chair_id) => chairs::fetch_chair(chair_id, &mut conn).await?,
            None => None,
        };
        Ok(Some(RiderNotice { ride, status, chair }))
    }
}

/// Loads the rider and the given status (or the latest one) for a chair notification.
async fn load_chair_notice(
    ride: Ride,
    status_id: Option<i64>,
    conn: &mut SqliteConnection,
) -> Result<Option<ChairNotice>, NotificationError> {
    let status = match status_id {
        Some(id) => ride_statuses::fetch_status(id, conn).await?,
        None => ride_statuses::latest_for_ride(ride.id, conn).await?,
    };
    let Some(status) = status else {
        return Ok(None);
    };
    let rider = users::fetch_user(ride.user_id, conn)
        .await?
        .ok_or_else(|| NotificationError::DatabaseError(format!("{} belongs to a missing user", ride.id)))?;
    Ok(Some(ChairNotice { ride, rider, status }))
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_user_by_token(&self, access_token: &str) -> Result<Option<User>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user_by_token(access_token, &mut conn).await?;
        Ok(user)
    }

    async fn fetch_chair_by_token(&self, access_token: &str) -> Result<Option<Chair>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let chair = chairs::fetch_chair_by_token(access_token, &mut conn).await?;
        Ok(chair)
    }

    async fn fetch_chair(&self, chair_id: ChairId) -> Result<Option<Chair>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let chair = chairs::fetch_chair(chair_id, &mut conn).await?;
        Ok(chair)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::insert_user(user, &mut conn).await?;
        debug!("🗃️ Created {} ({})", user.id, user.username);
        Ok(user)
    }

    async fn create_chair(&self, chair: NewChair) -> Result<Chair, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let chair = chairs::insert_chair(chair, &mut conn).await?;
        debug!("🗃️ Created {} ({}, model {})", chair.id, chair.name, chair.model);
        Ok(chair)
    }

    async fn upsert_chair_model(&self, model: ChairModel) -> Result<(), AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        chairs::upsert_model(model, &mut conn).await?;
        Ok(())
    }

    async fn set_chair_activity(&self, chair_id: ChairId, is_active: bool) -> Result<(), AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        if chairs::set_activity(chair_id, is_active, &mut conn).await? {
            debug!("🗃️ {chair_id} is now {}", if is_active { "active" } else { "inactive" });
            Ok(())
        } else {
            Err(AccountApiError::ChairNotFound(chair_id))
        }
    }

    async fn save_payment_token(&self, user_id: UserId, token: &str) -> Result<(), AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::save_payment_token(user_id, token, &mut conn).await?;
        Ok(())
    }

    async fn fetch_payment_token(&self, user_id: UserId) -> Result<Option<String>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let token = users::fetch_payment_token(user_id, &mut conn).await?;
        Ok(token)
    }
}
