use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::db_types::{ChairId, NewRide, Ride, RideId, UserId};

/// Picks a chair's current ride out of `rides r`: a ride that is still under way wins over finished ones, then the
/// ride matched last. Creation order says nothing here, since an older ride can be matched after a newer one.
pub(crate) const CURRENT_RIDE_ORDER: &str = r#"
    ORDER BY EXISTS (
        SELECT 1 FROM ride_statuses s WHERE s.ride_id = r.id AND s.status IN ('COMPLETED', 'CANCELED')
    ) ASC, r.matched_at DESC, r.id DESC
    LIMIT 1
"#;

pub async fn insert_ride(ride: NewRide, conn: &mut SqliteConnection) -> Result<Ride, sqlx::Error> {
    let ride = sqlx::query_as(
        r#"
            INSERT INTO rides (
                user_id,
                pickup_latitude,
                pickup_longitude,
                destination_latitude,
                destination_longitude,
                fare
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(ride.user_id)
    .bind(ride.pickup.latitude)
    .bind(ride.pickup.longitude)
    .bind(ride.destination.latitude)
    .bind(ride.destination.longitude)
    .bind(ride.fare)
    .fetch_one(conn)
    .await?;
    Ok(ride)
}

pub async fn fetch_ride(ride_id: RideId, conn: &mut SqliteConnection) -> Result<Option<Ride>, sqlx::Error> {
    let ride = sqlx::query_as("SELECT * FROM rides WHERE id = $1").bind(ride_id).fetch_optional(conn).await?;
    Ok(ride)
}

/// Touches the ride's `updated_at` and returns the ride. As the first statement of a transaction, this takes the write
/// lock before anything about the ride is read.
///
/// Returns `None` (and takes no lock) if the ride does not exist.
pub async fn lock_ride(ride_id: RideId, conn: &mut SqliteConnection) -> Result<Option<Ride>, sqlx::Error> {
    let ride = sqlx::query_as(
        r#"
            UPDATE rides SET updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
            WHERE id = $1
            RETURNING *;
        "#,
    )
    .bind(ride_id)
    .fetch_optional(conn)
    .await?;
    Ok(ride)
}

/// Takes the write lock over the set of unmatched rides, without changing them. Returns the number of unmatched rides.
pub async fn lock_unmatched_rides(conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE rides SET updated_at = updated_at WHERE chair_id IS NULL").execute(conn).await?;
    Ok(result.rows_affected())
}

/// Unassigned rides that have not been canceled, oldest first.
pub async fn fetch_unmatched_rides(conn: &mut SqliteConnection) -> Result<Vec<Ride>, sqlx::Error> {
    let rides = sqlx::query_as(
        r#"
            SELECT r.* FROM rides r
            WHERE r.chair_id IS NULL
              AND NOT EXISTS (SELECT 1 FROM ride_statuses s WHERE s.ride_id = r.id AND s.status = 'CANCELED')
            ORDER BY r.created_at ASC, r.id ASC
        "#,
    )
    .fetch_all(conn)
    .await?;
    Ok(rides)
}

/// Every ride ever assigned to any of the given chairs.
pub async fn fetch_rides_for_chairs(
    chair_ids: &[ChairId],
    conn: &mut SqliteConnection,
) -> Result<Vec<Ride>, sqlx::Error> {
    if chair_ids.is_empty() {
        return Ok(vec![]);
    }
    let mut builder = QueryBuilder::new("SELECT * FROM rides WHERE chair_id IN (");
    let mut ids = builder.separated(", ");
    for id in chair_ids {
        ids.push_bind(id.value());
    }
    ids.push_unseparated(") ORDER BY id");
    trace!("🗃️ Fetching rides for {} chairs", chair_ids.len());
    let rides = builder.build_query_as::<Ride>().fetch_all(conn).await?;
    Ok(rides)
}

/// Assigns the chair to the ride, provided the ride is still unassigned. Returns `false` if it was not.
pub async fn assign_chair(ride_id: RideId, chair_id: ChairId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE rides SET
                chair_id = $1,
                matched_at = strftime('%Y-%m-%d %H:%M:%f', 'now'),
                updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
            WHERE id = $2 AND chair_id IS NULL
        "#,
    )
    .bind(chair_id)
    .bind(ride_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn set_evaluation(ride_id: RideId, evaluation: i64, conn: &mut SqliteConnection) -> Result<Ride, sqlx::Error> {
    let ride = sqlx::query_as(
        r#"
            UPDATE rides SET evaluation = $1, updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
            WHERE id = $2
            RETURNING *;
        "#,
    )
    .bind(evaluation)
    .bind(ride_id)
    .fetch_one(conn)
    .await?;
    Ok(ride)
}

/// The chair's current ride. See [`CURRENT_RIDE_ORDER`].
pub async fn latest_ride_for_chair(chair_id: ChairId, conn: &mut SqliteConnection) -> Result<Option<Ride>, sqlx::Error> {
    let query = format!("SELECT r.* FROM rides r WHERE r.chair_id = $1 {CURRENT_RIDE_ORDER}");
    let ride = sqlx::query_as(&query).bind(chair_id).fetch_optional(conn).await?;
    Ok(ride)
}

pub async fn latest_ride_for_user(user_id: UserId, conn: &mut SqliteConnection) -> Result<Option<Ride>, sqlx::Error> {
    let ride = sqlx::query_as("SELECT * FROM rides WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(ride)
}

/// The user's completed rides, oldest first.
pub async fn fetch_completed_rides(user_id: UserId, conn: &mut SqliteConnection) -> Result<Vec<Ride>, sqlx::Error> {
    let rides = sqlx::query_as(
        r#"
            SELECT r.* FROM rides r
            WHERE r.user_id = $1
              AND EXISTS (SELECT 1 FROM ride_statuses s WHERE s.ride_id = r.id AND s.status = 'COMPLETED')
            ORDER BY r.created_at ASC, r.id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(rides)
}

/// Counts the user's rides that have neither completed nor been canceled.
pub async fn count_unfinished_rides(user_id: UserId, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let count = sqlx::query_scalar(
        r#"
            SELECT COUNT(*) FROM rides r
            WHERE r.user_id = $1
              AND NOT EXISTS (
                SELECT 1 FROM ride_statuses s WHERE s.ride_id = r.id AND s.status IN ('COMPLETED', 'CANCELED')
              )
        "#,
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok(count)
}
