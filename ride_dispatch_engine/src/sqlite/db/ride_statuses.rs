use sqlx::{QueryBuilder, SqliteConnection};

use super::rides::CURRENT_RIDE_ORDER;
use crate::db_types::{ChairId, RideId, RideStatus, RideStatusType};

/// Appends a status to the ride's history. The `(ride_id, status)` uniqueness constraint rejects repeats.
pub async fn insert_status(
    ride_id: RideId,
    status: RideStatusType,
    conn: &mut SqliteConnection,
) -> Result<RideStatus, sqlx::Error> {
    let status = sqlx::query_as("INSERT INTO ride_statuses (ride_id, status) VALUES ($1, $2) RETURNING *")
        .bind(ride_id)
        .bind(status.as_str())
        .fetch_one(conn)
        .await?;
    Ok(status)
}

/// The ride's status history in insertion order.
pub async fn fetch_for_ride(ride_id: RideId, conn: &mut SqliteConnection) -> Result<Vec<RideStatus>, sqlx::Error> {
    let statuses = sqlx::query_as("SELECT * FROM ride_statuses WHERE ride_id = $1 ORDER BY id ASC")
        .bind(ride_id)
        .fetch_all(conn)
        .await?;
    Ok(statuses)
}

pub async fn fetch_for_rides(ride_ids: &[RideId], conn: &mut SqliteConnection) -> Result<Vec<RideStatus>, sqlx::Error> {
    if ride_ids.is_empty() {
        return Ok(vec![]);
    }
    let mut builder = QueryBuilder::new("SELECT * FROM ride_statuses WHERE ride_id IN (");
    let mut ids = builder.separated(", ");
    for id in ride_ids {
        ids.push_bind(id.value());
    }
    ids.push_unseparated(") ORDER BY id");
    let statuses = builder.build_query_as::<RideStatus>().fetch_all(conn).await?;
    Ok(statuses)
}

pub async fn latest_for_ride(ride_id: RideId, conn: &mut SqliteConnection) -> Result<Option<RideStatus>, sqlx::Error> {
    let status = sqlx::query_as("SELECT * FROM ride_statuses WHERE ride_id = $1 ORDER BY id DESC LIMIT 1")
        .bind(ride_id)
        .fetch_optional(conn)
        .await?;
    Ok(status)
}

/// Stamps `chair_sent_at` on every undelivered status of the ride up to and including `status_id`, provided the ride
/// is assigned to `chair_id`.
///
/// Rows that were already delivered are left alone. Returns the ids of the rows that were stamped by this call.
pub async fn mark_delivered_up_to(
    chair_id: ChairId,
    ride_id: RideId,
    status_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<i64>, sqlx::Error> {
    let ids = sqlx::query_scalar(
        r#"
            UPDATE ride_statuses SET chair_sent_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
            WHERE ride_id = $1 AND id <= $2 AND chair_sent_at IS NULL
              AND EXISTS (SELECT 1 FROM rides WHERE id = $1 AND chair_id = $3)
            RETURNING id
        "#,
    )
    .bind(ride_id)
    .bind(status_id)
    .bind(chair_id)
    .fetch_all(conn)
    .await?;
    Ok(ids)
}

/// Stamps `chair_sent_at` on every undelivered status of the chair's current ride. Returns the stamped ids.
pub async fn mark_latest_ride_delivered(
    chair_id: ChairId,
    conn: &mut SqliteConnection,
) -> Result<Vec<i64>, sqlx::Error> {
    let query = format!(
        r#"
            UPDATE ride_statuses SET chair_sent_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
            WHERE chair_sent_at IS NULL
              AND ride_id = (SELECT r.id FROM rides r WHERE r.chair_id = $1 {CURRENT_RIDE_ORDER})
            RETURNING id
        "#
    );
    let ids = sqlx::query_scalar(&query).bind(chair_id).fetch_all(conn).await?;
    Ok(ids)
}

pub async fn fetch_status(status_id: i64, conn: &mut SqliteConnection) -> Result<Option<RideStatus>, sqlx::Error> {
    let status =
        sqlx::query_as("SELECT * FROM ride_statuses WHERE id = $1").bind(status_id).fetch_optional(conn).await?;
    Ok(status)
}
