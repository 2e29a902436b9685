use sqlx::SqliteConnection;

use crate::db_types::{ChairId, ChairLocation, Coordinate};

pub async fn insert_location(
    chair_id: ChairId,
    coordinate: Coordinate,
    conn: &mut SqliteConnection,
) -> Result<ChairLocation, sqlx::Error> {
    let location = sqlx::query_as(
        r#"
            INSERT INTO chair_locations (chair_id, latitude, longitude)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(chair_id)
    .bind(coordinate.latitude)
    .bind(coordinate.longitude)
    .fetch_one(conn)
    .await?;
    Ok(location)
}

/// The sample the chair reported just before sample `location_id`.
pub async fn previous_location(
    chair_id: ChairId,
    location_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<ChairLocation>, sqlx::Error> {
    let location =
        sqlx::query_as("SELECT * FROM chair_locations WHERE chair_id = $1 AND id < $2 ORDER BY id DESC LIMIT 1")
            .bind(chair_id)
            .bind(location_id)
            .fetch_optional(conn)
            .await?;
    Ok(location)
}

pub async fn latest_location(
    chair_id: ChairId,
    conn: &mut SqliteConnection,
) -> Result<Option<ChairLocation>, sqlx::Error> {
    let location = sqlx::query_as("SELECT * FROM chair_locations WHERE chair_id = $1 ORDER BY id DESC LIMIT 1")
        .bind(chair_id)
        .fetch_optional(conn)
        .await?;
    Ok(location)
}
