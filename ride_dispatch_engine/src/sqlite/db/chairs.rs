use sqlx::{FromRow, SqliteConnection};

use crate::{
    db_types::{Chair, ChairId, ChairModel, Coordinate, NewChair},
    helpers::CandidateChair,
};

pub async fn insert_chair(chair: NewChair, conn: &mut SqliteConnection) -> Result<Chair, sqlx::Error> {
    let chair = sqlx::query_as(
        r#"
            INSERT INTO chairs (owner_id, name, model, access_token)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(chair.owner_id)
    .bind(chair.name)
    .bind(chair.model)
    .bind(chair.access_token)
    .fetch_one(conn)
    .await?;
    Ok(chair)
}

pub async fn fetch_chair(chair_id: ChairId, conn: &mut SqliteConnection) -> Result<Option<Chair>, sqlx::Error> {
    let chair = sqlx::query_as("SELECT * FROM chairs WHERE id = $1").bind(chair_id).fetch_optional(conn).await?;
    Ok(chair)
}

pub async fn fetch_chair_by_token(token: &str, conn: &mut SqliteConnection) -> Result<Option<Chair>, sqlx::Error> {
    let chair =
        sqlx::query_as("SELECT * FROM chairs WHERE access_token = $1").bind(token).fetch_optional(conn).await?;
    Ok(chair)
}

/// Returns `false` if the chair does not exist.
pub async fn set_activity(chair_id: ChairId, is_active: bool, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE chairs SET is_active = $1, updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now') WHERE id = $2",
    )
    .bind(is_active)
    .bind(chair_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Adds `delta` to the chair's odometer, stamped with the time of the location sample that produced it.
pub async fn add_distance(
    chair_id: ChairId,
    delta: i64,
    location_id: i64,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            UPDATE chairs SET
                total_distance = total_distance + $1,
                total_distance_updated_at = (SELECT created_at FROM chair_locations WHERE id = $2)
            WHERE id = $3
        "#,
    )
    .bind(delta)
    .bind(location_id)
    .bind(chair_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn upsert_model(model: ChairModel, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO chair_models (name, speed) VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET speed = excluded.speed
        "#,
    )
    .bind(model.name)
    .bind(model.speed)
    .execute(conn)
    .await?;
    Ok(())
}

#[derive(FromRow)]
struct CandidateRow {
    id: ChairId,
    latitude: i64,
    longitude: i64,
    speed: Option<i64>,
}

/// Active chairs with their latest position and model speed. Chairs that have never reported a position are left out.
pub async fn fetch_dispatch_candidates(conn: &mut SqliteConnection) -> Result<Vec<CandidateChair>, sqlx::Error> {
    let rows: Vec<CandidateRow> = sqlx::query_as(
        r#"
            SELECT c.id, l.latitude, l.longitude, m.speed
            FROM chairs c
            JOIN chair_locations l ON l.id = (SELECT MAX(id) FROM chair_locations WHERE chair_id = c.id)
            LEFT JOIN chair_models m ON m.name = c.model
            WHERE c.is_active = 1
            ORDER BY c.id
        "#,
    )
    .fetch_all(conn)
    .await?;
    let candidates = rows
        .into_iter()
        .map(|r| CandidateChair {
            chair_id: r.id,
            location: Coordinate::new(r.latitude, r.longitude),
            model_speed: r.speed,
        })
        .collect();
    Ok(candidates)
}
