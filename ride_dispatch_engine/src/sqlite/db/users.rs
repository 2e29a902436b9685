use sqlx::SqliteConnection;

use crate::db_types::{NewUser, User, UserId};

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as(
        r#"
            INSERT INTO users (username, firstname, lastname, access_token)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(user.username)
    .bind(user.firstname)
    .bind(user.lastname)
    .bind(user.access_token)
    .fetch_one(conn)
    .await?;
    Ok(user)
}

pub async fn fetch_user(user_id: UserId, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn fetch_user_by_token(token: &str, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE access_token = $1").bind(token).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn save_payment_token(user_id: UserId, token: &str, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO payment_tokens (user_id, token) VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET token = excluded.token
        "#,
    )
    .bind(user_id)
    .bind(token)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_payment_token(user_id: UserId, conn: &mut SqliteConnection) -> Result<Option<String>, sqlx::Error> {
    let token = sqlx::query_scalar("SELECT token FROM payment_tokens WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(token)
}
