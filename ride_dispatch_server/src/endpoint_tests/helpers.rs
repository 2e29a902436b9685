use actix_web::{
    body::to_bytes,
    cookie::Cookie,
    http::{header::AUTHORIZATION, StatusCode},
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use chrono::{DateTime, TimeZone, Utc};
use dispatch_common::Fare;
use log::debug;
use ride_dispatch_engine::db_types::{
    Chair,
    ChairId,
    Coordinate,
    Ride,
    RideId,
    RideStatus,
    RideStatusType,
    User,
    UserId,
};
use serde_json::Value;

use crate::auth::{APP_SESSION_COOKIE, CHAIR_SESSION_COOKIE};

pub const CHAIR_TOKEN: &str = "chair-token-7";
pub const RIDER_TOKEN: &str = "rider-token-3";

/// How a test request identifies itself.
#[derive(Debug, Clone, Copy)]
pub enum Credentials<'a> {
    Anonymous,
    ChairCookie(&'a str),
    AppCookie(&'a str),
    Bearer(&'a str),
}

impl Credentials<'_> {
    fn apply(self, req: TestRequest) -> TestRequest {
        match self {
            Credentials::Anonymous => req,
            Credentials::ChairCookie(token) => req.cookie(Cookie::new(CHAIR_SESSION_COOKIE, token.to_string())),
            Credentials::AppCookie(token) => req.cookie(Cookie::new(APP_SESSION_COOKIE, token.to_string())),
            Credentials::Bearer(token) => req.insert_header((AUTHORIZATION, format!("Bearer {token}"))),
        }
    }
}

pub async fn get_request<F>(
    credentials: Credentials<'_>,
    path: &str,
    configure: F,
) -> Result<(StatusCode, String), String>
where
    F: FnOnce(&mut ServiceConfig),
{
    let req = credentials.apply(TestRequest::get().uri(path));
    send_request(req, configure).await
}

pub async fn post_request<F>(
    credentials: Credentials<'_>,
    path: &str,
    body: Value,
    configure: F,
) -> Result<(StatusCode, String), String>
where
    F: FnOnce(&mut ServiceConfig),
{
    let req = credentials.apply(TestRequest::post().uri(path).set_json(body));
    send_request(req, configure).await
}

async fn send_request<F>(req: TestRequest, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req.to_request()).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    // Streamed bodies (the chair notification stream) can only be collected asynchronously
    let body = to_bytes(res.into_body()).await.map_err(|e| e.to_string())?;
    Ok((status, String::from_utf8_lossy(&body).into_owned()))
}

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 19, 9, 0, 0).unwrap()
}

pub fn chair() -> Chair {
    Chair {
        id: ChairId(7),
        owner_id: 1,
        name: "Seven".to_string(),
        model: "Recliner".to_string(),
        is_active: true,
        access_token: CHAIR_TOKEN.to_string(),
        total_distance: 0,
        total_distance_updated_at: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn rider() -> User {
    User {
        id: UserId(3),
        username: "alice".to_string(),
        firstname: "Alice".to_string(),
        lastname: "Liddell".to_string(),
        access_token: RIDER_TOKEN.to_string(),
        created_at: timestamp(),
    }
}

pub fn ride(chair_id: Option<ChairId>) -> Ride {
    Ride {
        id: RideId(12),
        user_id: UserId(3),
        chair_id,
        pickup: Coordinate::new(0, 0),
        destination: Coordinate::new(3, 4),
        fare: Fare::from(1200),
        evaluation: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn status(id: i64, status: RideStatusType) -> RideStatus {
    RideStatus { id, ride_id: RideId(12), status, created_at: timestamp(), chair_sent_at: None }
}
