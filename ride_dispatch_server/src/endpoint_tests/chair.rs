use actix_web::{http::StatusCode, web, web::ServiceConfig};
use mockall::predicate::eq;
use ride_dispatch_engine::{
    db_types::{ChairId, ChairLocation, Coordinate, RideId, RideStatusType},
    helpers::TransitionError,
    traits::{ChairNotice, LocationUpdate, StatusChange},
    AccountApi,
    ChairEvent,
    NotificationApi,
    NotificationHub,
    RideFlowApi,
    RideFlowError,
};
use serde_json::json;

use super::{
    helpers::{get_request, post_request, ride, rider, status, timestamp, Credentials, CHAIR_TOKEN},
    mocks::{known_accounts, MockAccountManager, MockNotificationManager, MockRideFlowManager},
};
use crate::routes::{ChairActivityRoute, ChairCoordinateRoute, ChairNotificationRoute, ChairRideStatusRoute};

fn configure_activity(cfg: &mut ServiceConfig) {
    let mut accounts = known_accounts();
    accounts.expect_set_chair_activity().with(eq(ChairId(7)), eq(false)).returning(|_, _| Ok(()));
    cfg.service(ChairActivityRoute::<MockAccountManager>::new()).app_data(web::Data::new(AccountApi::new(accounts)));
}

#[actix_web::test]
async fn activity_requires_a_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request(Credentials::Anonymous, "/chair/activity", json!({"is_active": false}), configure_activity)
            .await
            .expect("Failed to make request");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"chair_session cookie is required"}"#);
}

#[actix_web::test]
async fn activity_rejects_unknown_tokens() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request(
        Credentials::ChairCookie("not-a-chair"),
        "/chair/activity",
        json!({"is_active": false}),
        |cfg: &mut ServiceConfig| {
            let accounts = known_accounts();
            cfg.service(ChairActivityRoute::<MockAccountManager>::new())
                .app_data(web::Data::new(AccountApi::new(accounts)));
        },
    )
    .await
    .expect("Failed to make request");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"invalid access token"}"#);
}

#[actix_web::test]
async fn chair_goes_off_duty() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request(Credentials::ChairCookie(CHAIR_TOKEN), "/chair/activity", json!({"is_active": false}), configure_activity)
            .await
            .expect("Failed to make request");
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

fn configure_coordinate(cfg: &mut ServiceConfig) {
    let mut rides = MockRideFlowManager::new();
    rides.expect_record_chair_location().with(eq(ChairId(7)), eq(Coordinate::new(3, 4))).times(1).returning(
        |chair_id, coordinate| {
            let location = ChairLocation { id: 40, chair_id, coordinate, created_at: timestamp() };
            let change = StatusChange::new(ride(Some(chair_id)), status(5, RideStatusType::Arrived));
            Ok(LocationUpdate { location, change: Some(change) })
        },
    );
    cfg.service(ChairCoordinateRoute::<MockAccountManager, MockRideFlowManager>::new())
        .app_data(web::Data::new(AccountApi::new(known_accounts())))
        .app_data(web::Data::new(RideFlowApi::new(rides, NotificationHub::new())));
}

#[actix_web::test]
async fn coordinate_reports_when_it_was_recorded() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request(
        Credentials::Bearer(CHAIR_TOKEN),
        "/chair/coordinate",
        json!({"latitude": 3, "longitude": 4}),
        configure_coordinate,
    )
    .await
    .expect("Failed to make request");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"recorded_at":1729328400000}"#);
}

fn configure_ride_status(cfg: &mut ServiceConfig) {
    let mut rides = MockRideFlowManager::new();
    rides
        .expect_apply_chair_status()
        .with(eq(ChairId(7)), eq(RideId(12)), eq(RideStatusType::Carrying))
        .returning(|_, _, _| Err(RideFlowError::InvalidState(TransitionError::ChairNotArrived)));
    rides
        .expect_apply_chair_status()
        .with(eq(ChairId(7)), eq(RideId(99)), eq(RideStatusType::Enroute))
        .returning(|_, ride_id, _| Err(RideFlowError::RideNotFound(ride_id)));
    rides
        .expect_apply_chair_status()
        .with(eq(ChairId(7)), eq(RideId(12)), eq(RideStatusType::Enroute))
        .returning(|chair_id, _, s| Ok(StatusChange::new(ride(Some(chair_id)), status(3, s))));
    cfg.service(ChairRideStatusRoute::<MockAccountManager, MockRideFlowManager>::new())
        .app_data(web::Data::new(AccountApi::new(known_accounts())))
        .app_data(web::Data::new(RideFlowApi::new(rides, NotificationHub::new())));
}

#[actix_web::test]
async fn ride_status_updates() {
    let _ = env_logger::try_init().ok();
    let chair = Credentials::ChairCookie(CHAIR_TOKEN);
    let (code, body) =
        post_request(chair, "/chair/rides/12/status", json!({"status": "ENROUTE"}), configure_ride_status)
            .await
            .expect("Failed to make request");
    assert_eq!(code, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (code, body) =
        post_request(chair, "/chair/rides/12/status", json!({"status": "CARRYING"}), configure_ride_status)
            .await
            .expect("Failed to make request");
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"chair has not arrived yet"}"#);

    let (code, body) =
        post_request(chair, "/chair/rides/99/status", json!({"status": "ENROUTE"}), configure_ride_status)
            .await
            .expect("Failed to make request");
    assert_eq!(code, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. ride#99 does not exist"}"#);
}

#[actix_web::test]
async fn ride_status_must_be_a_known_status() {
    let _ = env_logger::try_init().ok();
    let (code, _) = post_request(
        Credentials::ChairCookie(CHAIR_TOKEN),
        "/chair/rides/12/status",
        json!({"status": "TELEPORTING"}),
        configure_ride_status,
    )
    .await
    .expect("Failed to make request");
    assert_eq!(code, StatusCode::BAD_REQUEST);
}

fn notice(status_id: i64, s: RideStatusType) -> ChairNotice {
    ChairNotice { ride: ride(Some(ChairId(7))), rider: rider(), status: status(status_id, s) }
}

const SNAPSHOT_FRAME: &str = "data: {\"data\":{\"ride_id\":12,\"user\":{\"id\":3,\"name\":\"Alice Liddell\"},\
                              \"pickup_coordinate\":{\"latitude\":0,\"longitude\":0},\
                              \"destination_coordinate\":{\"latitude\":3,\"longitude\":4},\
                              \"status\":\"MATCHING\"},\"retry_after_ms\":30}\n\n";

const ENROUTE_FRAME: &str = "data: {\"data\":{\"ride_id\":12,\"user\":{\"id\":3,\"name\":\"Alice Liddell\"},\
                             \"pickup_coordinate\":{\"latitude\":0,\"longitude\":0},\
                             \"destination_coordinate\":{\"latitude\":3,\"longitude\":4},\
                             \"status\":\"ENROUTE\"},\"retry_after_ms\":30}\n\n";

#[actix_web::test]
async fn notification_stream_starts_with_a_snapshot() {
    let _ = env_logger::try_init().ok();
    let (code, body) = get_request(Credentials::ChairCookie(CHAIR_TOKEN), "/chair/notification", |cfg| {
        let mut notifications = MockNotificationManager::new();
        notifications.expect_chair_snapshot().with(eq(ChairId(7))).times(1).returning(|_| Ok(None));
        notifications.expect_deliver_chair_event().never();
        // A closed hub ends the stream right after the snapshot
        let hub = NotificationHub::new();
        hub.shutdown();
        cfg.service(ChairNotificationRoute::<MockAccountManager, MockNotificationManager>::new())
            .app_data(web::Data::new(AccountApi::new(known_accounts())))
            .app_data(web::Data::new(NotificationApi::new(notifications, hub, 30)));
    })
    .await
    .expect("Failed to make request");
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body, "data: {\"data\":null,\"retry_after_ms\":30}\n\n");
}

#[actix_web::test]
async fn notification_stream_delivers_events() {
    let _ = env_logger::try_init().ok();
    let (code, body) = get_request(Credentials::ChairCookie(CHAIR_TOKEN), "/chair/notification", |cfg| {
        let hub = NotificationHub::new();
        hub.publish(ChairId(7), ChairEvent { ride_id: RideId(12), status_id: 2, status: RideStatusType::Enroute });
        let mut notifications = MockNotificationManager::new();
        notifications.expect_chair_snapshot().returning(|_| Ok(Some(notice(1, RideStatusType::Matching))));
        let closer = hub.clone();
        notifications
            .expect_deliver_chair_event()
            .withf(|chair_id, event| *chair_id == ChairId(7) && event.status_id == 2)
            .times(1)
            .returning(move |_, event| {
                // Nothing else will be published. End the stream after this frame.
                closer.shutdown();
                Ok(Some(notice(event.status_id, event.status)))
            });
        cfg.service(ChairNotificationRoute::<MockAccountManager, MockNotificationManager>::new())
            .app_data(web::Data::new(AccountApi::new(known_accounts())))
            .app_data(web::Data::new(NotificationApi::new(notifications, hub, 30)));
    })
    .await
    .expect("Failed to make request");
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body, format!("{SNAPSHOT_FRAME}{ENROUTE_FRAME}"));
}
