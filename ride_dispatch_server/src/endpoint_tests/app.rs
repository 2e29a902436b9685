use std::time::Duration;

use actix_web::{http::StatusCode, web, web::ServiceConfig, App, HttpResponse, HttpServer};
use dispatch_common::Fare;
use mockall::predicate::eq;
use payment_gateway::{PaymentGatewayApi, PaymentGatewayConfig};
use ride_dispatch_engine::{
    db_types::{ChairId, Coordinate, RideId, RideStatusType, UserId},
    traits::{RiderNotice, StatusChange},
    AccountApi,
    NotificationApi,
    NotificationHub,
    RideFlowApi,
    RideFlowError,
};
use serde_json::json;

use super::{
    helpers::{chair, get_request, post_request, ride, status, Credentials, RIDER_TOKEN},
    mocks::{known_accounts, MockAccountManager, MockNotificationManager, MockRideFlowManager},
};
use crate::routes::{AppCancelRideRoute, AppEvaluateRideRoute, AppNotificationRoute, AppRequestRideRoute};

const PAYMENT_TOKEN: &str = "pay-alice";

fn configure_request_ride(cfg: &mut ServiceConfig) {
    let mut rides = MockRideFlowManager::new();
    rides
        .expect_insert_ride()
        .withf(|r| {
            r.user_id == UserId(3) &&
                r.pickup == Coordinate::new(0, 0) &&
                r.destination == Coordinate::new(3, 4) &&
                r.fare == Fare::from(1200)
        })
        .returning(|_| Ok(StatusChange::new(ride(None), status(1, RideStatusType::Matching))));
    rides
        .expect_insert_ride()
        .withf(|r| r.destination == Coordinate::new(9, 9))
        .returning(|_| Err(RideFlowError::RideInProgress));
    cfg.service(AppRequestRideRoute::<MockAccountManager, MockRideFlowManager>::new())
        .app_data(web::Data::new(AccountApi::new(known_accounts())))
        .app_data(web::Data::new(RideFlowApi::new(rides, NotificationHub::new())));
}

#[actix_web::test]
async fn request_ride() {
    let _ = env_logger::try_init().ok();
    let body = json!({
        "pickup_coordinate": {"latitude": 0, "longitude": 0},
        "destination_coordinate": {"latitude": 3, "longitude": 4}
    });
    let (code, body) = post_request(Credentials::AppCookie(RIDER_TOKEN), "/app/rides", body, configure_request_ride)
        .await
        .expect("Failed to make request");
    assert_eq!(code, StatusCode::ACCEPTED);
    assert_eq!(body, r#"{"ride_id":12,"fare":1200}"#);
}

#[actix_web::test]
async fn one_ride_at_a_time() {
    let _ = env_logger::try_init().ok();
    let body = json!({
        "pickup_coordinate": {"latitude": 0, "longitude": 0},
        "destination_coordinate": {"latitude": 9, "longitude": 9}
    });
    let (code, body) = post_request(Credentials::Bearer(RIDER_TOKEN), "/app/rides", body, configure_request_ride)
        .await
        .expect("Failed to make request");
    assert_eq!(code, StatusCode::CONFLICT);
    assert_eq!(body, r#"{"error":"user already has a ride in progress"}"#);
}

#[actix_web::test]
async fn chair_tokens_are_not_rider_tokens() {
    let _ = env_logger::try_init().ok();
    let body = json!({
        "pickup_coordinate": {"latitude": 0, "longitude": 0},
        "destination_coordinate": {"latitude": 3, "longitude": 4}
    });
    let (code, body) =
        post_request(Credentials::ChairCookie(RIDER_TOKEN), "/app/rides", body, configure_request_ride)
            .await
            .expect("Failed to make request");
    assert_eq!(code, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"app_session cookie is required"}"#);
}

#[actix_web::test]
async fn cancel_someone_elses_ride() {
    let _ = env_logger::try_init().ok();
    let (code, body) =
        post_request(Credentials::AppCookie(RIDER_TOKEN), "/app/rides/44/cancel", json!({}), |cfg: &mut ServiceConfig| {
            let mut rides = MockRideFlowManager::new();
            rides
                .expect_cancel_ride()
                .with(eq(UserId(3)), eq(RideId(44)))
                .times(1)
                .returning(|_, _| Err(RideFlowError::NotOwner));
            cfg.service(AppCancelRideRoute::<MockAccountManager, MockRideFlowManager>::new())
                .app_data(web::Data::new(AccountApi::new(known_accounts())))
                .app_data(web::Data::new(RideFlowApi::new(rides, NotificationHub::new())));
        })
        .await
        .expect("Failed to make request");
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"ride does not belong to this user"}"#);
}

#[actix_web::test]
async fn cancel_ride() {
    let _ = env_logger::try_init().ok();
    let (code, body) =
        post_request(Credentials::AppCookie(RIDER_TOKEN), "/app/rides/12/cancel", json!({}), |cfg: &mut ServiceConfig| {
            let mut rides = MockRideFlowManager::new();
            rides
                .expect_cancel_ride()
                .with(eq(UserId(3)), eq(RideId(12)))
                .times(1)
                .returning(|_, _| Ok(StatusChange::new(ride(None), status(2, RideStatusType::Canceled))));
            cfg.service(AppCancelRideRoute::<MockAccountManager, MockRideFlowManager>::new())
                .app_data(web::Data::new(AccountApi::new(known_accounts())))
                .app_data(web::Data::new(RideFlowApi::new(rides, NotificationHub::new())));
        })
        .await
        .expect("Failed to make request");
    assert_eq!(code, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

//----------------------------------------------   Evaluation  ----------------------------------------------------

fn gateway(url: &str) -> PaymentGatewayApi {
    let config = PaymentGatewayConfig::new(url).with_retries(2, Duration::from_millis(5));
    PaymentGatewayApi::new(config).expect("Could not create gateway client")
}

/// The rider's accounts and rides. `completes` is how often the ride is expected to be completed.
fn evaluation_backends(payment_token: Option<&'static str>, completes: usize) -> (MockAccountManager, MockRideFlowManager) {
    let mut accounts = known_accounts();
    accounts
        .expect_fetch_payment_token()
        .with(eq(UserId(3)))
        .returning(move |_| Ok(payment_token.map(String::from)));
    let mut rides = MockRideFlowManager::new();
    rides.expect_complete_ride().with(eq(UserId(3)), eq(RideId(12)), eq(4)).times(completes).returning(|_, _, e| {
        let mut ride = ride(Some(ChairId(7)));
        ride.evaluation = Some(e);
        Ok(StatusChange::new(ride, status(6, RideStatusType::Completed)))
    });
    rides.expect_fetch_completed_rides().returning(|_| Ok(vec![ride(Some(ChairId(7)))]));
    (accounts, rides)
}

fn register_evaluation(cfg: &mut ServiceConfig, accounts: MockAccountManager, rides: MockRideFlowManager, url: &str) {
    cfg.service(AppEvaluateRideRoute::<MockAccountManager, MockRideFlowManager>::new())
        .app_data(web::Data::new(AccountApi::new(accounts)))
        .app_data(web::Data::new(RideFlowApi::new(rides, NotificationHub::new())))
        .app_data(web::Data::new(gateway(url)));
}

#[actix_web::test]
async fn evaluation_settles_the_fare() {
    let _ = env_logger::try_init().ok();
    let server = HttpServer::new(|| {
        App::new().route(
            "/payments",
            web::post().to(|req: actix_web::HttpRequest| async move {
                let expected = format!("Bearer {PAYMENT_TOKEN}");
                match req.headers().get("Authorization").and_then(|v| v.to_str().ok()) {
                    Some(v) if v == expected => HttpResponse::NoContent().finish(),
                    _ => HttpResponse::Unauthorized().finish(),
                }
            }),
        )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("Could not bind fake gateway");
    let url = format!("http://{}", server.addrs()[0]);
    actix_web::rt::spawn(server.run());

    let (code, body) =
        post_request(Credentials::AppCookie(RIDER_TOKEN), "/app/rides/12/evaluation", json!({"evaluation": 4}), |cfg| {
            let (accounts, rides) = evaluation_backends(Some(PAYMENT_TOKEN), 1);
            register_evaluation(cfg, accounts, rides, &url);
        })
        .await
        .expect("Failed to make request");
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body, r#"{"completed_at":1729328400000}"#);
}

#[actix_web::test]
async fn unreachable_gateway_is_a_bad_gateway() {
    let _ = env_logger::try_init().ok();
    let (code, body) =
        post_request(Credentials::AppCookie(RIDER_TOKEN), "/app/rides/12/evaluation", json!({"evaluation": 4}), |cfg| {
            let (accounts, rides) = evaluation_backends(Some(PAYMENT_TOKEN), 1);
            // Nothing listens on the discard port
            register_evaluation(cfg, accounts, rides, "http://127.0.0.1:9");
        })
        .await
        .expect("Failed to make request");
    assert_eq!(code, StatusCode::BAD_GATEWAY);
    assert!(body.contains("Payment failed after 2 attempts"), "{body}");
}

#[actix_web::test]
async fn evaluation_needs_a_payment_token() {
    let _ = env_logger::try_init().ok();
    let (code, body) =
        post_request(Credentials::AppCookie(RIDER_TOKEN), "/app/rides/12/evaluation", json!({"evaluation": 4}), |cfg| {
            let (accounts, rides) = evaluation_backends(None, 0);
            register_evaluation(cfg, accounts, rides, "http://127.0.0.1:9");
        })
        .await
        .expect("Failed to make request");
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"payment token not registered"}"#);
}

#[actix_web::test]
async fn evaluation_out_of_range() {
    let _ = env_logger::try_init().ok();
    let (code, body) =
        post_request(Credentials::AppCookie(RIDER_TOKEN), "/app/rides/12/evaluation", json!({"evaluation": 6}), |cfg| {
            let (accounts, rides) = evaluation_backends(Some(PAYMENT_TOKEN), 0);
            register_evaluation(cfg, accounts, rides, "http://127.0.0.1:9");
        })
        .await
        .expect("Failed to make request");
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Could not read request body: evaluation must be between 1 and 5, not 6"}"#);
}

//----------------------------------------------   Notification  ----------------------------------------------------

fn configure_rider_notification(cfg: &mut ServiceConfig) {
    let mut notifications = MockNotificationManager::new();
    notifications.expect_rider_snapshot().with(eq(UserId(3))).returning(|_| {
        Ok(Some(RiderNotice {
            ride: ride(Some(ChairId(7))),
            status: status(3, RideStatusType::Enroute),
            chair: Some(chair()),
        }))
    });
    cfg.service(AppNotificationRoute::<MockAccountManager, MockNotificationManager>::new())
        .app_data(web::Data::new(AccountApi::new(known_accounts())))
        .app_data(web::Data::new(NotificationApi::new(notifications, NotificationHub::new(), 30)));
}

#[actix_web::test]
async fn rider_notification() {
    let _ = env_logger::try_init().ok();
    let (code, body) = get_request(Credentials::AppCookie(RIDER_TOKEN), "/app/notification", configure_rider_notification)
        .await
        .expect("Failed to make request");
    assert_eq!(code, StatusCode::OK);
    let expected = json!({
        "data": {
            "ride_id": 12,
            "pickup_coordinate": {"latitude": 0, "longitude": 0},
            "destination_coordinate": {"latitude": 3, "longitude": 4},
            "fare": 1200,
            "status": "ENROUTE",
            "chair": {"id": 7, "name": "Seven", "model": "Recliner"},
            "created_at": 1729328400000i64,
            "updated_at": 1729328400000i64
        },
        "retry_after_ms": 30
    });
    let actual: serde_json::Value = serde_json::from_str(&body).expect("Response is not JSON");
    assert_eq!(actual, expected);
}
