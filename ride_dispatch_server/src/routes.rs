//! Request handler definitions
//!
//! Define each route and its handler here. Chair endpoints live under `/api/chair`, rider endpoints under `/api/app`.
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (database calls, waiting on the
//! notification hub, calls to the payment gateway) must be awaited, never blocked on.
//!
//! The chair notification stream is the one long-lived response. Its future parks on the chair's slot in the
//! notification hub and is dropped when the client disconnects.
use actix_web::{
    get,
    http::header::{CacheControl, CacheDirective},
    web,
    HttpResponse,
    Responder,
};
use bytes::Bytes;
use dispatch_common::Secret;
use futures::{future::ready, stream, StreamExt};
use log::*;
use payment_gateway::PaymentGatewayApi;
use ride_dispatch_engine::{
    db_types::{Coordinate, RideId},
    AccountApi,
    AccountManagement,
    NotificationApi,
    NotificationManagement,
    RideFlowApi,
    RideFlowManagement,
};
use serde::Serialize;

use crate::{
    auth::{authenticated_chair, authenticated_user, AppSession, ChairSession},
    data_objects::{
        ChairActivityRequest,
        CoordinateResponse,
        EvaluationRequest,
        EvaluationResponse,
        RideRequest,
        RideRequestResponse,
        RideStatusRequest,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro.
// `route!(name => Method "/path" impl TraitA, TraitB)` registers `name::<TTraitA, TTraitB>`, so handler type
// parameters must be declared in the same order as the bounds.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Chair  ----------------------------------------------------
route!(chair_activity => Post "/chair/activity" impl AccountManagement);
/// Chairs switch themselves on and off duty. Only active chairs are considered by the matcher.
pub async fn chair_activity<A: AccountManagement>(
    session: ChairSession,
    body: web::Json<ChairActivityRequest>,
    accounts: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let chair = authenticated_chair(&session, accounts.as_ref()).await?;
    let is_active = body.into_inner().is_active;
    debug!("💻️ POST activity for {}: {is_active}", chair.id);
    accounts.set_chair_activity(chair.id, is_active).await?;
    Ok(HttpResponse::NoContent().finish())
}

route!(chair_coordinate => Post "/chair/coordinate" impl AccountManagement, RideFlowManagement);
/// Chairs report their position. Arriving at the pickup or the destination of the current ride moves the ride on.
pub async fn chair_coordinate<A: AccountManagement, R: RideFlowManagement>(
    session: ChairSession,
    body: web::Json<Coordinate>,
    accounts: web::Data<AccountApi<A>>,
    rides: web::Data<RideFlowApi<R>>,
) -> Result<HttpResponse, ServerError> {
    let chair = authenticated_chair(&session, accounts.as_ref()).await?;
    let coordinate = body.into_inner();
    trace!("💻️ POST coordinate for {}: {coordinate}", chair.id);
    let update = rides.report_location(chair.id, coordinate).await?;
    if let Some(change) = &update.change {
        debug!("💻️ {} moved {} to {}", chair.id, change.ride.id, change.status.status);
    }
    Ok(HttpResponse::Ok().json(CoordinateResponse::new(update.location.created_at)))
}

route!(chair_notification => Get "/chair/notification" impl AccountManagement, NotificationManagement);
/// The chair's notification stream.
///
/// The first frame is a snapshot of the chair's current ride (or `null` data if it has none). Every later frame is an
/// event taken from the chair's slot in the notification hub. The stream ends when the server shuts down.
pub async fn chair_notification<A: AccountManagement, N: NotificationManagement + 'static>(
    session: ChairSession,
    accounts: web::Data<AccountApi<A>>,
    notifications: web::Data<NotificationApi<N>>,
) -> Result<HttpResponse, ServerError> {
    let chair = authenticated_chair(&session, accounts.as_ref()).await?;
    debug!("💻️ {} subscribed to notifications", chair.id);
    let snapshot = notifications.chair_snapshot(chair.id).await?;
    let head = stream::once(ready(sse_frame(&snapshot)));
    let tail = stream::unfold((notifications, chair.id), |(api, chair_id)| async move {
        match api.next_chair_notification(chair_id).await {
            Ok(Some(notification)) => Some((sse_frame(&notification), (api, chair_id))),
            Ok(None) => None,
            Err(e) => {
                warn!("💻️ Ending the notification stream for {chair_id}. {e}");
                None
            },
        }
    });
    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(CacheControl(vec![CacheDirective::NoCache]))
        .streaming(head.chain(tail)))
}

/// One server-sent event carrying `message` as JSON.
pub fn sse_frame<T: Serialize>(message: &T) -> Result<Bytes, ServerError> {
    let json = serde_json::to_string(message).map_err(|e| ServerError::Unspecified(e.to_string()))?;
    Ok(Bytes::from(format!("data: {json}\n\n")))
}

route!(chair_ride_status => Post "/chair/rides/{ride_id}/status" impl AccountManagement, RideFlowManagement);
/// Chairs report that they have set off for the pickup (`ENROUTE`) or that the rider is on board (`CARRYING`).
pub async fn chair_ride_status<A: AccountManagement, R: RideFlowManagement>(
    session: ChairSession,
    path: web::Path<i64>,
    body: web::Json<RideStatusRequest>,
    accounts: web::Data<AccountApi<A>>,
    rides: web::Data<RideFlowApi<R>>,
) -> Result<HttpResponse, ServerError> {
    let chair = authenticated_chair(&session, accounts.as_ref()).await?;
    let ride_id = RideId(path.into_inner());
    let status = body.into_inner().status;
    debug!("💻️ POST {status} for {ride_id} from {}", chair.id);
    rides.update_ride_status(chair.id, ride_id, status).await?;
    Ok(HttpResponse::NoContent().finish())
}

//----------------------------------------------   Rider  ----------------------------------------------------
route!(app_request_ride => Post "/app/rides" impl AccountManagement, RideFlowManagement);
/// Riders request a ride. The fare is quoted immediately; the ride is matched to a chair later.
pub async fn app_request_ride<A: AccountManagement, R: RideFlowManagement>(
    session: AppSession,
    body: web::Json<RideRequest>,
    accounts: web::Data<AccountApi<A>>,
    rides: web::Data<RideFlowApi<R>>,
) -> Result<HttpResponse, ServerError> {
    let user = authenticated_user(&session, accounts.as_ref()).await?;
    let RideRequest { pickup_coordinate, destination_coordinate } = body.into_inner();
    debug!("💻️ POST ride request from {}", user.id);
    let change = rides.request_ride(user.id, pickup_coordinate, destination_coordinate).await?;
    Ok(HttpResponse::Accepted().json(RideRequestResponse { ride_id: change.ride.id, fare: change.ride.fare }))
}

route!(app_evaluate_ride => Post "/app/rides/{ride_id}/evaluation" impl AccountManagement, RideFlowManagement);
/// Riders rate an arrived ride. This completes the ride and charges the fare through the payment gateway.
///
/// The ride stays `COMPLETED` if the charge cannot be settled; the rider gets a 502 in that case.
pub async fn app_evaluate_ride<A: AccountManagement, R: RideFlowManagement>(
    session: AppSession,
    path: web::Path<i64>,
    body: web::Json<EvaluationRequest>,
    accounts: web::Data<AccountApi<A>>,
    rides: web::Data<RideFlowApi<R>>,
    gateway: web::Data<PaymentGatewayApi>,
) -> Result<HttpResponse, ServerError> {
    let user = authenticated_user(&session, accounts.as_ref()).await?;
    let ride_id = RideId(path.into_inner());
    let evaluation = body.into_inner().evaluation;
    debug!("💻️ POST evaluation of {evaluation} for {ride_id} from {}", user.id);
    let token = accounts
        .payment_token(user.id)
        .await?
        .ok_or_else(|| ServerError::InvalidState("payment token not registered".into()))?;
    let change = rides.evaluate_ride(user.id, ride_id, evaluation).await?;
    let ride_api = rides.get_ref();
    let user_id = user.id;
    gateway.settle_ride(&Secret::new(token), change.ride.fare, move || ride_api.completed_rides(user_id)).await?;
    Ok(HttpResponse::Ok().json(EvaluationResponse::new(change.status.created_at)))
}

route!(app_cancel_ride => Post "/app/rides/{ride_id}/cancel" impl AccountManagement, RideFlowManagement);
pub async fn app_cancel_ride<A: AccountManagement, R: RideFlowManagement>(
    session: AppSession,
    path: web::Path<i64>,
    accounts: web::Data<AccountApi<A>>,
    rides: web::Data<RideFlowApi<R>>,
) -> Result<HttpResponse, ServerError> {
    let user = authenticated_user(&session, accounts.as_ref()).await?;
    let ride_id = RideId(path.into_inner());
    debug!("💻️ POST cancel {ride_id} from {}", user.id);
    rides.cancel_ride(user.id, ride_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

route!(app_notification => Get "/app/notification" impl AccountManagement, NotificationManagement);
/// Riders poll for the state of their latest ride.
pub async fn app_notification<A: AccountManagement, N: NotificationManagement>(
    session: AppSession,
    accounts: web::Data<AccountApi<A>>,
    notifications: web::Data<NotificationApi<N>>,
) -> Result<HttpResponse, ServerError> {
    let user = authenticated_user(&session, accounts.as_ref()).await?;
    trace!("💻️ GET notification for {}", user.id);
    let notification = notifications.rider_notification(user.id).await?;
    Ok(HttpResponse::Ok().json(notification))
}
