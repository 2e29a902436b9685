use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use payment_gateway::PaymentGatewayApi;
use ride_dispatch_engine::{AccountApi, NotificationApi, NotificationHub, RideFlowApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    matching_worker::start_matching_worker,
    routes::{
        health,
        AppCancelRideRoute,
        AppEvaluateRideRoute,
        AppNotificationRoute,
        AppRequestRideRoute,
        ChairActivityRoute,
        ChairCoordinateRoute,
        ChairNotificationRoute,
        ChairRideStatusRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let mut db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    }
    let gateway = PaymentGatewayApi::new(config.payment_gateway.clone())?;
    let hub = NotificationHub::new();
    let worker = if config.matching_interval.is_zero() {
        warn!("🕰️ The matching worker is disabled. Rides will not be matched to chairs.");
        None
    } else {
        Some(start_matching_worker(
            db.clone(),
            hub.clone(),
            config.dispatch_policy,
            config.matching_interval,
        ))
    };
    let srv = create_server_instance(config, db.clone(), hub.clone(), gateway)?;
    let handle = srv.handle();
    let signal_hub = hub.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("💻️ Could not listen for the shutdown signal. {e}");
            return;
        }
        info!("💻️ Shutting down. Closing notification streams.");
        // Open chair streams would otherwise hold up the graceful shutdown
        signal_hub.shutdown();
        handle.stop(true).await;
    });
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    hub.shutdown();
    if let Some(worker) = worker {
        worker.abort();
    }
    db.close().await.map_err(|e| ServerError::BackendError(e.to_string()))?;
    result
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    hub: NotificationHub,
    gateway: PaymentGatewayApi,
) -> Result<Server, ServerError> {
    let retry_after_ms = config.notification_retry_ms;
    let srv = HttpServer::new(move || {
        let accounts_api = AccountApi::new(db.clone());
        let ride_flow_api = RideFlowApi::new(db.clone(), hub.clone());
        let notification_api = NotificationApi::new(db.clone(), hub.clone(), retry_after_ms);
        let api_scope = web::scope("/api")
            .service(ChairActivityRoute::<SqliteDatabase>::new())
            .service(ChairCoordinateRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(ChairNotificationRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(ChairRideStatusRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(AppRequestRideRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(AppEvaluateRideRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(AppCancelRideRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(AppNotificationRoute::<SqliteDatabase, SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("rds::access_log"))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(ride_flow_api))
            .app_data(web::Data::new(notification_api))
            .app_data(web::Data::new(gateway.clone()))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .disable_signals()
    .bind((config.host.as_str(), config.port))?
    .run();
    info!("💻️ Ride dispatch server listening on {}:{}", config.host, config.port);
    Ok(srv)
}
