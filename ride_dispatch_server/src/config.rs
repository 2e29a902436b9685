use std::{env, time::Duration};

use dispatch_common::parse_boolean_flag;
use log::*;
use payment_gateway::PaymentGatewayConfig;
use ride_dispatch_engine::helpers::{DispatchPolicy, DEFAULT_CHAIR_SPEED, DEFAULT_MAX_DISPATCH_RADIUS};

const DEFAULT_RDS_HOST: &str = "127.0.0.1";
const DEFAULT_RDS_PORT: u16 = 8380;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/ride_dispatch.db";
const DEFAULT_MATCHING_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_NOTIFICATION_RETRY_MS: u64 = 30;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// If true, pending migrations are applied to the database before the server starts.
    pub run_migrations: bool,
    /// Time between matching passes. A zero interval disables the background matcher.
    pub matching_interval: Duration,
    pub dispatch_policy: DispatchPolicy,
    /// The `retry_after_ms` hint sent with every notification.
    pub notification_retry_ms: u64,
    pub payment_gateway: PaymentGatewayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RDS_HOST.to_string(),
            port: DEFAULT_RDS_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            run_migrations: true,
            matching_interval: DEFAULT_MATCHING_INTERVAL,
            dispatch_policy: DispatchPolicy::default(),
            notification_retry_ms: DEFAULT_NOTIFICATION_RETRY_MS,
            payment_gateway: PaymentGatewayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("RDS_HOST").ok().unwrap_or_else(|| DEFAULT_RDS_HOST.into());
        let port = env::var("RDS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for RDS_PORT. {e} Using the default, {DEFAULT_RDS_PORT}, instead."
                    );
                    DEFAULT_RDS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_RDS_PORT);
        let database_url = env::var("RDS_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ RDS_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let run_migrations = parse_boolean_flag(env::var("RDS_RUN_MIGRATIONS").ok(), true);
        let matching_interval = configure_matching_interval();
        let dispatch_policy = configure_dispatch_policy();
        let notification_retry_ms =
            parse_env_number("RDS_NOTIFICATION_RETRY_MS", DEFAULT_NOTIFICATION_RETRY_MS, |_| true);
        let payment_gateway = PaymentGatewayConfig::new_from_env_or_default();
        Self {
            host,
            port,
            database_url,
            run_migrations,
            matching_interval,
            dispatch_policy,
            notification_retry_ms,
            payment_gateway,
        }
    }
}

fn configure_matching_interval() -> Duration {
    let ms = parse_env_number("RDS_MATCHING_INTERVAL_MS", DEFAULT_MATCHING_INTERVAL.as_millis() as u64, |_| true);
    if ms == 0 {
        info!("🪛️ RDS_MATCHING_INTERVAL_MS is 0. The background matcher is disabled.");
    }
    Duration::from_millis(ms)
}

fn configure_dispatch_policy() -> DispatchPolicy {
    let max_dispatch_radius =
        parse_env_number("RDS_MAX_DISPATCH_RADIUS", DEFAULT_MAX_DISPATCH_RADIUS, |r: &i64| *r >= 0);
    let default_speed = parse_env_number("RDS_DEFAULT_CHAIR_SPEED", DEFAULT_CHAIR_SPEED, |s: &i64| *s > 0);
    if max_dispatch_radius == 0 {
        info!("🪛️ Chairs will be dispatched to rides at any distance.");
    }
    DispatchPolicy { max_dispatch_radius, default_speed }
}

/// Reads a numeric variable. Unset, unparseable and rejected values all fall back to `default`.
fn parse_env_number<T, F>(name: &str, default: T, accept: F) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
    T::Err: std::fmt::Display,
    F: Fn(&T) -> bool,
{
    env::var(name)
        .map_err(|_| debug!("🪛️ {name} is not set. Using the default value of {default}."))
        .and_then(|s| s.trim().parse::<T>().map_err(|e| warn!("🪛️ Invalid configuration value for {name}. {e}")))
        .and_then(|v| {
            if accept(&v) {
                Ok(v)
            } else {
                error!("🪛️ {v} is out of range for {name}. Using the default, {default}, instead.");
                Err(())
            }
        })
        .ok()
        .unwrap_or(default)
}
