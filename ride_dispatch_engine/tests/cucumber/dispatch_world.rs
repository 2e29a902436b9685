use std::collections::HashMap;

use cucumber::World;
use log::*;
use ride_dispatch_engine::{
    db_types::{Chair, Ride, User},
    helpers::DispatchPolicy,
    test_utils::prepare_env::{create_database, random_db_path, run_migrations},
    AccountApi,
    MatchingApi,
    NotificationApi,
    NotificationHub,
    RideFlowApi,
    SqliteDatabase,
};

#[derive(Default, Debug, World)]
pub struct DispatchWorld {
    pub system: Option<DispatchSystem>,
    pub riders: HashMap<String, User>,
    pub chairs: HashMap<String, Chair>,
    pub rides: HashMap<String, Ride>,
    pub last_error: Option<String>,
}

#[derive(Debug)]
pub struct DispatchSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub hub: NotificationHub,
    pub accounts: AccountApi<SqliteDatabase>,
    pub matching: MatchingApi<SqliteDatabase>,
    pub rides: RideFlowApi<SqliteDatabase>,
    pub notifications: NotificationApi<SqliteDatabase>,
}

impl DispatchWorld {
    pub fn system(&self) -> &DispatchSystem {
        self.system.as_ref().expect("Dispatch system not initialised")
    }

    pub fn rider(&self, name: &str) -> &User {
        self.riders.get(name).unwrap_or_else(|| panic!("Unknown rider {name}"))
    }

    pub fn chair(&self, name: &str) -> &Chair {
        self.chairs.get(name).unwrap_or_else(|| panic!("Unknown chair {name}"))
    }

    pub fn ride(&self, name: &str) -> &Ride {
        self.rides.get(name).unwrap_or_else(|| panic!("Unknown ride {name}"))
    }
}

impl DispatchSystem {
    pub async fn new(policy: DispatchPolicy) -> Self {
        let db_path = prepare_test_env().await;
        let db = SqliteDatabase::new_with_url(&db_path, 5).await.expect("Error creating connection to database");
        debug!("Created database: {db_path}");
        let hub = NotificationHub::new();
        Self {
            accounts: AccountApi::new(db.clone()),
            matching: MatchingApi::new(db.clone(), hub.clone(), policy),
            rides: RideFlowApi::new(db.clone(), hub.clone()),
            notifications: NotificationApi::new(db.clone(), hub.clone(), 30),
            db_path,
            db,
            hub,
        }
    }
}

pub async fn prepare_test_env() -> String {
    let path = random_db_path();
    create_database(&path).await;
    run_migrations(&path).await;
    path
}
