//! Ride Dispatch Engine
//!
//! The dispatch engine is the core of a ride-hailing service. It quotes fares, matches waiting riders to free chairs,
//! moves every ride through its status lifecycle, and tells each chair about its ride as the ride progresses.
//!
//! The library is divided into these main sections:
//! 1. Storage ([`mod@traits`] and, with the `sqlite` feature, [`SqliteDatabase`]). Backends implement the traits in
//!    [`mod@traits`]. The data types they store live in [`mod@db_types`] and are public.
//! 2. Pure dispatch logic ([`mod@helpers`]): the cost model, the ride state machine and the matching planner. None of
//!    it touches storage, so it is straightforward to test in isolation.
//! 3. Chair notifications ([`mod@events`]): a [`NotificationHub`] with one coalescing slot per chair.
//! 4. The public API ([`mod@rde_api`]), which ties a backend and the hub together. This is what the server uses.
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod rde_api;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use events::{ChairEvent, NotificationHub};
pub use rde_api::{
    accounts_api::AccountApi,
    matching_api::MatchingApi,
    notification_api::NotificationApi,
    notification_objects,
    ride_flow_api::RideFlowApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    AccountApiError,
    AccountManagement,
    DispatchError,
    DispatchManagement,
    NotificationError,
    NotificationManagement,
    RideFlowError,
    RideFlowManagement,
};
