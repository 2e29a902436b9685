//! # Ride dispatch public API
//!
//! The `rde_api` module exposes the programmatic API of the dispatch core. Each API wraps a storage backend that
//! implements the traits it needs, so callers only pull in the functionality they use.
//!
//! * [`matching_api`] runs matching passes and announces new assignments to chairs.
//! * [`ride_flow_api`] records ride requests, chair positions and explicit status changes, and announces every new
//!   status to the ride's chair.
//! * [`notification_api`] builds the chair and rider notification payloads, and waits on the chair's slot.
//! * [`accounts_api`] covers credential lookups, chair activity and payment tokens.
//!
//! The APIs that publish or consume chair events share a single [`crate::events::NotificationHub`], which the
//! service that builds them owns.
//!
//! ```rust,ignore
//! let db = SqliteDatabase::new_with_url(url, 25).await?;
//! let hub = NotificationHub::new();
//! let rides = RideFlowApi::new(db.clone(), hub.clone());
//! let change = rides.request_ride(user_id, pickup, destination).await?;
//! ```

pub mod accounts_api;
pub mod matching_api;
pub mod notification_api;
pub mod notification_objects;
pub mod ride_flow_api;
