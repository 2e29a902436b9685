//! Per-chair status notifications.
//!
//! Every status a ride moves into is published to the [`NotificationHub`] under the ride's chair. The hub keeps a single
//! pending slot per chair, so a chair that falls behind only ever sees the newest status.
mod event_types;
mod hub;

pub use event_types::ChairEvent;
pub use hub::NotificationHub;
