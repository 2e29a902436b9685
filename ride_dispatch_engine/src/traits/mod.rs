//! # Storage backends
//!
//! The traits in this module are the contracts a storage backend has to fulfil to drive the dispatch engine.
//!
//! * [`AccountManagement`] looks up users and chairs by their access credentials, and stores the little account
//!   state the core needs (chair models, activity flags, payment tokens).
//! * [`DispatchManagement`] runs a complete matching pass atomically.
//! * [`RideFlowManagement`] records new rides and applies ride lifecycle transitions.
//! * [`NotificationManagement`] reads what chairs and riders need to be told, and records chair deliveries.
//!
//! All the transition and matching *rules* live in [`crate::helpers`]. Backends are responsible for running them
//! against a consistent, write-locked view of the data.
mod account_management;
mod data_objects;
mod dispatch_management;
mod notification_management;
mod ride_flow_management;

pub use account_management::{AccountApiError, AccountManagement};
pub use data_objects::{ChairNotice, DispatchOutcome, LocationUpdate, RiderNotice, StatusChange};
pub use dispatch_management::{DispatchError, DispatchManagement};
pub use notification_management::{NotificationError, NotificationManagement};
pub use ride_flow_management::{RideFlowError, RideFlowManagement};
