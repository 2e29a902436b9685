//! Client for the external ride payment gateway.
//!
//! The gateway is unreliable: a charge can be applied even when the `POST` that requested it fails or times out.
//! [`PaymentGatewayApi::settle_ride`] resolves that ambiguity by comparing the gateway's own payment records with the
//! rider's completed rides, and retries the whole exchange a bounded number of times.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::PaymentGatewayApi;
pub use config::PaymentGatewayConfig;
pub use data_objects::{GatewayPayment, PaymentRequest};
pub use error::PaymentGatewayError;
