//! # Ride dispatch server
//! The HTTP front end of the ride dispatch engine. It is responsible for:
//! * Authenticating chairs and riders by their access tokens.
//! * Accepting ride requests, chair positions and ride status updates.
//! * Streaming ride updates to chairs, and answering rider polls.
//! * Running the matching worker, which pairs waiting rides with free chairs.
//! * Settling fares with the payment gateway when a rider rates a ride.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/chair/...`: Chair endpoints (`chair_session` cookie or bearer token).
//! * `/api/app/...`: Rider endpoints (`app_session` cookie or bearer token).
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod matching_worker;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
