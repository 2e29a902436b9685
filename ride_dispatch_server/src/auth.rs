//! Access token extraction for chair and rider endpoints.
//!
//! Clients present their access token either in a session cookie (`chair_session` for chairs, `app_session` for
//! riders) or as an `Authorization: Bearer` header. The cookie wins if both are sent. Extraction only reads the token;
//! the handler resolves it to an account through [`AccountApi`], since that is where the storage backend lives.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, FromRequest, HttpRequest};
use dispatch_common::Secret;
use log::*;
use ride_dispatch_engine::{
    db_types::{Chair, User},
    AccountApi,
    AccountManagement,
};

use crate::errors::ServerError;

pub const CHAIR_SESSION_COOKIE: &str = "chair_session";
pub const APP_SESSION_COOKIE: &str = "app_session";

/// The access token a chair sent with its request.
#[derive(Debug, Clone)]
pub struct ChairSession(pub Secret<String>);

/// The access token a rider sent with its request.
#[derive(Debug, Clone)]
pub struct AppSession(pub Secret<String>);

fn extract_token(req: &HttpRequest, cookie_name: &str) -> Result<Secret<String>, ServerError> {
    if let Some(cookie) = req.cookie(cookie_name).filter(|c| !c.value().is_empty()) {
        return Ok(Secret::new(cookie.value().to_string()));
    }
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| Secret::new(t.to_string()))
        .ok_or_else(|| {
            trace!("💻️ No access token in request to {}", req.path());
            ServerError::Unauthorized(format!("{cookie_name} cookie is required"))
        })
}

impl FromRequest for ChairSession {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(extract_token(req, CHAIR_SESSION_COOKIE).map(Self))
    }
}

impl FromRequest for AppSession {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(extract_token(req, APP_SESSION_COOKIE).map(Self))
    }
}

pub async fn authenticated_chair<B: AccountManagement>(
    session: &ChairSession,
    api: &AccountApi<B>,
) -> Result<Chair, ServerError> {
    api.chair_by_token(session.0.reveal()).await?.ok_or_else(|| {
        debug!("💻️ Rejected an unknown chair access token");
        ServerError::Unauthorized("invalid access token".into())
    })
}

pub async fn authenticated_user<B: AccountManagement>(
    session: &AppSession,
    api: &AccountApi<B>,
) -> Result<User, ServerError> {
    api.user_by_token(session.0.reveal()).await?.ok_or_else(|| {
        debug!("💻️ Rejected an unknown rider access token");
        ServerError::Unauthorized("invalid access token".into())
    })
}
