use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::*;
use payment_gateway::PaymentGatewayError;
use ride_dispatch_engine::{AccountApiError, DispatchError, NotificationError, RideFlowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Payment could not be settled. {0}")]
    PaymentFailed(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidState(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PaymentFailed(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<RideFlowError> for ServerError {
    fn from(e: RideFlowError) -> Self {
        match e {
            RideFlowError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            RideFlowError::RideNotFound(_) => Self::NoRecordFound(e.to_string()),
            RideFlowError::NotAssigned => Self::InvalidState(e.to_string()),
            RideFlowError::NotOwner => Self::InvalidState(e.to_string()),
            RideFlowError::InvalidState(_) => Self::InvalidState(e.to_string()),
            RideFlowError::InvalidEvaluation(_) => Self::InvalidRequestBody(e.to_string()),
            RideFlowError::RideInProgress => Self::Conflict(e.to_string()),
        }
    }
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        match e {
            AccountApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            AccountApiError::ChairNotFound(_) | AccountApiError::UserNotFound(_) => Self::NoRecordFound(e.to_string()),
            AccountApiError::AccountExists(_) => Self::Conflict(e.to_string()),
        }
    }
}

impl From<NotificationError> for ServerError {
    fn from(e: NotificationError) -> Self {
        Self::BackendError(e.to_string())
    }
}

impl From<DispatchError> for ServerError {
    fn from(e: DispatchError) -> Self {
        Self::BackendError(e.to_string())
    }
}

impl From<PaymentGatewayError> for ServerError {
    fn from(e: PaymentGatewayError) -> Self {
        match e {
            PaymentGatewayError::Initialization(e) => Self::InitializeError(e),
            e => {
                warn!("💳️ Settlement failed. {e}");
                Self::PaymentFailed(e.to_string())
            },
        }
    }
}
