use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach the payment gateway: {0}")]
    RequestError(String),
    #[error("Payment gateway replied with status {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("The gateway has {recorded} payments on record, but there are {expected} completed rides")]
    PaymentCountMismatch { recorded: usize, expected: usize },
    #[error("Could not list completed rides: {0}")]
    RideListing(String),
    #[error("Payment failed after {attempts} attempts. Last error: {last}")]
    RetriesExhausted { attempts: u32, last: Box<PaymentGatewayError> },
}
