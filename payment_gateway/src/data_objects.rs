use dispatch_common::Fare;
use serde::{Deserialize, Serialize};

/// Body of `POST /payments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: Fare,
}

/// One entry of the gateway's `GET /payments` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayPayment {
    pub amount: Fare,
    pub status: String,
}
