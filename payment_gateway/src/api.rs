use std::{fmt::Display, future::Future, sync::Arc};

use dispatch_common::{Fare, Secret};
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    StatusCode,
};

use crate::{
    config::PaymentGatewayConfig,
    data_objects::{GatewayPayment, PaymentRequest},
    PaymentGatewayError,
};

#[derive(Clone)]
pub struct PaymentGatewayApi {
    config: PaymentGatewayConfig,
    client: Arc<Client>,
}

impl std::fmt::Debug for PaymentGatewayApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentGatewayApi ({})", self.config.url)
    }
}

impl PaymentGatewayApi {
    pub fn new(config: PaymentGatewayConfig) -> Result<Self, PaymentGatewayError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| PaymentGatewayError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &PaymentGatewayConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.url.trim_end_matches('/'))
    }

    /// Asks the gateway to charge `amount` to the holder of `token`. Any 2xx reply counts as success.
    pub async fn post_payment(&self, token: &Secret<String>, amount: Fare) -> Result<(), PaymentGatewayError> {
        let url = self.url("/payments");
        trace!("💳️ POST {url} for {amount}");
        let response = self
            .client
            .post(url)
            .bearer_auth(token.reveal())
            .json(&PaymentRequest { amount })
            .send()
            .await
            .map_err(|e| PaymentGatewayError::RequestError(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ Payment accepted. {}", response.status());
            Ok(())
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(PaymentGatewayError::QueryError { status, message })
        }
    }

    /// The gateway's record of every payment charged to the holder of `token`.
    pub async fn list_payments(&self, token: &Secret<String>) -> Result<Vec<GatewayPayment>, PaymentGatewayError> {
        let url = self.url("/payments");
        trace!("💳️ GET {url}");
        let response = self
            .client
            .get(url)
            .bearer_auth(token.reveal())
            .send()
            .await
            .map_err(|e| PaymentGatewayError::RequestError(e.to_string()))?;
        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentGatewayError::QueryError { status, message });
        }
        response.json::<Vec<GatewayPayment>>().await.map_err(|e| PaymentGatewayError::JsonError(e.to_string()))
    }

    /// Charges the fare for a completed ride, reconciling against the gateway's records when the outcome of the charge
    /// is unclear.
    ///
    /// `list_completed_rides` must return every completed ride of the rider, including the one being paid for. It is
    /// called afresh on every attempt that needs to reconcile.
    pub async fn settle_ride<F, Fut, T, E>(
        &self,
        token: &Secret<String>,
        amount: Fare,
        list_completed_rides: F,
    ) -> Result<(), PaymentGatewayError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
        E: Display,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut last_error = None;
        for attempt in 1..=max_attempts {
            match self.try_settle(token, amount, &list_completed_rides).await {
                Ok(()) => {
                    info!("💳️ Payment of {amount} settled on attempt {attempt}");
                    return Ok(());
                },
                Err(e) => {
                    warn!("💳️ Payment attempt {attempt}/{max_attempts} failed. {e}");
                    last_error = Some(e);
                },
            }
            if attempt < max_attempts {
                tokio::time::sleep(self.config.retry_delay).await;
            }
        }
        let last = last_error.unwrap_or_else(|| PaymentGatewayError::RequestError("no attempt was made".into()));
        error!("💳️ Giving up on payment of {amount} after {max_attempts} attempts");
        Err(PaymentGatewayError::RetriesExhausted { attempts: max_attempts, last: Box::new(last) })
    }

    async fn try_settle<F, Fut, T, E>(
        &self,
        token: &Secret<String>,
        amount: Fare,
        list_completed_rides: &F,
    ) -> Result<(), PaymentGatewayError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
        E: Display,
    {
        match self.post_payment(token, amount).await {
            Ok(()) => return Ok(()),
            // No reply at all. Nothing to reconcile against yet
            Err(e @ PaymentGatewayError::RequestError(_)) => return Err(e),
            Err(e) => debug!("💳️ Payment request was not accepted ({e}). Checking the gateway's records."),
        }
        let payments = self.list_payments(token).await?;
        let rides = list_completed_rides().await.map_err(|e| PaymentGatewayError::RideListing(e.to_string()))?;
        if payments.len() == rides.len() {
            debug!("💳️ The gateway has recorded the payment ({} payments for {} rides)", payments.len(), rides.len());
            Ok(())
        } else {
            Err(PaymentGatewayError::PaymentCountMismatch { recorded: payments.len(), expected: rides.len() })
        }
    }
}
