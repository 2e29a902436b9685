use std::time::Duration;

use log::*;

const DEFAULT_GATEWAY_URL: &str = "http://localhost:12345";
const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_RETRY_DELAY_MS: u64 = 100;

#[derive(Debug, Clone)]
pub struct PaymentGatewayConfig {
    /// Base URL of the gateway, without the `/payments` path.
    pub url: String,
    pub max_attempts: u32,
    /// Pause between consecutive attempts.
    pub retry_delay: Duration,
}

impl Default for PaymentGatewayConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GATEWAY_URL.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl PaymentGatewayConfig {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self { url: url.into(), ..Default::default() }
    }

    pub fn with_retries(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    pub fn new_from_env_or_default() -> Self {
        let url = std::env::var("RDS_PAYMENT_GATEWAY_URL").unwrap_or_else(|_| {
            warn!("💳️ RDS_PAYMENT_GATEWAY_URL not set, using {DEFAULT_GATEWAY_URL} as default");
            DEFAULT_GATEWAY_URL.to_string()
        });
        let max_attempts = std::env::var("RDS_PAYMENT_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| {
                s.parse::<u32>()
                    .map_err(|e| warn!("💳️ Invalid RDS_PAYMENT_MAX_ATTEMPTS value, {s}: {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);
        let retry_delay = std::env::var("RDS_PAYMENT_RETRY_DELAY_MS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("💳️ Invalid RDS_PAYMENT_RETRY_DELAY_MS value, {s}: {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_RETRY_DELAY_MS);
        Self::new(url).with_retries(max_attempts, Duration::from_millis(retry_delay))
    }
}
