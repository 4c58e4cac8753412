//! The payment-service port. The real PSP integration lives behind this
//! trait; the local implementation mints deterministic checkout URLs so
//! the rest of the flow works without external credentials.

use app_core::error::AppError;

#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub payment_id: i64,
    pub booking_id: i64,
    pub amount: i64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Creates a hosted checkout session and returns its URL.
    async fn create_session(&self, request: CheckoutSessionRequest) -> Result<String, AppError>;
}

pub struct LocalCheckoutGateway {
    base_url: String,
}

impl LocalCheckoutGateway {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }
}

#[async_trait::async_trait]
impl CheckoutGateway for LocalCheckoutGateway {
    async fn create_session(&self, request: CheckoutSessionRequest) -> Result<String, AppError> {
        Ok(format!(
            "{}/session/{}?booking={}&amount={}&currency={}",
            self.base_url, request.payment_id, request.booking_id, request.amount, request.currency
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_session_url_is_rooted_at_the_base() {
        let gateway = LocalCheckoutGateway::new("https://pay.example.com".to_string());
        let url = gateway
            .create_session(CheckoutSessionRequest {
                payment_id: 7,
                booking_id: 3,
                amount: 2500,
                currency: "usd".to_string(),
                success_url: "https://app.example.com/success".to_string(),
                cancel_url: "https://app.example.com/cancel".to_string(),
            })
            .await
            .unwrap();

        assert!(url.starts_with("https://pay.example.com/session/7"));
        assert!(url.contains("amount=2500"));
    }
}
