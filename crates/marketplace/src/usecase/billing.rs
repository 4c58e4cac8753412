//! Checkout-session creation and the per-user dashboard aggregate.

use std::sync::Arc;

use app_core::error::AppError;
use async_trait::async_trait;

use crate::domain::booking::Booking;
use crate::domain::payment::Payment;
use crate::domain::review::Review;
use crate::outbound::checkout::{CheckoutGateway, CheckoutSessionRequest};
use crate::outbound::store::{MarketStore, NewPayment};

#[derive(Debug, Clone)]
pub struct CheckoutInput {
    pub booking_id: i64,
    pub amount: i64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub bookings: Vec<Booking>,
    pub payments: Vec<Payment>,
    pub reviews: Vec<Review>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BillingUseCase: Send + Sync {
    /// Records a pending payment and returns the hosted checkout URL.
    async fn checkout(&self, input: CheckoutInput) -> Result<String, AppError>;

    async fn dashboard(&self, user_id: i64) -> Result<Dashboard, AppError>;
}

pub struct BillingService {
    store: Arc<dyn MarketStore>,
    gateway: Arc<dyn CheckoutGateway>,
}

impl BillingService {
    pub fn new(store: Arc<dyn MarketStore>, gateway: Arc<dyn CheckoutGateway>) -> Self {
        Self { store, gateway }
    }
}

#[async_trait]
impl BillingUseCase for BillingService {
    async fn checkout(&self, input: CheckoutInput) -> Result<String, AppError> {
        let payment = self
            .store
            .create_payment(NewPayment {
                booking_id: input.booking_id,
                amount: input.amount,
                currency: input.currency.clone(),
            })
            .await?;

        self.gateway
            .create_session(CheckoutSessionRequest {
                payment_id: payment.id,
                booking_id: input.booking_id,
                amount: input.amount,
                currency: input.currency,
                success_url: input.success_url,
                cancel_url: input.cancel_url,
            })
            .await
    }

    async fn dashboard(&self, user_id: i64) -> Result<Dashboard, AppError> {
        Ok(Dashboard {
            bookings: self.store.bookings_for_user(user_id).await?,
            payments: self.store.payments_for_user(user_id).await?,
            reviews: self.store.reviews_by_user(user_id).await?,
        })
    }
}
