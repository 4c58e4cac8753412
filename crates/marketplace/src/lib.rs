mod domain;
mod inbound;
pub mod outbound;
mod usecase;

use std::sync::Arc;

pub use inbound::router::create_router;

use crate::inbound::state::MarketState;
use crate::outbound::checkout::CheckoutGateway;
use crate::outbound::store::MarketStore;
use crate::usecase::billing::BillingService;
use crate::usecase::booking::BookingService;
use crate::usecase::review::ReviewService;
use crate::usecase::station::StationService;

pub struct Dependency {
    pub store: Arc<dyn MarketStore>,
    pub checkout: Arc<dyn CheckoutGateway>,
}

pub fn new(dep: Dependency) -> MarketState {
    MarketState {
        station: Arc::new(StationService::new(dep.store.clone())),
        booking: Arc::new(BookingService::new(dep.store.clone())),
        review: Arc::new(ReviewService::new(dep.store.clone())),
        billing: Arc::new(BillingService::new(dep.store, dep.checkout)),
    }
}
