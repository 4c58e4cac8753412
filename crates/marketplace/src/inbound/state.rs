use std::sync::Arc;

use crate::usecase::billing::BillingUseCase;
use crate::usecase::booking::BookingUseCase;
use crate::usecase::review::ReviewUseCase;
use crate::usecase::station::StationUseCase;

#[derive(Clone)]
pub struct MarketState {
    pub station: Arc<dyn StationUseCase>,
    pub booking: Arc<dyn BookingUseCase>,
    pub review: Arc<dyn ReviewUseCase>,
    pub billing: Arc<dyn BillingUseCase>,
}
