/// A rating left for a station after a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: i64,
    pub booking_id: i64,
    pub station_id: i64,
    pub user_id: i64,
    pub rating: u8,
    pub review: String,
}
