pub mod booking;
pub mod payment;
pub mod review;
pub mod station;
