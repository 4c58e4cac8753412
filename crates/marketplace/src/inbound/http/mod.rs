pub mod billing;
pub mod booking;
pub mod review;
pub mod station;
