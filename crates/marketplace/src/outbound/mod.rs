pub mod checkout;
pub mod memory;
pub mod store;
