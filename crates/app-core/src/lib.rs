//! Shared application plumbing: configuration, error handling, extractors,
//! session management and the OAuth provider adapters.

pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod oauth;
pub mod session;
