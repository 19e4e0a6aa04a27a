//! Shared types used across the enrollment saga crates.

pub mod types;

pub use types::TransactionId;
