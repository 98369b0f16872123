//! Application layer - error types shared by the store and its adapters

pub mod error;

pub use error::StoreError;
