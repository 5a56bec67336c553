pub mod constants;
pub mod error;
pub mod types;

pub mod config;
pub mod observability;

// Read-only reference data
pub mod attribution;
pub mod catalog;
pub mod education;

// Application layer and its adapters
pub mod app;
pub mod infra;

// Per-user state
pub mod carousel;
pub mod session;

pub use error::{Result, StudioError};
