//! Listing wizard state, geocoding proxy, and backend query layer for the
//! property marketplace.

pub mod config;
pub mod error;
pub mod geo;
pub mod listing;
pub mod query;
pub mod telemetry;
