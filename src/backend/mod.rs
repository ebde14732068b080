//! Clients for the REST backend that fronts the record table.

pub mod rest;
pub mod util;

pub use rest::RestStore;
