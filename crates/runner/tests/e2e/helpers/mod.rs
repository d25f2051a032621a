//! Shared E2E test helpers.

pub mod scenarios;
pub mod topology;
