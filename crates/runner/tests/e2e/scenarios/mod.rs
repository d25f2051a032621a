//! E2E test scenarios, one module per lifecycle concern.

mod polling;
mod readiness;
mod suite;
mod teardown;
