//! E2E tests for the scenario runner.
//!
//! These tests drive whole scenarios against scripted hosts and check the
//! lifecycle guarantees: teardown ordering, exactly-once cleanup, poll
//! counting, readiness waits, and suite-level sequencing.
//!
//! # Test Structure
//!
//! - `helpers/` -- scripted topologies and small scenario implementations
//! - `scenarios/` -- test files organized by lifecycle concern
//!
//! # Running
//!
//! ```bash
//! cargo test -p trustcheck-runner --test e2e
//! ```

mod helpers;
mod scenarios;
