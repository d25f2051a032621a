#![doc = include_str!("../README.md")]

pub mod context;
pub mod error;
pub mod expect;
pub mod fixture;
pub mod poll;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod step;
pub mod testing;

pub use context::{Probe, ScenarioContext};
pub use error::RunnerError;
pub use expect::{AssertionFailure, CountExpectation, Expectation};
pub use fixture::{FixtureId, FixtureStack};
pub use poll::{
    OutcomeCounts, PollPolicy, Poller, Sample, StopWhen, WaitStrategy, poll, poll_with, wait_until,
};
pub use report::{
    CommandRecord, CommandStatus, Phase, PollRecord, ScenarioOutcome, ScenarioReport,
    SuiteReport, TeardownSummary,
};
pub use runner::{RunnerSettings, ScenarioRunner};
pub use scenario::{DynScenario, Scenario, matches_filter};
pub use step::Step;
