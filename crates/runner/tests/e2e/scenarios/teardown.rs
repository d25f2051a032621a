//! Teardown guarantees: reverse order, exactly once, best effort.

use trustcheck_core::types::HostRole;
use trustcheck_runner::report::{CommandStatus, Phase, ScenarioOutcome};
use trustcheck_runner::runner::ScenarioRunner;
use trustcheck_runner::testing::{Reply, ScriptedHost};

use crate::helpers::scenarios::{Ending, ThreeFixtures};
use crate::helpers::topology::{fast_settings, lab, quiet_lab};

fn three(ending: Ending) -> ThreeFixtures {
    ThreeFixtures {
        name: "three",
        ending,
    }
}

/// Passing scenario -> fixtures removed in reverse creation order.
#[tokio::test]
async fn test_e2e_teardown_runs_in_reverse_order() {
    // Given: a quiet lab
    let lab = quiet_lab();
    let runner = ScenarioRunner::new(lab.topology.clone(), fast_settings());

    // When: running a scenario that creates three fixtures
    let report = runner.run(&three(Ending::Pass)).await;

    // Then: passed, and deletes ran third, second, first
    assert_eq!(report.outcome, ScenarioOutcome::Passed);
    let third = lab.master.position("group-del third").expect("third deleted");
    let second = lab.master.position("group-del second").expect("second deleted");
    let first = lab.master.position("group-del first").expect("first deleted");
    assert!(third < second && second < first, "{:?}", lab.master.history());
    assert_eq!(report.teardown.executed, 3);
    assert_eq!(report.teardown.failed, 0);
    assert_eq!(report.phases.last(), Some(&Phase::Teardown));
}

/// Assertion failure -> verdict is Failed and teardown still runs once.
#[tokio::test]
async fn test_e2e_assertion_failure_still_tears_down() {
    let lab = quiet_lab();
    let runner = ScenarioRunner::new(lab.topology.clone(), fast_settings());

    let report = runner.run(&three(Ending::AssertionFailure)).await;

    match &report.outcome {
        ScenarioOutcome::Failed { failure } => {
            assert_eq!(failure.message, "third is not nested in first");
            assert_eq!(failure.command.as_deref(), Some("ipa group-show third"));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    for name in ["first", "second", "third"] {
        assert_eq!(lab.master.count(&format!("group-del {name}")), 1);
    }
}

/// Fatal command failure -> verdict is Errored, teardown still runs once.
#[tokio::test]
async fn test_e2e_fatal_command_errors_and_tears_down() {
    let lab = lab(
        ScriptedHost::new("master0", HostRole::Master)
            .on("group-add-member", Reply::fail(1, "group not found")),
        ScriptedHost::new("client0", HostRole::Client),
        ScriptedHost::new("ad0", HostRole::Ad),
    );
    let runner = ScenarioRunner::new(lab.topology.clone(), fast_settings());

    let report = runner.run(&three(Ending::FatalCommand)).await;

    match &report.outcome {
        ScenarioOutcome::Errored { error } => {
            assert!(error.contains("group not found"), "{error}");
            assert!(error.contains("exit code 1"), "{error}");
        }
        other => panic!("expected Errored, got {other:?}"),
    }
    assert_eq!(report.teardown.executed, 3);
    assert_eq!(lab.master.count("group-del"), 3);
}

/// Missing host in the topology -> Errored, fixtures created so far cleaned up.
#[tokio::test]
async fn test_e2e_missing_host_errors_and_tears_down() {
    let lab = quiet_lab();
    let runner = ScenarioRunner::new(lab.topology.clone(), fast_settings());

    let report = runner.run(&three(Ending::MissingHost)).await;

    match &report.outcome {
        ScenarioOutcome::Errored { error } => {
            assert!(error.contains("no client host at index 3"), "{error}");
        }
        other => panic!("expected Errored, got {other:?}"),
    }
    assert_eq!(lab.master.count("group-del"), 3);
}

/// A failing teardown step is tolerated and the remaining steps still run.
#[tokio::test]
async fn test_e2e_teardown_failure_does_not_stop_cleanup() {
    let lab = lab(
        ScriptedHost::new("master0", HostRole::Master)
            .on("group-del second", Reply::fail(2, "second: group not found")),
        ScriptedHost::new("client0", HostRole::Client),
        ScriptedHost::new("ad0", HostRole::Ad),
    );
    let runner = ScenarioRunner::new(lab.topology.clone(), fast_settings());

    let report = runner.run(&three(Ending::Pass)).await;

    assert_eq!(report.outcome, ScenarioOutcome::Passed);
    assert_eq!(report.teardown.executed, 3);
    assert_eq!(report.teardown.failed, 1);
    assert!(report.teardown.errors[0].contains("group not found"));
    assert_eq!(lab.master.count("group-del first"), 1);
}

/// Unreachable host during teardown -> every step attempted once, failures counted.
#[tokio::test]
async fn test_e2e_unreachable_teardown_is_best_effort() {
    let lab = lab(
        ScriptedHost::new("master0", HostRole::Master)
            .on("group-del", Reply::unreachable("connection reset")),
        ScriptedHost::new("client0", HostRole::Client),
        ScriptedHost::new("ad0", HostRole::Ad),
    );
    let runner = ScenarioRunner::new(lab.topology.clone(), fast_settings());

    let report = runner.run(&three(Ending::Pass)).await;

    assert_eq!(report.outcome, ScenarioOutcome::Passed);
    assert_eq!(report.teardown.failed, 3);
    assert_eq!(lab.master.count("group-del"), 3);
    let errors = report
        .commands
        .iter()
        .filter(|c| c.phase == Phase::Teardown && c.status == CommandStatus::Error)
        .count();
    assert_eq!(errors, 3);
}

/// Setup against leftovers from an earlier run ("already exists") is tolerated.
#[tokio::test]
async fn test_e2e_setup_is_rerunnable() {
    let lab = lab(
        ScriptedHost::new("master0", HostRole::Master)
            .on("group-add", Reply::fail(1, "group with name \"first\" already exists")),
        ScriptedHost::new("client0", HostRole::Client),
        ScriptedHost::new("ad0", HostRole::Ad),
    );
    let runner = ScenarioRunner::new(lab.topology.clone(), fast_settings());

    let report = runner.run(&three(Ending::Pass)).await;

    assert_eq!(report.outcome, ScenarioOutcome::Passed);
    let tolerated = report
        .commands
        .iter()
        .filter(|c| c.phase == Phase::Setup && c.status == CommandStatus::Tolerated)
        .count();
    assert_eq!(tolerated, 3);
}
