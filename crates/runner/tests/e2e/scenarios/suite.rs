//! Suite sequencing: independent verdicts and stop-on-first-failure.

use trustcheck_runner::runner::{RunnerSettings, ScenarioRunner};
use trustcheck_runner::scenario::DynScenario;

use crate::helpers::scenarios::{Ending, ThreeFixtures, Unrunnable};
use crate::helpers::topology::{fast_settings, quiet_lab};

fn catalogue() -> Vec<Box<dyn DynScenario>> {
    vec![
        Box::new(ThreeFixtures {
            name: "passes",
            ending: Ending::Pass,
        }),
        Box::new(ThreeFixtures {
            name: "fails",
            ending: Ending::AssertionFailure,
        }),
        Box::new(Unrunnable),
    ]
}

/// One failure never aborts the rest of the suite.
#[tokio::test]
async fn test_e2e_suite_runs_every_scenario() {
    let lab = quiet_lab();
    let runner = ScenarioRunner::new(lab.topology.clone(), fast_settings());

    let suite = runner.run_all(&catalogue()).await;

    assert_eq!(suite.scenarios.len(), 3);
    assert_eq!(suite.passed(), 1);
    assert_eq!(suite.failed(), 1);
    assert_eq!(suite.errored(), 1);
    assert!(suite.skipped.is_empty());
    assert!(!suite.is_success());
    // both fixture scenarios cleaned up their three groups
    assert_eq!(lab.master.count("group-del"), 6);
}

/// stop_on_first_failure -> remaining scenarios are skipped and listed.
#[tokio::test]
async fn test_e2e_suite_stops_on_first_failure() {
    let lab = quiet_lab();
    let settings = RunnerSettings {
        stop_on_first_failure: true,
        ..fast_settings()
    };
    let runner = ScenarioRunner::new(lab.topology.clone(), settings);

    let suite = runner.run_all(&catalogue()).await;

    assert_eq!(suite.scenarios.len(), 2);
    assert_eq!(suite.skipped, vec!["unrunnable".to_owned()]);
}

/// Suite report serializes for `--output json`.
#[tokio::test]
async fn test_e2e_suite_report_serializes() {
    let lab = quiet_lab();
    let runner = ScenarioRunner::new(lab.topology.clone(), fast_settings());

    let suite = runner.run_all(&catalogue()[..1]).await;
    let json = serde_json::to_value(&suite).expect("suite report serializes");

    assert_eq!(json["scenarios"][0]["name"], "passes");
    assert_eq!(json["scenarios"][0]["outcome"]["result"], "passed");
    assert_eq!(json["scenarios"][0]["teardown"]["executed"], 3);
}
