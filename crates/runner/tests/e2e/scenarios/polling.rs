//! Bounded polling inside scenarios.

use trustcheck_core::types::HostRole;
use trustcheck_runner::report::ScenarioOutcome;
use trustcheck_runner::runner::ScenarioRunner;
use trustcheck_runner::testing::{Reply, ScriptedHost};

use crate::helpers::scenarios::StaleGid;
use crate::helpers::topology::{fast_settings, lab};

fn client_lab(client: ScriptedHost) -> crate::helpers::topology::Lab {
    lab(
        ScriptedHost::new("master0", HostRole::Master),
        client,
        ScriptedHost::new("ad0", HostRole::Ad),
    )
}

/// 50 samples, stale gid never seen -> passes with 0 matches out of 50.
#[tokio::test]
async fn test_e2e_poll_samples_all_rounds() {
    let lab = client_lab(
        ScriptedHost::new("client0", HostRole::Client).on("id -g", Reply::ok("50000\n")),
    );
    let runner = ScenarioRunner::new(lab.topology.clone(), fast_settings());

    let report = runner
        .run(&StaleGid {
            rounds: 50,
            stale_gid: "1234",
        })
        .await;

    assert_eq!(report.outcome, ScenarioOutcome::Passed);
    assert_eq!(lab.client.count("id -g"), 50);
    let counts = report.polls[0].counts;
    assert_eq!(counts.attempts, 50);
    assert_eq!(counts.matches, 0);
    assert_eq!(counts.misses, 50);
}

/// Stale gid surfaces once -> assertion failure reporting the observed count.
#[tokio::test]
async fn test_e2e_poll_detects_single_stale_sample() {
    let lab = client_lab(ScriptedHost::new("client0", HostRole::Client).on_sequence(
        "id -g",
        vec![
            Reply::ok("50000"),
            Reply::ok("50000"),
            Reply::ok("1234"),
            Reply::ok("50000"),
        ],
    ));
    let runner = ScenarioRunner::new(lab.topology.clone(), fast_settings());

    let report = runner
        .run(&StaleGid {
            rounds: 10,
            stale_gid: "1234",
        })
        .await;

    match &report.outcome {
        ScenarioOutcome::Failed { failure } => {
            assert_eq!(failure.message, "Stale gid was returned");
            assert!(failure.expected.contains("observed 1"), "{}", failure.expected);
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(lab.client.count("id -g"), 10);
}

/// Transport errors during polling are counted separately from misses.
#[tokio::test]
async fn test_e2e_poll_counts_transport_errors() {
    let lab = client_lab(ScriptedHost::new("client0", HostRole::Client).on_sequence(
        "id -g",
        vec![Reply::unreachable("timed out"), Reply::ok("50000")],
    ));
    let runner = ScenarioRunner::new(lab.topology.clone(), fast_settings());

    let report = runner
        .run(&StaleGid {
            rounds: 5,
            stale_gid: "1234",
        })
        .await;

    let counts = report.polls[0].counts;
    assert_eq!(counts.errors, 1);
    assert_eq!(counts.misses, 4);
    assert_eq!(counts.attempts, 5);
}

/// Zero rounds -> nothing sampled, count assertion trivially holds.
#[tokio::test]
async fn test_e2e_poll_zero_rounds() {
    let lab = client_lab(ScriptedHost::new("client0", HostRole::Client));
    let runner = ScenarioRunner::new(lab.topology.clone(), fast_settings());

    let report = runner
        .run(&StaleGid {
            rounds: 0,
            stale_gid: "1234",
        })
        .await;

    assert_eq!(report.outcome, ScenarioOutcome::Passed);
    assert!(lab.client.history().is_empty());
}
