//! Propagation waits: readiness probes and the fixed-delay fallback.

use std::time::Duration;

use trustcheck_core::types::HostRole;
use trustcheck_runner::poll::WaitStrategy;
use trustcheck_runner::report::{Phase, ScenarioOutcome};
use trustcheck_runner::runner::{RunnerSettings, ScenarioRunner};
use trustcheck_runner::testing::{Reply, ScriptedHost};

use crate::helpers::scenarios::WaitsForUser;
use crate::helpers::topology::{fast_settings, lab};

fn master_lab(master: ScriptedHost) -> crate::helpers::topology::Lab {
    lab(
        master,
        ScriptedHost::new("client0", HostRole::Client),
        ScriptedHost::new("ad0", HostRole::Ad),
    )
}

/// Probe fails twice then succeeds -> scenario proceeds and passes.
#[tokio::test(start_paused = true)]
async fn test_e2e_waits_until_probe_passes() {
    let lab = master_lab(ScriptedHost::new("master0", HostRole::Master).on_sequence(
        "id user@ad.test",
        vec![
            Reply::fail(1, "id: 'user@ad.test': no such user"),
            Reply::fail(1, "id: 'user@ad.test': no such user"),
            Reply::ok("uid=1(user@ad.test) groups=2(posix)"),
        ],
    ));
    let runner = ScenarioRunner::new(lab.topology.clone(), fast_settings());

    let report = runner.run(&WaitsForUser).await;

    assert_eq!(report.outcome, ScenarioOutcome::Passed);
    // three probes + one lookup
    assert_eq!(lab.master.count("id user@ad.test"), 4);
    assert!(report.phases.contains(&Phase::Wait));
}

/// Probe never passes -> the assertion decides: Failed with captured output, teardown still runs.
#[tokio::test(start_paused = true)]
async fn test_e2e_readiness_timeout_defers_to_assertion() {
    let lab = master_lab(
        ScriptedHost::new("master0", HostRole::Master)
            .on("id user@ad.test", Reply::fail(1, "id: 'user@ad.test': no such user")),
    );
    let runner = ScenarioRunner::new(lab.topology.clone(), fast_settings());

    let report = runner.run(&WaitsForUser).await;

    match &report.outcome {
        ScenarioOutcome::Failed { failure } => {
            assert_eq!(failure.message, "not a member");
            assert_eq!(failure.exit_code, Some(1));
            assert!(failure.stderr.contains("no such user"));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    // timeout 3s / interval 1s -> 4 probes, then the lookup itself
    assert_eq!(lab.master.count("id user@ad.test"), 5);
    assert_eq!(lab.master.count("group-del posix"), 1);
    assert!(report.phases.contains(&Phase::Assert));
}

/// Fixed strategy -> no probing, just the configured delay.
#[tokio::test(start_paused = true)]
async fn test_e2e_fixed_delay_skips_probe() {
    let lab = master_lab(
        ScriptedHost::new("master0", HostRole::Master)
            .on("id user@ad.test", Reply::ok("groups=2(posix)")),
    );
    let settings = RunnerSettings {
        propagation: WaitStrategy::Fixed(Duration::from_secs(60)),
        ..fast_settings()
    };
    let runner = ScenarioRunner::new(lab.topology.clone(), settings);

    let started = tokio::time::Instant::now();
    let report = runner.run(&WaitsForUser).await;

    assert_eq!(report.outcome, ScenarioOutcome::Passed);
    assert_eq!(lab.master.count("id user@ad.test"), 1);
    assert!(started.elapsed() >= Duration::from_secs(60));
}
