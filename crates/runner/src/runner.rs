//! 시나리오 러너
//!
//! 시나리오 본문을 실행한 뒤 결과와 무관하게 fixture 스택을 정확히 한 번 해제합니다.
//! 여러 시나리오는 순차 실행되며, 한 시나리오의 실패가 나머지를 중단하지 않습니다
//! (`stop_on_first_failure` 설정 시 제외).

use std::time::{Duration, Instant};

use tracing::{error, info, warn};
use trustcheck_core::config::RunnerConfig;
use trustcheck_core::host::Topology;
use trustcheck_core::metrics as m;

use crate::context::ScenarioContext;
use crate::error::RunnerError;
use crate::poll::WaitStrategy;
use crate::report::{ScenarioOutcome, ScenarioReport, SuiteReport, duration_millis};
use crate::scenario::DynScenario;

/// 러너 동작 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSettings {
    /// 원격 상태 전파 대기 방식
    pub propagation: WaitStrategy,
    /// poll 기본 간격
    pub poll_interval: Duration,
    /// 첫 실패 시 나머지 시나리오 건너뛰기
    pub stop_on_first_failure: bool,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self::from(&RunnerConfig::default())
    }
}

impl From<&RunnerConfig> for RunnerSettings {
    /// `readiness_timeout_secs == 0`이면 고정 대기(`propagation_delay_secs`)를 사용합니다.
    fn from(config: &RunnerConfig) -> Self {
        let propagation = if config.readiness_timeout_secs == 0 {
            WaitStrategy::Fixed(config.propagation_delay())
        } else {
            WaitStrategy::UntilReady {
                timeout: config.readiness_timeout(),
                interval: config.readiness_interval(),
            }
        };
        Self {
            propagation,
            poll_interval: config.poll_interval(),
            stop_on_first_failure: config.stop_on_first_failure,
        }
    }
}

/// 시나리오 러너
///
/// 토폴로지를 공유하며, 시나리오마다 새 [`ScenarioContext`]를 만듭니다.
pub struct ScenarioRunner {
    topology: Topology,
    settings: RunnerSettings,
}

impl ScenarioRunner {
    /// 새 러너를 생성합니다.
    pub fn new(topology: Topology, settings: RunnerSettings) -> Self {
        Self { topology, settings }
    }

    /// 러너 설정
    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    /// 시나리오 하나를 실행합니다.
    ///
    /// 본문이 단언 실패나 호스트 에러로 끝나도 teardown은 항상 실행됩니다.
    pub async fn run(&self, scenario: &dyn DynScenario) -> ScenarioReport {
        let started = Instant::now();
        info!(scenario = scenario.name(), id = scenario.id(), "scenario started");

        let mut ctx = ScenarioContext::new(self.topology.clone(), self.settings.clone());
        let body = scenario.run(&mut ctx).await;

        let teardown = ctx.unwind().await;
        if teardown.failed > 0 {
            warn!(
                scenario = scenario.name(),
                executed = teardown.executed,
                failed = teardown.failed,
                "teardown finished with failures"
            );
        }

        let outcome = match body {
            Ok(()) => ScenarioOutcome::Passed,
            Err(RunnerError::Assertion(failure)) => ScenarioOutcome::Failed { failure: *failure },
            Err(e) => ScenarioOutcome::Errored {
                error: e.to_string(),
            },
        };

        let elapsed = started.elapsed();
        match &outcome {
            ScenarioOutcome::Passed => info!(
                scenario = scenario.name(),
                duration_ms = duration_millis(elapsed),
                "scenario passed"
            ),
            ScenarioOutcome::Failed { failure } => warn!(
                scenario = scenario.name(),
                message = %failure.message,
                expected = %failure.expected,
                "scenario failed"
            ),
            ScenarioOutcome::Errored { error: e } => error!(
                scenario = scenario.name(),
                error = %e,
                "scenario errored"
            ),
        }
        metrics::counter!(m::RUNNER_SCENARIOS_TOTAL, m::LABEL_RESULT => outcome.label())
            .increment(1);

        let (phases, commands, polls) = ctx.into_parts();
        ScenarioReport {
            name: scenario.name().to_owned(),
            id: scenario.id().to_owned(),
            title: scenario.title().to_owned(),
            outcome,
            phases,
            commands,
            polls,
            teardown,
            duration_ms: duration_millis(elapsed),
        }
    }

    /// 시나리오를 순서대로 실행합니다.
    pub async fn run_all(&self, scenarios: &[Box<dyn DynScenario>]) -> SuiteReport {
        let started = Instant::now();
        let mut suite = SuiteReport::new();
        info!(run_id = %suite.run_id, count = scenarios.len(), "suite started");

        for (idx, scenario) in scenarios.iter().enumerate() {
            let report = self.run(scenario.as_ref()).await;
            let passed = report.outcome.is_passed();
            suite.scenarios.push(report);

            if !passed && self.settings.stop_on_first_failure {
                suite
                    .skipped
                    .extend(scenarios[idx + 1..].iter().map(|s| s.name().to_owned()));
                if !suite.skipped.is_empty() {
                    warn!(
                        skipped = suite.skipped.len(),
                        "stopping after first failure"
                    );
                }
                break;
            }
        }

        suite.duration_ms = duration_millis(started.elapsed());
        info!(
            run_id = %suite.run_id,
            passed = suite.passed(),
            failed = suite.failed(),
            errored = suite.errored(),
            skipped = suite.skipped.len(),
            "suite finished"
        );
        suite
    }
}
