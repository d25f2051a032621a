//! 시나리오 컨텍스트 — 시나리오 본문에 전달되는 실행 핸들
//!
//! 모든 원격 명령은 컨텍스트를 거쳐 실행되며, 실행 단계와 함께 명령 로그에 기록됩니다.
//! fixture 정리 명령은 컨텍스트의 [`FixtureStack`]에 쌓이고,
//! 시나리오 본문이 끝난 뒤 러너가 [`ScenarioContext::unwind`]로 한 번만 실행합니다.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use trustcheck_core::host::{DynRemoteHost, HostRef, Topology};
use trustcheck_core::metrics as m;
use trustcheck_core::types::{CommandResult, ErrorPolicy};

use crate::error::RunnerError;
use crate::expect::{CountExpectation, Expectation};
use crate::fixture::{FixtureId, FixtureStack};
use crate::poll::{OutcomeCounts, PollPolicy, Sample, WaitStrategy, poll_with, wait_until};
use crate::report::{
    CommandRecord, CommandStatus, Phase, PollRecord, TeardownSummary, duration_millis,
};
use crate::runner::RunnerSettings;
use crate::step::Step;

/// 관찰용 명령과 그 결과에 대한 조건
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    /// 실행 대상 호스트
    pub host: HostRef,
    /// 관찰 명령
    pub command: String,
    /// 일치 조건
    pub expectation: Expectation,
}

impl Probe {
    /// 새 관찰 명령
    pub fn new(host: HostRef, command: impl Into<String>, expectation: Expectation) -> Self {
        Self {
            host,
            command: command.into(),
            expectation,
        }
    }
}

/// 시나리오 실행 핸들
pub struct ScenarioContext {
    topology: Topology,
    settings: RunnerSettings,
    fixtures: FixtureStack,
    phase: Phase,
    phases: Vec<Phase>,
    commands: Vec<CommandRecord>,
    polls: Vec<PollRecord>,
}

impl ScenarioContext {
    /// 새 컨텍스트를 생성합니다. 시작 단계는 `Phase::Setup`입니다.
    pub fn new(topology: Topology, settings: RunnerSettings) -> Self {
        Self {
            topology,
            settings,
            fixtures: FixtureStack::new(),
            phase: Phase::Setup,
            phases: vec![Phase::Setup],
            commands: Vec::new(),
            polls: Vec::new(),
        }
    }

    /// 토폴로지
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// 러너 설정
    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    /// 현재 단계
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 새 단계로 진입합니다. 같은 단계 재진입은 기록하지 않습니다.
    pub fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!(from = %self.phase, to = %phase, "entering phase");
            self.phase = phase;
            self.phases.push(phase);
        }
    }

    /// 호스트 조회
    pub fn host(&self, host: HostRef) -> Result<Arc<dyn DynRemoteHost>, RunnerError> {
        Ok(Arc::clone(self.topology.get(host)?))
    }

    /// 명령을 실행하고 결과를 로그에 기록합니다.
    ///
    /// `ErrorPolicy::Fatal`인데 0이 아닌 종료 코드가 나오면 `RunnerError::Host`를 반환합니다.
    pub async fn run(
        &mut self,
        host: HostRef,
        command: &str,
        policy: ErrorPolicy,
    ) -> Result<CommandResult, RunnerError> {
        let target = self.host(host)?;
        let started = Instant::now();
        let outcome = target.run_command(command, policy).await;
        let elapsed = started.elapsed();

        let (status, exit_code) = match &outcome {
            Ok(o) => (CommandStatus::from(o), Some(o.result().exit_code)),
            Err(_) => (CommandStatus::Error, None),
        };

        metrics::counter!(
            m::RUNNER_COMMANDS_TOTAL,
            m::LABEL_ROLE => target.role().to_string(),
            m::LABEL_OUTCOME => status.as_str()
        )
        .increment(1);
        metrics::histogram!(m::RUNNER_COMMAND_DURATION_SECONDS).record(elapsed.as_secs_f64());

        self.commands.push(CommandRecord {
            phase: self.phase,
            host: target.name().to_owned(),
            role: target.role(),
            command: command.to_owned(),
            status,
            exit_code,
            duration_ms: duration_millis(elapsed),
        });

        match outcome {
            Ok(outcome) => {
                debug!(
                    host = target.name(),
                    phase = %self.phase,
                    command,
                    exit_code = outcome.result().exit_code,
                    status = status.as_str(),
                    "command finished"
                );
                Ok(outcome.into_result()?)
            }
            Err(e) => {
                warn!(
                    host = target.name(),
                    phase = %self.phase,
                    command,
                    error = %e,
                    "command could not be executed"
                );
                Err(e.into())
            }
        }
    }

    /// [`Step`]을 실행합니다.
    pub async fn run_step(&mut self, step: &Step) -> Result<CommandResult, RunnerError> {
        self.run(step.host, &step.command, step.policy).await
    }

    /// 실패를 허용하는 명령 실행
    pub async fn exec(
        &mut self,
        host: HostRef,
        command: &str,
    ) -> Result<CommandResult, RunnerError> {
        self.run(host, command, ErrorPolicy::Tolerate).await
    }

    /// 실패를 허용하는 setup 명령 실행
    ///
    /// 이미 존재하는 객체 생성 시도처럼 재실행 시 실패하는 명령도 시나리오를 중단하지 않습니다.
    pub async fn setup(
        &mut self,
        host: HostRef,
        command: &str,
    ) -> Result<CommandResult, RunnerError> {
        self.enter(Phase::Setup);
        self.run(host, command, ErrorPolicy::Tolerate).await
    }

    /// 정리 명령을 등록합니다. 정리는 등록 역순으로 실행됩니다.
    pub fn defer(&mut self, host: HostRef, command: impl Into<String>) -> FixtureId {
        let id = self.fixtures.push(host, command);
        debug!(pending = self.fixtures.len(), "teardown registered");
        id
    }

    /// fixture를 생성하고 정리 명령을 등록합니다.
    ///
    /// 정리 명령은 생성 명령보다 먼저 등록되므로 생성이 전송 에러로 중단되어도
    /// teardown에서 정리가 시도됩니다.
    pub async fn create_fixture(
        &mut self,
        host: HostRef,
        create: &str,
        teardown: impl Into<String>,
    ) -> Result<FixtureId, RunnerError> {
        let id = self.defer(host, teardown);
        self.setup(host, create).await?;
        Ok(id)
    }

    /// 등록된 정리 명령을 지금 실행하고 스택에서 제거합니다.
    ///
    /// 이미 실행된 fixture면 `None`을 반환합니다.
    pub async fn release(&mut self, id: FixtureId) -> Result<Option<CommandResult>, RunnerError> {
        let Some(teardown) = self.fixtures.take(id) else {
            return Ok(None);
        };
        self.run_step(&teardown.step).await.map(Some)
    }

    /// 원격 상태가 전파될 때까지 기다립니다.
    ///
    /// `WaitStrategy::UntilReady`면 `probe`가 일치할 때까지 관찰하고,
    /// `WaitStrategy::Fixed`면 고정 시간만 대기합니다.
    /// 제한 시간 안에 일치하지 않아도 시나리오는 계속 진행되며, 판정은 이어지는 단언이 내립니다.
    /// 관찰이 성공했거나 고정 대기였으면 true를 반환합니다.
    pub async fn wait_for_propagation(&mut self, what: &str, probe: &Probe) -> bool {
        let previous = self.phase;
        self.enter(Phase::Wait);

        let observed = match self.settings.propagation {
            WaitStrategy::Fixed(delay) => {
                info!(what, delay_secs = delay.as_secs(), "waiting fixed propagation delay");
                tokio::time::sleep(delay).await;
                true
            }
            WaitStrategy::UntilReady { timeout, interval } => {
                let counts = wait_until(what, timeout, interval, self, |ctx| {
                    let probe = probe.clone();
                    Box::pin(async move { ctx.observe(&probe).await })
                })
                .await;
                !counts.none_matched()
            }
        };

        self.enter(previous);
        observed
    }

    /// 설정된 기본 간격을 사용하는 poll 정책
    pub fn poll_policy(&self, max_attempts: u32) -> PollPolicy {
        PollPolicy::new(max_attempts).with_interval(self.settings.poll_interval)
    }

    /// `probe`를 정책에 따라 반복 실행하고 카운트를 기록합니다.
    ///
    /// 전송 에러는 `Sample::Error`로 집계됩니다.
    pub async fn poll(
        &mut self,
        label: &str,
        probe: &Probe,
        policy: PollPolicy,
    ) -> Result<OutcomeCounts, RunnerError> {
        self.enter(Phase::Exercise);
        let counts = poll_with(policy, self, |ctx| {
            let probe = probe.clone();
            Box::pin(async move { ctx.observe(&probe).await })
        })
        .await;
        info!(label, %counts, "poll finished");
        self.record_poll(label, counts);
        Ok(counts)
    }

    /// 직접 구성한 poll 루프의 결과를 보고서에 기록합니다.
    pub fn record_poll(&mut self, label: &str, counts: OutcomeCounts) {
        self.polls.push(PollRecord {
            label: label.to_owned(),
            counts,
        });
    }

    /// `probe`를 한 번 실행해 샘플로 분류합니다. 전송 에러는 `Sample::Error`입니다.
    async fn observe(&mut self, probe: &Probe) -> Sample {
        match self.exec(probe.host, &probe.command).await {
            Ok(result) if probe.expectation.matches(&result) => Sample::Match,
            Ok(_) => Sample::Miss,
            Err(_) => Sample::Error,
        }
    }

    /// 명령 결과에 대한 단언
    pub fn expect(
        &mut self,
        result: &CommandResult,
        expectation: Expectation,
        message: &str,
    ) -> Result<(), RunnerError> {
        self.enter(Phase::Assert);
        expectation.check(result, message).map_err(|failure| {
            info!(message, expected = %expectation, host = %result.host, "assertion failed");
            failure.into()
        })
    }

    /// 카운트에 대한 단언
    pub fn expect_count(
        &mut self,
        count: u32,
        expectation: CountExpectation,
        message: &str,
    ) -> Result<(), RunnerError> {
        self.enter(Phase::Assert);
        expectation.check(count, message).map_err(|failure| {
            info!(message, count, expected = %expectation, "assertion failed");
            failure.into()
        })
    }

    /// 등록된 정리 명령을 역순으로 모두 실행합니다.
    ///
    /// 실패는 기록만 하고 나머지 정리를 계속 진행합니다.
    /// 실행된 항목은 스택에서 제거되므로 두 번 호출해도 각 명령은 한 번만 실행됩니다.
    pub async fn unwind(&mut self) -> TeardownSummary {
        self.enter(Phase::Teardown);
        let mut summary = TeardownSummary::default();

        while let Some(teardown) = self.fixtures.pop() {
            summary.executed += 1;
            let failure = match self.run_step(&teardown.step).await {
                Ok(result) if result.succeeded() => None,
                Ok(result) => Some(format!(
                    "{} exited with {}: {}",
                    teardown.step,
                    result.exit_code,
                    result.stderr_text.trim()
                )),
                Err(e) => Some(format!("{}: {e}", teardown.step)),
            };

            if let Some(reason) = failure {
                warn!(step = %teardown.step, reason = %reason, "teardown step failed");
                metrics::counter!(m::RUNNER_TEARDOWN_FAILURES_TOTAL).increment(1);
                summary.failed += 1;
                summary.errors.push(reason);
            }
        }

        summary
    }

    /// 기록된 명령 로그
    pub fn commands(&self) -> &[CommandRecord] {
        &self.commands
    }

    pub(crate) fn into_parts(self) -> (Vec<Phase>, Vec<CommandRecord>, Vec<PollRecord>) {
        (self.phases, self.commands, self.polls)
    }
}
