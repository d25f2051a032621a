//! 유한 poll 조합자
//!
//! 동작을 정해진 횟수만큼 반복 실행하고 각 샘플을 분류해 카운트합니다.
//! "50번 조회해 stale 값이 한 번도 보이지 않아야 한다"와
//! "5번 조회해 매번 멤버십이 보여야 한다" 두 형태를 모두 표현합니다.
//!
//! 준비 상태 대기(readiness)는 `StopWhen::FirstMatch`를 사용하는 poll로 구현됩니다.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};
use trustcheck_core::host::BoxFuture;
use trustcheck_core::metrics as m;

/// poll 조기 종료 조건
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopWhen {
    /// 항상 `max_attempts`번 모두 실행
    #[default]
    Never,
    /// 처음 일치하는 샘플에서 종료 (준비 상태 대기)
    FirstMatch,
    /// 처음 불일치하는 샘플에서 종료
    FirstMiss,
}

/// poll 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// 최대 샘플 수
    pub max_attempts: u32,
    /// 샘플 사이 간격
    pub interval: Duration,
    /// 조기 종료 조건
    pub stop_when: StopWhen,
}

impl PollPolicy {
    /// 간격 없이 `max_attempts`번 실행하는 정책
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            interval: Duration::ZERO,
            stop_when: StopWhen::Never,
        }
    }

    /// 샘플 간격 지정
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// 조기 종료 조건 지정
    pub fn stop_when(mut self, stop_when: StopWhen) -> Self {
        self.stop_when = stop_when;
        self
    }

    /// `timeout` 안에서 `interval` 간격으로 첫 일치를 기다리는 정책
    pub fn until_ready(timeout: Duration, interval: Duration) -> Self {
        let max_attempts = if interval.is_zero() {
            1
        } else {
            let steps = timeout.as_millis() / interval.as_millis();
            u32::try_from(steps).unwrap_or(u32::MAX).saturating_add(1)
        };
        Self {
            max_attempts,
            interval,
            stop_when: StopWhen::FirstMatch,
        }
    }
}

/// 샘플 하나의 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    /// 조건 일치
    Match,
    /// 조건 불일치
    Miss,
    /// 동작 자체가 실패 (전송 에러 등)
    Error,
}

/// poll 결과 카운트
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OutcomeCounts {
    /// 실제 실행한 샘플 수
    pub attempts: u32,
    /// 일치 샘플 수
    pub matches: u32,
    /// 불일치 샘플 수
    pub misses: u32,
    /// 에러 샘플 수
    pub errors: u32,
}

impl OutcomeCounts {
    /// 샘플 하나를 기록합니다.
    pub fn record(&mut self, sample: Sample) {
        self.attempts += 1;
        match sample {
            Sample::Match => self.matches += 1,
            Sample::Miss => self.misses += 1,
            Sample::Error => self.errors += 1,
        }
    }

    /// 샘플이 하나 이상이고 모두 일치했는지 여부
    pub fn all_matched(&self) -> bool {
        self.attempts > 0 && self.matches == self.attempts
    }

    /// 일치 샘플이 하나도 없는지 여부
    pub fn none_matched(&self) -> bool {
        self.matches == 0
    }
}

impl fmt::Display for OutcomeCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} attempts: {} matched, {} missed, {} errored",
            self.attempts, self.matches, self.misses, self.errors
        )
    }
}

/// poll 루프 상태
///
/// 호출자가 동작을 직접 실행해야 하는 경우(예: `&mut` 컨텍스트를 빌리는 경우)
/// 이 타입으로 루프를 구성합니다.
#[derive(Debug)]
pub struct Poller {
    policy: PollPolicy,
    counts: OutcomeCounts,
    stopped: bool,
}

impl Poller {
    /// 새 poll 루프를 시작합니다.
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            counts: OutcomeCounts::default(),
            stopped: false,
        }
    }

    /// 다음 샘플을 실행할 수 있으면 간격만큼 대기 후 true를 반환합니다.
    pub async fn next_attempt(&self) -> bool {
        if self.stopped || self.counts.attempts >= self.policy.max_attempts {
            return false;
        }
        if self.counts.attempts > 0 && !self.policy.interval.is_zero() {
            tokio::time::sleep(self.policy.interval).await;
        }
        true
    }

    /// 샘플을 기록하고 조기 종료 조건을 평가합니다.
    pub fn record(&mut self, sample: Sample) {
        self.counts.record(sample);
        metrics::counter!(m::RUNNER_POLL_ATTEMPTS_TOTAL).increment(1);
        self.stopped = match (self.policy.stop_when, sample) {
            (StopWhen::FirstMatch, Sample::Match) => true,
            (StopWhen::FirstMiss, Sample::Miss) => true,
            _ => false,
        };
    }

    /// 현재까지의 카운트
    pub fn counts(&self) -> OutcomeCounts {
        self.counts
    }

    /// 루프를 종료하고 카운트를 반환합니다.
    pub fn finish(self) -> OutcomeCounts {
        self.counts
    }
}

/// `action`을 정책에 따라 반복 실행하고 `classify`로 각 결과를 분류합니다.
///
/// 동작이 에러를 반환하면 `Sample::Error`로 기록하고 계속 진행합니다.
/// `max_attempts == 0`이면 동작을 한 번도 실행하지 않습니다.
pub async fn poll<T, E, F, Fut, C>(policy: PollPolicy, mut action: F, classify: C) -> OutcomeCounts
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
    C: Fn(&T) -> bool,
{
    let mut poller = Poller::new(policy);
    while poller.next_attempt().await {
        let sample = match action().await {
            Ok(value) if classify(&value) => Sample::Match,
            Ok(_) => Sample::Miss,
            Err(e) => {
                debug!(
                    attempt = poller.counts().attempts + 1,
                    error = %e,
                    "poll action failed"
                );
                Sample::Error
            }
        };
        poller.record(sample);
    }
    poller.finish()
}

/// `&mut`로 빌린 상태를 샘플마다 `sample`에 넘기며 정책에 따라 반복 실행합니다.
///
/// 동작이 [`ScenarioContext`](crate::context::ScenarioContext)처럼 가변 대여가 필요한
/// 상태를 쓸 때 사용합니다. 각 호출은 샘플 분류를 직접 돌려줍니다.
pub async fn poll_with<S, F>(policy: PollPolicy, state: &mut S, mut sample: F) -> OutcomeCounts
where
    F: for<'a> FnMut(&'a mut S) -> BoxFuture<'a, Sample>,
{
    let mut poller = Poller::new(policy);
    while poller.next_attempt().await {
        let outcome = sample(state).await;
        poller.record(outcome);
    }
    poller.finish()
}

/// `probe`가 `Sample::Match`를 돌려줄 때까지 `interval` 간격으로 최대 `timeout` 동안 기다립니다.
///
/// 시간 안에 준비되지 않아도 에러가 아닙니다. 카운트만 돌려주며,
/// 최종 판정은 뒤따르는 단언이 내립니다.
pub async fn wait_until<S, F>(
    what: &str,
    timeout: Duration,
    interval: Duration,
    state: &mut S,
    probe: F,
) -> OutcomeCounts
where
    F: for<'a> FnMut(&'a mut S) -> BoxFuture<'a, Sample>,
{
    let counts = poll_with(PollPolicy::until_ready(timeout, interval), state, probe).await;
    if counts.none_matched() {
        warn!(
            what,
            attempts = counts.attempts,
            timeout_secs = timeout.as_secs(),
            "readiness check timed out, continuing to assertions"
        );
    } else {
        debug!(what, attempts = counts.attempts, "readiness check passed");
    }
    counts
}

/// 원격 상태 전파 대기 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStrategy {
    /// 고정 시간 대기
    Fixed(Duration),
    /// 준비 조건이 만족될 때까지 대기
    UntilReady {
        /// 최대 대기 시간
        timeout: Duration,
        /// 확인 간격
        interval: Duration,
    },
}
