//! 실행 보고서 — 시나리오별 결과, 명령 로그, teardown 요약

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use trustcheck_core::types::{CommandOutcome, HostRole};
use uuid::Uuid;

use crate::expect::AssertionFailure;
use crate::poll::OutcomeCounts;

/// 시나리오 실행 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// fixture 생성
    Setup,
    /// 검증 대상 동작 실행
    Exercise,
    /// 원격 상태 전파 대기
    Wait,
    /// 관찰 및 단언
    Assert,
    /// 등록된 정리 동작 실행
    Teardown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Exercise => write!(f, "exercise"),
            Self::Wait => write!(f, "wait"),
            Self::Assert => write!(f, "assert"),
            Self::Teardown => write!(f, "teardown"),
        }
    }
}

/// 명령 로그 항목의 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    /// 종료 코드 0
    Succeeded,
    /// 허용된 실패
    Tolerated,
    /// Fatal 정책 실패
    Failed,
    /// 전송 계층 에러
    Error,
}

impl CommandStatus {
    /// 메트릭 레이블 값
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Tolerated => "tolerated",
            Self::Failed => "failed",
            Self::Error => "error",
        }
    }
}

impl From<&CommandOutcome> for CommandStatus {
    fn from(outcome: &CommandOutcome) -> Self {
        match outcome {
            CommandOutcome::Succeeded(_) => Self::Succeeded,
            CommandOutcome::Tolerated(_) => Self::Tolerated,
            CommandOutcome::Failed(_) => Self::Failed,
        }
    }
}

/// 실행된 원격 명령 기록
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandRecord {
    /// 실행 단계
    pub phase: Phase,
    /// 호스트 이름
    pub host: String,
    /// 호스트 역할
    pub role: HostRole,
    /// 명령 문자열
    pub command: String,
    /// 상태
    pub status: CommandStatus,
    /// 종료 코드 (전송 에러 시 없음)
    pub exit_code: Option<i32>,
    /// 소요 시간 (밀리초)
    pub duration_ms: u64,
}

/// 이름 붙은 poll 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollRecord {
    /// poll 설명
    pub label: String,
    /// 결과 카운트
    pub counts: OutcomeCounts,
}

/// teardown 요약
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeardownSummary {
    /// 실행한 정리 명령 수
    pub executed: usize,
    /// 실패한 정리 명령 수 (0이 아닌 종료 코드 또는 전송 에러)
    pub failed: usize,
    /// 실패 설명
    pub errors: Vec<String>,
}

/// 시나리오 최종 판정
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum ScenarioOutcome {
    /// 모든 단언 통과
    Passed,
    /// 단언 실패
    Failed {
        /// 실패 정보
        failure: AssertionFailure,
    },
    /// 시나리오를 완료할 수 없음 (호스트/토폴로지/준비 상태 에러)
    Errored {
        /// 에러 설명
        error: String,
    },
}

impl ScenarioOutcome {
    /// 메트릭/출력용 레이블
    pub fn label(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed { .. } => "failed",
            Self::Errored { .. } => "errored",
        }
    }

    /// 통과 여부
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// 시나리오 하나의 실행 보고서
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// 시나리오 이름
    pub name: String,
    /// 고정 식별자
    pub id: String,
    /// 한 줄 제목
    pub title: String,
    /// 최종 판정
    pub outcome: ScenarioOutcome,
    /// 진입한 단계 (순서대로)
    pub phases: Vec<Phase>,
    /// 실행된 명령 로그
    pub commands: Vec<CommandRecord>,
    /// poll 결과
    pub polls: Vec<PollRecord>,
    /// teardown 요약
    pub teardown: TeardownSummary,
    /// 전체 소요 시간 (밀리초)
    pub duration_ms: u64,
}

/// 스위트 실행 보고서
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// 실행 식별자
    pub run_id: Uuid,
    /// 실행된 시나리오 보고서
    pub scenarios: Vec<ScenarioReport>,
    /// `stop_on_first_failure`로 건너뛴 시나리오 이름
    pub skipped: Vec<String>,
    /// 전체 소요 시간 (밀리초)
    pub duration_ms: u64,
}

impl SuiteReport {
    /// 빈 보고서를 생성합니다.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            scenarios: Vec::new(),
            skipped: Vec::new(),
            duration_ms: 0,
        }
    }

    /// 통과한 시나리오 수
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, ScenarioOutcome::Passed))
    }

    /// 단언 실패한 시나리오 수
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ScenarioOutcome::Failed { .. }))
    }

    /// 에러로 끝난 시나리오 수
    pub fn errored(&self) -> usize {
        self.count(|o| matches!(o, ScenarioOutcome::Errored { .. }))
    }

    /// 모든 시나리오가 통과했고 건너뛴 시나리오가 없는지 여부
    pub fn is_success(&self) -> bool {
        self.skipped.is_empty() && self.scenarios.iter().all(|s| s.outcome.is_passed())
    }

    fn count(&self, pred: impl Fn(&ScenarioOutcome) -> bool) -> usize {
        self.scenarios.iter().filter(|s| pred(&s.outcome)).count()
    }
}

impl Default for SuiteReport {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
