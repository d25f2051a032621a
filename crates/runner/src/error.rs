//! 러너 에러 타입
//!
//! [`RunnerError`]는 시나리오 본문이 반환하는 에러입니다.
//! [`RunnerError::Assertion`]은 시나리오 "실패"로, 나머지 변형은 "에러"로 보고됩니다.

use trustcheck_core::error::{HostError, ScenarioError, TopologyError, TrustcheckError};

use crate::expect::AssertionFailure;

/// 시나리오 실행 에러
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// 기대 조건이 관찰되지 않음 (시나리오의 최종 판정)
    #[error("assertion failed: {0}")]
    Assertion(Box<AssertionFailure>),

    /// 원격 명령 전송 실패 또는 Fatal 명령 실패
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// 토폴로지에 필요한 호스트가 없음
    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),

    /// 출력 추출 실패, 준비 상태 시간 초과 등
    #[error("scenario error: {0}")]
    Scenario(#[from] ScenarioError),
}

impl RunnerError {
    /// 단언 실패인지 여부
    pub fn is_assertion(&self) -> bool {
        matches!(self, Self::Assertion(_))
    }
}

impl From<AssertionFailure> for RunnerError {
    fn from(failure: AssertionFailure) -> Self {
        Self::Assertion(Box::new(failure))
    }
}

impl From<RunnerError> for TrustcheckError {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::Host(e) => TrustcheckError::Host(e),
            RunnerError::Topology(e) => TrustcheckError::Topology(e),
            RunnerError::Scenario(e) => TrustcheckError::Scenario(e),
            RunnerError::Assertion(failure) => {
                TrustcheckError::Scenario(ScenarioError::AssertionFailed(failure.to_string()))
            }
        }
    }
}
