//! 시나리오 카탈로그 에러

use trustcheck_core::error::{ScenarioError, TrustcheckError};
use trustcheck_runner::error::RunnerError;

/// 시나리오 전제 조건 에러
#[derive(Debug, thiserror::Error)]
pub enum AdTrustError {
    /// AD 호스트에 도메인 이름이 없음
    #[error("ad host '{host}' has no domain name")]
    MissingDomain { host: String },

    /// sssd.conf에서 도메인 섹션을 찾지 못함
    #[error("no domains entry in sssd.conf on '{host}'")]
    MissingDomainSection { host: String },
}

impl From<AdTrustError> for ScenarioError {
    fn from(err: AdTrustError) -> Self {
        ScenarioError::Precondition(err.to_string())
    }
}

impl From<AdTrustError> for RunnerError {
    fn from(err: AdTrustError) -> Self {
        RunnerError::Scenario(err.into())
    }
}

impl From<AdTrustError> for TrustcheckError {
    fn from(err: AdTrustError) -> Self {
        TrustcheckError::Scenario(err.into())
    }
}
