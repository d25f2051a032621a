//! 단일 원격 명령 단계

use std::fmt;

use trustcheck_core::host::HostRef;
use trustcheck_core::types::ErrorPolicy;

/// 호스트 하나에서 실행할 명령 하나
///
/// setup/teardown 단계는 기본적으로 `ErrorPolicy::Tolerate`입니다.
/// 이미 존재하거나 이미 삭제된 객체 때문에 실패해도 시나리오를 계속 진행합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// 실행 대상 호스트
    pub host: HostRef,
    /// 명령 문자열
    pub command: String,
    /// 실패 처리 정책
    pub policy: ErrorPolicy,
}

impl Step {
    /// 실패를 허용하는 단계
    pub fn tolerated(host: HostRef, command: impl Into<String>) -> Self {
        Self {
            host,
            command: command.into(),
            policy: ErrorPolicy::Tolerate,
        }
    }

    /// 실패 시 시나리오를 중단하는 단계
    pub fn fatal(host: HostRef, command: impl Into<String>) -> Self {
        Self {
            host,
            command: command.into(),
            policy: ErrorPolicy::Fatal,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.host, self.command)
    }
}
