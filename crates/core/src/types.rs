//! 도메인 타입 — 호스트 역할, 명령 결과, 에러 정책

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, HostError};

/// 토폴로지 내 호스트 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostRole {
    /// IPA 서버 (trust 설정 및 fixture 생성 위치)
    Master,
    /// SSSD가 구성된 IPA 클라이언트
    Client,
    /// 신뢰 관계의 Active Directory 도메인 컨트롤러
    Ad,
}

impl fmt::Display for HostRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Master => write!(f, "master"),
            Self::Client => write!(f, "client"),
            Self::Ad => write!(f, "ad"),
        }
    }
}

impl FromStr for HostRole {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "master" => Ok(Self::Master),
            "client" => Ok(Self::Client),
            "ad" => Ok(Self::Ad),
            other => Err(ConfigError::InvalidValue {
                field: "role".to_owned(),
                reason: format!("unknown host role '{other}' (expected: master, client, ad)"),
            }),
        }
    }
}

/// 명령 실패 처리 정책
///
/// `raiseonerr` 불리언 대신 호출 지점에서 의도를 명시합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// 0이 아닌 종료 코드를 기록만 하고 계속 진행
    #[default]
    Tolerate,
    /// 0이 아닌 종료 코드를 에러로 전파
    Fatal,
}

/// 원격 명령 한 번의 실행 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    /// 실행한 명령 문자열
    pub command: String,
    /// 명령을 실행한 호스트 이름
    pub host: String,
    /// 종료 코드
    pub exit_code: i32,
    /// 표준 출력
    pub stdout_text: String,
    /// 표준 에러
    pub stderr_text: String,
    /// 실행 소요 시간
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl CommandResult {
    /// 종료 코드가 0이면 true
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    /// 앞뒤 공백을 제거한 표준 출력
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout_text.trim()
    }
}

/// 에러 정책이 적용된 명령 결과
///
/// 허용된 실패(`Tolerated`)와 치명적 실패(`Failed`)를 타입으로 구분합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "lowercase")]
pub enum CommandOutcome {
    /// 종료 코드 0
    Succeeded(CommandResult),
    /// 0이 아닌 종료 코드, `ErrorPolicy::Tolerate`로 허용됨
    Tolerated(CommandResult),
    /// 0이 아닌 종료 코드, `ErrorPolicy::Fatal`
    Failed(CommandResult),
}

impl CommandOutcome {
    /// 결과와 정책으로부터 outcome을 결정합니다.
    pub fn classify(result: CommandResult, policy: ErrorPolicy) -> Self {
        if result.succeeded() {
            Self::Succeeded(result)
        } else {
            match policy {
                ErrorPolicy::Tolerate => Self::Tolerated(result),
                ErrorPolicy::Fatal => Self::Failed(result),
            }
        }
    }

    /// 내부 결과에 대한 참조
    pub fn result(&self) -> &CommandResult {
        match self {
            Self::Succeeded(r) | Self::Tolerated(r) | Self::Failed(r) => r,
        }
    }

    /// 허용된 실패인지 여부
    pub fn is_tolerated(&self) -> bool {
        matches!(self, Self::Tolerated(_))
    }

    /// 치명적 실패인지 여부
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// `Failed`는 [`HostError::Fatal`]로, 그 외는 결과로 변환합니다.
    pub fn into_result(self) -> Result<CommandResult, HostError> {
        match self {
            Self::Succeeded(r) | Self::Tolerated(r) => Ok(r),
            Self::Failed(r) => Err(HostError::Fatal {
                host: r.host,
                command: r.command,
                exit_code: r.exit_code,
                stderr: r.stderr_text,
            }),
        }
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
