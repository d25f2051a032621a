//! 에러 타입 — 도메인별 에러 정의

use crate::types::HostRole;

/// trustcheck 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum TrustcheckError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 원격 호스트 명령 실행 에러
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// 토폴로지 조회 에러
    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),

    /// 시나리오 실행 에러
    #[error("scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 원격 명령 실행 에러
///
/// 명령이 "실행은 되었지만 0이 아닌 종료 코드를 반환"한 경우와
/// "전송 계층에서 실패"한 경우를 구분합니다. 전자는 `ErrorPolicy::Fatal`일 때만
/// [`HostError::Fatal`]로 올라옵니다.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// 프로세스 생성 실패 (ssh/sh 바이너리 없음 등)
    #[error("failed to spawn command on {host}: {reason}")]
    Spawn { host: String, reason: String },

    /// 명령 타임아웃
    #[error("command timed out on {host} after {timeout_secs}s: {command}")]
    Timeout {
        host: String,
        command: String,
        timeout_secs: u64,
    },

    /// 원격 연결 실패
    #[error("connection to {host} failed: {reason}")]
    Connection { host: String, reason: String },

    /// Fatal 정책 명령의 비정상 종료
    #[error("command failed on {host} with exit code {exit_code}: {command}: {stderr}")]
    Fatal {
        host: String,
        command: String,
        exit_code: i32,
        stderr: String,
    },
}

/// 토폴로지 조회 에러
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    /// 요청한 역할/인덱스의 호스트가 없음
    #[error("no {role} host at index {index}")]
    MissingHost { role: HostRole, index: usize },

    /// 중복된 호스트 이름
    #[error("duplicate host name: {name}")]
    DuplicateHost { name: String },
}

/// 시나리오 실행 에러
///
/// 단언 실패가 아닌, 시나리오를 의미 있게 진행할 수 없는 상황입니다.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// 명령 출력에서 값을 추출하지 못함
    #[error("could not extract {what} from output of '{command}'")]
    Extraction { what: String, command: String },

    /// 시나리오를 찾을 수 없음
    #[error("scenario not found: {0}")]
    NotFound(String),

    /// 시나리오 전제 조건 미충족 (토폴로지/설정 정보 부족)
    #[error("precondition not met: {0}")]
    Precondition(String),

    /// 단언 실패 (러너 밖으로 전달될 때의 요약)
    #[error("{0}")]
    AssertionFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_fatal_display_includes_exit_code_and_stderr() {
        let err = HostError::Fatal {
            host: "master0".to_owned(),
            command: "ipa idview-add foo_bar".to_owned(),
            exit_code: 1,
            stderr: "already exists".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("master0"));
        assert!(msg.contains("exit code 1"));
        assert!(msg.contains("already exists"));
    }

    #[test]
    fn missing_host_display() {
        let err = TopologyError::MissingHost {
            role: HostRole::Client,
            index: 2,
        };
        assert_eq!(err.to_string(), "no client host at index 2");
    }

    #[test]
    fn converts_into_top_level_error() {
        let err: TrustcheckError = ConfigError::ParseFailed {
            reason: "bad".to_owned(),
        }
        .into();
        assert!(matches!(err, TrustcheckError::Config(_)));

        let err: TrustcheckError = ScenarioError::NotFound("x".to_owned()).into();
        assert!(err.to_string().contains("scenario not found"));
    }
}
