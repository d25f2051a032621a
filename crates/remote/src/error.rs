//! 원격 호스트 구성 에러

use trustcheck_core::error::{ConfigError, TopologyError, TrustcheckError};

/// 원격 호스트 구성 에러
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// 토폴로지 구성 실패
    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),

    /// 호스트 설정이 전송 방식과 맞지 않음
    #[error("invalid host '{name}': {reason}")]
    InvalidHost { name: String, reason: String },
}

impl From<RemoteError> for TrustcheckError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Topology(e) => TrustcheckError::Topology(e),
            RemoteError::InvalidHost { name, reason } => {
                TrustcheckError::Config(ConfigError::InvalidValue {
                    field: format!("hosts.{name}"),
                    reason,
                })
            }
        }
    }
}
