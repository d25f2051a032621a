#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod host;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, HostError, ScenarioError, TopologyError, TrustcheckError};

// 설정
pub use config::TrustcheckConfig;

// 호스트
pub use host::{BoxFuture, DynRemoteHost, HostRef, RemoteHost, Topology};

// 도메인 타입
pub use types::{CommandOutcome, CommandResult, ErrorPolicy, HostRole};
