//! 설정 관리 — trustcheck.toml 파싱 및 런타임 설정
//!
//! [`TrustcheckConfig`]는 토폴로지, 전송, 러너, 시나리오 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`TRUSTCHECK_SSH_USER=root` 형식)
//! 3. 설정 파일 (`trustcheck.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), trustcheck_core::error::TrustcheckError> {
//! use trustcheck_core::config::TrustcheckConfig;
//!
//! let config = TrustcheckConfig::load("trustcheck.toml").await?;
//! let config = TrustcheckConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, TrustcheckError};
use crate::types::HostRole;

/// 설정 상한값 상수
const MAX_TIMEOUT_SECS: u64 = 3600;
const MAX_POLL_ROUNDS: u32 = 1000;

/// trustcheck 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrustcheckConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// SSH 전송 설정
    #[serde(default)]
    pub ssh: SshConfig,
    /// 토폴로지 호스트 목록
    #[serde(default)]
    pub hosts: Vec<HostConfig>,
    /// 시나리오 러너 설정
    #[serde(default)]
    pub runner: RunnerConfig,
    /// AD trust 시나리오 파라미터
    #[serde(default)]
    pub adtrust: AdTrustConfig,
}

impl TrustcheckConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, TrustcheckError> {
        let mut config = Self::read(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, TrustcheckError> {
        let config = Self::read(path).await?;
        config.validate()?;
        Ok(config)
    }

    async fn read(path: impl AsRef<Path>) -> Result<Self, TrustcheckError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TrustcheckError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                TrustcheckError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, TrustcheckError> {
        toml::from_str(toml_str).map_err(|e| {
            TrustcheckError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `TRUSTCHECK_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "TRUSTCHECK_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "TRUSTCHECK_GENERAL_LOG_FORMAT");

        // SSH
        override_string(&mut self.ssh.user, "TRUSTCHECK_SSH_USER");
        override_u16(&mut self.ssh.port, "TRUSTCHECK_SSH_PORT");
        override_opt_string(&mut self.ssh.identity_file, "TRUSTCHECK_SSH_IDENTITY_FILE");
        override_u64(
            &mut self.ssh.connect_timeout_secs,
            "TRUSTCHECK_SSH_CONNECT_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.ssh.command_timeout_secs,
            "TRUSTCHECK_SSH_COMMAND_TIMEOUT_SECS",
        );

        // Runner
        override_u64(
            &mut self.runner.propagation_delay_secs,
            "TRUSTCHECK_RUNNER_PROPAGATION_DELAY_SECS",
        );
        override_u64(
            &mut self.runner.readiness_timeout_secs,
            "TRUSTCHECK_RUNNER_READINESS_TIMEOUT_SECS",
        );
        override_bool(
            &mut self.runner.stop_on_first_failure,
            "TRUSTCHECK_RUNNER_STOP_ON_FIRST_FAILURE",
        );

        // AD trust
        override_u32(
            &mut self.adtrust.stale_override_rounds,
            "TRUSTCHECK_ADTRUST_STALE_OVERRIDE_ROUNDS",
        );
        override_u32(
            &mut self.adtrust.membership_rounds,
            "TRUSTCHECK_ADTRUST_MEMBERSHIP_ROUNDS",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), TrustcheckError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.ssh.connect_timeout_secs == 0 || self.ssh.connect_timeout_secs > MAX_TIMEOUT_SECS {
            return Err(invalid(
                "ssh.connect_timeout_secs",
                format!("must be 1-{MAX_TIMEOUT_SECS}"),
            ));
        }

        if self.ssh.command_timeout_secs == 0 || self.ssh.command_timeout_secs > MAX_TIMEOUT_SECS {
            return Err(invalid(
                "ssh.command_timeout_secs",
                format!("must be 1-{MAX_TIMEOUT_SECS}"),
            ));
        }

        if self.ssh.user.is_empty() {
            return Err(invalid("ssh.user", "must not be empty".to_owned()));
        }

        self.validate_hosts()?;

        if self.runner.propagation_delay_secs > MAX_TIMEOUT_SECS {
            return Err(invalid(
                "runner.propagation_delay_secs",
                format!("must be 0-{MAX_TIMEOUT_SECS}"),
            ));
        }

        if self.runner.readiness_timeout_secs > MAX_TIMEOUT_SECS {
            return Err(invalid(
                "runner.readiness_timeout_secs",
                format!("must be 0-{MAX_TIMEOUT_SECS}"),
            ));
        }

        if self.runner.readiness_interval_secs == 0 {
            return Err(invalid(
                "runner.readiness_interval_secs",
                "must be greater than 0".to_owned(),
            ));
        }

        for (field, rounds) in [
            (
                "adtrust.stale_override_rounds",
                self.adtrust.stale_override_rounds,
            ),
            ("adtrust.membership_rounds", self.adtrust.membership_rounds),
        ] {
            if rounds == 0 || rounds > MAX_POLL_ROUNDS {
                return Err(invalid(field, format!("must be 1-{MAX_POLL_ROUNDS}")));
            }
        }

        for (field, value) in [
            ("adtrust.id_view", &self.adtrust.id_view),
            ("adtrust.trust_view", &self.adtrust.trust_view),
            ("adtrust.posix_group", &self.adtrust.posix_group),
            ("adtrust.external_group", &self.adtrust.external_group),
            ("adtrust.private_group_user", &self.adtrust.private_group_user),
        ] {
            if value.is_empty() {
                return Err(invalid(field, "must not be empty".to_owned()));
            }
        }

        Ok(())
    }

    fn validate_hosts(&self) -> Result<(), TrustcheckError> {
        // 호스트가 없으면 토폴로지 없이 config 명령만 사용하는 경우이므로 허용
        if self.hosts.is_empty() {
            return Ok(());
        }

        if !self.hosts.iter().any(|h| h.role == HostRole::Master) {
            return Err(invalid(
                "hosts",
                "topology requires at least one master host".to_owned(),
            ));
        }

        let mut names = HashSet::new();
        for (i, host) in self.hosts.iter().enumerate() {
            if host.name.is_empty() {
                return Err(invalid(
                    &format!("hosts[{i}].name"),
                    "must not be empty".to_owned(),
                ));
            }
            if !names.insert(host.name.as_str()) {
                return Err(invalid(
                    &format!("hosts[{i}].name"),
                    format!("duplicate host name '{}'", host.name),
                ));
            }
            if host.hostname.is_empty() {
                return Err(invalid(
                    &format!("hosts[{i}].hostname"),
                    "must not be empty".to_owned(),
                ));
            }
            if host.role == HostRole::Ad && host.domain.as_deref().is_none_or(str::is_empty) {
                return Err(invalid(
                    &format!("hosts[{i}].domain"),
                    "ad hosts must declare their domain".to_owned(),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> TrustcheckError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// SSH 전송 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    /// 원격 사용자
    pub user: String,
    /// 포트
    pub port: u16,
    /// 개인 키 경로 (없으면 ssh 기본값)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_file: Option<String>,
    /// 연결 타임아웃 (초)
    pub connect_timeout_secs: u64,
    /// 명령 하나의 최대 실행 시간 (초)
    pub command_timeout_secs: u64,
    /// 추가 `-o` 옵션 (예: `"StrictHostKeyChecking=no"`)
    pub extra_options: Vec<String>,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            user: "root".to_owned(),
            port: 22,
            identity_file: None,
            connect_timeout_secs: 10,
            command_timeout_secs: 300,
            extra_options: vec!["StrictHostKeyChecking=no".to_owned()],
        }
    }
}

impl SshConfig {
    /// 명령 타임아웃
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// 명령 전송 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// `ssh` 서브프로세스
    #[default]
    Ssh,
    /// 로컬 `sh -c`
    Local,
}

/// 토폴로지 호스트 하나
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// 토폴로지 내 고유 이름
    pub name: String,
    /// 역할
    pub role: HostRole,
    /// 시스템 호스트명 (FQDN)
    pub hostname: String,
    /// 접속 주소 (없으면 hostname)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// AD 도메인 이름 (ad 역할 필수)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// 전송 방식
    #[serde(default)]
    pub transport: Transport,
}

impl HostConfig {
    /// 실제 접속 주소
    pub fn address(&self) -> &str {
        self.address.as_deref().unwrap_or(&self.hostname)
    }
}

/// 시나리오 러너 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// 고정 전파 대기 시간 (초). 준비 상태 확인이 없는 단계에서만 사용
    pub propagation_delay_secs: u64,
    /// 준비 상태 확인 최대 대기 시간 (초)
    pub readiness_timeout_secs: u64,
    /// 준비 상태 확인 간격 (초)
    pub readiness_interval_secs: u64,
    /// poll 반복 사이 기본 간격 (밀리초)
    pub default_poll_interval_ms: u64,
    /// 첫 실패 시 나머지 시나리오 건너뛰기
    pub stop_on_first_failure: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            propagation_delay_secs: 5,
            readiness_timeout_secs: 60,
            readiness_interval_secs: 5,
            default_poll_interval_ms: 0,
            stop_on_first_failure: false,
        }
    }
}

impl RunnerConfig {
    /// 고정 전파 대기 시간
    pub fn propagation_delay(&self) -> Duration {
        Duration::from_secs(self.propagation_delay_secs)
    }

    /// 준비 상태 확인 최대 대기 시간
    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_secs(self.readiness_timeout_secs)
    }

    /// 준비 상태 확인 간격
    pub fn readiness_interval(&self) -> Duration {
        Duration::from_secs(self.readiness_interval_secs)
    }

    /// poll 반복 사이 간격
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.default_poll_interval_ms)
    }
}

/// AD trust 시나리오 파라미터
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdTrustConfig {
    /// GID 강제 시나리오의 ID view 이름
    pub id_view: String,
    /// `Domain Users` 그룹에 덮어쓸 GID
    pub override_gid: u32,
    /// ID override 준수 시나리오의 ID view 이름
    pub trust_view: String,
    /// 사용자 override UID
    pub override_uid: u32,
    /// 사용자 override GID
    pub override_gidnumber: u32,
    /// POSIX 그룹 이름
    pub posix_group: String,
    /// 외부 그룹 이름
    pub external_group: String,
    /// private group 시나리오 사용자 이름
    pub private_group_user: String,
    /// 오래된 override 관찰 반복 횟수
    pub stale_override_rounds: u32,
    /// 멤버십 확인 반복 횟수
    pub membership_rounds: u32,
    /// 생성할 AD 사용자/그룹 이름 접두어
    pub ad_user_prefix: String,
}

impl Default for AdTrustConfig {
    fn default() -> Self {
        Self {
            id_view: "foo_bar".to_owned(),
            override_gid: 40_000_000,
            trust_view: "madrid_trust_view".to_owned(),
            override_uid: 50_001,
            override_gidnumber: 50_000,
            posix_group: "posix_group_01".to_owned(),
            external_group: "ext_group_01".to_owned(),
            private_group_user: "some-user".to_owned(),
            stale_override_rounds: 50,
            membership_rounds: 5,
            ad_user_prefix: "testuser".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_opt_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = if val.is_empty() { None } else { Some(val) };
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
