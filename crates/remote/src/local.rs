//! 로컬 셸 호스트
//!
//! 러너가 토폴로지의 한 호스트 위에서 실행되는 랩 구성에서 사용합니다.

use std::time::Duration;

use tracing::debug;
use trustcheck_core::config::HostConfig;
use trustcheck_core::error::HostError;
use trustcheck_core::host::RemoteHost;
use trustcheck_core::types::{CommandOutcome, CommandResult, ErrorPolicy, HostRole};

use crate::process::run_process;

/// `sh -c`로 명령을 실행하는 호스트
#[derive(Debug, Clone)]
pub struct LocalHost {
    name: String,
    role: HostRole,
    hostname: String,
    domain: Option<String>,
    timeout: Duration,
}

impl LocalHost {
    /// 새 로컬 호스트
    pub fn new(name: impl Into<String>, role: HostRole, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            role,
            hostname: "localhost".to_owned(),
            domain: None,
            timeout,
        }
    }

    /// 호스트 설정으로 생성합니다.
    pub fn from_config(host: &HostConfig, timeout: Duration) -> Self {
        Self {
            name: host.name.clone(),
            role: host.role,
            hostname: host.hostname.clone(),
            domain: host.domain.clone(),
            timeout,
        }
    }
}

impl RemoteHost for LocalHost {
    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> HostRole {
        self.role
    }

    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn domain_name(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    async fn run_command(
        &self,
        command: &str,
        policy: ErrorPolicy,
    ) -> Result<CommandOutcome, HostError> {
        debug!(host = %self.name, command, "local exec");
        let out = run_process(
            &self.name,
            command,
            "sh",
            &["-c".to_owned(), command.to_owned()],
            self.timeout,
        )
        .await?;

        Ok(CommandOutcome::classify(
            CommandResult {
                command: command.to_owned(),
                host: self.name.clone(),
                exit_code: out.exit_code,
                stdout_text: out.stdout,
                stderr_text: out.stderr,
                duration: out.duration,
            },
            policy,
        ))
    }
}
