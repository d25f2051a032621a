//! `ssh` 서브프로세스 기반 원격 호스트
//!
//! 키 기반 비대화식 접속(`BatchMode=yes`)을 전제로 합니다.
//! ssh 자체의 실패는 종료 코드 255로 나타나며, 이 경우 원격 명령의 실패가 아니라
//! [`HostError::Connection`]으로 보고합니다.

use std::time::Duration;

use tracing::debug;
use trustcheck_core::config::{HostConfig, SshConfig};
use trustcheck_core::error::HostError;
use trustcheck_core::host::RemoteHost;
use trustcheck_core::types::{CommandOutcome, CommandResult, ErrorPolicy, HostRole};

use crate::process::run_process;

/// ssh가 연결 실패 시 사용하는 종료 코드
pub const SSH_CONNECTION_FAILURE: i32 = 255;

/// ssh 원격 호스트
#[derive(Debug, Clone)]
pub struct SshHost {
    name: String,
    role: HostRole,
    hostname: String,
    address: String,
    domain: Option<String>,
    user: String,
    port: u16,
    identity_file: Option<String>,
    connect_timeout_secs: u64,
    command_timeout: Duration,
    extra_options: Vec<String>,
}

impl SshHost {
    /// 호스트 설정과 ssh 설정으로 생성합니다.
    pub fn from_config(host: &HostConfig, ssh: &SshConfig) -> Self {
        Self {
            name: host.name.clone(),
            role: host.role,
            hostname: host.hostname.clone(),
            address: host.address().to_owned(),
            domain: host.domain.clone(),
            user: ssh.user.clone(),
            port: ssh.port,
            identity_file: ssh.identity_file.clone(),
            connect_timeout_secs: ssh.connect_timeout_secs,
            command_timeout: ssh.command_timeout(),
            extra_options: ssh.extra_options.clone(),
        }
    }

    /// `ssh`에 전달할 인자 목록
    pub fn ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = vec![
            "-o".to_owned(),
            "BatchMode=yes".to_owned(),
            "-o".to_owned(),
            format!("ConnectTimeout={}", self.connect_timeout_secs),
        ];
        for option in &self.extra_options {
            args.push("-o".to_owned());
            args.push(option.clone());
        }
        args.push("-p".to_owned());
        args.push(self.port.to_string());
        if let Some(key) = &self.identity_file {
            args.push("-i".to_owned());
            args.push(key.clone());
        }
        args.push(format!("{}@{}", self.user, self.address));
        args.push("--".to_owned());
        args.push(command.to_owned());
        args
    }
}

impl RemoteHost for SshHost {
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
        debug!(host = %self.name, address = %self.address, command, "ssh exec");
        let out = run_process(
            &self.name,
            command,
            "ssh",
            &self.ssh_args(command),
            self.command_timeout,
        )
        .await?;

        if out.exit_code == SSH_CONNECTION_FAILURE && is_ssh_diagnostic(&out.stderr) {
            return Err(HostError::Connection {
                host: self.name.clone(),
                reason: out.stderr.trim().to_owned(),
            });
        }

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

/// ssh 클라이언트가 남기는 연결 실패 메시지인지 판별합니다.
///
/// 원격 명령이 직접 255로 종료한 경우와 구분하기 위해 사용합니다.
fn is_ssh_diagnostic(stderr: &str) -> bool {
    const MARKERS: [&str; 7] = [
        "ssh:",
        "Permission denied",
        "Connection refused",
        "Connection timed out",
        "Could not resolve hostname",
        "Host key verification failed",
        "Connection closed",
    ];
    MARKERS.iter().any(|m| stderr.contains(m))
}
