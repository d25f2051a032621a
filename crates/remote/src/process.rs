//! 서브프로세스 실행 공통 로직

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use trustcheck_core::error::HostError;

/// 종료된 프로세스의 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

/// 프로그램을 실행하고 `timeout` 안에 종료되기를 기다립니다.
///
/// 시그널로 종료되어 종료 코드가 없으면 -1을 사용합니다.
/// 타임아웃 시 프로세스는 drop과 함께 종료됩니다.
pub(crate) async fn run_process(
    host: &str,
    display: &str,
    program: &str,
    args: &[String],
    timeout: Duration,
) -> Result<ProcessOutput, HostError> {
    let started = Instant::now();
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| HostError::Spawn {
            host: host.to_owned(),
            reason: format!("{program}: {e}"),
        })?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(HostError::Spawn {
                host: host.to_owned(),
                reason: format!("{program}: {e}"),
            });
        }
        Err(_elapsed) => {
            return Err(HostError::Timeout {
                host: host.to_owned(),
                command: display.to_owned(),
                timeout_secs: timeout.as_secs(),
            });
        }
    };

    Ok(ProcessOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        duration: started.elapsed(),
    })
}
