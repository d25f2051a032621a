//! 스크립트 기반 가짜 호스트
//!
//! 실제 IPA/AD 환경 없이 시나리오를 검증하기 위한 [`RemoteHost`] 구현입니다.
//! 명령 문자열에 부분 문자열이 포함되면 등록된 응답을 돌려주고,
//! 실행된 모든 명령을 순서대로 기록합니다.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use trustcheck_core::error::{HostError, TopologyError};
use trustcheck_core::host::{DynRemoteHost, RemoteHost, Topology};
use trustcheck_core::types::{CommandOutcome, CommandResult, ErrorPolicy, HostRole};

/// 가짜 응답
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// 명령 실행 결과
    Output {
        /// 종료 코드
        exit_code: i32,
        /// 표준 출력
        stdout: String,
        /// 표준 에러
        stderr: String,
    },
    /// 전송 계층 실패
    Unreachable(String),
}

impl Reply {
    /// 종료 코드 0과 stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self::Output {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// 0이 아닌 종료 코드와 stderr
    pub fn fail(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::Output {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// 연결 실패
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self::Unreachable(reason.into())
    }
}

#[derive(Debug)]
struct Rule {
    pattern: String,
    replies: VecDeque<Reply>,
}

impl Rule {
    /// 응답을 순서대로 소비하고, 마지막 응답은 계속 반복합니다.
    fn next(&mut self) -> Reply {
        if self.replies.len() > 1 {
            self.replies.pop_front().unwrap_or_else(|| Reply::ok(""))
        } else {
            self.replies.front().cloned().unwrap_or_else(|| Reply::ok(""))
        }
    }
}

#[derive(Debug, Default)]
struct State {
    rules: Vec<Rule>,
    history: Vec<String>,
}

/// 스크립트 기반 가짜 호스트
///
/// 규칙은 등록 순서대로 검사하며, 일치하는 규칙이 없으면 종료 코드 0과 빈 출력을 돌려줍니다.
#[derive(Debug)]
pub struct ScriptedHost {
    name: String,
    role: HostRole,
    hostname: String,
    domain: Option<String>,
    state: Mutex<State>,
}

impl ScriptedHost {
    /// 새 가짜 호스트
    pub fn new(name: impl Into<String>, role: HostRole) -> Self {
        let name = name.into();
        Self {
            hostname: format!("{name}.test"),
            name,
            role,
            domain: None,
            state: Mutex::new(State::default()),
        }
    }

    /// 시스템 호스트명 지정
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// AD 도메인 지정
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// `pattern`을 포함하는 명령에 항상 `reply`로 응답
    pub fn on(self, pattern: impl Into<String>, reply: Reply) -> Self {
        self.on_sequence(pattern, vec![reply])
    }

    /// `pattern`을 포함하는 명령에 `replies`를 순서대로 응답 (마지막 응답 반복)
    pub fn on_sequence(self, pattern: impl Into<String>, replies: Vec<Reply>) -> Self {
        self.lock().rules.push(Rule {
            pattern: pattern.into(),
            replies: replies.into(),
        });
        self
    }

    /// 토폴로지와 공유하기 위해 `Arc`로 감쌉니다.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 실행된 명령 목록
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// `pattern`을 포함하는 명령이 실행된 횟수
    pub fn count(&self, pattern: &str) -> usize {
        self.lock()
            .history
            .iter()
            .filter(|c| c.contains(pattern))
            .count()
    }

    /// `pattern`을 포함하는 첫 명령의 실행 순서
    pub fn position(&self, pattern: &str) -> Option<usize> {
        self.lock().history.iter().position(|c| c.contains(pattern))
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn respond(&self, command: &str) -> Reply {
        let mut state = self.lock();
        state.history.push(command.to_owned());
        state
            .rules
            .iter_mut()
            .find(|r| command.contains(r.pattern.as_str()))
            .map(Rule::next)
            .unwrap_or_else(|| Reply::ok(""))
    }
}

impl RemoteHost for ScriptedHost {
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
        match self.respond(command) {
            Reply::Output {
                exit_code,
                stdout,
                stderr,
            } => Ok(CommandOutcome::classify(
                CommandResult {
                    command: command.to_owned(),
                    host: self.name.clone(),
                    exit_code,
                    stdout_text: stdout,
                    stderr_text: stderr,
                    duration: Duration::ZERO,
                },
                policy,
            )),
            Reply::Unreachable(reason) => Err(HostError::Connection {
                host: self.name.clone(),
                reason,
            }),
        }
    }
}

/// `ScriptedHost` 목록으로 토폴로지를 만듭니다.
///
/// 이름이 중복되면 `TopologyError::DuplicateHost`를 반환합니다.
pub fn topology_of(hosts: &[Arc<ScriptedHost>]) -> Result<Topology, TopologyError> {
    let mut topology = Topology::new();
    for host in hosts {
        topology.add(Arc::clone(host) as Arc<dyn DynRemoteHost>)?;
    }
    Ok(topology)
}
