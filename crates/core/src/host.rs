//! 호스트 협력자 — 원격 명령 실행 추상화 및 토폴로지
//!
//! [`RemoteHost`]는 "명령 문자열을 보내고 종료 코드와 출력 텍스트를 받는"
//! 유일한 외부 인터페이스입니다. 시나리오는 IPA/AD/SSSD를 이 텍스트 인터페이스로만 다룹니다.
//!
//! # 구조
//! ```text
//! Scenario ──borrow──> Topology ──Arc<dyn DynRemoteHost>──> SshHost / LocalHost / ScriptedHost
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::{HostError, TopologyError};
use crate::types::{CommandOutcome, ErrorPolicy, HostRole};

/// dyn-compatible async 반환 타입
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 원격 호스트 trait
///
/// 구현체는 명령 실행 결과에 [`ErrorPolicy`]를 적용해 [`CommandOutcome`]을 돌려줍니다.
/// 전송 계층 실패(프로세스 생성 불가, 연결 끊김, 타임아웃)는 `Err(HostError)`입니다.
pub trait RemoteHost: Send + Sync {
    /// 토폴로지 내 고유 이름 (예: `"master0"`)
    fn name(&self) -> &str;

    /// 호스트 역할
    fn role(&self) -> HostRole;

    /// 호스트의 시스템 호스트명 (`ipa idview-apply --hosts=` 인자로 사용)
    fn hostname(&self) -> &str;

    /// AD 호스트의 도메인 이름 (그 외 역할은 `None`)
    fn domain_name(&self) -> Option<&str>;

    /// 명령을 실행하고 정책이 적용된 결과를 반환합니다.
    fn run_command(
        &self,
        command: &str,
        policy: ErrorPolicy,
    ) -> impl Future<Output = Result<CommandOutcome, HostError>> + Send;
}

/// dyn-compatible 원격 호스트 trait
///
/// `RemoteHost`는 RPITIT를 사용하므로 `dyn RemoteHost`가 불가합니다.
/// `DynRemoteHost`는 `BoxFuture`를 반환하여 토폴로지가
/// `Arc<dyn DynRemoteHost>`로 호스트를 보관할 수 있게 합니다.
pub trait DynRemoteHost: Send + Sync {
    /// 토폴로지 내 고유 이름
    fn name(&self) -> &str;

    /// 호스트 역할
    fn role(&self) -> HostRole;

    /// 시스템 호스트명
    fn hostname(&self) -> &str;

    /// AD 도메인 이름
    fn domain_name(&self) -> Option<&str>;

    /// 명령 실행
    fn run_command<'a>(
        &'a self,
        command: &'a str,
        policy: ErrorPolicy,
    ) -> BoxFuture<'a, Result<CommandOutcome, HostError>>;
}

/// RemoteHost를 구현한 타입은 자동으로 DynRemoteHost도 구현됩니다.
impl<T: RemoteHost> DynRemoteHost for T {
    fn name(&self) -> &str {
        RemoteHost::name(self)
    }

    fn role(&self) -> HostRole {
        RemoteHost::role(self)
    }

    fn hostname(&self) -> &str {
        RemoteHost::hostname(self)
    }

    fn domain_name(&self) -> Option<&str> {
        RemoteHost::domain_name(self)
    }

    fn run_command<'a>(
        &'a self,
        command: &'a str,
        policy: ErrorPolicy,
    ) -> BoxFuture<'a, Result<CommandOutcome, HostError>> {
        Box::pin(RemoteHost::run_command(self, command, policy))
    }
}

/// 역할 + 인덱스로 호스트를 지정하는 참조
///
/// `multihost.master[0]`에 해당합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostRef {
    /// 역할
    pub role: HostRole,
    /// 역할 내 인덱스
    pub index: usize,
}

impl HostRef {
    /// `master[index]`
    pub const fn master(index: usize) -> Self {
        Self {
            role: HostRole::Master,
            index,
        }
    }

    /// `client[index]`
    pub const fn client(index: usize) -> Self {
        Self {
            role: HostRole::Client,
            index,
        }
    }

    /// `ad[index]`
    pub const fn ad(index: usize) -> Self {
        Self {
            role: HostRole::Ad,
            index,
        }
    }
}

impl fmt::Display for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.role, self.index)
    }
}

/// 고정된 멀티호스트 토폴로지
///
/// 역할별 등록 순서가 인덱스가 됩니다. 시나리오는 토폴로지를 빌려 쓰기만 합니다.
#[derive(Default, Clone)]
pub struct Topology {
    hosts: Vec<Arc<dyn DynRemoteHost>>,
}

impl Topology {
    /// 빈 토폴로지를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 호스트를 등록합니다.
    ///
    /// 동일한 이름의 호스트가 이미 있으면 에러를 반환합니다.
    pub fn add(&mut self, host: Arc<dyn DynRemoteHost>) -> Result<(), TopologyError> {
        if self.hosts.iter().any(|h| h.name() == host.name()) {
            return Err(TopologyError::DuplicateHost {
                name: host.name().to_owned(),
            });
        }
        self.hosts.push(host);
        Ok(())
    }

    /// 빌더 스타일 등록
    pub fn with_host(mut self, host: Arc<dyn DynRemoteHost>) -> Result<Self, TopologyError> {
        self.add(host)?;
        Ok(self)
    }

    /// 역할/인덱스로 호스트를 조회합니다.
    pub fn get(&self, host: HostRef) -> Result<&Arc<dyn DynRemoteHost>, TopologyError> {
        self.hosts
            .iter()
            .filter(|h| h.role() == host.role)
            .nth(host.index)
            .ok_or(TopologyError::MissingHost {
                role: host.role,
                index: host.index,
            })
    }

    /// `master[index]`
    pub fn master(&self, index: usize) -> Result<&Arc<dyn DynRemoteHost>, TopologyError> {
        self.get(HostRef::master(index))
    }

    /// `client[index]`
    pub fn client(&self, index: usize) -> Result<&Arc<dyn DynRemoteHost>, TopologyError> {
        self.get(HostRef::client(index))
    }

    /// `ad[index]`
    pub fn ad(&self, index: usize) -> Result<&Arc<dyn DynRemoteHost>, TopologyError> {
        self.get(HostRef::ad(index))
    }

    /// 특정 역할의 호스트 수
    pub fn count(&self, role: HostRole) -> usize {
        self.hosts.iter().filter(|h| h.role() == role).count()
    }

    /// 등록된 전체 호스트 수
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl fmt::Debug for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.hosts.iter().map(|h| format!("{}({})", h.name(), h.role())))
            .finish()
    }
}
