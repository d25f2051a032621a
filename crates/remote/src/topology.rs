//! 설정으로부터 토폴로지 구성

use std::sync::Arc;

use tracing::info;
use trustcheck_core::config::{Transport, TrustcheckConfig};
use trustcheck_core::host::{DynRemoteHost, Topology};
use trustcheck_core::types::HostRole;

use crate::error::RemoteError;
use crate::local::LocalHost;
use crate::ssh::SshHost;

/// `[[hosts]]` 항목으로 토폴로지를 만듭니다.
///
/// 역할별 선언 순서가 인덱스가 됩니다 (`master[0]`은 첫 번째 master 항목).
pub fn build_topology(config: &TrustcheckConfig) -> Result<Topology, RemoteError> {
    let mut topology = Topology::new();

    for host in &config.hosts {
        if host.role == HostRole::Ad && host.domain.as_deref().is_none_or(str::is_empty) {
            return Err(RemoteError::InvalidHost {
                name: host.name.clone(),
                reason: "ad hosts require a domain".to_owned(),
            });
        }

        let remote: Arc<dyn DynRemoteHost> = match host.transport {
            Transport::Ssh => Arc::new(SshHost::from_config(host, &config.ssh)),
            Transport::Local => Arc::new(LocalHost::from_config(
                host,
                config.ssh.command_timeout(),
            )),
        };
        topology.add(remote)?;
    }

    info!(
        hosts = topology.len(),
        masters = topology.count(HostRole::Master),
        clients = topology.count(HostRole::Client),
        ad = topology.count(HostRole::Ad),
        "topology ready"
    );
    Ok(topology)
}
