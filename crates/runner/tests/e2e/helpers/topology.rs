//! Scripted topology builders.

use std::sync::Arc;
use std::time::Duration;

use trustcheck_core::host::Topology;
use trustcheck_core::types::HostRole;
use trustcheck_runner::poll::WaitStrategy;
use trustcheck_runner::runner::RunnerSettings;
use trustcheck_runner::testing::{ScriptedHost, topology_of};

/// Hosts of a standard master + client + AD lab.
#[allow(dead_code)]
pub struct Lab {
    pub master: Arc<ScriptedHost>,
    pub client: Arc<ScriptedHost>,
    pub ad: Arc<ScriptedHost>,
    pub topology: Topology,
}

/// Builds a lab from pre-scripted hosts.
pub fn lab(master: ScriptedHost, client: ScriptedHost, ad: ScriptedHost) -> Lab {
    let master = master.shared();
    let client = client.shared();
    let ad = ad.shared();
    let topology = topology_of(&[
        Arc::clone(&master),
        Arc::clone(&client),
        Arc::clone(&ad),
    ])
    .unwrap();
    Lab {
        master,
        client,
        ad,
        topology,
    }
}

/// A lab whose hosts answer every command with exit code 0.
#[allow(dead_code)]
pub fn quiet_lab() -> Lab {
    lab(
        ScriptedHost::new("master0", HostRole::Master),
        ScriptedHost::new("client0", HostRole::Client),
        ScriptedHost::new("ad0", HostRole::Ad).with_domain("ad.test"),
    )
}

/// Runner settings with no real waiting.
pub fn fast_settings() -> RunnerSettings {
    RunnerSettings {
        propagation: WaitStrategy::UntilReady {
            timeout: Duration::from_secs(3),
            interval: Duration::from_secs(1),
        },
        poll_interval: Duration::ZERO,
        stop_on_first_failure: false,
    }
}
