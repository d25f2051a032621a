//! Small scenarios exercising the runner lifecycle.

use trustcheck_core::error::ScenarioError;
use trustcheck_core::host::HostRef;
use trustcheck_core::types::ErrorPolicy;
use trustcheck_runner::context::{Probe, ScenarioContext};
use trustcheck_runner::error::RunnerError;
use trustcheck_runner::expect::{CountExpectation, Expectation};
use trustcheck_runner::scenario::Scenario;

/// How the body of [`ThreeFixtures`] ends.
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)]
pub enum Ending {
    Pass,
    AssertionFailure,
    FatalCommand,
    MissingHost,
}

/// Creates three fixtures on the master, then ends as configured.
pub struct ThreeFixtures {
    pub name: &'static str,
    pub ending: Ending,
}

impl Scenario for ThreeFixtures {
    fn name(&self) -> &str {
        self.name
    }

    fn title(&self) -> &str {
        "three fixtures"
    }

    fn id(&self) -> &str {
        "00000000-0000-0000-0000-000000000001"
    }

    fn tags(&self) -> &[&str] {
        &["lifecycle"]
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> Result<(), RunnerError> {
        let master = HostRef::master(0);
        ctx.create_fixture(master, "ipa group-add first", "ipa group-del first")
            .await?;
        ctx.create_fixture(master, "ipa group-add second", "ipa group-del second")
            .await?;
        ctx.create_fixture(master, "ipa group-add third", "ipa group-del third")
            .await?;

        match self.ending {
            Ending::Pass => {
                let shown = ctx.exec(master, "ipa group-show third").await?;
                ctx.expect(&shown, Expectation::Succeeded, "group must exist")
            }
            Ending::AssertionFailure => {
                let shown = ctx.exec(master, "ipa group-show third").await?;
                ctx.expect(
                    &shown,
                    Expectation::Contains("Member of groups: first".to_owned()),
                    "third is not nested in first",
                )
            }
            Ending::FatalCommand => {
                ctx.run(master, "ipa group-add-member broken", ErrorPolicy::Fatal)
                    .await?;
                Ok(())
            }
            Ending::MissingHost => {
                ctx.exec(HostRef::client(3), "id admin").await?;
                Ok(())
            }
        }
    }
}

/// Samples `id -g` on the client and expects the stale gid never to appear.
pub struct StaleGid {
    pub rounds: u32,
    pub stale_gid: &'static str,
}

impl Scenario for StaleGid {
    fn name(&self) -> &str {
        "stale_gid"
    }

    fn title(&self) -> &str {
        "stale gid never returned"
    }

    fn id(&self) -> &str {
        "00000000-0000-0000-0000-000000000002"
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> Result<(), RunnerError> {
        let probe = Probe::new(
            HostRef::client(0),
            "id -g user@ad.test",
            Expectation::Equals(self.stale_gid.to_owned()),
        );
        let policy = ctx.poll_policy(self.rounds);
        let counts = ctx.poll("stale gid lookups", &probe, policy).await?;
        ctx.expect_count(
            counts.matches,
            CountExpectation::Equals(0),
            "Stale gid was returned",
        )
    }
}

/// Waits for a user to become resolvable, then checks membership once.
pub struct WaitsForUser;

impl Scenario for WaitsForUser {
    fn name(&self) -> &str {
        "waits_for_user"
    }

    fn title(&self) -> &str {
        "waits for propagation"
    }

    fn id(&self) -> &str {
        "00000000-0000-0000-0000-000000000003"
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> Result<(), RunnerError> {
        let master = HostRef::master(0);
        ctx.create_fixture(master, "ipa group-add posix", "ipa group-del posix")
            .await?;
        let probe = Probe::new(master, "id user@ad.test", Expectation::Succeeded);
        ctx.wait_for_propagation("user resolvable", &probe).await;
        let id = ctx.exec(master, "id user@ad.test").await?;
        ctx.expect(&id, Expectation::Contains("posix".to_owned()), "not a member")
    }
}

/// Always errors out before touching any host.
pub struct Unrunnable;

impl Scenario for Unrunnable {
    fn name(&self) -> &str {
        "unrunnable"
    }

    fn title(&self) -> &str {
        "cannot extract value"
    }

    fn id(&self) -> &str {
        "00000000-0000-0000-0000-000000000004"
    }

    async fn run(&self, _ctx: &mut ScenarioContext) -> Result<(), RunnerError> {
        Err(ScenarioError::Extraction {
            what: "gid".to_owned(),
            command: "ipa group-show posix".to_owned(),
        }
        .into())
    }
}
