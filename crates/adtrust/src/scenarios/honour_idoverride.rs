use trustcheck_core::config::AdTrustConfig;
use trustcheck_core::error::ScenarioError;
use trustcheck_core::types::ErrorPolicy;
use trustcheck_runner::context::{Probe, ScenarioContext};
use trustcheck_runner::error::RunnerError;
use trustcheck_runner::expect::{CountExpectation, Expectation};
use trustcheck_runner::scenario::Scenario;

use crate::ad::AdUserGroup;
use crate::ipa;
use crate::lab::{AD, CLIENT, MASTER, ad_domain, client_hostname, principal};
use crate::nss_idmap;
use crate::sssd::SssdTools;

/// 사용자 ID override 적용 후 클라이언트가 이전 GID를 한 번도 돌려주지 않아야 합니다.
#[derive(Debug)]
pub struct HonourIdOverride {
    view: String,
    uid: u32,
    gid: u32,
    rounds: u32,
    prefix: String,
}

impl HonourIdOverride {
    pub fn new(config: &AdTrustConfig) -> Self {
        Self {
            view: config.trust_view.clone(),
            uid: config.override_uid,
            gid: config.override_gidnumber,
            rounds: config.stale_override_rounds,
            prefix: config.ad_user_prefix.clone(),
        }
    }
}

impl Scenario for HonourIdOverride {
    fn name(&self) -> &str {
        "honour_idoverride"
    }

    fn title(&self) -> &str {
        "Verify sssd honours the customized ID View"
    }

    fn id(&self) -> &str {
        "0c0dcfbb-6099-4c61-81c9-3bd3a003ff58"
    }

    fn tags(&self) -> &[&str] {
        &["trust", "idview"]
    }

    fn bugzilla(&self) -> &[&str] {
        &["https://bugzilla.redhat.com/show_bug.cgi?id=1826720"]
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> Result<(), RunnerError> {
        let ad = ad_domain(ctx)?;
        let client_host = client_hostname(ctx)?;
        let client = SssdTools::new(CLIENT);

        let fixture = AdUserGroup::create(ctx, AD, &self.prefix).await?;
        let user = principal(&fixture.user, &ad);
        client.defer_clear_cache(ctx);
        client.clear_cache(ctx).await?;

        let resolvable = Probe::new(MASTER, nss_idmap::id_gid(&user), Expectation::Succeeded);
        ctx.wait_for_propagation("ad user resolvable on master", &resolvable).await;
        let current = ctx.exec(MASTER, &nss_idmap::id_gid(&user)).await?;
        ctx.expect(
            &current,
            Expectation::Succeeded,
            "Could not find the user, something wrong with setup!",
        )?;
        let current_gid = current.stdout_trimmed().to_owned();
        if current_gid.is_empty() {
            return Err(ScenarioError::Extraction {
                what: "current gid".to_owned(),
                command: current.command,
            }
            .into());
        }

        ctx.create_fixture(MASTER, &ipa::idview_add(&self.view), ipa::idview_del(&self.view))
            .await?;
        let home = format!("/home/{}", fixture.user);
        ctx.setup(
            MASTER,
            &ipa::idoverrideuser_add(&self.view, &user, self.uid, self.gid, &home),
        )
        .await?;
        ctx.run(MASTER, &ipa::idview_apply(&self.view, &client_host), ErrorPolicy::Fatal)
            .await?;
        client.clear_cache(ctx).await?;

        let overridden = Probe::new(
            CLIENT,
            nss_idmap::id_uid(&user),
            Expectation::Equals(self.uid.to_string()),
        );
        ctx.wait_for_propagation("user override applied on client", &overridden).await;

        let stale = Probe::new(CLIENT, nss_idmap::id_gid(&user), Expectation::Equals(current_gid));
        let policy = ctx.poll_policy(self.rounds);
        let counts = ctx.poll("stale gid", &stale, policy).await?;
        ctx.expect_count(counts.matches, CountExpectation::Equals(0), "Stale gid was returned")
    }
}
