use trustcheck_core::config::AdTrustConfig;
use trustcheck_core::types::ErrorPolicy;
use trustcheck_runner::context::{Probe, ScenarioContext};
use trustcheck_runner::error::RunnerError;
use trustcheck_runner::expect::Expectation;
use trustcheck_runner::report::Phase;
use trustcheck_runner::scenario::Scenario;

use crate::ipa;
use crate::lab::{CLIENT, MASTER, ad_domain, client_hostname, principal};
use crate::nss_idmap;
use crate::sssd::SssdTools;

/// `Domain Users` 그룹의 GID override가 클라이언트에 적용되는지 확인합니다.
///
/// view를 지우고 캐시를 비우면 override된 GID는 더 이상 보이지 않아야 합니다.
#[derive(Debug)]
pub struct EnforceGid {
    view: String,
    gid: u32,
}

impl EnforceGid {
    pub fn new(config: &AdTrustConfig) -> Self {
        Self {
            view: config.id_view.clone(),
            gid: config.override_gid,
        }
    }
}

impl Scenario for EnforceGid {
    fn name(&self) -> &str {
        "enforce_gid"
    }

    fn title(&self) -> &str {
        "Verify whether the new gid is enforceable when gid of AD Group Domain Users is overridden"
    }

    fn id(&self) -> &str {
        "3581c7c0-d598-4e34-bb9b-9d791b93ec65"
    }

    fn tags(&self) -> &[&str] {
        &["trust", "idview"]
    }

    fn bugzilla(&self) -> &[&str] {
        &["https://bugzilla.redhat.com/show_bug.cgi?id=1817219"]
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> Result<(), RunnerError> {
        let ad = ad_domain(ctx)?;
        let client_host = client_hostname(ctx)?;
        let client = SssdTools::new(CLIENT);
        let group = principal("Domain Users", &ad);
        let id_admin = nss_idmap::id(&principal("Administrator", &ad));
        let overridden = format!("{}(domain users@{ad})", self.gid);

        client.defer_clear_cache(ctx);
        let view = ctx
            .create_fixture(MASTER, &ipa::idview_add(&self.view), ipa::idview_del(&self.view))
            .await?;
        ctx.setup(MASTER, &ipa::idoverridegroup_add(&self.view, &group, self.gid))
            .await?;
        ctx.run(MASTER, &ipa::idview_apply(&self.view, &client_host), ErrorPolicy::Fatal)
            .await?;
        client.clear_cache(ctx).await?;

        let probe = Probe::new(CLIENT, id_admin.clone(), Expectation::Contains(overridden.clone()));
        ctx.wait_for_propagation("id view applied on client", &probe).await;

        ctx.enter(Phase::Exercise);
        let enforced = ctx.exec(CLIENT, &id_admin).await?;
        ctx.expect(
            &enforced,
            Expectation::Contains(overridden.clone()),
            "Overridden gid of Domain Users is not enforced",
        )?;

        ctx.enter(Phase::Exercise);
        ctx.release(view).await?;
        client.clear_cache(ctx).await?;
        let reverted = ctx.exec(CLIENT, &id_admin).await?;
        ctx.expect(
            &reverted,
            Expectation::NotContains(overridden),
            "Overridden gid is still returned after the id view was deleted",
        )
    }
}
