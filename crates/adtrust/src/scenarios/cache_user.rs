use trustcheck_runner::context::ScenarioContext;
use trustcheck_runner::error::RunnerError;
use trustcheck_runner::expect::Expectation;
use trustcheck_runner::report::Phase;
use trustcheck_runner::scenario::Scenario;

use crate::lab::{CLIENT, MASTER, ad_domain, principal};
use crate::nss_idmap;
use crate::sssd::{SssdTools, cache_path, ldbsearch, user_cache_dn};

const CACHED_USER: &str = "Administrator";

/// 클라이언트가 AD 사용자를 조회하면 IPA 서버의 SSSD 캐시에도 항목이 생겨야 합니다.
#[derive(Debug, Default)]
pub struct IpaServerSssCacheUser;

impl Scenario for IpaServerSssCacheUser {
    fn name(&self) -> &str {
        "ipaserver_sss_cache_user"
    }

    fn title(&self) -> &str {
        "Verify AD user is cached on IPA server when ipa client queries AD User"
    }

    fn id(&self) -> &str {
        "4a48ee7a-62d1-4eea-9f33-7df3fccc908e"
    }

    fn tags(&self) -> &[&str] {
        &["trust", "cache"]
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> Result<(), RunnerError> {
        let ad = ad_domain(ctx)?;
        let ipa_domain = SssdTools::new(MASTER).domain_section_name(ctx).await?;
        let user = principal(CACHED_USER, &ad);

        ctx.enter(Phase::Exercise);
        ctx.exec(MASTER, &nss_idmap::id(&user)).await?;
        ctx.exec(CLIENT, &nss_idmap::id(&user)).await?;
        let search = ctx
            .exec(
                MASTER,
                &ldbsearch(&cache_path(&ipa_domain), &user_cache_dn(CACHED_USER, &ad)),
            )
            .await?;

        ctx.expect(&search, Expectation::Succeeded, "ldbsearch on the IPA server cache failed")?;
        ctx.expect(
            &search,
            Expectation::Contains("dn: ".to_owned()),
            "AD user is not cached on the IPA server",
        )
    }
}
