use trustcheck_runner::context::ScenarioContext;
use trustcheck_runner::error::RunnerError;
use trustcheck_runner::expect::Expectation;
use trustcheck_runner::report::Phase;
use trustcheck_runner::scenario::Scenario;

use crate::lab::{MASTER, ad_domain};
use crate::sssd::parse_domain_list;

/// `sssctl domain-list`가 AD 도메인을 포함하는지 확인합니다.
#[derive(Debug, Default)]
pub struct BasicSssctlList;

impl Scenario for BasicSssctlList {
    fn name(&self) -> &str {
        "basic_sssctl_list"
    }

    fn title(&self) -> &str {
        "Verify sssctl lists trusted domain"
    }

    fn id(&self) -> &str {
        "8da8919d-524c-4498-8dc8-608eb5e139b0"
    }

    fn tags(&self) -> &[&str] {
        &["trust", "sssctl"]
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> Result<(), RunnerError> {
        let domain = ad_domain(ctx)?;

        ctx.enter(Phase::Exercise);
        let listed = ctx.exec(MASTER, "sssctl domain-list").await?;
        let domains = parse_domain_list(&listed.stdout_text);
        tracing::debug!(?domains, "trusted domains listed");

        ctx.expect(
            &listed,
            Expectation::ContainsWord(domain),
            "sssctl domain-list does not list the AD domain",
        )
    }
}
