use trustcheck_core::config::AdTrustConfig;
use trustcheck_core::error::ScenarioError;
use trustcheck_runner::context::{Probe, ScenarioContext};
use trustcheck_runner::error::RunnerError;
use trustcheck_runner::expect::{CountExpectation, Expectation};
use trustcheck_runner::poll::{Poller, Sample};
use trustcheck_runner::report::Phase;
use trustcheck_runner::scenario::Scenario;

use crate::ad::AdUserGroup;
use crate::ipa;
use crate::lab::{AD, MASTER, ad_domain, principal};
use crate::nss_idmap;
use crate::sssd::SssdTools;

/// AD 우선 도메인 해석 순서에서 외부 그룹을 거친 POSIX 그룹 멤버십이 빠지지 않아야 합니다.
///
/// 재현율이 100%가 아니어서 캐시를 비운 뒤 `getent group <gid>`로 negative cache를
/// 채우고 `id`를 확인하는 과정을 여러 번 반복합니다. 모든 회차에서 GID가 보여야 합니다.
#[derive(Debug)]
pub struct MissingSecondaryPosixGroups {
    posix_group: String,
    external_group: String,
    rounds: u32,
    prefix: String,
}

impl MissingSecondaryPosixGroups {
    pub fn new(config: &AdTrustConfig) -> Self {
        Self {
            posix_group: config.posix_group.clone(),
            external_group: config.external_group.clone(),
            rounds: config.membership_rounds,
            prefix: config.ad_user_prefix.clone(),
        }
    }
}

impl Scenario for MissingSecondaryPosixGroups {
    fn name(&self) -> &str {
        "ipa_missing_secondary_ipa_posix_groups"
    }

    fn title(&self) -> &str {
        "IPA missing secondary IPA Posix groups in latest sssd"
    }

    fn id(&self) -> &str {
        "bbb82516-4127-4053-9b06-9104ac889819"
    }

    fn tags(&self) -> &[&str] {
        &["trust", "groups", "customerscenario"]
    }

    fn bugzilla(&self) -> &[&str] {
        &[
            "https://bugzilla.redhat.com/show_bug.cgi?id=1945552",
            "https://bugzilla.redhat.com/show_bug.cgi?id=1937919",
            "https://bugzilla.redhat.com/show_bug.cgi?id=1945654",
        ]
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> Result<(), RunnerError> {
        let ad = ad_domain(ctx)?;
        let master = SssdTools::new(MASTER);
        let ipa_domain = master.domain_section_name(ctx).await?;
        let (posix, external) = (self.posix_group.as_str(), self.external_group.as_str());

        let fixture = AdUserGroup::create(ctx, AD, &self.prefix).await?;
        let user = principal(&fixture.user, &ad);

        ctx.create_fixture(
            MASTER,
            &ipa::domain_resolution_order(&[&ad, &ipa_domain]),
            ipa::domain_resolution_order(&[&ipa_domain, &ad]),
        )
        .await?;
        ctx.create_fixture(MASTER, &ipa::group_add(posix), ipa::group_del(posix))
            .await?;
        ctx.create_fixture(MASTER, &ipa::group_add_external(external), ipa::group_del(external))
            .await?;
        ctx.create_fixture(
            MASTER,
            &ipa::group_add_member_group(posix, external),
            ipa::group_remove_member_group(posix, external),
        )
        .await?;
        ctx.create_fixture(
            MASTER,
            &ipa::group_add_member_external(external, &user),
            ipa::group_remove_member_external(external, &user),
        )
        .await?;

        ctx.enter(Phase::Exercise);
        let shown = ctx.exec(MASTER, &ipa::group_show(posix)).await?;
        let gid = ipa::extract_gid(&shown.stdout_text)
            .ok_or_else(|| ScenarioError::Extraction {
                what: "posix group GID".to_owned(),
                command: shown.command.clone(),
            })?
            .to_string();

        let membership = ctx.exec(MASTER, &ipa::group_show(external)).await?;
        ctx.expect(
            &membership,
            Expectation::Contains(posix.to_owned()),
            "The external group is not a member of posix group!",
        )?;

        let resolvable = Probe::new(MASTER, nss_idmap::id(&user), Expectation::Succeeded);
        ctx.wait_for_propagation("ad user propagated to master", &resolvable).await;

        ctx.enter(Phase::Exercise);
        let mut poller = Poller::new(ctx.poll_policy(self.rounds));
        while poller.next_attempt().await {
            master.clear_cache(ctx).await?;
            ctx.exec(MASTER, &nss_idmap::getent_group(&gid)).await?;

            let id = ctx.exec(MASTER, &nss_idmap::id(&user)).await?;
            if !id.succeeded() {
                ctx.expect(
                    &id,
                    Expectation::Succeeded,
                    "Could not find the user, something wrong with setup!",
                )?;
            }
            poller.record(if id.stdout_text.contains(&gid) {
                Sample::Match
            } else {
                Sample::Miss
            });
        }

        let counts = poller.finish();
        ctx.record_poll("posix group membership", counts);
        ctx.expect_count(
            counts.matches,
            CountExpectation::Equals(self.rounds),
            "The user is not a member of posix group!",
        )
    }
}
