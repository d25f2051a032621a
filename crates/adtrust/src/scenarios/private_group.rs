use trustcheck_core::config::AdTrustConfig;
use trustcheck_runner::context::ScenarioContext;
use trustcheck_runner::error::RunnerError;
use trustcheck_runner::expect::Expectation;
use trustcheck_runner::report::Phase;
use trustcheck_runner::scenario::Scenario;

use crate::ipa;
use crate::lab::MASTER;
use crate::nss_idmap;

/// private group을 가진 IPA 사용자도 SID로 조회되어야 합니다.
///
/// 사용자는 단언 전에 삭제됩니다.
#[derive(Debug)]
pub struct NssGetByNameWithPrivateGroup {
    user: String,
}

impl NssGetByNameWithPrivateGroup {
    pub fn new(config: &AdTrustConfig) -> Self {
        Self {
            user: config.private_group_user.clone(),
        }
    }
}

impl Scenario for NssGetByNameWithPrivateGroup {
    fn name(&self) -> &str {
        "nss_get_by_name_with_private_group"
    }

    fn title(&self) -> &str {
        "SSSD fails nss_getby_name for IPA user with SID if the user has a private group"
    }

    fn id(&self) -> &str {
        "45dce6b9-0d47-4b9f-9532-4da8178e5334"
    }

    fn tags(&self) -> &[&str] {
        &["trust", "nss"]
    }

    fn bugzilla(&self) -> &[&str] {
        &["https://bugzilla.redhat.com/show_bug.cgi?id=1837090"]
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> Result<(), RunnerError> {
        let user = self.user.as_str();
        let created = ctx
            .create_fixture(MASTER, &ipa::user_add(user, "Some", "User"), ipa::user_del(user))
            .await?;

        ctx.enter(Phase::Exercise);
        let found = ctx.exec(MASTER, &nss_idmap::id(user)).await?;
        let admin_sid = ctx.exec(MASTER, &nss_idmap::getsidbyname("admin")).await?;
        let user_sid = ctx.exec(MASTER, &nss_idmap::getsidbyname(user)).await?;

        ctx.release(created).await?;

        ctx.expect(&found, Expectation::Succeeded, "Could not find the user!")?;
        ctx.expect(&admin_sid, Expectation::Succeeded, "Something wrong with setup!")?;
        ctx.expect(
            &user_sid,
            Expectation::Succeeded,
            &format!("pysss_nss_idmap.getsidbyname for {user} failed"),
        )
    }
}
