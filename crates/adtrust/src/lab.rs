//! 표준 랩 토폴로지 (master, client, AD 각 하나)

use trustcheck_core::host::HostRef;
use trustcheck_runner::context::ScenarioContext;
use trustcheck_runner::error::RunnerError;

use crate::error::AdTrustError;

/// IPA 서버
pub const MASTER: HostRef = HostRef::master(0);

/// IPA 클라이언트
pub const CLIENT: HostRef = HostRef::client(0);

/// AD 도메인 컨트롤러
pub const AD: HostRef = HostRef::ad(0);

/// 신뢰 관계의 AD 도메인 이름
pub fn ad_domain(ctx: &ScenarioContext) -> Result<String, RunnerError> {
    let ad = ctx.host(AD)?;
    ad.domain_name().map(str::to_owned).ok_or_else(|| {
        AdTrustError::MissingDomain {
            host: ad.name().to_owned(),
        }
        .into()
    })
}

/// 클라이언트의 시스템 호스트명
pub fn client_hostname(ctx: &ScenarioContext) -> Result<String, RunnerError> {
    Ok(ctx.host(CLIENT)?.hostname().to_owned())
}

/// `user@domain`
pub fn principal(user: &str, domain: &str) -> String {
    format!("{user}@{domain}")
}
