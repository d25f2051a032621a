//! SSSD 보조 도구 — 캐시 초기화, 설정 조회, 도메인 목록

use trustcheck_core::host::HostRef;
use trustcheck_core::types::ErrorPolicy;
use trustcheck_runner::context::ScenarioContext;
use trustcheck_runner::error::RunnerError;

use crate::error::AdTrustError;
use crate::ipa::shell_quote;

/// SSSD 설정 파일 경로
pub const SSSD_CONF: &str = "/etc/sssd/sssd.conf";

/// SSSD 캐시 디렉터리
pub const SSSD_DB_DIR: &str = "/var/lib/sss/db";

/// 도메인 캐시 파일 경로 (`/var/lib/sss/db/cache_<domain>.ldb`)
pub fn cache_path(domain: &str) -> String {
    format!("{SSSD_DB_DIR}/cache_{domain}.ldb")
}

/// sssd.conf의 `[sssd]` 섹션 `domains` 값 중 첫 번째 도메인
pub fn parse_domain_section_name(conf: &str) -> Option<String> {
    let mut in_sssd = false;
    for line in conf.lines().map(str::trim) {
        if line.starts_with('[') {
            in_sssd = line == "[sssd]";
            continue;
        }
        if !in_sssd {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim() == "domains" {
            return value
                .split(',')
                .map(str::trim)
                .find(|d| !d.is_empty())
                .map(str::to_owned);
        }
    }
    None
}

/// 캐시에 저장된 trusted domain 사용자의 DN
pub fn user_cache_dn(user: &str, domain: &str) -> String {
    format!("name={user}@{domain},cn=users,cn={domain},cn=sysdb")
}

/// `ldbsearch -H <cache> -b <dn>`
pub fn ldbsearch(cache: &str, base_dn: &str) -> String {
    format!("ldbsearch -H {} -b {}", shell_quote(cache), shell_quote(base_dn))
}

/// `sssctl domain-list` 출력의 도메인 목록
pub fn parse_domain_list(stdout: &str) -> Vec<String> {
    stdout.split_whitespace().map(str::to_owned).collect()
}

/// 호스트 하나의 SSSD 조작
#[derive(Debug, Clone, Copy)]
pub struct SssdTools {
    host: HostRef,
}

impl SssdTools {
    /// 대상 호스트 지정
    pub fn new(host: HostRef) -> Self {
        Self { host }
    }

    /// sssd를 멈추고 캐시를 지운 뒤 다시 시작합니다.
    ///
    /// 재시작 실패는 이후 모든 조회를 무의미하게 만들므로 Fatal입니다.
    pub async fn clear_cache(&self, ctx: &mut ScenarioContext) -> Result<(), RunnerError> {
        ctx.exec(self.host, "systemctl stop sssd").await?;
        ctx.exec(self.host, &format!("rm -rf {SSSD_DB_DIR}/*"))
            .await?;
        ctx.run(self.host, "systemctl start sssd", ErrorPolicy::Fatal)
            .await?;
        Ok(())
    }

    /// 캐시 초기화를 teardown에 등록합니다. 등록 이후에 쌓인 정리 명령이 먼저 실행됩니다.
    pub fn defer_clear_cache(&self, ctx: &mut ScenarioContext) {
        ctx.defer(self.host, "systemctl start sssd");
        ctx.defer(self.host, format!("rm -rf {SSSD_DB_DIR}/*"));
        ctx.defer(self.host, "systemctl stop sssd");
    }

    /// sssd.conf에 설정된 첫 번째 도메인 섹션 이름
    pub async fn domain_section_name(
        &self,
        ctx: &mut ScenarioContext,
    ) -> Result<String, RunnerError> {
        let conf = ctx
            .run(self.host, &format!("cat {SSSD_CONF}"), ErrorPolicy::Fatal)
            .await?;
        parse_domain_section_name(&conf.stdout_text).ok_or_else(|| {
            AdTrustError::MissingDomainSection {
                host: conf.host.clone(),
            }
            .into()
        })
    }
}
