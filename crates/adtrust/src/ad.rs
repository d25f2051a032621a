//! AD 사용자/그룹 fixture
//!
//! AD 도메인 컨트롤러의 OpenSSH 기본 셸이 PowerShell이라고 가정합니다.
//! 바깥 셸이 큰따옴표 안의 `$`를 확장하지 않도록 스크립트의 특수 문자는 backtick으로 이스케이프합니다.
//! 생성한 사용자와 그룹은 fixture 스택에 삭제 명령으로 등록됩니다.

use tracing::info;
use trustcheck_core::host::HostRef;
use trustcheck_runner::context::ScenarioContext;
use trustcheck_runner::error::RunnerError;
use uuid::Uuid;

/// 테스트 사용자 초기 비밀번호
const FIXTURE_PASSWORD: &str = "Secret123";

/// 생성된 AD 사용자와 그룹
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdUserGroup {
    /// 사용자 sAMAccountName
    pub user: String,
    /// 그룹 이름
    pub group: String,
}

impl AdUserGroup {
    /// 접두어와 임의 접미어로 이름을 만듭니다.
    pub fn named(prefix: &str) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        let suffix = &suffix[..6];
        Self {
            user: format!("{prefix}{suffix}"),
            group: format!("{prefix}{suffix}_grp"),
        }
    }

    /// AD 사용자, 그룹, 멤버십을 만들고 정리 명령을 등록합니다.
    pub async fn create(
        ctx: &mut ScenarioContext,
        ad: HostRef,
        prefix: &str,
    ) -> Result<Self, RunnerError> {
        let fixture = Self::named(prefix);
        ctx.create_fixture(ad, &new_user(&fixture.user), remove_user(&fixture.user))
            .await?;
        ctx.create_fixture(ad, &new_group(&fixture.group), remove_group(&fixture.group))
            .await?;
        ctx.setup(ad, &add_member(&fixture.group, &fixture.user))
            .await?;
        info!(user = %fixture.user, group = %fixture.group, "ad fixture created");
        Ok(fixture)
    }
}

fn powershell(script: &str) -> String {
    format!(
        "powershell -NoProfile -NonInteractive -Command \"{}\"",
        escape_double_quoted(script)
    )
}

/// PowerShell 큰따옴표 문자열 안에서 그대로 전달되도록 `` ` ``, `$`, `"`를 이스케이프합니다.
fn escape_double_quoted(script: &str) -> String {
    let mut escaped = String::with_capacity(script.len());
    for c in script.chars() {
        if matches!(c, '`' | '$' | '"') {
            escaped.push('`');
        }
        escaped.push(c);
    }
    escaped
}

/// `New-ADUser`
pub fn new_user(user: &str) -> String {
    powershell(&format!(
        "New-ADUser -Name '{user}' -SamAccountName '{user}' \
         -AccountPassword (ConvertTo-SecureString '{FIXTURE_PASSWORD}' -AsPlainText -Force) \
         -Enabled $true"
    ))
}

/// `New-ADGroup`
pub fn new_group(group: &str) -> String {
    powershell(&format!(
        "New-ADGroup -Name '{group}' -SamAccountName '{group}' -GroupScope Global -GroupCategory Security"
    ))
}

/// `Add-ADGroupMember`
pub fn add_member(group: &str, user: &str) -> String {
    powershell(&format!("Add-ADGroupMember -Identity '{group}' -Members '{user}'"))
}

/// `Remove-ADUser`
pub fn remove_user(user: &str) -> String {
    powershell(&format!("Remove-ADUser -Identity '{user}' -Confirm:$false"))
}

/// `Remove-ADGroup`
pub fn remove_group(group: &str) -> String {
    powershell(&format!("Remove-ADGroup -Identity '{group}' -Confirm:$false"))
}
