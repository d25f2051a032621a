//! `ipa` CLI 명령 빌더
//!
//! 모든 명령은 셸을 거쳐 원격에서 실행되므로, 사용자 입력이 들어가는 인자는
//! [`shell_quote`]로 감쌉니다.

use std::sync::LazyLock;

use regex::Regex;

static GID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"GID: (\d+)").expect("GID pattern is valid"));

/// 단일 인용부호로 셸 인자를 감쌉니다.
pub fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// `ipa idview-add <view>`
pub fn idview_add(view: &str) -> String {
    format!("ipa idview-add {}", shell_quote(view))
}

/// `ipa idview-apply <view> --hosts=<host>`
pub fn idview_apply(view: &str, host: &str) -> String {
    format!("ipa idview-apply {} --hosts={}", shell_quote(view), shell_quote(host))
}

/// `ipa idview-del <view>`
pub fn idview_del(view: &str) -> String {
    format!("ipa idview-del {}", shell_quote(view))
}

/// `ipa idoverridegroup-add <view> <group> --gid=<gid>`
pub fn idoverridegroup_add(view: &str, group: &str, gid: u32) -> String {
    format!(
        "ipa idoverridegroup-add {} {} --gid={gid}",
        shell_quote(view),
        shell_quote(group)
    )
}

/// `ipa idoverrideuser-add <view> <user> --uid --gidnumber --home`
pub fn idoverrideuser_add(view: &str, user: &str, uid: u32, gid: u32, home: &str) -> String {
    format!(
        "ipa idoverrideuser-add {} {} --uid={uid} --gidnumber={gid} --home={}",
        shell_quote(view),
        shell_quote(user),
        shell_quote(home)
    )
}

/// `ipa group-add <group>`
pub fn group_add(group: &str) -> String {
    format!("ipa group-add {}", shell_quote(group))
}

/// `ipa group-add --external <group>`
pub fn group_add_external(group: &str) -> String {
    format!("ipa group-add --external {}", shell_quote(group))
}

/// `ipa -n group-add-member <group> --groups=<member>`
pub fn group_add_member_group(group: &str, member: &str) -> String {
    format!(
        "ipa -n group-add-member {} --groups={}",
        shell_quote(group),
        shell_quote(member)
    )
}

/// `ipa -n group-add-member <group> --external <principal>`
pub fn group_add_member_external(group: &str, principal: &str) -> String {
    format!(
        "ipa -n group-add-member {} --external {}",
        shell_quote(group),
        shell_quote(principal)
    )
}

/// `ipa -n group-remove-member <group> --groups=<member>`
pub fn group_remove_member_group(group: &str, member: &str) -> String {
    format!(
        "ipa -n group-remove-member {} --groups={}",
        shell_quote(group),
        shell_quote(member)
    )
}

/// `ipa -n group-remove-member <group> --external <principal>`
pub fn group_remove_member_external(group: &str, principal: &str) -> String {
    format!(
        "ipa -n group-remove-member {} --external {}",
        shell_quote(group),
        shell_quote(principal)
    )
}

/// `ipa group-show <group>`
pub fn group_show(group: &str) -> String {
    format!("ipa group-show {}", shell_quote(group))
}

/// `ipa group-del <group>`
pub fn group_del(group: &str) -> String {
    format!("ipa group-del {}", shell_quote(group))
}

/// `ipa user-add <login> --first --last`
pub fn user_add(login: &str, first: &str, last: &str) -> String {
    format!(
        "ipa user-add {} --first={} --last={}",
        shell_quote(login),
        shell_quote(first),
        shell_quote(last)
    )
}

/// `ipa user-del <login>`
pub fn user_del(login: &str) -> String {
    format!("ipa user-del {}", shell_quote(login))
}

/// `ipa config-mod --domain-resolution-order=<d1>:<d2>...`
pub fn domain_resolution_order(domains: &[&str]) -> String {
    format!(
        "ipa config-mod --domain-resolution-order={}",
        shell_quote(&domains.join(":"))
    )
}

/// `ipa group-show` 출력에서 GID를 추출합니다.
pub fn extract_gid(group_show: &str) -> Option<u32> {
    GID_PATTERN
        .captures(group_show)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
