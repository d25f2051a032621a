//! NSS 조회 명령 (`id`, `getent`, `pysss_nss_idmap`)

use crate::ipa::shell_quote;

/// `id <name>`
pub fn id(name: &str) -> String {
    format!("id {}", shell_quote(name))
}

/// `id -u <name>`
pub fn id_uid(name: &str) -> String {
    format!("id -u {}", shell_quote(name))
}

/// `id -g <name>`
pub fn id_gid(name: &str) -> String {
    format!("id -g {}", shell_quote(name))
}

/// `getent group <key>`
pub fn getent_group(key: &str) -> String {
    format!("getent group {}", shell_quote(key))
}

/// 이름으로 SID를 조회하고, 결과가 비어 있으면 종료 코드 2로 끝나는 명령
pub fn getsidbyname(name: &str) -> String {
    let script = format!(
        "import pysss_nss_idmap; import sys; \
         result=pysss_nss_idmap.getsidbyname({name:?}); \
         print(result); result or sys.exit(2)"
    );
    format!("python3 -c {}", shell_quote(&script))
}
