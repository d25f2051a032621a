//! IPA-AD trust 시나리오

mod cache_user;
mod enforce_gid;
mod honour_idoverride;
mod posix_groups;
mod private_group;
mod sssctl_list;

pub use cache_user::IpaServerSssCacheUser;
pub use enforce_gid::EnforceGid;
pub use honour_idoverride::HonourIdOverride;
pub use posix_groups::MissingSecondaryPosixGroups;
pub use private_group::NssGetByNameWithPrivateGroup;
pub use sssctl_list::BasicSssctlList;
