//! 시나리오 카탈로그

use trustcheck_core::config::AdTrustConfig;
use trustcheck_core::error::ScenarioError;
use trustcheck_runner::scenario::{DynScenario, matches_filter};

use crate::scenarios::{
    BasicSssctlList, EnforceGid, HonourIdOverride, IpaServerSssCacheUser,
    MissingSecondaryPosixGroups, NssGetByNameWithPrivateGroup,
};

/// 모든 시나리오를 실행 순서대로 반환합니다.
pub fn catalog(config: &AdTrustConfig) -> Vec<Box<dyn DynScenario>> {
    vec![
        Box::new(BasicSssctlList),
        Box::new(IpaServerSssCacheUser),
        Box::new(EnforceGid::new(config)),
        Box::new(HonourIdOverride::new(config)),
        Box::new(MissingSecondaryPosixGroups::new(config)),
        Box::new(NssGetByNameWithPrivateGroup::new(config)),
    ]
}

/// 이름과 태그로 시나리오를 고릅니다.
///
/// 카탈로그에 없는 이름이 하나라도 있으면 `ScenarioError::NotFound`를 반환합니다.
pub fn select(
    config: &AdTrustConfig,
    names: &[String],
    tag: Option<&str>,
) -> Result<Vec<Box<dyn DynScenario>>, ScenarioError> {
    let all = catalog(config);
    if let Some(unknown) = names
        .iter()
        .find(|n| !all.iter().any(|s| s.name() == n.as_str()))
    {
        return Err(ScenarioError::NotFound(unknown.clone()));
    }

    Ok(all
        .into_iter()
        .filter(|s| matches_filter(s.as_ref(), names, tag))
        .collect())
}
