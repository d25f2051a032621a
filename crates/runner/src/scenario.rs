//! 시나리오 trait
//!
//! [`Scenario`]는 RPITIT 기반이므로 직접 `dyn`으로 쓸 수 없습니다.
//! 카탈로그는 [`DynScenario`]를 통해 `Box<dyn DynScenario>`로 시나리오를 보관합니다.

use std::future::Future;

use trustcheck_core::host::BoxFuture;

use crate::context::ScenarioContext;
use crate::error::RunnerError;

/// 통합 테스트 시나리오
///
/// `run`은 setup, exercise, 대기, 단언을 수행합니다.
/// teardown은 `ScenarioContext`에 등록된 정리 명령으로 러너가 실행하므로
/// `run`이 어떤 에러를 반환하더라도 정리가 보장됩니다.
pub trait Scenario: Send + Sync {
    /// 선택/필터링에 쓰는 고유 이름 (예: `"enforce_gid"`)
    fn name(&self) -> &str;

    /// 한 줄 제목
    fn title(&self) -> &str;

    /// 고정 식별자 (UUID 문자열)
    fn id(&self) -> &str;

    /// 태그 (예: `"tier2"`)
    fn tags(&self) -> &[&str] {
        &[]
    }

    /// 관련 버그 추적 번호
    fn bugzilla(&self) -> &[&str] {
        &[]
    }

    /// 시나리오 본문
    fn run(&self, ctx: &mut ScenarioContext)
    -> impl Future<Output = Result<(), RunnerError>> + Send;
}

/// dyn-compatible 시나리오 trait
pub trait DynScenario: Send + Sync {
    /// 고유 이름
    fn name(&self) -> &str;

    /// 한 줄 제목
    fn title(&self) -> &str;

    /// 고정 식별자
    fn id(&self) -> &str;

    /// 태그
    fn tags(&self) -> &[&str];

    /// 관련 버그 추적 번호
    fn bugzilla(&self) -> &[&str];

    /// 시나리오 본문
    fn run<'a>(&'a self, ctx: &'a mut ScenarioContext) -> BoxFuture<'a, Result<(), RunnerError>>;
}

impl<T: Scenario> DynScenario for T {
    fn name(&self) -> &str {
        Scenario::name(self)
    }

    fn title(&self) -> &str {
        Scenario::title(self)
    }

    fn id(&self) -> &str {
        Scenario::id(self)
    }

    fn tags(&self) -> &[&str] {
        Scenario::tags(self)
    }

    fn bugzilla(&self) -> &[&str] {
        Scenario::bugzilla(self)
    }

    fn run<'a>(&'a self, ctx: &'a mut ScenarioContext) -> BoxFuture<'a, Result<(), RunnerError>> {
        Box::pin(Scenario::run(self, ctx))
    }
}

/// 이름 또는 태그로 시나리오를 고릅니다.
///
/// `names`가 비어 있으면 이름 조건은 모두 통과합니다. `tag`가 주어지면 해당 태그를 가진
/// 시나리오만 남습니다.
pub fn matches_filter(scenario: &dyn DynScenario, names: &[String], tag: Option<&str>) -> bool {
    let name_ok = names.is_empty() || names.iter().any(|n| n == scenario.name());
    let tag_ok = tag.is_none_or(|t| scenario.tags().contains(&t));
    name_ok && tag_ok
}
