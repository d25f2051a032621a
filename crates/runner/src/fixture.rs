//! fixture 스택 — 등록 역순 teardown
//!
//! 시나리오가 만든 원격 객체마다 정리 명령을 하나씩 등록합니다.
//! 스택에서 꺼낸 항목은 다시 실행되지 않으므로 각 정리 명령은 최대 한 번 실행됩니다.

use trustcheck_core::host::HostRef;

use crate::step::Step;

/// 등록된 fixture 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixtureId(u64);

/// 등록된 정리 동작
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teardown {
    /// 식별자
    pub id: FixtureId,
    /// 정리 단계 (항상 실패 허용)
    pub step: Step,
}

/// 정리 동작 스택
#[derive(Debug, Default)]
pub struct FixtureStack {
    entries: Vec<Teardown>,
    next_id: u64,
}

impl FixtureStack {
    /// 빈 스택을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 정리 명령을 등록합니다.
    pub fn push(&mut self, host: HostRef, command: impl Into<String>) -> FixtureId {
        let id = FixtureId(self.next_id);
        self.next_id += 1;
        self.entries.push(Teardown {
            id,
            step: Step::tolerated(host, command),
        });
        id
    }

    /// 가장 최근에 등록된 정리 명령을 꺼냅니다.
    pub fn pop(&mut self) -> Option<Teardown> {
        self.entries.pop()
    }

    /// 특정 정리 명령을 스택에서 제거하고 반환합니다.
    ///
    /// 시나리오 본문에서 객체를 명시적으로 삭제할 때 사용합니다.
    pub fn take(&mut self, id: FixtureId) -> Option<Teardown> {
        let pos = self.entries.iter().position(|t| t.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// 등록된 정리 명령 수
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 실행 예정 순서(역순)로 정리 명령을 나열합니다.
    pub fn pending(&self) -> impl Iterator<Item = &Teardown> {
        self.entries.iter().rev()
    }
}
