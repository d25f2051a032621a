//! 메트릭 상수 및 설명 등록
//!
//! 시나리오 실행 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다. recorder가 설치되지 않으면 매크로는 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `trustcheck_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 호스트 역할 레이블 키 (master, client, ad)
pub const LABEL_ROLE: &str = "role";

/// 명령 결과 레이블 키 (succeeded, tolerated, failed, error)
pub const LABEL_OUTCOME: &str = "outcome";

/// 시나리오 결과 레이블 키 (passed, failed, errored)
pub const LABEL_RESULT: &str = "result";

// ─── Runner 메트릭 ────────────────────────────────────────────────

/// 실행된 원격 명령 수 (counter, labels: role, outcome)
pub const RUNNER_COMMANDS_TOTAL: &str = "trustcheck_runner_commands_total";

/// 원격 명령 실행 시간 (histogram, 초)
pub const RUNNER_COMMAND_DURATION_SECONDS: &str = "trustcheck_runner_command_duration_seconds";

/// 완료된 시나리오 수 (counter, label: result)
pub const RUNNER_SCENARIOS_TOTAL: &str = "trustcheck_runner_scenarios_total";

/// 실패한 teardown 명령 수 (counter)
pub const RUNNER_TEARDOWN_FAILURES_TOTAL: &str = "trustcheck_runner_teardown_failures_total";

/// poll 샘플 수 (counter)
pub const RUNNER_POLL_ATTEMPTS_TOTAL: &str = "trustcheck_runner_poll_attempts_total";

/// 모든 메트릭의 설명을 등록합니다.
///
/// recorder 설치 직후 한 번 호출합니다.
pub fn describe_metrics() {
    metrics::describe_counter!(
        RUNNER_COMMANDS_TOTAL,
        "Total remote commands executed by the scenario runner"
    );
    metrics::describe_histogram!(
        RUNNER_COMMAND_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Remote command wall-clock duration"
    );
    metrics::describe_counter!(
        RUNNER_SCENARIOS_TOTAL,
        "Total scenarios completed, by result"
    );
    metrics::describe_counter!(
        RUNNER_TEARDOWN_FAILURES_TOTAL,
        "Teardown commands that failed and were tolerated"
    );
    metrics::describe_counter!(
        RUNNER_POLL_ATTEMPTS_TOTAL,
        "Samples taken by bounded poll loops"
    );
}
