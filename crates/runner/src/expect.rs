//! 단언 — 명령 결과와 poll 카운트에 대한 기대 조건
//!
//! 단언 실패는 호스트 에러와 구분되는 [`AssertionFailure`]로 보고되며,
//! 실패 메시지와 함께 관찰된 명령 출력을 담습니다.

use std::fmt;

use serde::Serialize;
use trustcheck_core::types::CommandResult;

/// 명령 결과에 대한 기대 조건
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// stdout에 부분 문자열이 포함됨
    Contains(String),
    /// stdout에 부분 문자열이 포함되지 않음
    NotContains(String),
    /// stdout을 공백으로 나눈 단어 중 하나와 일치
    ContainsWord(String),
    /// 앞뒤 공백을 제거한 stdout이 정확히 일치
    Equals(String),
    /// 종료 코드가 정확히 일치
    ExitCode(i32),
    /// 종료 코드 0
    Succeeded,
    /// 종료 코드가 0이 아님
    Failed,
}

impl Expectation {
    /// 결과가 조건을 만족하는지 검사합니다.
    pub fn matches(&self, result: &CommandResult) -> bool {
        match self {
            Self::Contains(needle) => result.stdout_text.contains(needle.as_str()),
            Self::NotContains(needle) => !result.stdout_text.contains(needle.as_str()),
            Self::ContainsWord(word) => result
                .stdout_text
                .split_whitespace()
                .any(|w| w == word.as_str()),
            Self::Equals(expected) => result.stdout_trimmed() == expected.as_str(),
            Self::ExitCode(code) => result.exit_code == *code,
            Self::Succeeded => result.succeeded(),
            Self::Failed => !result.succeeded(),
        }
    }

    /// 결과를 검사하고, 불일치 시 실패 정보를 만듭니다.
    pub fn check(
        &self,
        result: &CommandResult,
        message: impl Into<String>,
    ) -> Result<(), AssertionFailure> {
        if self.matches(result) {
            Ok(())
        } else {
            Err(AssertionFailure::from_result(message, self.to_string(), result))
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains(s) => write!(f, "stdout contains '{s}'"),
            Self::NotContains(s) => write!(f, "stdout does not contain '{s}'"),
            Self::ContainsWord(s) => write!(f, "stdout lists '{s}'"),
            Self::Equals(s) => write!(f, "stdout equals '{s}'"),
            Self::ExitCode(c) => write!(f, "exit code {c}"),
            Self::Succeeded => write!(f, "exit code 0"),
            Self::Failed => write!(f, "non-zero exit code"),
        }
    }
}

/// poll 카운트에 대한 기대 조건
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountExpectation {
    /// 정확히 n
    Equals(u32),
    /// 최대 n
    AtMost(u32),
    /// 최소 n
    AtLeast(u32),
}

impl CountExpectation {
    /// 카운트가 조건을 만족하는지 검사합니다.
    pub fn matches(&self, count: u32) -> bool {
        match *self {
            Self::Equals(n) => count == n,
            Self::AtMost(n) => count <= n,
            Self::AtLeast(n) => count >= n,
        }
    }

    /// 카운트를 검사하고, 불일치 시 실패 정보를 만듭니다.
    pub fn check(&self, count: u32, message: impl Into<String>) -> Result<(), AssertionFailure> {
        if self.matches(count) {
            return Ok(());
        }
        Err(AssertionFailure::condition(
            message,
            format!("count {self}, observed {count}"),
        ))
    }
}

impl fmt::Display for CountExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals(n) => write!(f, "== {n}"),
            Self::AtMost(n) => write!(f, "<= {n}"),
            Self::AtLeast(n) => write!(f, ">= {n}"),
        }
    }
}

/// 단언 실패 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionFailure {
    /// 시나리오가 지정한 실패 메시지
    pub message: String,
    /// 기대 조건 설명
    pub expected: String,
    /// 관련 호스트
    pub host: Option<String>,
    /// 관련 명령
    pub command: Option<String>,
    /// 관찰된 종료 코드
    pub exit_code: Option<i32>,
    /// 관찰된 stdout
    pub stdout: String,
    /// 관찰된 stderr
    pub stderr: String,
}

impl AssertionFailure {
    /// 명령 결과로부터 실패 정보를 만듭니다.
    pub fn from_result(
        message: impl Into<String>,
        expected: impl Into<String>,
        result: &CommandResult,
    ) -> Self {
        Self {
            message: message.into(),
            expected: expected.into(),
            host: Some(result.host.clone()),
            command: Some(result.command.clone()),
            exit_code: Some(result.exit_code),
            stdout: result.stdout_text.clone(),
            stderr: result.stderr_text.clone(),
        }
    }

    /// 명령과 무관한 조건의 실패
    pub fn condition(message: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expected: expected.into(),
            host: None,
            command: None,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (expected {}", self.message, self.expected)?;
        if let (Some(host), Some(command)) = (&self.host, &self.command) {
            write!(f, "; {host}: '{command}'")?;
        }
        write!(f, ")")
    }
}
