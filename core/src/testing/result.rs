use std::{collections::HashMap, fmt};

use serde::Serialize;

pub use rj_webclient::ExecutionOutcome;

use super::testcase::TestCase;
use crate::compare::{self, Tolerance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumIter)]
pub enum JudgeCode {
    /// Correct output
    AC,
    /// Built, but wrong output
    WA,
    /// Build failed, or the program exited non-zero or was killed by a signal
    CE,
    /// Backend unreachable or answered garbage
    IE,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseResult {
    pub case_index: usize,
    pub input: String,
    pub expected: String,
    pub outcome: Option<ExecutionOutcome>,
    pub is_correct: bool,
    pub transport_error: Option<String>,
}

impl CaseResult {
    pub fn completed(
        case_index: usize,
        testcase: &TestCase,
        outcome: ExecutionOutcome,
        tolerance: &Tolerance,
    ) -> Self {
        let is_correct = compare::compare(
            outcome.build_succeeded,
            &outcome.stdout,
            &testcase.expected,
            tolerance,
        );
        Self {
            case_index,
            input: testcase.input.clone(),
            expected: testcase.expected.clone(),
            outcome: Some(outcome),
            is_correct,
            transport_error: None,
        }
    }

    pub fn transport_failure(case_index: usize, testcase: &TestCase, err: impl fmt::Display) -> Self {
        Self {
            case_index,
            input: testcase.input.clone(),
            expected: testcase.expected.clone(),
            outcome: None,
            is_correct: false,
            transport_error: Some(err.to_string()),
        }
    }

    pub fn judge(&self) -> JudgeCode {
        match &self.outcome {
            _ if self.is_correct => JudgeCode::AC,
            None => JudgeCode::IE,
            Some(o) if !o.build_succeeded => JudgeCode::CE,
            Some(_) => JudgeCode::WA,
        }
    }
}

/// Outcome of one judging run. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    results: Vec<CaseResult>,
    correct_count: usize,
    total_count: usize,
}

impl Verdict {
    /// `results` must already be ordered by `case_index`.
    pub fn new(results: Vec<CaseResult>) -> Self {
        debug_assert!(results
            .iter()
            .enumerate()
            .all(|(i, r)| r.case_index == i + 1));
        let correct_count = results.iter().filter(|r| r.is_correct).count();
        let total_count = results.len();
        Self {
            results,
            correct_count,
            total_count,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn results(&self) -> &[CaseResult] {
        &self.results
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn is_passed(&self) -> bool {
        self.total_count > 0 && self.correct_count == self.total_count
    }

    pub fn count_by_judge(&self) -> HashMap<JudgeCode, usize> {
        self.results.iter().fold(HashMap::new(), |mut count, r| {
            *count.entry(r.judge()).or_default() += 1;
            count
        })
    }
}
