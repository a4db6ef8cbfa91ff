use std::{sync::Arc, time::Duration};

use rj_webclient::{Backend, Error};

use super::{result::*, testcase::*};
use crate::compare::Tolerance;

/// Runs a single testcase on a backend and judges its output.
#[derive(Clone)]
pub struct CaseRunner {
    backend: Arc<dyn Backend>,
    tolerance: Tolerance,
    timeout: Option<Duration>,
}

impl CaseRunner {
    pub fn new(backend: Arc<dyn Backend>, tolerance: Tolerance) -> Self {
        Self {
            backend,
            tolerance,
            timeout: None,
        }
    }

    /// Upper bound of one backend call, on top of the backend's own request timeout.
    pub fn timeout(mut self, limit: Option<Duration>) -> Self {
        self.timeout = limit;
        self
    }

    /// Never fails: a backend error becomes a result with `transport_error` set.
    pub async fn run(&self, case_index: usize, testcase: &TestCase, code: &str) -> CaseResult {
        let exec = self.backend.execute(code, &testcase.input);
        let res = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exec)
                .await
                .unwrap_or(Err(Error::TimedOut(limit))),
            None => exec.await,
        };

        match res {
            Ok(outcome) => CaseResult::completed(case_index, testcase, outcome, &self.tolerance),
            Err(e) => {
                log::warn!(
                    "Testcase {} failed on {}: {}",
                    case_index,
                    self.backend.kind().service_name(),
                    e
                );
                CaseResult::transport_failure(case_index, testcase, e)
            }
        }
    }
}
