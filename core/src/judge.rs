//! Judging orchestration: one backend per run, every testcase in its own task.
//!
//! Results are slotted by case index, so completion order never leaks into the verdict.
//! A task that dies without producing a result still yields an `IE` result for its case.

use std::{future::Future, sync::Arc, time::Duration};

use rj_webclient::{Backend, BackendConfig, BackendKind, Result};
use serde::{Deserialize, Serialize};
use tokio::{
    sync::{mpsc::UnboundedSender, Semaphore},
    task::JoinSet,
};

use crate::{
    compare::Tolerance,
    testing::{CaseResult, CaseRunner, TestCase, Verdict},
};

/// Everything one judging run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub code: String,
    pub testcases: Vec<TestCase>,
    pub tolerance: Tolerance,
    pub backend: BackendKind,
}

impl Job {
    pub fn new(
        code: impl Into<String>,
        testcases: Vec<TestCase>,
        tolerance: Tolerance,
        backend: BackendKind,
    ) -> Self {
        Self {
            code: code.into(),
            testcases,
            tolerance,
            backend,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JudgeEvent {
    Started { total: usize },
    CaseFinished(CaseResult),
    Finished { correct: usize, total: usize },
}

#[derive(Debug, Clone)]
pub struct Judge {
    backend_config: BackendConfig,
    max_concurrency: usize,
    case_timeout: Option<Duration>,
}

impl Default for Judge {
    fn default() -> Self {
        Self::new(BackendConfig::default())
    }
}

impl Judge {
    pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

    pub fn new(backend_config: BackendConfig) -> Self {
        Self {
            backend_config,
            max_concurrency: Self::DEFAULT_MAX_CONCURRENCY,
            case_timeout: None,
        }
    }

    /// At least one case always runs.
    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n.max(1);
        self
    }

    pub fn case_timeout(mut self, limit: Option<Duration>) -> Self {
        self.case_timeout = limit;
        self
    }

    pub fn get_max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn get_backend_config(&self) -> &BackendConfig {
        &self.backend_config
    }

    /// Fails only when the selected backend cannot be built from its settings.
    pub async fn judge(&self, job: &Job) -> Result<Verdict> {
        if job.testcases.is_empty() {
            return Ok(Verdict::empty());
        }
        let backend = rj_webclient::new_backend(job.backend, &self.backend_config)?;
        Ok(self.judge_with_backend(job, backend, None).await)
    }

    /// Like [`Judge::judge`], but gives up as soon as `cancelled` completes.
    /// In-flight backend calls are aborted and `None` is returned.
    pub async fn judge_until<F>(
        &self,
        job: &Job,
        events: Option<UnboundedSender<JudgeEvent>>,
        cancelled: F,
    ) -> Result<Option<Verdict>>
    where
        F: Future<Output = ()>,
    {
        if job.testcases.is_empty() {
            return Ok(Some(Verdict::empty()));
        }
        let backend = rj_webclient::new_backend(job.backend, &self.backend_config)?;

        tokio::select! {
            verdict = self.judge_with_backend(job, backend, events.as_ref()) => Ok(Some(verdict)),
            _ = cancelled => {
                log::info!("Judging cancelled; discarding in-flight results");
                Ok(None)
            }
        }
    }

    /// Runs `job` on the given backend, ignoring `job.backend`.
    pub async fn judge_with_backend(
        &self,
        job: &Job,
        backend: Arc<dyn Backend>,
        events: Option<&UnboundedSender<JudgeEvent>>,
    ) -> Verdict {
        let emit = |ev: JudgeEvent| {
            if let Some(tx) = events {
                // Receiver gone means nobody is watching; the run goes on.
                let _ = tx.send(ev);
            }
        };

        let total = job.testcases.len();
        emit(JudgeEvent::Started { total });
        if total == 0 {
            emit(JudgeEvent::Finished {
                correct: 0,
                total: 0,
            });
            return Verdict::empty();
        }

        log::info!(
            "Judging {} testcases on {} (max concurrency: {})",
            total,
            backend.kind().service_name(),
            self.max_concurrency
        );

        let runner = CaseRunner::new(backend, job.tolerance).timeout(self.case_timeout);
        let code: Arc<str> = Arc::from(job.code.as_str());
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));

        // Dropping the set aborts every task still running.
        let mut tasks = JoinSet::new();
        for (i, t) in job.testcases.iter().enumerate() {
            let (runner, code, semaphore, t) =
                (runner.clone(), code.clone(), semaphore.clone(), t.clone());
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                runner.run(i + 1, &t, &code).await
            });
        }

        let mut slots: Vec<Option<CaseResult>> = vec![None; total];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(res) => {
                    log::debug!("Testcase {} finished: {}", res.case_index, res.judge());
                    emit(JudgeEvent::CaseFinished(res.clone()));
                    let slot = res.case_index - 1;
                    slots[slot] = Some(res);
                }
                Err(e) => log::error!("Testcase task died: {}", e),
            }
        }

        let results: Vec<CaseResult> = slots
            .into_iter()
            .zip(&job.testcases)
            .enumerate()
            .map(|(i, (slot, t))| {
                slot.unwrap_or_else(|| {
                    let res = CaseResult::transport_failure(i + 1, t, "testcase task died");
                    emit(JudgeEvent::CaseFinished(res.clone()));
                    res
                })
            })
            .collect();

        let verdict = Verdict::new(results);
        emit(JudgeEvent::Finished {
            correct: verdict.correct_count(),
            total: verdict.total_count(),
        });
        log::info!(
            "Judging finished: {}/{} correct",
            verdict.correct_count(),
            verdict.total_count()
        );
        verdict
    }
}
