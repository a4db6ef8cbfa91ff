//! Scripted backends for tests.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use rand::Rng as _;
use rj_webclient::{Backend, BackendKind, Error, ExecutionOutcome, Result};

type Reply = Box<dyn Fn(&str) -> Result<ExecutionOutcome> + Send + Sync>;

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub started: AtomicUsize,
    pub finished: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

pub(crate) struct FakeBackend {
    reply: Reply,
    delay: Duration,
    jitter_ms: u64,
    pub counters: Arc<Counters>,
}

fn built(stdout: String) -> Result<ExecutionOutcome> {
    Ok(ExecutionOutcome {
        build_succeeded: true,
        stdout,
        ..Default::default()
    })
}

impl FakeBackend {
    pub fn new(reply: impl Fn(&str) -> Result<ExecutionOutcome> + Send + Sync + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            delay: Duration::ZERO,
            jitter_ms: 0,
            counters: Arc::default(),
        }
    }

    /// Prints the sum of the integers in stdin, without trailing newline.
    pub fn summing() -> Self {
        Self::new(|stdin| {
            let sum: i64 = stdin
                .split_whitespace()
                .filter_map(|s| s.parse::<i64>().ok())
                .sum();
            built(sum.to_string())
        })
    }

    /// Echoes stdin.
    pub fn echoing() -> Self {
        Self::new(|stdin| built(stdin.to_owned()))
    }

    pub fn replying(stdout: &'static str) -> Self {
        Self::new(move |_| built(stdout.to_owned()))
    }

    pub fn build_failing(stdout: &'static str) -> Self {
        Self::new(move |_| {
            Ok(ExecutionOutcome {
                build_succeeded: false,
                stdout: stdout.to_owned(),
                stderr: String::new(),
                build_error_message: "error: expected ';'".to_owned(),
            })
        })
    }

    pub fn failing() -> Self {
        Self::new(|_| {
            Err(Error::MissingField {
                field: "status",
                requested_url: "http://fake.invalid/".to_owned(),
            })
        })
    }

    pub fn delay(mut self, d: Duration) -> Self {
        self.delay = d;
        self
    }

    /// Adds a random extra delay in `0..max_ms` to every call.
    pub fn jitter(mut self, max_ms: u64) -> Self {
        self.jitter_ms = max_ms;
        self
    }
}

#[async_trait]
impl Backend for FakeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Wandbox
    }

    async fn execute(&self, _code: &str, stdin: &str) -> Result<ExecutionOutcome> {
        let c = &self.counters;
        c.started.fetch_add(1, Ordering::SeqCst);
        let now = c.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        c.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let jitter = if self.jitter_ms > 0 {
            rand::thread_rng().gen_range(0..self.jitter_ms)
        } else {
            0
        };
        tokio::time::sleep(self.delay + Duration::from_millis(jitter)).await;

        c.in_flight.fetch_sub(1, Ordering::SeqCst);
        c.finished.fetch_add(1, Ordering::SeqCst);
        (self.reply)(stdin)
    }
}
