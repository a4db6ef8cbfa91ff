//! Wandbox: compiles and runs in a single request.
//!
//! API: <https://github.com/melpon/wandbox/blob/master/kennel/API.md>

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::*,
    http,
    model::*,
    util::{self, text_or_empty},
};

pub const COMPILE_URL: &str = "https://wandbox.org/api/compile.json";
pub const DEFAULT_COMPILER: &str = "gcc-head";
/// C++20 without GNU extensions.
pub const DEFAULT_OPTIONS: &str = "-std=c++20";
pub const SUCCESS_STATUS: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WandboxConfig {
    pub url: String,
    pub compiler: String,
    pub options: String,
    pub timeout_ms: u64,
    pub request_interval_ms: u64,
}

impl Default for WandboxConfig {
    fn default() -> Self {
        Self {
            url: COMPILE_URL.to_owned(),
            compiler: DEFAULT_COMPILER.to_owned(),
            options: DEFAULT_OPTIONS.to_owned(),
            timeout_ms: http::Client::DEFAULT_TIMEOUT.as_millis() as u64,
            request_interval_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileRequest<'a> {
    pub code: &'a str,
    pub compiler: &'a str,
    pub options: &'a str,
    pub stdin: &'a str,
}

/// Wandbox omits empty text fields, and omits `status` when the program was killed by a signal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompileResponse {
    pub status: Option<String>,
    pub signal: Option<String>,
    pub program_output: Option<String>,
    pub program_error: Option<String>,
    pub compiler_error: Option<String>,
}

impl CompileResponse {
    /// `status` is the exit status of the program, so a non-zero exit counts as not built.
    pub fn into_outcome(self, requested_url: &str) -> Result<ExecutionOutcome> {
        if self.status.is_none() && self.signal.is_none() {
            return Err(Error::MissingField {
                field: "status",
                requested_url: requested_url.to_owned(),
            });
        }
        if let Some(sig) = &self.signal {
            log::info!("Program was terminated by signal: {}", sig);
        }
        Ok(ExecutionOutcome {
            build_succeeded: self.status.as_deref() == Some(SUCCESS_STATUS),
            stdout: text_or_empty(self.program_output),
            stderr: text_or_empty(self.program_error),
            build_error_message: text_or_empty(self.compiler_error),
        })
    }
}

pub struct WandboxClient {
    http: http::Client,
    cfg: WandboxConfig,
}

impl WandboxClient {
    pub fn new(cfg: WandboxConfig) -> Result<Self> {
        util::parse_url(&cfg.url)?;
        let http = http::Client::new(
            Duration::from_millis(cfg.timeout_ms),
            [(
                http::Client::url_prefix_glob(&cfg.url),
                Duration::from_millis(cfg.request_interval_ms),
            )],
        )?;
        Ok(Self { http, cfg })
    }
}

#[async_trait]
impl Backend for WandboxClient {
    fn kind(&self) -> BackendKind {
        BackendKind::Wandbox
    }

    async fn execute(&self, code: &str, stdin: &str) -> Result<ExecutionOutcome> {
        let req = CompileRequest {
            code,
            compiler: &self.cfg.compiler,
            options: &self.cfg.options,
            stdin,
        };
        let resp = self.http.post(&self.cfg.url).json(&req).send().await?;
        let body: CompileResponse = util::read_json(resp, &self.cfg.url).await?;
        body.into_outcome(&self.cfg.url)
    }
}
