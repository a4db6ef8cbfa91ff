//! Paiza.IO: submit, wait a fixed settle delay, then fetch the result once.
//!
//! The result is fetched exactly once. A run still in progress after the settle delay
//! comes back without `build_result` and is reported as [`Error::MissingField`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::*,
    http,
    model::*,
    util::{self, text_or_empty},
};

pub const CREATE_URL: &str = "http://api.paiza.io/runners/create";
pub const DETAILS_URL: &str = "http://api.paiza.io/runners/get_details";
pub const DEFAULT_LANGUAGE: &str = "cpp";
pub const GUEST_API_KEY: &str = "guest";
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(3000);
pub const SUCCESS_BUILD_RESULT: &str = "success";
const COMPLETED_STATUS: &str = "completed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaizaConfig {
    pub create_url: String,
    pub details_url: String,
    pub language: String,
    pub api_key: String,
    pub settle_delay_ms: u64,
    pub timeout_ms: u64,
    pub request_interval_ms: u64,
}

impl Default for PaizaConfig {
    fn default() -> Self {
        Self {
            create_url: CREATE_URL.to_owned(),
            details_url: DETAILS_URL.to_owned(),
            language: DEFAULT_LANGUAGE.to_owned(),
            api_key: GUEST_API_KEY.to_owned(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
            timeout_ms: http::Client::DEFAULT_TIMEOUT.as_millis() as u64,
            request_interval_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRequest<'a> {
    pub source_code: &'a str,
    pub language: &'a str,
    pub input: &'a str,
    pub api_key: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateResponse {
    pub id: Option<String>,
    pub status: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailsQuery<'a> {
    pub id: &'a str,
    pub api_key: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DetailsResponse {
    pub status: Option<String>,
    pub build_result: Option<String>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub build_stderr: Option<String>,
    pub error: Option<String>,
}

impl CreateResponse {
    pub fn into_id(self, requested_url: &str) -> Result<String> {
        if let Some(message) = self.error {
            return Err(Error::Rejected {
                message,
                requested_url: requested_url.to_owned(),
            });
        }
        self.id.ok_or_else(|| Error::MissingField {
            field: "id",
            requested_url: requested_url.to_owned(),
        })
    }
}

impl DetailsResponse {
    pub fn into_outcome(self, requested_url: &str) -> Result<ExecutionOutcome> {
        if let Some(message) = self.error {
            return Err(Error::Rejected {
                message,
                requested_url: requested_url.to_owned(),
            });
        }
        let completed = self.status.as_deref() == Some(COMPLETED_STATUS);
        let build_succeeded = match self.build_result.as_deref() {
            Some(r) => r == SUCCESS_BUILD_RESULT,
            // Interpreted languages have no build step and report a null build_result.
            None if completed => true,
            None => {
                log::warn!(
                    "Paiza.IO runner is still '{}' after the settle delay; consider a longer settle_delay_ms",
                    self.status.as_deref().unwrap_or("unknown")
                );
                return Err(Error::MissingField {
                    field: "build_result",
                    requested_url: requested_url.to_owned(),
                });
            }
        };
        Ok(ExecutionOutcome {
            build_succeeded,
            stdout: text_or_empty(self.stdout),
            stderr: text_or_empty(self.stderr),
            build_error_message: text_or_empty(self.build_stderr),
        })
    }
}

pub struct PaizaClient {
    http: http::Client,
    cfg: PaizaConfig,
}

impl PaizaClient {
    pub fn new(cfg: PaizaConfig) -> Result<Self> {
        util::parse_url(&cfg.create_url)?;
        util::parse_url(&cfg.details_url)?;
        let interval = Duration::from_millis(cfg.request_interval_ms);
        let http = http::Client::new(
            Duration::from_millis(cfg.timeout_ms),
            [
                (http::Client::url_prefix_glob(&cfg.create_url), interval),
                (http::Client::url_prefix_glob(&cfg.details_url), interval),
            ],
        )?;
        Ok(Self { http, cfg })
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.cfg.settle_delay_ms)
    }

    pub async fn create_runner(&self, code: &str, stdin: &str) -> Result<String> {
        let req = CreateRequest {
            source_code: code,
            language: &self.cfg.language,
            input: stdin,
            api_key: &self.cfg.api_key,
        };
        let url = &self.cfg.create_url;
        let resp = self.http.post(url).json(&req).send().await?;
        let body: CreateResponse = util::read_json(resp, url).await?;
        body.into_id(url)
    }

    pub async fn get_details(&self, id: &str) -> Result<ExecutionOutcome> {
        let query = DetailsQuery {
            id,
            api_key: &self.cfg.api_key,
        };
        let url = &self.cfg.details_url;
        let resp = self.http.get(url).query(&query).send().await?;
        let body: DetailsResponse = util::read_json(resp, url).await?;
        body.into_outcome(url)
    }
}

#[async_trait]
impl Backend for PaizaClient {
    fn kind(&self) -> BackendKind {
        BackendKind::PaizaIo
    }

    async fn execute(&self, code: &str, stdin: &str) -> Result<ExecutionOutcome> {
        let id = self.create_runner(code, stdin).await?;
        log::debug!("Paiza.IO runner created: id={}", id);

        tokio::time::sleep(self.settle_delay()).await;

        self.get_details(&id).await
    }
}
