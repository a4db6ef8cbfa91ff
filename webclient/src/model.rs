use crate::{error::*, paiza::PaizaConfig, wandbox::WandboxConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Wandbox,
    PaizaIo,
}

impl BackendKind {
    pub const fn service_name(&self) -> &'static str {
        use BackendKind::*;
        match self {
            Wandbox => "Wandbox",
            PaizaIo => "Paiza.IO",
        }
    }

    /// Whether the backend answers in one round trip or needs a submit-then-fetch cycle.
    pub const fn is_polling(&self) -> bool {
        matches!(self, BackendKind::PaizaIo)
    }
}

/// What one remote compile-and-run produced.
/// Either a backend returns it whole or the call fails with an [`Error`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// False on a build failure, and also on a non-zero exit or a signal.
    pub build_succeeded: bool,
    pub stdout: String,
    pub stderr: String,
    pub build_error_message: String,
}

/// Settings of every backend; only the selected one is used per run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub wandbox: WandboxConfig,
    pub paizaio: PaizaConfig,
}

#[async_trait]
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Compiles `code` and runs it with `stdin`. Never retries.
    async fn execute(&self, code: &str, stdin: &str) -> Result<ExecutionOutcome>;
}
