//! Problem description (`problemInfo.json`).
//!
//! ```json
//! { "testCases": [{ "input": "100 200 300", "expect": "600" }], "errorMargin": 0.5 }
//! ```
//! `errorMargin` absent or `null` means exact comparison.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{compare::Tolerance, fsutil, testing::TestCase};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Read(#[from] fsutil::Error),

    #[error("Invalid problem JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("Invalid problem JSON '{}': {source}", .path.to_string_lossy())]
    JsonFile {
        path: PathBuf,

        #[source]
        source: serde_json::Error,
    },

    #[error("Problem has no testcases")]
    NoTestcases,

    #[error("Invalid errorMargin {0} (must be a finite number >= 0)")]
    InvalidErrorMargin(f64),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProblemJson {
    test_cases: Option<Vec<TestCase>>,
    error_margin: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub testcases: Vec<TestCase>,
    pub tolerance: Tolerance,
}

impl Problem {
    pub const FILENAME: &str = "problemInfo.json";

    pub fn from_json(s: &str) -> Result<Self> {
        let raw: ProblemJson = serde_json::from_str(s).map_err(Error::Json)?;
        Self::validate(raw)
    }

    pub fn from_json_file(filepath: impl AsRef<Path>) -> Result<Self> {
        let filepath = filepath.as_ref();
        let json = fsutil::read_to_string(filepath)?;
        let raw: ProblemJson = serde_json::from_str(&json).map_err(|e| Error::JsonFile {
            path: filepath.to_owned(),
            source: e,
        })?;
        Self::validate(raw)
    }

    fn validate(raw: ProblemJson) -> Result<Self> {
        let testcases = raw.test_cases.unwrap_or_default();
        if testcases.is_empty() {
            return Err(Error::NoTestcases);
        }
        if let Some(m) = raw.error_margin {
            if !m.is_finite() || m < 0.0 {
                return Err(Error::InvalidErrorMargin(m));
            }
        }
        Ok(Self {
            testcases,
            tolerance: Tolerance::from_error_margin(raw.error_margin),
        })
    }
}
