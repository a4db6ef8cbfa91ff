use serde::{Deserialize, Serialize};

/// One (input, expected output) pair.
/// Identified by its 1-based position in the list it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,

    #[serde(alias = "expect")]
    pub expected: String,
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected: expected.into(),
        }
    }
}
