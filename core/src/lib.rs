pub mod action;
pub mod compare;
pub mod config;
pub mod fsutil;
pub mod judge;
pub mod problem;
pub mod serdable;
pub mod style;
pub mod testing;

pub use crate::config::Config;
pub use crate::judge::{Job, Judge, JudgeEvent};
pub use crate::problem::Problem;
pub use crate::testing::{CaseResult, JudgeCode, TestCase, Verdict};
