//! Output comparison.
//!
//! Exact mode compares the raw strings, so a missing trailing newline is a mismatch.
//! Tolerance mode compares whitespace-separated tokens as numbers; anything that does
//! not parse as a finite number never matches.

use serde::{Deserialize, Serialize};

/// Numeric tolerance applied uniformly to every testcase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Tolerance {
    pub enabled: bool,
    pub margin: f64,
}

impl Tolerance {
    pub const EXACT: Tolerance = Tolerance {
        enabled: false,
        margin: 0.0,
    };

    pub fn margin(margin: f64) -> Self {
        Self {
            enabled: true,
            margin,
        }
    }

    /// `None` disables tolerance, as an absent `errorMargin` does.
    pub fn from_error_margin(margin: Option<f64>) -> Self {
        margin.map_or(Self::EXACT, Self::margin)
    }
}

pub fn compare(build_succeeded: bool, actual: &str, expected: &str, tolerance: &Tolerance) -> bool {
    if !build_succeeded {
        return false;
    }
    if !tolerance.enabled {
        return actual == expected;
    }
    self::within_margin(actual, expected, tolerance.margin)
}

fn parse_tokens(s: &str) -> Option<Vec<f64>> {
    s.split_whitespace()
        .map(|tok| tok.parse::<f64>().ok().filter(|x| x.is_finite()))
        .collect()
}

fn within_margin(actual: &str, expected: &str, margin: f64) -> bool {
    let (Some(actual), Some(expected)) = (parse_tokens(actual), parse_tokens(expected)) else {
        return false;
    };
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(&expected)
            .all(|(a, e)| (a - e).abs() <= margin)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exact_is_literal_equality() {
        let t = Tolerance::EXACT;
        assert!(compare(true, "600\n", "600\n", &t));
        assert!(!compare(true, "600\n", "600", &t));
        assert!(!compare(true, "600 ", "600", &t));
        assert!(!compare(true, "6.0", "6", &t));
        assert!(compare(true, "", "", &t));
    }

    #[test]
    fn exact_ignores_margin_when_disabled() {
        let t = Tolerance {
            enabled: false,
            margin: 100.0,
        };
        assert!(!compare(true, "1", "2", &t));
    }

    #[test]
    fn tolerance_per_token() {
        assert!(compare(true, "6.0 6.0", "6.05 5.99", &Tolerance::margin(0.1)));
        assert!(!compare(true, "6.0 6.0", "6.05 5.99", &Tolerance::margin(0.01)));
    }

    #[test]
    fn tolerance_boundary_is_inclusive() {
        assert!(compare(true, "1.5", "1", &Tolerance::margin(0.5)));
        assert!(compare(true, "3", "3", &Tolerance::margin(0.0)));
        assert!(!compare(true, "3.001", "3", &Tolerance::margin(0.0)));
    }

    #[test]
    fn tolerance_sum_scenario() {
        assert!(compare(true, "599.6", "600", &Tolerance::margin(0.5)));
        assert!(!compare(true, "599.6", "600", &Tolerance::margin(0.1)));
    }

    #[test]
    fn tolerance_splits_on_any_whitespace() {
        let t = Tolerance::margin(1e-6);
        assert!(compare(true, "1\n2\n3\n", "1 2 3", &t));
        assert!(compare(true, "  1\t2  ", "1 2", &t));
    }

    #[test]
    fn tolerance_length_mismatch() {
        for margin in [0.0, 1.0, 1e9] {
            assert!(!compare(true, "1 2", "1 2 3", &Tolerance::margin(margin)));
            assert!(!compare(true, "1 2 3", "1 2", &Tolerance::margin(margin)));
        }
    }

    #[test]
    fn tolerance_non_numeric_fails_closed() {
        let t = Tolerance::margin(1e9);
        assert!(!compare(true, "abc", "1", &t));
        assert!(!compare(true, "1", "abc", &t));
        assert!(!compare(true, "abc", "abc", &t));
        assert!(!compare(true, "NaN", "NaN", &t));
        assert!(!compare(true, "inf", "inf", &t));
    }

    #[test]
    fn tolerance_empty_outputs_match() {
        assert!(compare(true, "", "\n", &Tolerance::margin(0.1)));
        assert!(!compare(true, "", "1", &Tolerance::margin(0.1)));
    }

    #[test]
    fn build_failure_dominates() {
        for t in [Tolerance::EXACT, Tolerance::margin(0.5), Tolerance::margin(1e9)] {
            assert!(!compare(false, "600", "600", &t));
            assert!(!compare(false, "", "", &t));
        }
    }

    #[test]
    fn tolerance_from_error_margin() {
        assert_eq!(Tolerance::from_error_margin(None), Tolerance::EXACT);
        assert_eq!(
            Tolerance::from_error_margin(Some(0.25)),
            Tolerance {
                enabled: true,
                margin: 0.25
            }
        );
    }
}
