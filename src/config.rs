//! Execution-scoped evaluation options.

use serde::{Deserialize, Serialize};

/// Options that change how built-in functions compute their results.
/// Carried by [`crate::expression::ExecutorContext`]; evaluation without a
/// context uses `EvalConfig::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Report `EXTRACT(DAY ...)` as the civil day of month. When unset, the
    /// legacy numbering (one past the civil day) is used, which existing
    /// result sets were recorded with. Legacy values are not capped, so they
    /// run from 2 to 32 and the last day of a 31-day month reports 32.
    pub civil_day_of_month: bool,
}

impl EvalConfig {
    pub fn with_civil_day_of_month(mut self, enabled: bool) -> Self {
        self.civil_day_of_month = enabled;
        self
    }
}
