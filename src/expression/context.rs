//! Execution-scoped state passed to evaluation.

use crate::config::EvalConfig;
use crate::types::Value;

/// State shared by every expression evaluated within one statement
#[derive(Debug, Clone, Default)]
pub struct ExecutorContext {
    params: Vec<Value>,
    config: EvalConfig,
}

impl ExecutorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }

    pub fn with_config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /// Bound value of statement parameter `index` (0-based)
    pub fn parameter(&self, index: usize) -> Option<&Value> {
        self.params.get(index)
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_accessors() {
        let ctx = ExecutorContext::new()
            .with_params(vec![Value::Integer(7)])
            .with_config(EvalConfig::default().with_civil_day_of_month(true));

        assert_eq!(ctx.parameter(0), Some(&Value::Integer(7)));
        assert_eq!(ctx.parameter(1), None);
        assert!(ctx.config().civil_day_of_month);
        assert!(!ExecutorContext::new().config().civil_day_of_month);
    }
}
