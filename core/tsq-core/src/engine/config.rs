//! Optimizer configuration
//!
//! Loaded from JSON; every field has a default so partial files work.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::{TsqError, TsqResult};

/// 최적화기 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Upper bound on fixed-point iterations before the pass fails.
    pub max_iterations: usize,
    /// Rule names left out of the registry.
    pub disabled_rules: BTreeSet<String>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            disabled_rules: BTreeSet::new(),
        }
    }
}

impl OptimizerConfig {
    pub fn from_json_str(json: &str) -> TsqResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 최소 한 번의 반복은 허용되어야 함
    pub fn validate(&self) -> TsqResult<()> {
        if self.max_iterations == 0 {
            return Err(TsqError::invalid(
                "max_iterations must be at least 1",
                "OptimizerConfig",
            ));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> TsqResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn with_disabled_rule(mut self, name: impl Into<String>) -> Self {
        self.disabled_rules.insert(name.into());
        self
    }

    pub fn is_rule_enabled(&self, name: &str) -> bool {
        !self.disabled_rules.contains(name)
    }
}
