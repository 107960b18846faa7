//! Optimizer environment — configuration, feature flags, per-pass context

pub mod config;
pub mod context;
pub mod feature_flags;

pub use config::OptimizerConfig;
pub use context::RewriteContext;
pub use feature_flags::{Feature, FeatureFlags, FeatureSet};
