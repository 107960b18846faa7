//! Per-pass rewrite context
//!
//! Read-only inputs shared by every rule in one optimization pass. Built once
//! and passed by reference; rules never mutate it.

use crate::engine::feature_flags::{Feature, FeatureFlags, FeatureSet};
use crate::storage::capability::{StorageReader, WindowAggregateCapability};

#[derive(Debug, Clone, Default)]
pub struct RewriteContext {
    /// `None` when the connection has no windowed-aggregate support or
    /// reports no capability object.
    capability: Option<WindowAggregateCapability>,
    features: FeatureSet,
}

impl RewriteContext {
    pub fn new(capability: Option<WindowAggregateCapability>, features: FeatureSet) -> Self {
        Self {
            capability,
            features,
        }
    }

    /// Queries the reader's capability once and snapshots the flags.
    pub fn from_reader(reader: &dyn StorageReader, flags: &FeatureFlags) -> Self {
        let capability = reader
            .window_aggregate_reader()
            .and_then(|r| r.window_aggregate_capability());
        Self::new(capability, flags.snapshot())
    }

    pub fn window_aggregate_capability(&self) -> Option<&WindowAggregateCapability> {
        self.capability.as_ref()
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.features.is_enabled(feature)
    }
}
