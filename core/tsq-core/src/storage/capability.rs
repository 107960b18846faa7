//! Storage connection capabilities
//!
//! A read connection may advertise which window aggregates it can compute.
//! The optimizer takes one snapshot per pass and never mutates it.

use serde::{Deserialize, Serialize};

use crate::plan::types::ProcedureKind;

/// 윈도우 집계 지원 여부 스냅샷
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowAggregateCapability {
    pub min: bool,
    pub max: bool,
    pub mean: bool,
    pub count: bool,
    pub sum: bool,
}

impl WindowAggregateCapability {
    /// Every aggregate kind supported.
    pub fn all() -> Self {
        Self {
            min: true,
            max: true,
            mean: true,
            count: true,
            sum: true,
        }
    }

    pub fn have_min(&self) -> bool {
        self.min
    }

    pub fn have_max(&self) -> bool {
        self.max
    }

    pub fn have_mean(&self) -> bool {
        self.mean
    }

    pub fn have_count(&self) -> bool {
        self.count
    }

    pub fn have_sum(&self) -> bool {
        self.sum
    }

    /// `false` for kinds that are not window aggregates.
    pub fn supports(&self, kind: ProcedureKind) -> bool {
        match kind {
            ProcedureKind::Min => self.have_min(),
            ProcedureKind::Max => self.have_max(),
            ProcedureKind::Mean => self.have_mean(),
            ProcedureKind::Count => self.have_count(),
            ProcedureKind::Sum => self.have_sum(),
            _ => false,
        }
    }
}

/// Connection that can serve windowed aggregate reads.
pub trait WindowAggregateReader: Send + Sync {
    fn window_aggregate_capability(&self) -> Option<WindowAggregateCapability>;
}

/// The active storage read connection.
pub trait StorageReader: Send + Sync {
    /// `None` when the connection has no windowed-aggregate support at all.
    fn window_aggregate_reader(&self) -> Option<&dyn WindowAggregateReader> {
        None
    }
}

/// Reader with a fixed capability answer; used for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticReader {
    capability: Option<WindowAggregateCapability>,
    window_aggregates: bool,
}

impl StaticReader {
    /// Plain reader without windowed-aggregate support.
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn with_window_aggregates(capability: Option<WindowAggregateCapability>) -> Self {
        Self {
            capability,
            window_aggregates: true,
        }
    }
}

impl WindowAggregateReader for StaticReader {
    fn window_aggregate_capability(&self) -> Option<WindowAggregateCapability> {
        self.capability
    }
}

impl StorageReader for StaticReader {
    fn window_aggregate_reader(&self) -> Option<&dyn WindowAggregateReader> {
        if self.window_aggregates {
            Some(self)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_by_kind() {
        let caps = WindowAggregateCapability {
            count: true,
            ..Default::default()
        };
        assert!(caps.supports(ProcedureKind::Count));
        assert!(!caps.supports(ProcedureKind::Sum));
        assert!(!caps.supports(ProcedureKind::Filter));
        assert!(WindowAggregateCapability::all().supports(ProcedureKind::Mean));
    }

    #[test]
    fn test_static_reader() {
        assert!(StaticReader::plain().window_aggregate_reader().is_none());

        let reader = StaticReader::with_window_aggregates(None);
        let war = reader.window_aggregate_reader().unwrap();
        assert!(war.window_aggregate_capability().is_none());

        let reader = StaticReader::with_window_aggregates(Some(WindowAggregateCapability::all()));
        let caps = reader
            .window_aggregate_reader()
            .and_then(|r| r.window_aggregate_capability())
            .unwrap();
        assert!(caps.have_sum());
    }
}
