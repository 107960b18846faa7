//! Storage engine boundary — capabilities and the predicate wire form

pub mod capability;
pub mod predicate;

pub use capability::{StaticReader, StorageReader, WindowAggregateCapability, WindowAggregateReader};
pub use predicate::{
    ComparisonOp, Predicate, PredicateLogicalOp, PredicateNode, merge_predicates,
    to_storage_predicate,
};

/// Aggregate method identifier the storage engine expects for counts.
pub const AGGREGATE_METHOD_COUNT: &str = "COUNT";
