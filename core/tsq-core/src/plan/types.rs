//! 플랜 타입 정의
//!
//! ProcedureSpec (논리/물리 연산 사양), 시간 범위, 윈도우 등 핵심 타입을 정의합니다.

use serde::{Deserialize, Serialize};

use crate::error::{TsqError, TsqResult};
use crate::plan::expr::Expression;

/// Default column labels shared by every table a storage read produces.
pub const DEFAULT_TIME_COLUMN: &str = "_time";
pub const DEFAULT_VALUE_COLUMN: &str = "_value";
pub const DEFAULT_START_COLUMN: &str = "_start";
pub const DEFAULT_STOP_COLUMN: &str = "_stop";

/// 연산 종류 — 패턴 매칭 키
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcedureKind {
    From,
    FromStorage,
    Range,
    Filter,
    Group,
    Keys,
    SchemaMutation,
    Distinct,
    Pivot,
    Window,
    Min,
    Max,
    Mean,
    Count,
    Sum,
    ReadRange,
    ReadGroup,
    ReadTagKeys,
    ReadTagValues,
    ReadWindowAggregate,
}

impl ProcedureKind {
    /// Wire-level identifier understood by the storage executor.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcedureKind::From => "from",
            ProcedureKind::FromStorage => "fromStorage",
            ProcedureKind::Range => "range",
            ProcedureKind::Filter => "filter",
            ProcedureKind::Group => "group",
            ProcedureKind::Keys => "keys",
            ProcedureKind::SchemaMutation => "SchemaMutation",
            ProcedureKind::Distinct => "distinct",
            ProcedureKind::Pivot => "pivot",
            ProcedureKind::Window => "window",
            ProcedureKind::Min => "min",
            ProcedureKind::Max => "max",
            ProcedureKind::Mean => "mean",
            ProcedureKind::Count => "count",
            ProcedureKind::Sum => "sum",
            ProcedureKind::ReadRange => "ReadRange",
            ProcedureKind::ReadGroup => "ReadGroup",
            ProcedureKind::ReadTagKeys => "ReadTagKeys",
            ProcedureKind::ReadTagValues => "ReadTagValues",
            ProcedureKind::ReadWindowAggregate => "ReadWindowAggregate",
        }
    }

    /// Aggregate kinds the window-aggregate push-down understands.
    pub const WINDOW_AGGREGATES: [ProcedureKind; 5] = [
        ProcedureKind::Min,
        ProcedureKind::Max,
        ProcedureKind::Mean,
        ProcedureKind::Count,
        ProcedureKind::Sum,
    ];
}

impl std::fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar-aware duration: months and nanoseconds are kept apart because a
/// month has no fixed length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duration {
    pub months: i64,
    pub nanoseconds: i64,
    pub negative: bool,
}

impl Duration {
    pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

    /// Magnitudes beyond `i64::MAX` nanoseconds saturate.
    pub fn from_nanos(nanoseconds: i64) -> Self {
        Self {
            months: 0,
            nanoseconds: nanoseconds.saturating_abs(),
            negative: nanoseconds < 0,
        }
    }

    pub fn from_secs(secs: i64) -> Self {
        Self::from_nanos(secs.saturating_mul(Self::NANOS_PER_SECOND))
    }

    pub fn from_mins(mins: i64) -> Self {
        Self::from_secs(mins.saturating_mul(60))
    }

    pub fn from_months(months: i64) -> Self {
        Self {
            months: months.saturating_abs(),
            nanoseconds: 0,
            negative: months < 0,
        }
    }

    pub fn months(&self) -> i64 {
        self.months
    }

    /// Signed nanosecond component.
    pub fn nanoseconds(&self) -> i64 {
        if self.negative {
            self.nanoseconds.saturating_neg()
        } else {
            self.nanoseconds
        }
    }

    pub fn is_zero(&self) -> bool {
        self.months == 0 && self.nanoseconds == 0
    }

    pub fn is_negative(&self) -> bool {
        self.negative && !self.is_zero()
    }
}

/// 시간 경계 — 절대 시각 또는 now 기준 상대 시각
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeBound {
    /// Unix nanoseconds
    Absolute(i64),
    /// Offset from the query's `now`
    Relative(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub start: TimeBound,
    pub stop: TimeBound,
}

impl Bounds {
    pub fn absolute(start: i64, stop: i64) -> Self {
        Self {
            start: TimeBound::Absolute(start),
            stop: TimeBound::Absolute(stop),
        }
    }
}

/// Resolved bucket reference.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BucketRef {
    pub name: String,
    pub id: Option<String>,
}

impl BucketRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }
}

// ───────────────────────── Logical specs ─────────────────────────

/// `from(bucket:, org:, host:)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FromSpec {
    pub bucket: BucketRef,
    pub org: Option<String>,
    pub host: Option<String>,
}

/// `from` bound to the local storage engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FromStorageSpec {
    pub bucket: BucketRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSpec {
    pub bounds: Bounds,
}

/// 필터 함수 — 파라미터 목록과 본문
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionExpr {
    pub parameters: Vec<String>,
    /// `None` when the body is a block that is not a single return.
    pub body: Option<Expression>,
}

impl FunctionExpr {
    pub fn new(parameter: impl Into<String>, body: Expression) -> Self {
        Self {
            parameters: vec![parameter.into()],
            body: Some(body),
        }
    }

    pub fn body_expression(&self) -> Option<&Expression> {
        self.body.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub func: FunctionExpr,
    pub keep_empty_tables: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupMode {
    None,
    By,
    Except,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub mode: GroupMode,
    pub keys: Vec<String>,
}

/// `keys()` — emits each table's group-key labels into `column`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeysSpec {
    pub column: String,
}

impl Default for KeysSpec {
    fn default() -> Self {
        Self {
            column: DEFAULT_VALUE_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SchemaMutation {
    Keep {
        columns: Vec<String>,
        predicate: Option<FunctionExpr>,
    },
    Drop {
        columns: Vec<String>,
        predicate: Option<FunctionExpr>,
    },
    Rename {
        columns: Vec<(String, String)>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaMutationSpec {
    pub mutations: Vec<SchemaMutation>,
}

impl SchemaMutationSpec {
    /// The single column kept by a plain, column-based `keep()`.
    pub fn single_kept_column(&self) -> Option<&str> {
        match self.mutations.as_slice() {
            [SchemaMutation::Keep { columns, predicate: None }] if columns.len() == 1 => {
                Some(columns[0].as_str())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistinctSpec {
    pub column: String,
}

/// Ordering facts a pivot may rely on when its input comes straight from a
/// storage read: rows arrive sorted by tag-key order and only `_time` and
/// `_value` are non-key columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortHints;

impl SortHints {
    pub fn is_sorted_by(&self, columns: &[String], desc: bool) -> bool {
        if desc {
            return false;
        }
        // Absent tags still sort consistently; only _value breaks the order.
        !columns.iter().any(|c| c == DEFAULT_VALUE_COLUMN)
    }

    pub fn is_key_column(&self, label: &str) -> bool {
        label != DEFAULT_TIME_COLUMN && label != DEFAULT_VALUE_COLUMN
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotSpec {
    pub row_key: Vec<String>,
    pub column_key: Vec<String>,
    pub value_column: String,
    pub sort_hints: Option<SortHints>,
}

impl PivotSpec {
    /// Without hints the pivot must sort its input itself.
    pub fn is_sorted_by(&self, columns: &[String], desc: bool) -> bool {
        self.sort_hints
            .is_some_and(|hints| hints.is_sorted_by(columns, desc))
    }

    pub fn is_key_column(&self, label: &str) -> Option<bool> {
        self.sort_hints.map(|hints| hints.is_key_column(label))
    }
}

/// 윈도우 사양
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub every: Duration,
    pub period: Duration,
    pub offset: Duration,
    pub time_column: String,
    pub start_column: String,
    pub stop_column: String,
    pub create_empty: bool,
}

impl WindowSpec {
    /// Tumbling window with default columns.
    pub fn every(every: Duration) -> Self {
        Self {
            every,
            period: every,
            offset: Duration::default(),
            time_column: DEFAULT_TIME_COLUMN.to_string(),
            start_column: DEFAULT_START_COLUMN.to_string(),
            stop_column: DEFAULT_STOP_COLUMN.to_string(),
            create_empty: false,
        }
    }
}

/// `min`/`max` operate on one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorSpec {
    pub column: String,
}

impl Default for SelectorSpec {
    fn default() -> Self {
        Self {
            column: DEFAULT_VALUE_COLUMN.to_string(),
        }
    }
}

/// `mean`/`count`/`sum` operate on a column list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSpec {
    pub columns: Vec<String>,
}

impl Default for AggregateSpec {
    fn default() -> Self {
        Self {
            columns: vec![DEFAULT_VALUE_COLUMN.to_string()],
        }
    }
}

// ───────────────────────── Physical specs ─────────────────────────

/// Storage-native range read. Every other `Read*` spec embeds one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadRangeSpec {
    pub bucket: String,
    pub bucket_id: Option<String>,
    pub bounds: Bounds,
    pub predicate: Option<crate::storage::predicate::Predicate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadGroupSpec {
    pub range: ReadRangeSpec,
    pub group_mode: GroupMode,
    pub group_keys: Vec<String>,
    /// Storage aggregate identifier, e.g. `COUNT`
    pub aggregate_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadTagKeysSpec {
    pub range: ReadRangeSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadTagValuesSpec {
    pub range: ReadRangeSpec,
    pub tag_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadWindowAggregateSpec {
    pub range: ReadRangeSpec,
    pub aggregates: Vec<ProcedureKind>,
    pub window_every_nanos: i64,
}

/// 연산 사양 — 연산 종류별 tagged union
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProcedureSpec {
    From(FromSpec),
    FromStorage(FromStorageSpec),
    Range(RangeSpec),
    Filter(FilterSpec),
    Group(GroupSpec),
    Keys(KeysSpec),
    SchemaMutation(SchemaMutationSpec),
    Distinct(DistinctSpec),
    Pivot(PivotSpec),
    Window(WindowSpec),
    Min(SelectorSpec),
    Max(SelectorSpec),
    Mean(AggregateSpec),
    Count(AggregateSpec),
    Sum(AggregateSpec),
    ReadRange(ReadRangeSpec),
    ReadGroup(ReadGroupSpec),
    ReadTagKeys(ReadTagKeysSpec),
    ReadTagValues(ReadTagValuesSpec),
    ReadWindowAggregate(ReadWindowAggregateSpec),
}

macro_rules! expect_variant {
    ($fn_name:ident, $variant:ident, $ty:ty) => {
        /// Borrows the payload, or reports a malformed plan naming `rule`.
        pub fn $fn_name(&self, rule: &str) -> TsqResult<&$ty> {
            match self {
                ProcedureSpec::$variant(spec) => Ok(spec),
                other => Err(TsqError::malformed(
                    format!(
                        "expected {} spec, found {}",
                        ProcedureKind::$variant,
                        other.kind()
                    ),
                    rule.to_string(),
                )),
            }
        }
    };
}

impl ProcedureSpec {
    pub fn kind(&self) -> ProcedureKind {
        match self {
            ProcedureSpec::From(_) => ProcedureKind::From,
            ProcedureSpec::FromStorage(_) => ProcedureKind::FromStorage,
            ProcedureSpec::Range(_) => ProcedureKind::Range,
            ProcedureSpec::Filter(_) => ProcedureKind::Filter,
            ProcedureSpec::Group(_) => ProcedureKind::Group,
            ProcedureSpec::Keys(_) => ProcedureKind::Keys,
            ProcedureSpec::SchemaMutation(_) => ProcedureKind::SchemaMutation,
            ProcedureSpec::Distinct(_) => ProcedureKind::Distinct,
            ProcedureSpec::Pivot(_) => ProcedureKind::Pivot,
            ProcedureSpec::Window(_) => ProcedureKind::Window,
            ProcedureSpec::Min(_) => ProcedureKind::Min,
            ProcedureSpec::Max(_) => ProcedureKind::Max,
            ProcedureSpec::Mean(_) => ProcedureKind::Mean,
            ProcedureSpec::Count(_) => ProcedureKind::Count,
            ProcedureSpec::Sum(_) => ProcedureKind::Sum,
            ProcedureSpec::ReadRange(_) => ProcedureKind::ReadRange,
            ProcedureSpec::ReadGroup(_) => ProcedureKind::ReadGroup,
            ProcedureSpec::ReadTagKeys(_) => ProcedureKind::ReadTagKeys,
            ProcedureSpec::ReadTagValues(_) => ProcedureKind::ReadTagValues,
            ProcedureSpec::ReadWindowAggregate(_) => ProcedureKind::ReadWindowAggregate,
        }
    }

    /// The `ReadRange` embedded in any physical read spec.
    pub fn read_range(&self) -> Option<&ReadRangeSpec> {
        match self {
            ProcedureSpec::ReadRange(spec) => Some(spec),
            ProcedureSpec::ReadGroup(spec) => Some(&spec.range),
            ProcedureSpec::ReadTagKeys(spec) => Some(&spec.range),
            ProcedureSpec::ReadTagValues(spec) => Some(&spec.range),
            ProcedureSpec::ReadWindowAggregate(spec) => Some(&spec.range),
            _ => None,
        }
    }

    expect_variant!(expect_from, From, FromSpec);
    expect_variant!(expect_from_storage, FromStorage, FromStorageSpec);
    expect_variant!(expect_range, Range, RangeSpec);
    expect_variant!(expect_filter, Filter, FilterSpec);
    expect_variant!(expect_group, Group, GroupSpec);
    expect_variant!(expect_keys, Keys, KeysSpec);
    expect_variant!(expect_schema_mutation, SchemaMutation, SchemaMutationSpec);
    expect_variant!(expect_distinct, Distinct, DistinctSpec);
    expect_variant!(expect_pivot, Pivot, PivotSpec);
    expect_variant!(expect_window, Window, WindowSpec);
    expect_variant!(expect_read_range, ReadRange, ReadRangeSpec);
    expect_variant!(expect_read_group, ReadGroup, ReadGroupSpec);
}
