// Push-down 성능 벤치마크
//
// Section 1: 전체 규칙 패스 (filter + group + count)
// Section 2: 술어 분할 (partition_predicates)

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tsq_core::engine::{FeatureSet, RewriteContext};
use tsq_core::optimizer::{PhysicalOptimizer, partition_predicates};
use tsq_core::plan::{
    AggregateSpec, BinaryOperator, Bounds, BucketRef, Duration, Expression, FilterSpec, FromSpec,
    FunctionExpr, GroupMode, GroupSpec, PlanGraph, ProcedureSpec, RangeSpec, WindowSpec,
};
use tsq_core::storage::WindowAggregateCapability;

fn filter_body(terms: usize) -> Expression {
    (0..terms)
        .map(|i| {
            if i % 3 == 2 {
                Expression::binary(
                    BinaryOperator::GreaterThan,
                    Expression::member("r", "host"),
                    Expression::string(format!("h{}", i)),
                )
            } else {
                Expression::binary(
                    BinaryOperator::Equal,
                    Expression::member("r", format!("tag{}", i)),
                    Expression::string("x"),
                )
            }
        })
        .reduce(Expression::and)
        .unwrap()
}

fn plan(ops: Vec<ProcedureSpec>) -> PlanGraph {
    let mut g = PlanGraph::new();
    let from = g
        .add_node(
            ProcedureSpec::From(FromSpec {
                bucket: BucketRef::named("telegraf"),
                org: None,
                host: None,
            }),
            &[],
        )
        .unwrap();
    let mut last = g
        .add_node(ProcedureSpec::Range(RangeSpec { bounds: Bounds::absolute(0, 1_000) }), &[from])
        .unwrap();
    for op in ops {
        last = g.add_node(op, &[last]).unwrap();
    }
    g
}

fn bench_full_pass(c: &mut Criterion) {
    let optimizer = PhysicalOptimizer::default();
    let ctx = RewriteContext::new(Some(WindowAggregateCapability::all()), FeatureSet::all());

    c.bench_function("optimize filter+group+count", |b| {
        b.iter(|| {
            let mut g = plan(vec![
                ProcedureSpec::Filter(FilterSpec {
                    func: FunctionExpr::new("r", filter_body(6)),
                    keep_empty_tables: false,
                }),
                ProcedureSpec::Group(GroupSpec {
                    mode: GroupMode::By,
                    keys: vec!["host".to_string()],
                }),
                ProcedureSpec::Count(AggregateSpec::default()),
            ]);
            optimizer.optimize(&ctx, black_box(&mut g)).unwrap()
        })
    });

    c.bench_function("optimize window+mean", |b| {
        b.iter(|| {
            let mut g = plan(vec![
                ProcedureSpec::Window(WindowSpec::every(Duration::from_mins(5))),
                ProcedureSpec::Mean(AggregateSpec::default()),
            ]);
            optimizer.optimize(&ctx, black_box(&mut g)).unwrap()
        })
    });
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition_predicates");
    for terms in [4, 16, 64] {
        let body = filter_body(terms);
        group.bench_function(format!("{} conjuncts", terms), |b| {
            b.iter(|| partition_predicates("r", black_box(&body)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_full_pass, bench_partition);
criterion_main!(benches);
