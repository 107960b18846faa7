//! 물리 플랜 변환 예제
//!
//! 실행: TSQ_FEATURE_PUSH_DOWN_WINDOW_AGGREGATE_COUNT=true cargo run --example physical_plan --features logging

use tsq_core::engine::{FeatureFlags, RewriteContext};
use tsq_core::optimizer::PhysicalOptimizer;
use tsq_core::plan::{
    AggregateSpec, BinaryOperator, Bounds, BucketRef, Duration, Expression, FilterSpec, FromSpec,
    FunctionExpr, PlanGraph, ProcedureSpec, RangeSpec, WindowSpec,
};
use tsq_core::storage::{StaticReader, WindowAggregateCapability};

fn main() -> tsq_core::TsqResult<()> {
    tsq_core::logging::init_with_level("debug");
    println!("=== TSQ 물리 플랜 예제 ===\n");

    // 1. 논리 플랜 구성
    // from(bucket: "telegraf") |> range(start: -1h) |> filter(fn: (r) => r.host == "server01")
    //   |> window(every: 5m) |> count()
    println!("1. 논리 플랜 구성...");
    let mut plan = PlanGraph::new();
    let from = plan.add_node(
        ProcedureSpec::From(FromSpec {
            bucket: BucketRef::named("telegraf"),
            org: None,
            host: None,
        }),
        &[],
    )?;
    let range = plan.add_node(
        ProcedureSpec::Range(RangeSpec {
            bounds: Bounds::absolute(0, 3_600_000_000_000),
        }),
        &[from],
    )?;
    let filter = plan.add_node(
        ProcedureSpec::Filter(FilterSpec {
            func: FunctionExpr::new(
                "r",
                Expression::binary(
                    BinaryOperator::Equal,
                    Expression::member("r", "host"),
                    Expression::string("server01"),
                ),
            ),
            keep_empty_tables: false,
        }),
        &[range],
    )?;
    let window = plan.add_node(
        ProcedureSpec::Window(WindowSpec::every(Duration::from_mins(5))),
        &[filter],
    )?;
    let count = plan.add_node(ProcedureSpec::Count(AggregateSpec::default()), &[window])?;
    println!("   ✓ {}개 노드\n", plan.len());

    // 2. 패스 컨텍스트 (storage capability + feature flag)
    println!("2. 컨텍스트 생성...");
    let flags = FeatureFlags::new();
    flags.load_from_env();
    let reader = StaticReader::with_window_aggregates(Some(WindowAggregateCapability::all()));
    let ctx = RewriteContext::from_reader(&reader, &flags);
    println!("   ✓ capability: {:?}\n", ctx.window_aggregate_capability());

    // 3. 최적화
    println!("3. 최적화...");
    let stats = PhysicalOptimizer::default().optimize(&ctx, &mut plan)?;
    println!("   ✓ {}회 반복, 적용된 규칙: {:?}\n", stats.iterations, stats.applied);

    // 4. 결과
    println!("4. 물리 플랜:");
    for spec in plan.chain(count)? {
        println!("   {}", serde_json::to_string(spec)?);
    }

    println!("\n=== 예제 완료 ===");
    Ok(())
}
