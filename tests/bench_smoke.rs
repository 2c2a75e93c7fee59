use std::sync::{Mutex, MutexGuard, OnceLock};

use blitcheck::{
    BenchParams, BlendContext, BlendOperation, ColorFormat, HarnessError, SpeedupThresholds,
    StdCycles, run_benchmark,
};

fn ctx_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        Mutex::new(())
    })
    .lock()
    .unwrap_or_else(|e| e.into_inner())
}

// Host timing is noisy, so these tests use a zero-threshold table: they
// exercise the runner end to end without asserting real speedups.
fn permissive_thresholds() -> SpeedupThresholds {
    let mut table = SpeedupThresholds::default();
    for op in [
        BlendOperation::PlainFill,
        BlendOperation::FillWithOpacity,
        BlendOperation::ImageCopyBlend,
    ] {
        for format in [ColorFormat::Argb8888, ColorFormat::Rgb565] {
            table.insert(op, format, "host", 0.0, 0.0);
        }
    }
    table
}

#[test]
fn every_operation_produces_a_report() {
    let _guard = ctx_lock();
    let thresholds = permissive_thresholds();
    let clock = StdCycles::new();

    for op in [
        BlendOperation::PlainFill,
        BlendOperation::FillWithOpacity,
        BlendOperation::ImageCopyBlend,
    ] {
        for format in [ColorFormat::Argb8888, ColorFormat::Rgb565] {
            let mut params = BenchParams::defaults(op, format);
            params.width = 32;
            params.height = 32;
            params.iterations = 25;

            let mut ctx = BlendContext::new(format).unwrap();
            let report = run_benchmark(&mut ctx, &params, &clock, &thresholds, "host").unwrap();

            assert_eq!(report.operation, op);
            assert_eq!(report.common.width, 32);
            assert_eq!(report.common.misalign, 0);
            assert_eq!(report.corner.width, 31);
            assert_eq!(report.corner.height, 31);
            assert_eq!(report.corner.misalign, 1);
            assert!(report.common.reference_cycles > 0.0);
            assert!(report.common.speedup > 0.0);
            assert!(report.corner.speedup > 0.0);
        }
    }
}

#[test]
fn report_serializes_to_json() {
    let _guard = ctx_lock();
    let mut params = BenchParams::defaults(BlendOperation::PlainFill, ColorFormat::Rgb565);
    params.width = 16;
    params.height = 16;
    params.iterations = 10;

    let mut ctx = BlendContext::new(ColorFormat::Rgb565).unwrap();
    let clock = StdCycles::new();
    let report =
        run_benchmark(&mut ctx, &params, &clock, &permissive_thresholds(), "host").unwrap();

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"operation\":\"plain-fill\""));
    assert!(json.contains("\"target\":\"host\""));
}

#[test]
fn missing_table_entry_is_a_distinct_failure() {
    let _guard = ctx_lock();
    let mut ctx = BlendContext::new(ColorFormat::Argb8888).unwrap();
    let params = BenchParams::defaults(BlendOperation::PlainFill, ColorFormat::Argb8888);
    let clock = StdCycles::new();

    let err = run_benchmark(
        &mut ctx,
        &params,
        &clock,
        &SpeedupThresholds::default(),
        "never-configured",
    )
    .unwrap_err();

    assert!(matches!(err, HarnessError::Regression(_)));
}

#[test]
fn impossible_threshold_reports_regression() {
    let _guard = ctx_lock();
    let mut table = SpeedupThresholds::default();
    // No implementation is a million times faster than the reference.
    table.insert(
        BlendOperation::PlainFill,
        ColorFormat::Argb8888,
        "host",
        1e6,
        1e6,
    );

    // Large enough that the reference path cannot measure zero cycles.
    let mut params = BenchParams::defaults(BlendOperation::PlainFill, ColorFormat::Argb8888);
    params.width = 64;
    params.height = 64;
    params.iterations = 20;

    let mut ctx = BlendContext::new(ColorFormat::Argb8888).unwrap();
    let clock = StdCycles::new();
    let err = run_benchmark(&mut ctx, &params, &clock, &table, "host").unwrap_err();

    assert!(matches!(err, HarnessError::Regression(_)));
    assert!(err.to_string().contains("below required"));
}
