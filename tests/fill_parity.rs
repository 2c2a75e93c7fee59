use std::sync::{Mutex, MutexGuard, OnceLock};

use blitcheck::{
    BlendContext, BlendOperation, CaseParams, ColorFormat, MatrixParams, OpaRange,
    run_and_compare, sweep,
};

// The blend context is process-wide single-instance; serialize the tests in
// this binary around it.
fn ctx_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

#[test]
fn argb8888_fill_matrix_is_equal_everywhere() {
    let _guard = ctx_lock();
    let params = MatrixParams::fill_defaults(ColorFormat::Argb8888);
    let mut ctx = BlendContext::new(ColorFormat::Argb8888).unwrap();

    let count = sweep(&params, &mut ctx, run_and_compare).unwrap();

    // w 8..=16, h 1..=16, stride w..=2w, misalign 0..=16
    let expected: u64 = (8..=16u64).map(|w| 16 * (w + 1) * 17).sum();
    assert_eq!(count, expected);
}

#[test]
fn rgb565_fill_matrix_is_equal_everywhere() {
    let _guard = ctx_lock();
    let params = MatrixParams::fill_defaults(ColorFormat::Rgb565);
    let mut ctx = BlendContext::new(ColorFormat::Rgb565).unwrap();

    let count = sweep(&params, &mut ctx, run_and_compare).unwrap();
    let expected: u64 = (8..=16u64).map(|w| 16 * (w + 1) * 17).sum();
    assert_eq!(count, expected);
}

#[test]
fn smallest_accelerated_geometry_matches() {
    let _guard = ctx_lock();
    let mut ctx = BlendContext::new(ColorFormat::Argb8888).unwrap();
    let case = CaseParams {
        op: BlendOperation::PlainFill,
        format: ColorFormat::Argb8888,
        width: 8,
        height: 1,
        src_stride: 8,
        dest_stride: 8,
        src_misalign: 0,
        dest_misalign: 0,
        bg_opa: 255,
        fg_opa: 255,
        index: 0,
    };
    run_and_compare(&mut ctx, &case).unwrap();
}

#[test]
fn maximum_misalignment_matches() {
    let _guard = ctx_lock();
    let mut ctx = BlendContext::new(ColorFormat::Rgb565).unwrap();
    let case = CaseParams {
        op: BlendOperation::PlainFill,
        format: ColorFormat::Rgb565,
        width: 16,
        height: 16,
        src_stride: 16,
        dest_stride: 16,
        src_misalign: 0,
        dest_misalign: 16,
        bg_opa: 255,
        fg_opa: 255,
        index: 0,
    };
    run_and_compare(&mut ctx, &case).unwrap();
}

#[test]
fn argb8888_opacity_sweep_is_equal_everywhere() {
    let _guard = ctx_lock();
    // Both opacities swept 0..=254 with fine steps at the extremes; keep the
    // geometry modest so the opacity product dominates the case count.
    let mut params = MatrixParams::fill_opacity_defaults(ColorFormat::Argb8888);
    params.max_w = 10;
    params.max_h = 4;

    let mut ctx = BlendContext::new(ColorFormat::Argb8888).unwrap();
    let count = sweep(&params, &mut ctx, run_and_compare).unwrap();

    let opa_values = OpaRange::sweep(0, 254, 1).values().len() as u64;
    assert_eq!(count, 3 * 4 * opa_values * opa_values);
}

#[test]
fn opacity_extremes_pass_through() {
    let _guard = ctx_lock();
    let mut ctx = BlendContext::new(ColorFormat::Argb8888).unwrap();

    // fg_opa = 0 leaves the background; fg_opa = 255 is pure foreground.
    for fg_opa in [0u8, 255] {
        for bg_opa in [0u8, 127, 254] {
            let case = CaseParams {
                op: BlendOperation::FillWithOpacity,
                format: ColorFormat::Argb8888,
                width: 8,
                height: 2,
                src_stride: 8,
                dest_stride: 8,
                src_misalign: 0,
                dest_misalign: 0,
                bg_opa,
                fg_opa,
                index: 0,
            };
            run_and_compare(&mut ctx, &case).unwrap();
        }
    }
}

#[test]
fn rgb565_opacity_sweep_is_equal_everywhere() {
    let _guard = ctx_lock();
    // RGB565 carries no alpha channel, so only the foreground opacity sweeps.
    let mut params = MatrixParams::fill_opacity_defaults(ColorFormat::Rgb565);
    params.max_w = 10;
    params.max_h = 4;
    params.bg_opa = OpaRange::fixed(255);

    let mut ctx = BlendContext::new(ColorFormat::Rgb565).unwrap();
    let count = sweep(&params, &mut ctx, run_and_compare).unwrap();

    let opa_values = OpaRange::sweep(0, 254, 1).values().len() as u64;
    assert_eq!(count, 3 * 4 * opa_values);
}
