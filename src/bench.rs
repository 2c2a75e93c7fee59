//! Cycle-count benchmarking of one implementation at a time, with a
//! speedup check against the configured threshold table.

use std::time::Instant;

use serde::Serialize;

use crate::buffer::GuardedBuffer;
use crate::context::BlendContext;
use crate::error::{HarnessError, HarnessResult};
use crate::kernels::{
    self, BlendOperation, FillDescriptor, ImageDescriptor, Implementation,
};
use crate::pattern;
use crate::pixel::{ColorFormat, OPA_COVER};
use crate::thresholds::SpeedupThresholds;

/// Monotonic cycle counter. Readings only ever appear as
/// `end.wrapping_sub(start)`, so a wrapping counter is fine.
pub trait CycleSource {
    fn cycles(&self) -> u64;
}

/// Host-clock cycle source; nanoseconds stand in for cycles.
#[derive(Debug)]
pub struct StdCycles {
    epoch: Instant,
}

impl StdCycles {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for StdCycles {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleSource for StdCycles {
    fn cycles(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BenchParams {
    pub op: BlendOperation,
    pub format: ColorFormat,
    /// Ideal-case width; the corner case runs at `width - 1`.
    pub width: u32,
    /// Ideal-case height; the corner case runs at `height - 1`.
    pub height: u32,
    pub iterations: u32,
    pub fg_opa: u8,
}

impl BenchParams {
    pub fn defaults(op: BlendOperation, format: ColorFormat) -> Self {
        Self {
            op,
            format,
            width: 128,
            height: 128,
            iterations: 750,
            fg_opa: match op {
                // Low enough to force the per-pixel blend path.
                BlendOperation::FillWithOpacity => 25,
                _ => OPA_COVER,
            },
        }
    }
}

/// One measured configuration (ideal or corner).
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ConfigReport {
    pub width: u32,
    pub height: u32,
    pub misalign: u32,
    pub reference_cycles: f64,
    pub accelerated_cycles: f64,
    /// Accelerated cycles divided by the sample count, for cross-geometry
    /// comparison.
    pub cycles_per_sample: f64,
    pub speedup: f64,
    pub min_speedup: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct BenchReport {
    pub operation: BlendOperation,
    pub format: ColorFormat,
    pub target: String,
    pub common: ConfigReport,
    pub corner: ConfigReport,
}

#[derive(Clone, Copy, Debug)]
struct GeometryConfig {
    width: u32,
    height: u32,
    misalign: u32,
    dynamic_bg: bool,
}

/// Measure both implementations under the common/ideal and corner/worst
/// configurations and check the measured speedups against the threshold
/// table. A missing table entry is a failure in its own right.
pub fn run_benchmark(
    ctx: &mut BlendContext,
    params: &BenchParams,
    clock: &dyn CycleSource,
    thresholds: &SpeedupThresholds,
    target: &str,
) -> HarnessResult<BenchReport> {
    if params.iterations == 0 {
        return Err(HarnessError::invalid_state(
            "benchmark iterations must be greater than zero",
        ));
    }
    if params.width < 2 || params.height < 2 {
        return Err(HarnessError::invalid_state(
            "benchmark geometry must be at least 2x2 so the corner case is non-empty",
        ));
    }

    let (common_min, worst_min) = thresholds
        .lookup(params.op, params.format, target)
        .ok_or_else(|| {
            HarnessError::regression(format!(
                "no speedup threshold configured for {} / {} / {target}",
                params.op, params.format
            ))
        })?;

    ctx.set_format(params.format);

    // Ideal: 16-byte aligned, vector-friendly dimensions. Corner: 1-byte
    // misaligned, both dimensions one less, per-sample background alpha.
    let common_cfg = GeometryConfig {
        width: params.width,
        height: params.height,
        misalign: 0,
        dynamic_bg: false,
    };
    let corner_cfg = GeometryConfig {
        width: params.width - 1,
        height: params.height - 1,
        misalign: 1,
        dynamic_bg: true,
    };

    let common = measure_config(ctx, params, common_cfg, clock, common_min)?;
    let corner = measure_config(ctx, params, corner_cfg, clock, worst_min)?;

    Ok(BenchReport {
        operation: params.op,
        format: params.format,
        target: target.to_string(),
        common,
        corner,
    })
}

fn measure_config(
    ctx: &mut BlendContext,
    params: &BenchParams,
    cfg: GeometryConfig,
    clock: &dyn CycleSource,
    min_speedup: f64,
) -> HarnessResult<ConfigReport> {
    let reference_cycles = measure(ctx, params, cfg, Implementation::Reference, clock)?;
    let accelerated_cycles = measure(ctx, params, cfg, Implementation::Accelerated, clock)?;

    let samples = f64::from(cfg.width) * f64::from(cfg.height);
    let speedup = reference_cycles / accelerated_cycles;

    tracing::info!(
        op = %params.op,
        format = %params.format,
        width = cfg.width,
        height = cfg.height,
        misalign = cfg.misalign,
        reference_cycles,
        accelerated_cycles,
        cycles_per_sample = accelerated_cycles / samples,
        speedup,
        "benchmark configuration measured"
    );

    if speedup < min_speedup {
        return Err(HarnessError::regression(format!(
            "{} / {} at {}x{} misalign {}: speedup {speedup:.3} below required {min_speedup:.3}",
            params.op, params.format, cfg.width, cfg.height, cfg.misalign
        )));
    }

    Ok(ConfigReport {
        width: cfg.width,
        height: cfg.height,
        misalign: cfg.misalign,
        reference_cycles,
        accelerated_cycles,
        cycles_per_sample: accelerated_cycles / samples,
        speedup,
        min_speedup,
    })
}

/// Average cycles per invocation over the configured iteration count, after
/// one untimed warmup call.
fn measure(
    ctx: &BlendContext,
    params: &BenchParams,
    cfg: GeometryConfig,
    imp: Implementation,
    clock: &dyn CycleSource,
) -> HarnessResult<f64> {
    let elem = params.format.elem_size();
    // The stride stays at the ideal width even for the corner case, so the
    // buffer layout matches between configurations.
    let stride_elems = params.width as usize;
    let active = stride_elems * params.height as usize;

    // Benchmark buffers carry no guards; overrun detection belongs to the
    // functionality matrix.
    let mut dest = GuardedBuffer::allocate(active, 0, elem, cfg.misalign as usize)?;

    let src = match params.op {
        BlendOperation::ImageCopyBlend => {
            let mut src = GuardedBuffer::allocate(active, 0, elem, 0)?;
            pattern::fill_image_src(&mut src);
            Some(src)
        }
        _ => None,
    };

    let mut invoke = |dest: &mut GuardedBuffer| match &src {
        None => {
            let mut dsc = FillDescriptor {
                dest: dest.active_mut(),
                dest_w: cfg.width,
                dest_h: cfg.height,
                dest_stride: stride_elems * elem,
                color: ctx.fill_color,
                opa: params.fg_opa,
                format: params.format,
            };
            kernels::blend_fill(&mut dsc, imp);
        }
        Some(src) => {
            let mut dsc = ImageDescriptor {
                dest: dest.active_mut(),
                dest_w: cfg.width,
                dest_h: cfg.height,
                dest_stride: stride_elems * elem,
                src: src.active(),
                src_stride: stride_elems * elem,
                opa: params.fg_opa,
                format: params.format,
            };
            kernels::blend_image(&mut dsc, imp);
        }
    };

    // First call untimed: warms caches and code paths.
    invoke(&mut dest);

    let mut total = 0u64;
    for _ in 0..params.iterations {
        reinit_dest(ctx, params, cfg, &mut dest);
        let start = clock.cycles();
        invoke(&mut dest);
        let end = clock.cycles();
        total += end.wrapping_sub(start);
    }

    Ok(total as f64 / f64::from(params.iterations))
}

/// Opacity blends mutate their destination in place; without
/// re-initialization, repeated application would drift the effective input
/// distribution across iterations.
fn reinit_dest(
    ctx: &BlendContext,
    params: &BenchParams,
    cfg: GeometryConfig,
    dest: &mut GuardedBuffer,
) {
    if params.op != BlendOperation::FillWithOpacity {
        return;
    }

    let samples = cfg.width as usize * cfg.height as usize;
    if cfg.dynamic_bg {
        // Per-sample alpha keeps every pixel on the most demanding path.
        match params.format {
            ColorFormat::Argb8888 => {
                let bg = ctx.bg_color;
                for (i, px) in dest.active_mut().chunks_exact_mut(4).take(samples).enumerate() {
                    px.copy_from_slice(&bg.to_argb8888((i % 255) as u8));
                }
            }
            ColorFormat::Rgb565 => {
                let px = ctx.bg_color.to_rgb565().to_le_bytes();
                for out in dest.active_mut().chunks_exact_mut(2).take(samples) {
                    out.copy_from_slice(&px);
                }
            }
        }
    } else {
        let len = samples * params.format.elem_size();
        dest.active_mut()[..len].fill(0);
    }
}
