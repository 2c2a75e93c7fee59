//! Combinatorial sweep over buffer geometry and opacity. Cells run strictly
//! sequentially: every trial needs a fresh, hermetic buffer pair and the
//! shared context is mutated between cells.

use std::fmt;

use crate::context::BlendContext;
use crate::error::HarnessResult;
use crate::kernels::BlendOperation;
use crate::pixel::{ColorFormat, OPA_COVER};

/// Opacity sweep range. Stepping is asymmetric: the configured (fine) step
/// applies within 5 units of the minimum and 10 of the maximum, and a coarse
/// step of 20 covers the middle, concentrating cases on the saturation and
/// near-zero edges while keeping the total tractable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpaRange {
    pub min: u8,
    pub max: u8,
    pub step: u8,
}

impl OpaRange {
    pub fn fixed(value: u8) -> Self {
        Self {
            min: value,
            max: value,
            step: 0,
        }
    }

    pub fn sweep(min: u8, max: u8, step: u8) -> Self {
        Self { min, max, step }
    }

    fn step_at(&self, opa: u32) -> u32 {
        // A zero step would loop forever.
        let fine = u32::from(self.step).max(1);
        let min = u32::from(self.min);
        let max = u32::from(self.max);
        if opa > min + 5 && opa + 10 <= max { 20 } else { fine }
    }

    pub fn values(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut opa = u32::from(self.min);
        while opa <= u32::from(self.max) {
            out.push(opa as u8);
            opa += self.step_at(opa);
        }
        out
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MisalignRange {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl MisalignRange {
    pub fn none() -> Self {
        Self {
            min: 0,
            max: 0,
            step: 1,
        }
    }

    pub fn sweep(min: u32, max: u32, step: u32) -> Self {
        Self { min, max, step }
    }

    fn values(&self) -> Vec<u32> {
        let step = self.step.max(1);
        let mut out = Vec::new();
        let mut v = self.min;
        while v <= self.max {
            out.push(v);
            v += step;
        }
        out
    }
}

/// Ranges and steps for one matrix sweep.
#[derive(Clone, Debug)]
pub struct MatrixParams {
    pub op: BlendOperation,
    pub format: ColorFormat,
    pub min_w: u32,
    pub max_w: u32,
    pub min_h: u32,
    pub max_h: u32,
    /// Sweep the source stride over [w, 2w]; fixed at w when false.
    pub sweep_src_stride: bool,
    /// Sweep the destination stride over [w, 2w]; fixed at w when false.
    pub sweep_dest_stride: bool,
    pub stride_step: u32,
    pub src_misalign: MisalignRange,
    pub dest_misalign: MisalignRange,
    pub bg_opa: OpaRange,
    pub fg_opa: OpaRange,
}

impl MatrixParams {
    /// Plain-fill defaults: the full geometry sweep at fixed cover opacity.
    /// The minimum width of 8 is the smallest run the accelerated path takes.
    pub fn fill_defaults(format: ColorFormat) -> Self {
        Self {
            op: BlendOperation::PlainFill,
            format,
            min_w: 8,
            max_w: 16,
            min_h: 1,
            max_h: 16,
            sweep_src_stride: false,
            sweep_dest_stride: true,
            stride_step: 1,
            src_misalign: MisalignRange::none(),
            dest_misalign: MisalignRange::sweep(0, 16, 1),
            bg_opa: OpaRange::fixed(OPA_COVER),
            fg_opa: OpaRange::fixed(OPA_COVER),
        }
    }

    /// Opacity-fill defaults: fixed geometry alignment, both opacities swept
    /// edge-to-edge with the asymmetric stepping policy.
    pub fn fill_opacity_defaults(format: ColorFormat) -> Self {
        Self {
            op: BlendOperation::FillWithOpacity,
            format,
            min_w: 8,
            max_w: 16,
            min_h: 1,
            max_h: 16,
            sweep_src_stride: false,
            sweep_dest_stride: false,
            stride_step: 1,
            src_misalign: MisalignRange::none(),
            dest_misalign: MisalignRange::none(),
            bg_opa: OpaRange::sweep(0, 254, 1),
            fg_opa: OpaRange::sweep(0, 254, 1),
        }
    }

    /// Image-copy defaults: both strides and both misalignments swept.
    pub fn image_defaults(format: ColorFormat) -> Self {
        Self {
            op: BlendOperation::ImageCopyBlend,
            format,
            min_w: 8,
            max_w: 16,
            min_h: 2,
            max_h: 16,
            sweep_src_stride: true,
            sweep_dest_stride: true,
            stride_step: 1,
            src_misalign: MisalignRange::sweep(0, 16, 1),
            dest_misalign: MisalignRange::sweep(0, 16, 1),
            bg_opa: OpaRange::fixed(OPA_COVER),
            fg_opa: OpaRange::fixed(OPA_COVER),
        }
    }
}

/// The concrete values for one matrix cell. Strides are in elements;
/// misalignments in bytes.
#[derive(Clone, Copy, Debug)]
pub struct CaseParams {
    pub op: BlendOperation,
    pub format: ColorFormat,
    pub width: u32,
    pub height: u32,
    pub src_stride: u32,
    pub dest_stride: u32,
    pub src_misalign: u32,
    pub dest_misalign: u32,
    pub bg_opa: u8,
    pub fg_opa: u8,
    /// Running combination number, diagnostic only.
    pub index: u64,
}

impl fmt::Display for CaseParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: w = {}, h = {}, dest_stride = {}, src_stride = {}, \
             dest_misalign = {}, src_misalign = {}, bg_opa = {}, fg_opa = {}, case = {}",
            self.op,
            self.format,
            self.width,
            self.height,
            self.dest_stride,
            self.src_stride,
            self.dest_misalign,
            self.src_misalign,
            self.bg_opa,
            self.fg_opa,
            self.index
        )
    }
}

/// Run `cell` once per combination; returns the number of cells exercised.
/// The first failing cell aborts the sweep so the error stays anchored to
/// the geometry that produced it.
#[tracing::instrument(skip(params, ctx, cell), fields(op = %params.op, format = %params.format))]
pub fn sweep(
    params: &MatrixParams,
    ctx: &mut BlendContext,
    mut cell: impl FnMut(&mut BlendContext, &CaseParams) -> HarnessResult<()>,
) -> HarnessResult<u64> {
    let stride_step = params.stride_step.max(1);
    let src_misaligns = params.src_misalign.values();
    let dest_misaligns = params.dest_misalign.values();
    let bg_opas = params.bg_opa.values();
    let fg_opas = params.fg_opa.values();
    let mut count = 0u64;

    for w in params.min_w..=params.max_w {
        for h in params.min_h..=params.max_h {
            let src_hi = if params.sweep_src_stride { w * 2 } else { w };
            let mut src_stride = w;
            while src_stride <= src_hi {
                let dest_hi = if params.sweep_dest_stride { w * 2 } else { w };
                let mut dest_stride = w;
                while dest_stride <= dest_hi {
                    for &src_misalign in &src_misaligns {
                        for &dest_misalign in &dest_misaligns {
                            for &bg_opa in &bg_opas {
                                for &fg_opa in &fg_opas {
                                    let case = CaseParams {
                                        op: params.op,
                                        format: params.format,
                                        width: w,
                                        height: h,
                                        src_stride,
                                        dest_stride,
                                        src_misalign,
                                        dest_misalign,
                                        bg_opa,
                                        fg_opa,
                                        index: count,
                                    };
                                    cell(ctx, &case)?;
                                    count += 1;
                                }
                            }
                        }
                    }
                    dest_stride += stride_step;
                }
                src_stride += stride_step;
            }
        }
    }

    tracing::info!(combinations = count, "matrix sweep complete");
    Ok(count)
}
