//! Dual-path invocation and byte-exact evaluation for one matrix cell.

use crate::buffer::{GUARD_ELEMS, GuardedBuffer};
use crate::context::BlendContext;
use crate::error::{HarnessError, HarnessResult};
use crate::kernels::{
    self, BlendOperation, FillDescriptor, ImageDescriptor, Implementation,
};
use crate::matrix::CaseParams;
use crate::pattern;

/// Run one cell through both implementations on independently allocated,
/// identically seeded buffers, then evaluate:
///
/// 1. leading guards of both destinations are all-zero,
/// 2. active regions are element-wise equal,
/// 3. trailing guards are all-zero,
/// 4. for image operations, each destination row's first `width` elements
///    equal the corresponding source row.
///
/// The first divergence fails the cell with the full geometry context; both
/// buffers are released on every path by scope.
pub fn run_and_compare(ctx: &mut BlendContext, case: &CaseParams) -> HarnessResult<()> {
    ctx.set_format(case.format);
    ctx.set_cell_areas(case.width, case.height, case.dest_stride);

    let elem = case.format.elem_size();
    let active = case.height as usize * case.dest_stride as usize;

    let mut dest_accel =
        GuardedBuffer::allocate(active, GUARD_ELEMS, elem, case.dest_misalign as usize)?;
    let mut dest_ref =
        GuardedBuffer::allocate(active, GUARD_ELEMS, elem, case.dest_misalign as usize)?;

    let src = match case.op {
        BlendOperation::PlainFill => {
            pattern::fill_ramp(&mut dest_accel);
            pattern::fill_ramp(&mut dest_ref);
            None
        }
        BlendOperation::FillWithOpacity => {
            let bg = ctx.bg_color;
            pattern::fill_background(&mut dest_accel, case.format, bg, case.bg_opa);
            pattern::fill_background(&mut dest_ref, case.format, bg, case.bg_opa);
            None
        }
        BlendOperation::ImageCopyBlend => {
            pattern::fill_image_dest(&mut dest_accel);
            pattern::fill_image_dest(&mut dest_ref);
            let src_len = case.height as usize * case.src_stride as usize;
            let mut src =
                GuardedBuffer::allocate(src_len, 0, elem, case.src_misalign as usize)?;
            pattern::fill_image_src(&mut src);
            Some(src)
        }
    };

    // Both invocations observe the same area snapshot; only the destination
    // and the implementation selector differ.
    let blend = ctx.blend_area();
    let stride_bytes = ctx.buf_area().width() as usize * elem;
    let color = ctx.fill_color;

    for (buf, imp) in [
        (&mut dest_accel, Implementation::Accelerated),
        (&mut dest_ref, Implementation::Reference),
    ] {
        match &src {
            None => {
                let mut dsc = FillDescriptor {
                    dest: buf.active_mut(),
                    dest_w: blend.width(),
                    dest_h: blend.height(),
                    dest_stride: stride_bytes,
                    color,
                    opa: case.fg_opa,
                    format: case.format,
                };
                kernels::blend_fill(&mut dsc, imp);
            }
            Some(src) => {
                let mut dsc = ImageDescriptor {
                    dest: buf.active_mut(),
                    dest_w: blend.width(),
                    dest_h: blend.height(),
                    dest_stride: stride_bytes,
                    src: src.active(),
                    src_stride: case.src_stride as usize * elem,
                    opa: case.fg_opa,
                    format: case.format,
                };
                kernels::blend_image(&mut dsc, imp);
            }
        }
    }

    for (buf, label) in [(&dest_accel, "accelerated"), (&dest_ref, "reference")] {
        if let Some((side, offset)) = buf.first_corrupt_guard() {
            return Err(HarnessError::guard_violation(format!(
                "{label} wrote into the {side} guard at byte {offset} ({case})"
            )));
        }
    }

    if let Some(i) = first_mismatch(dest_accel.active(), dest_ref.active(), elem) {
        return Err(HarnessError::mismatch(format!(
            "accelerated = {:#x}, reference = {:#x} at element {i} ({case})",
            elem_value(dest_accel.active(), i, elem),
            elem_value(dest_ref.active(), i, elem),
        )));
    }

    if let Some(src) = &src {
        check_rows_equal_src(&dest_accel, src, case, elem)?;
    }

    Ok(())
}

/// First differing element index, comparing whole elements at the format's
/// width so diagnostics name a pixel rather than a byte.
fn first_mismatch(a: &[u8], b: &[u8], elem: usize) -> Option<usize> {
    a.chunks_exact(elem)
        .zip(b.chunks_exact(elem))
        .position(|(x, y)| x != y)
}

fn elem_value(bytes: &[u8], index: usize, elem: usize) -> u64 {
    let mut v = 0u64;
    for (i, &b) in bytes[index * elem..(index + 1) * elem].iter().enumerate() {
        v |= u64::from(b) << (8 * i);
    }
    v
}

/// Row-copy invariant for image operations at cover opacity: the first
/// `width` elements of every destination row equal the source row,
/// independent of stride padding on either side.
fn check_rows_equal_src(
    dest: &GuardedBuffer,
    src: &GuardedBuffer,
    case: &CaseParams,
    elem: usize,
) -> HarnessResult<()> {
    if case.fg_opa < crate::pixel::OPA_MAX {
        // Blended output is covered by the equivalence check alone.
        return Ok(());
    }

    let row_len = case.width as usize * elem;
    for row in 0..case.height as usize {
        let d = &dest.active()[row * case.dest_stride as usize * elem..][..row_len];
        let s = &src.active()[row * case.src_stride as usize * elem..][..row_len];
        if let Some(i) = first_mismatch(d, s, elem) {
            return Err(HarnessError::mismatch(format!(
                "dest row {row} differs from source at element {i} ({case})"
            )));
        }
    }
    Ok(())
}
