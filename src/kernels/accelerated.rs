//! Optimized blend kernels: row-template copies for fills, hoisted
//! foreground products for opacity blends, and two-pixel unrolled image
//! loops. Observable results are bit-identical to `reference`; proving that
//! is the harness's job.

use crate::pixel::{ColorFormat, OPA_MAX, OPA_MIN, rgb565_channels, rgb565_pack, udiv255};

use super::{FillDescriptor, ImageDescriptor};

pub fn fill(dsc: &mut FillDescriptor<'_>) {
    if dsc.opa <= OPA_MIN {
        return;
    }
    match dsc.format {
        ColorFormat::Argb8888 => fill_argb8888(dsc),
        ColorFormat::Rgb565 => fill_rgb565(dsc),
    }
}

pub fn image(dsc: &mut ImageDescriptor<'_>) {
    if dsc.opa <= OPA_MIN {
        return;
    }
    match dsc.format {
        ColorFormat::Argb8888 => image_argb8888(dsc),
        ColorFormat::Rgb565 => image_rgb565(dsc),
    }
}

/// Build one row's worth of a repeated pixel, then stamp it per row.
fn stamp_rows(dest: &mut [u8], h: usize, stride: usize, px: &[u8], w: usize) {
    let mut template = Vec::with_capacity(w * px.len());
    for _ in 0..w {
        template.extend_from_slice(px);
    }
    for y in 0..h {
        dest[y * stride..y * stride + template.len()].copy_from_slice(&template);
    }
}

fn fill_argb8888(dsc: &mut FillDescriptor<'_>) {
    let w = dsc.dest_w as usize;
    let h = dsc.dest_h as usize;
    let stride = dsc.dest_stride;

    if dsc.opa >= OPA_MAX {
        stamp_rows(dsc.dest, h, stride, &dsc.color.to_argb8888(0xFF), w);
        return;
    }

    // The foreground term is constant across the fill; hoist fg*alpha so the
    // per-pixel work is one multiply-add per channel.
    let a = u32::from(dsc.opa);
    let inv = 255 - a;
    let fb = u32::from(dsc.color.b) * a;
    let fg = u32::from(dsc.color.g) * a;
    let fr = u32::from(dsc.color.r) * a;

    for y in 0..h {
        let row = &mut dsc.dest[y * stride..y * stride + w * 4];
        for out in row.chunks_exact_mut(4) {
            out[0] = ((fb + u32::from(out[0]) * inv) >> 8) as u8;
            out[1] = ((fg + u32::from(out[1]) * inv) >> 8) as u8;
            out[2] = ((fr + u32::from(out[2]) * inv) >> 8) as u8;
            // out[3] keeps the destination alpha.
        }
    }
}

fn fill_rgb565(dsc: &mut FillDescriptor<'_>) {
    let w = dsc.dest_w as usize;
    let h = dsc.dest_h as usize;
    let stride = dsc.dest_stride;
    let fg565 = dsc.color.to_rgb565();

    if dsc.opa >= OPA_MAX {
        stamp_rows(dsc.dest, h, stride, &fg565.to_le_bytes(), w);
        return;
    }

    let m = u32::from(dsc.opa);
    let inv = 255 - m;
    let (fr, fgc, fb) = rgb565_channels(fg565);
    // Rounding offset folded into the hoisted foreground products.
    let pre_r = fr * m + 128;
    let pre_g = fgc * m + 128;
    let pre_b = fb * m + 128;

    for y in 0..h {
        let row = &mut dsc.dest[y * stride..y * stride + w * 2];
        for out in row.chunks_exact_mut(2) {
            let (br, bgc, bb) = rgb565_channels(u16::from_le_bytes([out[0], out[1]]));
            let px = rgb565_pack(
                udiv255(pre_r + br * inv),
                udiv255(pre_g + bgc * inv),
                udiv255(pre_b + bb * inv),
            );
            out.copy_from_slice(&px.to_le_bytes());
        }
    }
}

fn blend_px_argb8888(out: &mut [u8], px: &[u8], opa: u32) {
    let fa = (u32::from(px[3]) * opa) >> 8;
    if fa >= u32::from(OPA_MAX) {
        out[0] = px[0];
        out[1] = px[1];
        out[2] = px[2];
        out[3] = fa as u8;
        return;
    }
    if fa <= u32::from(OPA_MIN) {
        return;
    }
    let inv = 255 - fa;
    out[0] = ((u32::from(px[0]) * fa + u32::from(out[0]) * inv) >> 8) as u8;
    out[1] = ((u32::from(px[1]) * fa + u32::from(out[1]) * inv) >> 8) as u8;
    out[2] = ((u32::from(px[2]) * fa + u32::from(out[2]) * inv) >> 8) as u8;
    // out[3] keeps the destination alpha.
}

fn image_argb8888(dsc: &mut ImageDescriptor<'_>) {
    let w = dsc.dest_w as usize;
    let h = dsc.dest_h as usize;
    let opa = u32::from(dsc.opa);

    for y in 0..h {
        let src_row = &dsc.src[y * dsc.src_stride..y * dsc.src_stride + w * 4];
        let dest_row = &mut dsc.dest[y * dsc.dest_stride..y * dsc.dest_stride + w * 4];

        if dsc.opa >= OPA_MAX {
            dest_row.copy_from_slice(src_row);
            continue;
        }

        // Two pixels per step, odd-width tail handled after.
        let mut d = dest_row.chunks_exact_mut(8);
        let mut s = src_row.chunks_exact(8);
        for (dp, sp) in d.by_ref().zip(s.by_ref()) {
            let (d0, d1) = dp.split_at_mut(4);
            blend_px_argb8888(d0, &sp[0..4], opa);
            blend_px_argb8888(d1, &sp[4..8], opa);
        }
        for (dp, sp) in d
            .into_remainder()
            .chunks_exact_mut(4)
            .zip(s.remainder().chunks_exact(4))
        {
            blend_px_argb8888(dp, sp, opa);
        }
    }
}

fn blend_px_rgb565(out: &mut [u8], px: &[u8], m: u32) {
    let inv = 255 - m;
    let (fr, fgc, fb) = rgb565_channels(u16::from_le_bytes([px[0], px[1]]));
    let (br, bgc, bb) = rgb565_channels(u16::from_le_bytes([out[0], out[1]]));
    let mixed = rgb565_pack(
        udiv255(fr * m + br * inv + 128),
        udiv255(fgc * m + bgc * inv + 128),
        udiv255(fb * m + bb * inv + 128),
    );
    out.copy_from_slice(&mixed.to_le_bytes());
}

fn image_rgb565(dsc: &mut ImageDescriptor<'_>) {
    let w = dsc.dest_w as usize;
    let h = dsc.dest_h as usize;
    let m = u32::from(dsc.opa);

    for y in 0..h {
        let src_row = &dsc.src[y * dsc.src_stride..y * dsc.src_stride + w * 2];
        let dest_row = &mut dsc.dest[y * dsc.dest_stride..y * dsc.dest_stride + w * 2];

        if dsc.opa >= OPA_MAX {
            dest_row.copy_from_slice(src_row);
            continue;
        }

        let mut d = dest_row.chunks_exact_mut(4);
        let mut s = src_row.chunks_exact(4);
        for (dp, sp) in d.by_ref().zip(s.by_ref()) {
            let (d0, d1) = dp.split_at_mut(2);
            blend_px_rgb565(d0, &sp[0..2], m);
            blend_px_rgb565(d1, &sp[2..4], m);
        }
        for (dp, sp) in d
            .into_remainder()
            .chunks_exact_mut(2)
            .zip(s.remainder().chunks_exact(2))
        {
            blend_px_rgb565(dp, sp, m);
        }
    }
}
