//! Portable baseline blend kernels. Straightforward per-pixel loops; every
//! other implementation must reproduce these results bit for bit.

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

/// Mix `fg` over `bg` using `fg`'s alpha as the ratio. The result keeps the
/// background alpha; the shift by 8 (not a divide by 255) matches the
/// widely-deployed fixed-point formulation this harness verifies against.
pub(super) fn mix_argb8888(fg: [u8; 4], bg: [u8; 4]) -> [u8; 4] {
    if fg[3] >= OPA_MAX {
        return fg;
    }
    if fg[3] <= OPA_MIN {
        return bg;
    }

    let a = u32::from(fg[3]);
    let inv = 255 - a;
    [
        ((u32::from(fg[0]) * a + u32::from(bg[0]) * inv) >> 8) as u8,
        ((u32::from(fg[1]) * a + u32::from(bg[1]) * inv) >> 8) as u8,
        ((u32::from(fg[2]) * a + u32::from(bg[2]) * inv) >> 8) as u8,
        bg[3],
    ]
}

/// Mix two RGB565 words per channel with round-to-nearest /255.
pub(super) fn mix_rgb565(fg: u16, bg: u16, mix: u8) -> u16 {
    if mix >= OPA_MAX {
        return fg;
    }
    if mix <= OPA_MIN {
        return bg;
    }

    let m = u32::from(mix);
    let inv = 255 - m;
    let (fr, fgc, fb) = rgb565_channels(fg);
    let (br, bgc, bb) = rgb565_channels(bg);
    rgb565_pack(
        udiv255(fr * m + br * inv + 128),
        udiv255(fgc * m + bgc * inv + 128),
        udiv255(fb * m + bb * inv + 128),
    )
}

fn fill_argb8888(dsc: &mut FillDescriptor<'_>) {
    let w = dsc.dest_w as usize;
    let h = dsc.dest_h as usize;
    let stride = dsc.dest_stride;

    if dsc.opa >= OPA_MAX {
        let px = dsc.color.to_argb8888(0xFF);
        for y in 0..h {
            let row = &mut dsc.dest[y * stride..y * stride + w * 4];
            for out in row.chunks_exact_mut(4) {
                out.copy_from_slice(&px);
            }
        }
        return;
    }

    let fg = dsc.color.to_argb8888(dsc.opa);
    for y in 0..h {
        let row = &mut dsc.dest[y * stride..y * stride + w * 4];
        for out in row.chunks_exact_mut(4) {
            let bg = [out[0], out[1], out[2], out[3]];
            out.copy_from_slice(&mix_argb8888(fg, bg));
        }
    }
}

fn fill_rgb565(dsc: &mut FillDescriptor<'_>) {
    let w = dsc.dest_w as usize;
    let h = dsc.dest_h as usize;
    let stride = dsc.dest_stride;
    let fg = dsc.color.to_rgb565();

    if dsc.opa >= OPA_MAX {
        let px = fg.to_le_bytes();
        for y in 0..h {
            let row = &mut dsc.dest[y * stride..y * stride + w * 2];
            for out in row.chunks_exact_mut(2) {
                out.copy_from_slice(&px);
            }
        }
        return;
    }

    for y in 0..h {
        let row = &mut dsc.dest[y * stride..y * stride + w * 2];
        for out in row.chunks_exact_mut(2) {
            let bg = u16::from_le_bytes([out[0], out[1]]);
            out.copy_from_slice(&mix_rgb565(fg, bg, dsc.opa).to_le_bytes());
        }
    }
}

fn image_argb8888(dsc: &mut ImageDescriptor<'_>) {
    let w = dsc.dest_w as usize;
    let h = dsc.dest_h as usize;

    for y in 0..h {
        let src_row = &dsc.src[y * dsc.src_stride..y * dsc.src_stride + w * 4];
        let dest_row = &mut dsc.dest[y * dsc.dest_stride..y * dsc.dest_stride + w * 4];

        if dsc.opa >= OPA_MAX {
            // Plain copy: source contributions land unmodified.
            for (out, px) in dest_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
                out.copy_from_slice(px);
            }
            continue;
        }

        for (out, px) in dest_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
            // Source alpha scaled by the blend opacity drives the mix.
            let fa = (u32::from(px[3]) * u32::from(dsc.opa)) >> 8;
            let fg = [px[0], px[1], px[2], fa as u8];
            let bg = [out[0], out[1], out[2], out[3]];
            out.copy_from_slice(&mix_argb8888(fg, bg));
        }
    }
}

fn image_rgb565(dsc: &mut ImageDescriptor<'_>) {
    let w = dsc.dest_w as usize;
    let h = dsc.dest_h as usize;

    for y in 0..h {
        let src_row = &dsc.src[y * dsc.src_stride..y * dsc.src_stride + w * 2];
        let dest_row = &mut dsc.dest[y * dsc.dest_stride..y * dsc.dest_stride + w * 2];

        if dsc.opa >= OPA_MAX {
            for (out, px) in dest_row.chunks_exact_mut(2).zip(src_row.chunks_exact(2)) {
                out.copy_from_slice(px);
            }
            continue;
        }

        for (out, px) in dest_row.chunks_exact_mut(2).zip(src_row.chunks_exact(2)) {
            let fg = u16::from_le_bytes([px[0], px[1]]);
            let bg = u16::from_le_bytes([out[0], out[1]]);
            out.copy_from_slice(&mix_rgb565(fg, bg, dsc.opa).to_le_bytes());
        }
    }
}
