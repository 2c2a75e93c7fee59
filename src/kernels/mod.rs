//! The operations under test, behind an explicit dispatch seam.
//!
//! Both implementations consume the same descriptors and are selected by
//! [`Implementation`]; the harness never inspects their internals, only the
//! declared side effect of mutating the destination window.

pub mod accelerated;
pub mod reference;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pixel::{ColorFormat, Rgb888};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendOperation {
    PlainFill,
    FillWithOpacity,
    ImageCopyBlend,
}

impl fmt::Display for BlendOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlendOperation::PlainFill => write!(f, "plain-fill"),
            BlendOperation::FillWithOpacity => write!(f, "fill-with-opacity"),
            BlendOperation::ImageCopyBlend => write!(f, "image-copy-blend"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Implementation {
    Reference,
    Accelerated,
}

impl Implementation {
    pub fn label(self) -> &'static str {
        match self {
            Implementation::Reference => "reference",
            Implementation::Accelerated => "accelerated",
        }
    }
}

/// Fill operation descriptor. `dest` is the active window only; `dest_stride`
/// is in bytes, row `y` starts at byte `y * dest_stride`.
pub struct FillDescriptor<'a> {
    pub dest: &'a mut [u8],
    pub dest_w: u32,
    pub dest_h: u32,
    pub dest_stride: usize,
    pub color: Rgb888,
    pub opa: u8,
    pub format: ColorFormat,
}

/// Image copy-blend descriptor; strides are in bytes, source and destination
/// share the color format (no conversion in this harness).
pub struct ImageDescriptor<'a> {
    pub dest: &'a mut [u8],
    pub dest_w: u32,
    pub dest_h: u32,
    pub dest_stride: usize,
    pub src: &'a [u8],
    pub src_stride: usize,
    pub opa: u8,
    pub format: ColorFormat,
}

pub fn blend_fill(dsc: &mut FillDescriptor<'_>, imp: Implementation) {
    match imp {
        Implementation::Reference => reference::fill(dsc),
        Implementation::Accelerated => accelerated::fill(dsc),
    }
}

pub fn blend_image(dsc: &mut ImageDescriptor<'_>, imp: Implementation) {
    match imp {
        Implementation::Reference => reference::image(dsc),
        Implementation::Accelerated => accelerated::image(dsc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_serde_names_are_kebab_case() {
        let json = serde_json::to_string(&BlendOperation::FillWithOpacity).unwrap();
        assert_eq!(json, "\"fill-with-opacity\"");
        let back: BlendOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BlendOperation::FillWithOpacity);
    }

    #[test]
    fn implementation_labels() {
        assert_eq!(Implementation::Reference.label(), "reference");
        assert_eq!(Implementation::Accelerated.label(), "accelerated");
    }
}
