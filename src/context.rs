use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{HarnessError, HarnessResult};
use crate::pixel::{ColorFormat, Rgb888};

static CONTEXT_LIVE: AtomicBool = AtomicBool::new(false);

/// Inclusive pixel rectangle, `(x1, y1)`..=`(x2, y2)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Area {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Area {
    pub fn set(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.x1 = x1;
        self.y1 = y1;
        self.x2 = x2;
        self.y2 = y2;
    }

    pub fn width(&self) -> u32 {
        (self.x2 - self.x1 + 1) as u32
    }

    pub fn height(&self) -> u32 {
        (self.y2 - self.y1 + 1) as u32
    }
}

/// Shared state for one harness run: the colors under test and the area
/// snapshot both implementations observe for the current matrix cell.
///
/// At most one context is live per process; a second [`BlendContext::new`]
/// fails until the first is dropped. Fields are mutated only between cells,
/// never during an in-flight comparison or benchmark loop.
#[derive(Debug)]
pub struct BlendContext {
    format: ColorFormat,
    pub fill_color: Rgb888,
    pub bg_color: Rgb888,
    clip: Area,
    buf: Area,
    blend: Area,
}

impl BlendContext {
    pub fn new(format: ColorFormat) -> HarnessResult<Self> {
        if CONTEXT_LIVE.swap(true, Ordering::SeqCst) {
            return Err(HarnessError::invalid_state(
                "blend context is already initialized",
            ));
        }
        Ok(Self {
            format,
            fill_color: Rgb888::new(0x12, 0x34, 0x56),
            bg_color: Rgb888::new(0xAB, 0xCD, 0xEF),
            clip: Area::default(),
            buf: Area::default(),
            blend: Area::default(),
        })
    }

    pub fn format(&self) -> ColorFormat {
        self.format
    }

    pub fn set_format(&mut self, format: ColorFormat) {
        self.format = format;
    }

    /// Update the clip/buf/blend snapshot for one matrix cell: clip and buf
    /// cover the full stride, blend covers the logical fill width.
    pub fn set_cell_areas(&mut self, width: u32, height: u32, stride: u32) {
        let h = height as i32 - 1;
        self.clip.set(0, 0, stride as i32 - 1, h);
        self.buf.set(0, 0, stride as i32 - 1, h);
        self.blend.set(0, 0, width as i32 - 1, h);
    }

    pub fn clip_area(&self) -> Area {
        self.clip
    }

    pub fn buf_area(&self) -> Area {
        self.buf
    }

    pub fn blend_area(&self) -> Area {
        self.blend
    }
}

impl Drop for BlendContext {
    fn drop(&mut self) {
        CONTEXT_LIVE.store(false, Ordering::SeqCst);
    }
}

/// Serializes unit tests that create a [`BlendContext`]; the init guard is
/// process-wide and parallel test threads would race on it.
#[cfg(test)]
pub(crate) fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}
