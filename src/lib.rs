#![forbid(unsafe_code)]

pub mod bench;
pub mod buffer;
pub mod compare;
pub mod context;
pub mod error;
pub mod kernels;
pub mod matrix;
pub mod pattern;
pub mod pixel;
pub mod thresholds;

pub use bench::{BenchParams, BenchReport, ConfigReport, CycleSource, StdCycles, run_benchmark};
pub use buffer::{GUARD_ELEMS, GuardedBuffer};
pub use compare::run_and_compare;
pub use context::{Area, BlendContext};
pub use error::{HarnessError, HarnessResult};
pub use kernels::{BlendOperation, FillDescriptor, ImageDescriptor, Implementation};
pub use matrix::{CaseParams, MatrixParams, MisalignRange, OpaRange, sweep};
pub use pixel::{ColorFormat, OPA_COVER, OPA_MAX, OPA_MIN, Rgb888};
pub use thresholds::{SpeedupThresholds, ThresholdEntry};
