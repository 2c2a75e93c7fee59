//! Minimum-speedup acceptance table. Thresholds are empirically derived per
//! hardware target and supplied as configuration data; the harness never
//! computes them.

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, HarnessResult};
use crate::kernels::BlendOperation;
use crate::pixel::ColorFormat;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub operation: BlendOperation,
    pub format: ColorFormat,
    pub target: String,
    /// Required speedup for the common/ideal configuration.
    pub common: f64,
    /// Required speedup for the corner/worst configuration.
    pub worst: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedupThresholds {
    pub entries: Vec<ThresholdEntry>,
}

impl SpeedupThresholds {
    /// Conservative defaults for the portable host target.
    pub fn builtin() -> Self {
        let mut table = Self::default();
        for format in [ColorFormat::Argb8888, ColorFormat::Rgb565] {
            table.insert(BlendOperation::PlainFill, format, "portable", 1.2, 1.0);
            table.insert(BlendOperation::FillWithOpacity, format, "portable", 1.05, 0.9);
            table.insert(BlendOperation::ImageCopyBlend, format, "portable", 1.2, 1.0);
        }
        table
    }

    pub fn from_json(json: &str) -> HarnessResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| HarnessError::serde(format!("threshold table: {e}")))
    }

    pub fn to_json(&self) -> HarnessResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| HarnessError::serde(format!("threshold table: {e}")))
    }

    pub fn insert(
        &mut self,
        operation: BlendOperation,
        format: ColorFormat,
        target: &str,
        common: f64,
        worst: f64,
    ) {
        self.entries.push(ThresholdEntry {
            operation,
            format,
            target: target.to_string(),
            common,
            worst,
        });
    }

    /// Required (common, worst) speedups, or `None` when the triple is not
    /// configured — callers treat that as a failure, not a skip.
    pub fn lookup(
        &self,
        operation: BlendOperation,
        format: ColorFormat,
        target: &str,
    ) -> Option<(f64, f64)> {
        self.entries
            .iter()
            .find(|e| e.operation == operation && e.format == format && e.target == target)
            .map(|e| (e.common, e.worst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_every_operation_and_format() {
        let table = SpeedupThresholds::builtin();
        for op in [
            BlendOperation::PlainFill,
            BlendOperation::FillWithOpacity,
            BlendOperation::ImageCopyBlend,
        ] {
            for format in [ColorFormat::Argb8888, ColorFormat::Rgb565] {
                assert!(table.lookup(op, format, "portable").is_some());
            }
        }
    }

    #[test]
    fn unknown_target_yields_none() {
        let table = SpeedupThresholds::builtin();
        assert_eq!(
            table.lookup(BlendOperation::PlainFill, ColorFormat::Argb8888, "esp32s3"),
            None
        );
    }

    #[test]
    fn json_roundtrip_preserves_entries() {
        let table = SpeedupThresholds::builtin();
        let json = table.to_json().unwrap();
        let back = SpeedupThresholds::from_json(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn malformed_json_is_a_serde_error() {
        let err = SpeedupThresholds::from_json("{not json").unwrap_err();
        assert!(matches!(err, HarnessError::Serde(_)));
    }

    #[test]
    fn external_tables_parse() {
        let json = r#"{
            "entries": [
                {
                    "operation": "plain-fill",
                    "format": "rgb565",
                    "target": "esp32s3",
                    "common": 3.2,
                    "worst": 1.6
                }
            ]
        }"#;
        let table = SpeedupThresholds::from_json(json).unwrap();
        assert_eq!(
            table.lookup(BlendOperation::PlainFill, ColorFormat::Rgb565, "esp32s3"),
            Some((3.2, 1.6))
        );
    }
}
