//! Tunable detection thresholds.
//!
//! The external record is a flat `name -> integer` map ([`ParameterSet`]).
//! Every recognized name has a fixed range and default in [`PARAM_SPECS`];
//! presentation grouping lives in the separate [`PARAM_GROUPS`] table.
//! Stages consume the typed [`DetectorParams`] view built from a validated set.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::board::BoardSizePolicy;
use crate::error::RecognitionError;

pub const EDGE_THRESHOLD: &str = "edge_threshold";
pub const LINE_MIN_SUPPORT: &str = "line_min_support";
pub const LINE_MERGE_PX: &str = "line_merge_px";
pub const MIN_LINE_SPACING: &str = "min_line_spacing";
pub const SPACING_TOLERANCE: &str = "spacing_tolerance";
pub const MIN_GRID_LINES: &str = "min_grid_lines";
pub const BOARD_SIZE_EXACT: &str = "board_size_exact";
pub const BLOB_MIN_RADIUS: &str = "blob_min_radius";
pub const BLOB_MAX_RADIUS: &str = "blob_max_radius";
pub const BLOB_MIN_CONTRAST: &str = "blob_min_contrast";
pub const BLOB_MIN_CIRCULARITY: &str = "blob_min_circularity";
pub const LINE_SUPPRESS_PX: &str = "line_suppress_px";
pub const STONE_BRIGHTNESS_THRESHOLD: &str = "stone_brightness_threshold";

/// Declared range and default of one parameter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub min: i32,
    pub max: i32,
    pub default: i32,
}

impl ParamSpec {
    const fn new(name: &'static str, min: i32, max: i32, default: i32) -> Self {
        Self {
            name,
            min,
            max,
            default,
        }
    }

    #[inline]
    pub fn contains(&self, value: i64) -> bool {
        value >= self.min as i64 && value <= self.max as i64
    }

    fn out_of_range(&self, value: i64) -> RecognitionError {
        RecognitionError::InvalidParameter {
            name: self.name.to_string(),
            value,
            min: self.min,
            max: self.max,
        }
    }
}

/// All recognized parameters in validation order.
pub const PARAM_SPECS: [ParamSpec; 13] = [
    ParamSpec::new(EDGE_THRESHOLD, 1, 255, 40),
    ParamSpec::new(LINE_MIN_SUPPORT, 5, 100, 40),
    ParamSpec::new(LINE_MERGE_PX, 0, 10, 3),
    ParamSpec::new(MIN_LINE_SPACING, 2, 200, 8),
    ParamSpec::new(SPACING_TOLERANCE, 1, 50, 20),
    ParamSpec::new(MIN_GRID_LINES, 3, 19, 5),
    ParamSpec::new(BOARD_SIZE_EXACT, 0, 1, 0),
    ParamSpec::new(BLOB_MIN_RADIUS, 1, 200, 5),
    ParamSpec::new(BLOB_MAX_RADIUS, 2, 400, 40),
    ParamSpec::new(BLOB_MIN_CONTRAST, 1, 100, 15),
    ParamSpec::new(BLOB_MIN_CIRCULARITY, 10, 100, 60),
    ParamSpec::new(LINE_SUPPRESS_PX, 0, 10, 2),
    ParamSpec::new(STONE_BRIGHTNESS_THRESHOLD, 0, 255, 128),
];

/// UI grouping tag per parameter. Purely presentational.
pub const PARAM_GROUPS: [(&str, &str); 13] = [
    (EDGE_THRESHOLD, "Grid"),
    (LINE_MIN_SUPPORT, "Grid"),
    (LINE_MERGE_PX, "Grid"),
    (MIN_LINE_SPACING, "Grid"),
    (SPACING_TOLERANCE, "Grid"),
    (MIN_GRID_LINES, "Grid"),
    (BOARD_SIZE_EXACT, "Grid"),
    (BLOB_MIN_RADIUS, "Stones"),
    (BLOB_MAX_RADIUS, "Stones"),
    (BLOB_MIN_CONTRAST, "Stones"),
    (BLOB_MIN_CIRCULARITY, "Stones"),
    (LINE_SUPPRESS_PX, "Stones"),
    (STONE_BRIGHTNESS_THRESHOLD, "Stones"),
];

/// Look up the declared range of a parameter.
pub fn param_spec(name: &str) -> Option<&'static ParamSpec> {
    PARAM_SPECS.iter().find(|s| s.name == name)
}

/// Look up the UI group of a parameter.
pub fn param_group(name: &str) -> Option<&'static str> {
    PARAM_GROUPS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, group)| group)
}

/// What to do with a value outside its declared range.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// Clamp into `[min, max]` and log a warning.
    #[default]
    Clamp,
    /// Fail with `InvalidParameter` on the first offending key.
    Reject,
}

/// Validated flat parameter record.
///
/// Always holds every recognized key with an in-range value. Serializes as a
/// flat JSON object with sorted keys; loading goes through [`ParameterSet::from_json`]
/// so a deserialized set is always validated.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: BTreeMap<String, i32>,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            values: PARAM_SPECS
                .iter()
                .map(|s| (s.name.to_string(), s.default))
                .collect(),
        }
    }
}

impl ParameterSet {
    pub fn defaults() -> Self {
        Self::default()
    }

    /// Validate raw `name -> value` pairs against [`PARAM_SPECS`].
    ///
    /// Unknown names are ignored, missing names keep their defaults.
    pub fn validate<I, K>(raw: I, policy: ValidationPolicy) -> Result<Self, RecognitionError>
    where
        I: IntoIterator<Item = (K, i64)>,
        K: AsRef<str>,
    {
        let mut supplied: BTreeMap<&'static str, i64> = BTreeMap::new();
        for (name, value) in raw {
            let name = name.as_ref();
            match param_spec(name) {
                Some(spec) => {
                    supplied.insert(spec.name, value);
                }
                None => debug!("ignoring unknown parameter `{name}`"),
            }
        }

        let mut out = ParameterSet::default();
        for spec in &PARAM_SPECS {
            let Some(&value) = supplied.get(spec.name) else {
                continue;
            };
            let accepted = if spec.contains(value) {
                value as i32
            } else {
                match policy {
                    ValidationPolicy::Reject => return Err(spec.out_of_range(value)),
                    ValidationPolicy::Clamp => {
                        let clamped = value.clamp(spec.min as i64, spec.max as i64) as i32;
                        warn!(
                            "parameter `{}` = {value} clamped to {clamped} (range [{}, {}])",
                            spec.name, spec.min, spec.max
                        );
                        clamped
                    }
                }
            };
            out.values.insert(spec.name.to_string(), accepted);
        }

        out.enforce_radius_order(policy)?;
        Ok(out)
    }

    /// Validate a JSON object such as a parameter sidecar.
    ///
    /// Non-integer numbers are rounded; non-numeric values and non-object
    /// documents are ignored with a warning, matching the "unknown key" rule.
    pub fn from_json(
        value: &serde_json::Value,
        policy: ValidationPolicy,
    ) -> Result<Self, RecognitionError> {
        let Some(map) = value.as_object() else {
            warn!("parameter record is not a JSON object, using defaults");
            return Ok(Self::default());
        };
        let raw = map.iter().filter_map(|(k, v)| {
            let n = v
                .as_i64()
                .or_else(|| v.as_f64().map(|f| f.round() as i64));
            if n.is_none() {
                warn!("parameter `{k}` is not a number, ignored");
            }
            n.map(|n| (k.as_str(), n))
        });
        Self::validate(raw, policy)
    }

    fn enforce_radius_order(&mut self, policy: ValidationPolicy) -> Result<(), RecognitionError> {
        let min_r = self.get(BLOB_MIN_RADIUS);
        let max_r = self.get(BLOB_MAX_RADIUS);
        if max_r >= min_r {
            return Ok(());
        }
        match policy {
            ValidationPolicy::Reject => Err(RecognitionError::InvalidParameter {
                name: BLOB_MAX_RADIUS.to_string(),
                value: max_r as i64,
                min: min_r,
                max: param_spec(BLOB_MAX_RADIUS).map_or(i32::MAX, |s| s.max),
            }),
            ValidationPolicy::Clamp => {
                warn!("{BLOB_MAX_RADIUS} = {max_r} raised to {BLOB_MIN_RADIUS} = {min_r}");
                self.values.insert(BLOB_MAX_RADIUS.to_string(), min_r);
                Ok(())
            }
        }
    }

    /// Value of a recognized parameter; `0` for unknown names.
    pub fn get(&self, name: &str) -> i32 {
        self.values
            .get(name)
            .copied()
            .or_else(|| param_spec(name).map(|s| s.default))
            .unwrap_or(0)
    }

    /// Return a copy with one value replaced, validated under `policy`.
    pub fn with(&self, name: &str, value: i64, policy: ValidationPolicy) -> Result<Self, RecognitionError> {
        let raw = self
            .values
            .iter()
            .map(|(k, &v)| (k.as_str(), v as i64))
            .filter(|(k, _)| *k != name)
            .chain(std::iter::once((name, value)));
        Self::validate(raw, policy)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.values.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

/// Grid (geometry) detector settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridParams {
    /// Normalized Sobel magnitude (0..255) each flank of a line must reach.
    pub edge_threshold: f32,
    /// Fraction of the strongest profile bin a line candidate needs.
    pub line_min_support: f32,
    /// Profile peaks closer than this (pixels) merge into one line.
    pub line_merge_px: usize,
    /// Smallest accepted grid spacing in pixels.
    pub min_line_spacing: f32,
    /// Allowed relative deviation from the running spacing.
    pub spacing_tolerance: f32,
    /// Minimum number of lines in each family.
    pub min_grid_lines: usize,
    pub size_policy: BoardSizePolicy,
    /// Contrast (percent of full scale) of stone footprints kept out of the
    /// line evidence.
    pub stone_contrast: f32,
    /// Opening radius separating stone footprints from grid lines.
    pub stone_open_px: u8,
}

/// Blob (stone) detector settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlobParams {
    pub min_radius: f32,
    pub max_radius: f32,
    /// Minimum blob/background contrast, percent of full scale.
    pub min_contrast: f32,
    /// Minimum fill of the enclosing circle in [0, 1].
    pub min_circularity: f32,
    /// Opening radius that erases thin grid lines before labelling.
    pub line_suppress_px: u8,
}

/// Stone color classifier settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassifyParams {
    /// Mean luma strictly below this is black.
    pub brightness_threshold: u8,
}

/// Typed per-stage view of a [`ParameterSet`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorParams {
    pub grid: GridParams,
    pub blobs: BlobParams,
    pub classify: ClassifyParams,
}

impl From<&ParameterSet> for DetectorParams {
    fn from(p: &ParameterSet) -> Self {
        let size_policy = if p.get(BOARD_SIZE_EXACT) != 0 {
            BoardSizePolicy::Exact
        } else {
            BoardSizePolicy::Nearest
        };
        let line_suppress_px = p.get(LINE_SUPPRESS_PX).clamp(0, u8::MAX as i32) as u8;
        Self {
            grid: GridParams {
                edge_threshold: p.get(EDGE_THRESHOLD) as f32,
                line_min_support: p.get(LINE_MIN_SUPPORT) as f32 / 100.0,
                line_merge_px: p.get(LINE_MERGE_PX).max(0) as usize,
                min_line_spacing: p.get(MIN_LINE_SPACING) as f32,
                spacing_tolerance: p.get(SPACING_TOLERANCE) as f32 / 100.0,
                min_grid_lines: p.get(MIN_GRID_LINES).max(2) as usize,
                size_policy,
                stone_contrast: p.get(BLOB_MIN_CONTRAST) as f32,
                stone_open_px: line_suppress_px,
            },
            blobs: BlobParams {
                min_radius: p.get(BLOB_MIN_RADIUS) as f32,
                max_radius: p.get(BLOB_MAX_RADIUS) as f32,
                min_contrast: p.get(BLOB_MIN_CONTRAST) as f32,
                min_circularity: p.get(BLOB_MIN_CIRCULARITY) as f32 / 100.0,
                line_suppress_px,
            },
            classify: ClassifyParams {
                brightness_threshold: p.get(STONE_BRIGHTNESS_THRESHOLD).clamp(0, 255) as u8,
            },
        }
    }
}

impl Default for DetectorParams {
    fn default() -> Self {
        DetectorParams::from(&ParameterSet::default())
    }
}
