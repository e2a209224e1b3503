//! Sidecar files next to a board photograph.
//!
//! - `<image>.json`: the [`ParameterSet`] used to recognize the image.
//! - `<image>.jgf`: the recognized board as a [`BoardRecord`].

use std::fs;
use std::path::{Path, PathBuf};

use goboard_core::{Marker, ParameterSet, RecognitionError, StoneColor, ValidationPolicy};
use goboard_detect::RecognitionResult;
use image::RgbImage;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Params(#[from] RecognitionError),
}

/// Parameter sidecar path: same stem, `.json` extension.
pub fn params_path_for(image_path: impl AsRef<Path>) -> PathBuf {
    image_path.as_ref().with_extension("json")
}

/// Board record path: same stem, `.jgf` extension.
pub fn board_path_for(image_path: impl AsRef<Path>) -> PathBuf {
    image_path.as_ref().with_extension("jgf")
}

/// Load an image as 8-bit RGB.
pub fn load_image(path: impl AsRef<Path>) -> Result<RgbImage, IoError> {
    Ok(image::open(path)?.to_rgb8())
}

/// Read a flat JSON parameter object and validate it.
///
/// Unknown keys are ignored and missing keys take their defaults.
pub fn load_params(path: impl AsRef<Path>, policy: ValidationPolicy) -> Result<ParameterSet, IoError> {
    let raw = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    Ok(ParameterSet::from_json(&value, policy)?)
}

/// Write parameters as pretty JSON with sorted keys.
pub fn save_params(path: impl AsRef<Path>, params: &ParameterSet) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(params)?;
    fs::write(path, json)?;
    Ok(())
}

/// One stone of a [`BoardRecord`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoneRecord {
    /// Go notation such as `D16`; empty for boards wider than the label alphabet.
    pub label: String,
    pub col: u32,
    pub row: u32,
    pub x: f32,
    pub y: f32,
    pub r: f32,
}

impl StoneRecord {
    fn from_marker(m: &Marker, board_size: u32) -> Self {
        Self {
            label: m.coord.label(board_size).unwrap_or_default(),
            col: m.coord.col,
            row: m.coord.row,
            x: m.position.x,
            y: m.position.y,
            r: m.radius,
        }
    }
}

/// Exported recognition result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardRecord {
    #[serde(default)]
    pub image_file: Option<String>,
    pub board_size: u32,
    /// `[[left, top], [right, bottom]]` of the outermost grid lines.
    pub edges: [[f32; 2]; 2],
    /// Horizontal and vertical line spacing.
    pub spacing: [f32; 2],
    pub black: Vec<StoneRecord>,
    pub white: Vec<StoneRecord>,
}

impl BoardRecord {
    pub fn from_result(result: &RecognitionResult, image_file: Option<&Path>) -> Self {
        let g = &result.geometry;
        let stones = |color: StoneColor| {
            result
                .markers(color)
                .iter()
                .map(|m| StoneRecord::from_marker(m, g.board_size))
                .collect()
        };
        Self {
            image_file: image_file.map(|p| p.display().to_string()),
            board_size: g.board_size,
            edges: [[g.top_left.x, g.top_left.y], [g.bottom_right.x, g.bottom_right.y]],
            spacing: [g.spacing.x, g.spacing.y],
            black: stones(StoneColor::Black),
            white: stones(StoneColor::White),
        }
    }

    pub fn stones(&self, color: StoneColor) -> &[StoneRecord] {
        match color {
            StoneColor::Black => &self.black,
            StoneColor::White => &self.white,
        }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
