//! Status of a directory of board photographs and their sidecars.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use crate::io::{board_path_for, params_path_for, IoError};

/// Image extensions picked up by [`scan_dataset`].
pub const IMAGE_EXTENSIONS: [&str; 2] = ["png", "jpg"];

/// State of one derived file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    Missing,
    Present,
    /// Older than the file it was derived from.
    Stale,
}

impl FileState {
    pub fn symbol(self) -> char {
        match self {
            FileState::Missing => '-',
            FileState::Present => '+',
            FileState::Stale => '<',
        }
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatasetEntry {
    pub image: PathBuf,
    pub params: FileState,
    pub board: FileState,
}

impl DatasetEntry {
    pub fn file_name(&self) -> String {
        self.image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// List the images of `dir` with the state of their sidecars.
///
/// Entries are ordered by the first number in the file name (names without
/// a number sort as 0), then by name. A sidecar is stale when it is older
/// than the previous file of the chain image → parameters → board record.
pub fn scan_dataset(dir: impl AsRef<Path>) -> Result<Vec<DatasetEntry>, IoError> {
    let mut entries = Vec::new();
    for item in fs::read_dir(dir)? {
        let path = item?.path();
        if !path.is_file() || !has_image_extension(&path) {
            continue;
        }
        entries.push(entry_for(path)?);
    }
    entries.sort_by(|a, b| {
        let (na, nb) = (a.file_name(), b.file_name());
        first_number(&na).cmp(&first_number(&nb)).then(na.cmp(&nb))
    });
    log::debug!("dataset: {} images", entries.len());
    Ok(entries)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e))
}

fn entry_for(image: PathBuf) -> Result<DatasetEntry, IoError> {
    let mut prev = fs::metadata(&image)?.modified()?;
    let mut states = [FileState::Missing; 2];
    for (state, sidecar) in states
        .iter_mut()
        .zip([params_path_for(&image), board_path_for(&image)])
    {
        let Some(mtime) = modified(&sidecar)? else {
            continue;
        };
        *state = if mtime < prev {
            FileState::Stale
        } else {
            FileState::Present
        };
        prev = mtime;
    }
    Ok(DatasetEntry {
        image,
        params: states[0],
        board: states[1],
    })
}

fn modified(path: &Path) -> Result<Option<SystemTime>, IoError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(Some(meta.modified()?)),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn first_number(name: &str) -> u64 {
    name.chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .fold(0u64, |acc, c| {
            acc.saturating_mul(10)
                .saturating_add(u64::from(c as u8 - b'0'))
        })
}
