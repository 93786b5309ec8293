// Sticky notes persistence: one JSON file holding the whole collection.
// Every mutation saves the complete array and every load reads it back
// whole, so the file is always one consistent snapshot of the board.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_NOTE_X: i32 = 100;
pub const DEFAULT_NOTE_Y: i32 = 100;
pub const DEFAULT_NOTE_TEXT: &str = "New note...";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    pub x: i32,
    pub y: i32,
}

impl Note {
    /// A fresh note at the default spot.
    pub fn fresh() -> Self {
        Self {
            text: DEFAULT_NOTE_TEXT.into(),
            x: DEFAULT_NOTE_X,
            y: DEFAULT_NOTE_Y,
        }
    }
}

/// Loads and saves the whole collection at one path.
pub struct NoteStore {
    path: PathBuf,
}

impl NoteStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The per-user location: `<data dir>/loupe/notes.json`.
    pub fn default_path() -> Result<PathBuf, Error> {
        let base = dirs::data_dir().ok_or_else(|| {
            Error::Storage(io::Error::new(
                io::ErrorKind::NotFound,
                "no user data directory",
            ))
        })?;
        Ok(base.join("loupe").join("notes.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file reads as an empty board.
    pub fn load(&self) -> Result<Vec<Note>, Error> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Serialize the complete current collection, creating the directory
    /// on first save.
    pub fn save(&self, notes: &[Note]) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(notes)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Wipe the board: persist an empty collection.
    pub fn clear(&self) -> Result<(), Error> {
        self.save(&[])
    }
}
