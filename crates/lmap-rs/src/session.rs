// crates/lmap-rs/src/session.rs

//! File-backed editing of a single logical name map.

use crate::builder::{SaveOptions, save_lmap_to_string_with};
use crate::error::LmapError;
use crate::map::LogicalNameMap;
use crate::parser::load_lmap_from_slice;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// An open document together with the file it belongs to.
#[derive(Debug, Default)]
pub struct Session {
    path: Option<PathBuf>,
    map: LogicalNameMap,
    dirty: bool,
    options: SaveOptions,
}

impl Session {
    /// An empty, untitled document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the map stored at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LmapError> {
        let mut session = Self::new();
        session.load(path)?;
        Ok(session)
    }

    /// Replaces the open document with the file at `path`.
    ///
    /// If reading or parsing fails the current document, its path and its
    /// dirty flag are kept as they were.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), LmapError> {
        let path = path.as_ref();
        let map = fs::read(path)
            .map_err(LmapError::from)
            .and_then(|bytes| load_lmap_from_slice(&bytes))
            .inspect_err(|e| warn!("Failed to load {}: {}", path.display(), e))?;
        info!("Loaded {} ({} nodes)", path.display(), map.len());
        self.map = map;
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    /// Writes the document to its current path.
    pub fn save(&mut self) -> Result<(), LmapError> {
        let path = self.path.clone().ok_or(LmapError::NoFilePath)?;
        self.write_to(&path)
    }

    /// Writes the document to `path` and makes that its current path.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), LmapError> {
        let path = path.as_ref();
        self.write_to(path)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn write_to(&mut self, path: &Path) -> Result<(), LmapError> {
        let xml = save_lmap_to_string_with(&self.map, &self.options)?;
        fs::write(path, xml)?;
        debug!("Saved {}", path.display());
        self.dirty = false;
        Ok(())
    }

    /// Applies a group of edits as one step.
    ///
    /// When `f` fails the document is restored to its state before the call.
    /// When it succeeds the session is marked as modified.
    pub fn edit<T, F>(&mut self, f: F) -> Result<T, LmapError>
    where
        F: FnOnce(&mut LogicalNameMap) -> Result<T, LmapError>,
    {
        let snapshot = self.map.clone();
        match f(&mut self.map) {
            Ok(value) => {
                self.dirty = true;
                Ok(value)
            }
            Err(e) => {
                self.map = snapshot;
                Err(e)
            }
        }
    }

    pub fn map(&self) -> &LogicalNameMap {
        &self.map
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn options(&self) -> &SaveOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: SaveOptions) {
        self.options = options;
    }

    /// A display title: `"file.xlmap (/some/dir)"` or `"untitled"`, with a
    /// trailing `*` while there are unsaved changes.
    pub fn title(&self) -> String {
        let mut title = match &self.path {
            Some(path) => {
                let file = path
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let dir = match path.parent() {
                    Some(d) if !d.as_os_str().is_empty() => d.display().to_string(),
                    _ => String::from("."),
                };
                format!("{} ({})", file, dir)
            }
            None => String::from("untitled"),
        };
        if self.dirty {
            title.push('*');
        }
        title
    }
}
