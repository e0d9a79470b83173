//! Saving and restoring overrides per design.
//!
//! A saved layout is a small versioned JSON record holding three association
//! lists. Anything that goes wrong while reading counts as "no saved layout".

use std::collections::HashMap;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ir::{ConnectionId, Point};
use crate::overrides::{Overrides, trim_trailing_zeros};

pub const LAYOUT_VERSION: u32 = 1;

static UNSAFE_KEY_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid key pattern"));

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("layout store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode saved layout: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Key-value storage for saved layouts.
pub trait LayoutStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save(&mut self, key: &str, contents: &str) -> Result<(), StoreError>;
}

pub fn layout_key(design_id: &str) -> String {
    format!("arch-layout:{design_id}")
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: &str, contents: &str) {
        self.entries.insert(key.to_string(), contents.to_string());
    }

    /// Number of successful saves so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl LayoutStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, contents: &str) -> Result<(), StoreError> {
        self.insert(key, contents);
        self.writes += 1;
        Ok(())
    }
}

/// One JSON file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let name = UNSAFE_KEY_CHARS.replace_all(key, "_");
        self.dir.join(format!("{name}.json"))
    }
}

impl LayoutStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, key: &str, contents: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), contents)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLayout {
    pub version: u32,
    #[serde(default)]
    pub block_overrides: Vec<(String, Point)>,
    #[serde(default)]
    pub point_overrides: Vec<(ConnectionId, Vec<Point>)>,
    #[serde(default)]
    pub waypoints: Vec<(ConnectionId, Vec<Point>)>,
}

impl SavedLayout {
    pub fn from_overrides(overrides: &Overrides) -> Self {
        Self {
            version: LAYOUT_VERSION,
            block_overrides: overrides
                .blocks
                .iter()
                .map(|(id, pos)| (id.clone(), *pos))
                .collect(),
            point_overrides: overrides
                .points
                .iter()
                .map(|(id, list)| (id.clone(), list.clone()))
                .collect(),
            waypoints: overrides
                .waypoints
                .iter()
                .map(|(id, list)| (id.clone(), list.clone()))
                .collect(),
        }
    }

    pub fn into_overrides(self) -> Overrides {
        Overrides {
            blocks: self.block_overrides.into_iter().collect(),
            points: self
                .point_overrides
                .into_iter()
                .map(|(id, mut list)| {
                    trim_trailing_zeros(&mut list);
                    (id, list)
                })
                .filter(|(_, list)| !list.is_empty())
                .collect(),
            waypoints: self
                .waypoints
                .into_iter()
                .filter(|(_, list)| !list.is_empty())
                .collect(),
        }
    }
}

/// Loads the overrides saved for `design_id`. Missing, unreadable and
/// corrupt records all yield empty overrides.
pub fn load_overrides<S: LayoutStore + ?Sized>(store: &S, design_id: &str) -> Overrides {
    let key = layout_key(design_id);
    let contents = match store.load(&key) {
        Ok(Some(contents)) => contents,
        Ok(None) => {
            log::debug!("no saved layout for {key}");
            return Overrides::new();
        }
        Err(err) => {
            log::warn!("failed to read saved layout {key}: {err}");
            return Overrides::new();
        }
    };
    match serde_json::from_str::<SavedLayout>(&contents) {
        Ok(saved) if saved.version == LAYOUT_VERSION => {
            log::info!(
                "loaded saved layout {key} ({} blocks, {} paths, {} waypoint lists)",
                saved.block_overrides.len(),
                saved.point_overrides.len(),
                saved.waypoints.len()
            );
            saved.into_overrides()
        }
        Ok(saved) => {
            log::warn!(
                "ignoring saved layout {key} with unsupported version {}",
                saved.version
            );
            Overrides::new()
        }
        Err(err) => {
            log::warn!("ignoring corrupt saved layout {key}: {err}");
            Overrides::new()
        }
    }
}

pub fn save_overrides<S: LayoutStore + ?Sized>(
    store: &mut S,
    design_id: &str,
    overrides: &Overrides,
) -> Result<(), StoreError> {
    let key = layout_key(design_id);
    let contents = serde_json::to_string(&SavedLayout::from_overrides(overrides))?;
    store.save(&key, &contents)?;
    log::info!("saved layout {key}");
    Ok(())
}
