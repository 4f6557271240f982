//! Named pose store persisted as a JSON object.
//!
//! The file maps each pose name to an array of eight integer angles:
//!
//! ```json
//! {
//!   "stand": [90, 90, 90, 90, 90, 90, 90, 90],
//!   "sit": [150, 90, 150, 90, 30, 90, 30, 90]
//! }
//! ```
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};
use quadruped_link::Pose;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading, writing or renaming the pose file failed.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The pose file exists but is not a map of names to eight angles.
    #[error("Malformed pose file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoseStore {
    poses: BTreeMap<String, Pose>,
}

impl PoseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Pose> {
        self.poses.get(name)
    }

    /// Inserts or replaces `name`, returning the pose it replaced.
    pub fn set(&mut self, name: impl Into<String>, pose: Pose) -> Option<Pose> {
        self.poses.insert(name.into(), pose)
    }

    /// Returns the removed pose, `None` when `name` was not stored.
    pub fn delete(&mut self, name: &str) -> Option<Pose> {
        self.poses.remove(name)
    }

    /// Pose names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.poses.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Pose)> {
        self.poses.iter().map(|(name, pose)| (name.as_str(), pose))
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Loads the store from `path`.
    ///
    /// A missing file yields an empty store. Any other read failure, and any
    /// content that is not a JSON map of eight-angle arrays, is an error.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No pose file at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let store: Self = serde_json::from_str(&content).map_err(|source| StoreError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded {} poses from {}", store.len(), path.display());
        Ok(store)
    }

    /// Overwrites `path` with the whole store.
    ///
    /// The JSON is written to a temporary file next to `path` and renamed over
    /// it, so a failed write leaves the previous file intact.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        let io_error = |source: std::io::Error| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_error)?;
        }

        let json = serde_json::to_vec_pretty(self).map_err(|e| io_error(e.into()))?;
        let tmp = temp_path(path);
        fs::write(&tmp, json).map_err(io_error)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(io_error(e));
        }

        debug!("Saved {} poses to {}", self.len(), path.display());
        Ok(())
    }
}

/// Sibling of `path` used as the write target before the rename.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "poses".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_an_empty_store() {
        let dir = tempdir().unwrap();
        let store = PoseStore::load_from(&dir.path().join("absent.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn saved_pose_loads_back_identical() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("poses.json");
        let stand = Pose::new([90, 80, 90, 80, 90, 80, 90, 80]);

        let mut store = PoseStore::new();
        store.set("stand", stand);
        store.save_to(&path).unwrap();

        let loaded = PoseStore::load_from(&path).unwrap();
        assert_eq!(loaded.get("stand"), Some(&stand));
        assert_eq!(loaded, store);
    }

    #[test]
    fn absent_name_is_none() {
        let store = PoseStore::new();
        assert_eq!(store.get("jump"), None);
    }

    #[test]
    fn file_format_is_name_to_angle_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("poses.json");

        let mut store = PoseStore::new();
        store.set("b", Pose::splat(1));
        store.set("a", Pose::splat(2));
        store.save_to(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["a"], serde_json::json!([2, 2, 2, 2, 2, 2, 2, 2]));
        assert_eq!(value["b"].as_array().unwrap().len(), 8);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn save_overwrites_whole_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("poses.json");

        let mut store = PoseStore::new();
        store.set("old", Pose::default());
        store.save_to(&path).unwrap();

        store.delete("old");
        store.set("new", Pose::default());
        store.save_to(&path).unwrap();

        let loaded = PoseStore::load_from(&path).unwrap();
        assert_eq!(loaded.names().collect::<Vec<_>>(), vec!["new"]);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("robot").join("poses.json");

        PoseStore::new().save_to(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn malformed_file_fails_fast() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("poses.json");

        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            PoseStore::load_from(&path),
            Err(StoreError::Malformed { .. })
        ));

        fs::write(&path, r#"{"short": [1, 2, 3]}"#).unwrap();
        assert!(matches!(
            PoseStore::load_from(&path),
            Err(StoreError::Malformed { .. })
        ));
    }

    #[test]
    fn names_are_sorted() {
        let mut store = PoseStore::new();
        store.set("wave2", Pose::default());
        store.set("sit", Pose::default());
        store.set("wave1", Pose::default());
        assert_eq!(
            store.names().collect::<Vec<_>>(),
            vec!["sit", "wave1", "wave2"]
        );
    }
}
