use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rand::Rng;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::model::config::Config;
use crate::model::mind_map::MindMap;
use crate::model::node::timestamp;
use crate::ops::defaults::default_mind_map;

/// Storage key; the snapshot lives in `<key>.json`
pub const STORAGE_KEY: &str = "100stars_v2";

/// Error type for snapshot persistence
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not create data directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not remove {path}: {source}")]
    RemoveError { path: PathBuf, source: io::Error },
    #[error("could not encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Where the data directory is: `--dir` (or `$STARS_DIR`, which clap folds
/// into the flag), then `$XDG_DATA_HOME/stars`, then `~/.local/share/stars`.
pub fn resolve_data_dir(flag: Option<&str>) -> PathBuf {
    if let Some(dir) = flag.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    let data_home = std::env::var("XDG_DATA_HOME")
        .ok()
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".local").join("share"));
    data_home.join("stars")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// A map read from disk, or freshly generated because nothing usable was there
#[derive(Debug, Clone)]
pub struct Loaded {
    pub map: MindMap,
    /// True when the defaults were generated on this load
    pub fresh: bool,
}

/// The persistence gateway: one snapshot file in a data directory.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Open (creating if needed) the data directory
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|e| StoreError::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(Store {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", STORAGE_KEY))
    }

    /// Read the snapshot. Missing or unusable data gives `None`; the
    /// caller regenerates defaults.
    pub fn load(&self) -> Option<MindMap> {
        let path = self.snapshot_path();
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<MindMap>(&content) {
            Ok(mut map) => {
                // A hand-edited scale of 0 would make screen_to_world divide by zero
                map.view.set_zoom(map.view.scale);
                info!(path = %path.display(), nodes = map.nodes.len(), "loaded snapshot");
                Some(map)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "discarding unreadable snapshot");
                None
            }
        }
    }

    /// Load, or generate and save the default map
    pub fn load_or_init<R: Rng + ?Sized>(
        &self,
        config: &Config,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<Loaded, StoreError> {
        if let Some(map) = self.load() {
            return Ok(Loaded { map, fresh: false });
        }
        let mut map = default_mind_map(&config.map.categories, rng, now);
        self.save(&mut map, now)?;
        Ok(Loaded { map, fresh: true })
    }

    /// Stamp `updatedAt` and write the snapshot atomically
    pub fn save(&self, map: &mut MindMap, now: DateTime<Utc>) -> Result<(), StoreError> {
        map.updated_at = timestamp(now);
        let content = serde_json::to_string_pretty(map)?;
        let path = self.snapshot_path();
        atomic_write(&path, content.as_bytes()).map_err(|e| StoreError::WriteError {
            path: path.clone(),
            source: e,
        })?;
        info!(path = %path.display(), nodes = map.nodes.len(), "saved snapshot");
        Ok(())
    }

    /// Delete the snapshot. A missing file is not an error.
    pub fn clear(&self) -> Result<(), StoreError> {
        let path = self.snapshot_path();
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "cleared snapshot");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::RemoveError { path, source: e }),
        }
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::Node;
    use crate::model::view::{MAX_SCALE, MIN_SCALE};
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 5, 5, 5, 5).unwrap()
    }

    #[test]
    fn first_load_generates_and_saves_defaults() {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let loaded = store.load_or_init(&Config::default(), &mut rng, now()).unwrap();
        assert!(loaded.fresh);
        assert_eq!(loaded.map.nodes.len(), 9);
        assert!(store.snapshot_path().exists());

        let again = store.load_or_init(&Config::default(), &mut rng, now()).unwrap();
        assert!(!again.fresh);
        assert_eq!(again.map, loaded.map);
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let mut map = default_mind_map(&Config::default().map.categories, &mut rng, now());
        let mut odd = Node::star("s_odd".into(), "Odd \"one\", with\nbreaks", "nowhere", 1.25, -3.5, now());
        odd.priority = 17;
        odd.completed = true;
        map.nodes.insert(odd);
        map.view.scale = 1.7;
        map.view.ox = -12.25;
        map.view.oy = 99.0;

        store.save(&mut map, now()).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, map);
        assert_eq!(loaded.updated_at, "2025-05-05T05:05:05.000Z");
        let ids: Vec<&str> = loaded.nodes.ids().collect();
        let expected: Vec<&str> = map.nodes.ids().collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn malformed_snapshot_is_discarded() {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        fs::write(store.snapshot_path(), "{ not json").unwrap();
        assert!(store.load().is_none());

        fs::write(store.snapshot_path(), r#"{"nodes": []}"#).unwrap();
        assert!(store.load().is_none());

        let mut rng = StdRng::seed_from_u64(5);
        let loaded = store.load_or_init(&Config::default(), &mut rng, now()).unwrap();
        assert!(loaded.fresh);
        assert!(store.load().is_some());
    }

    #[test]
    fn loads_original_snapshot_shape() {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        fs::write(
            store.snapshot_path(),
            r#"{
  "nodes": [
    {"id":"s_me","title":"Me","notes":"","priority":3,"parentId":null,"x":0,"y":0,
     "lockedTitle":true,"isMe":true,"isCategory":false,
     "createdAt":"2024-12-01T10:00:00.000Z","updatedAt":"2024-12-01T10:00:00.000Z"},
    {"id":"s_cat","title":"Work","parentId":"s_me","x":120.5,"y":-40,"priority":1,
     "lockedTitle":true,"completed":false,"isMe":false,"isCategory":true}
  ],
  "view": {"scale": 1.1, "ox": 400, "oy": 300},
  "updatedAt": "2024-12-01T10:00:00.000Z"
}"#,
        )
        .unwrap();
        let map = store.load().unwrap();
        assert_eq!(map.nodes.len(), 2);
        let me = map.nodes.root().unwrap();
        assert!(!me.completed);
        assert_eq!(map.view.scale, 1.1);
        assert_eq!(map.view.ox, 400.0);
    }

    #[test]
    fn clear_removes_snapshot() {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        store.clear().unwrap();
        fs::write(store.snapshot_path(), "{}").unwrap();
        store.clear().unwrap();
        assert!(!store.snapshot_path().exists());
    }

    #[test]
    fn stored_scale_is_clamped_on_load() {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        fs::write(
            store.snapshot_path(),
            r#"{"nodes":[],"view":{"scale":0,"ox":10,"oy":20}}"#,
        )
        .unwrap();
        let map = store.load().unwrap();
        assert_eq!(map.view.scale, MIN_SCALE);
        assert_eq!((map.view.ox, map.view.oy), (10.0, 20.0));

        fs::write(store.snapshot_path(), r#"{"nodes":[],"view":{"scale":40}}"#).unwrap();
        assert_eq!(store.load().unwrap().view.scale, MAX_SCALE);
    }

    #[test]
    fn data_dir_flag_wins() {
        assert_eq!(resolve_data_dir(Some("/tmp/elsewhere")), PathBuf::from("/tmp/elsewhere"));
    }
}
