use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PresetError, Result};
use crate::preset::{default_presets, parse_presets, Preset};

/// Ordered preset list persisted as pretty-printed JSON.
///
/// Names are unique. Every mutating call writes the file before returning.
#[derive(Debug)]
pub struct PresetStore {
    path: PathBuf,
    presets: Vec<Preset>,
}

impl PresetStore {
    /// Load presets from `path`.
    ///
    /// A missing file is seeded with [`default_presets`]. An unreadable or
    /// malformed file is logged and the defaults are used in memory.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        if !path.exists() {
            tracing::info!(path = %path.display(), "stations file not found, using defaults");
            let store = Self {
                path,
                presets: default_presets(),
            };
            if let Err(e) = store.save() {
                tracing::warn!(error = %e, "failed to write default stations");
            }
            return store;
        }

        let presets = match read_file(&path) {
            Ok(presets) => {
                tracing::info!(count = presets.len(), path = %path.display(), "loaded stations");
                presets
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "error loading stations, using defaults");
                default_presets()
            }
        };

        Self { path, presets }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Insert a preset, or replace the URI of the one with the same name in place
    pub fn add(&mut self, name: &str, uri: &str) -> Result<()> {
        match self.presets.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.uri = uri.to_string(),
            None => self.presets.push(Preset::new(name, uri)),
        }
        self.save()
    }

    /// Returns false when no preset had that name
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        self.remove_where(|p| p.name == name)
    }

    /// Returns false for an empty `names` list or when nothing matched
    pub fn remove_many<S: AsRef<str>>(&mut self, names: &[S]) -> Result<bool> {
        if names.is_empty() {
            return Ok(false);
        }
        let names: HashSet<&str> = names.iter().map(AsRef::as_ref).collect();
        self.remove_where(|p| names.contains(p.name.as_str()))
    }

    fn remove_where(&mut self, matches: impl Fn(&Preset) -> bool) -> Result<bool> {
        let before = self.presets.len();
        self.presets.retain(|p| !matches(p));

        if self.presets.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    pub fn replace_all(&mut self, presets: Vec<Preset>) -> Result<()> {
        self.presets = dedup_by_name(presets);
        self.save()
    }

    /// Append presets whose names are not present yet. Returns how many were added.
    pub fn merge(&mut self, presets: Vec<Preset>) -> Result<usize> {
        let mut known: HashSet<String> = self.presets.iter().map(|p| p.name.clone()).collect();
        let mut added = 0;

        for preset in presets {
            if known.insert(preset.name.clone()) {
                self.presets.push(preset);
                added += 1;
            }
        }

        self.save()?;
        Ok(added)
    }

    pub fn reset_to_defaults(&mut self) -> Result<()> {
        self.presets = default_presets();
        self.save()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.presets)?)
    }

    pub fn export_json(&self, path: impl AsRef<Path>) -> Result<()> {
        write_file(path.as_ref(), &self.to_json()?)
    }

    /// Load presets from another JSON file, replacing or merging.
    ///
    /// The file is validated before anything changes.
    pub fn import_json(&mut self, path: impl AsRef<Path>, replace: bool) -> Result<usize> {
        let imported = read_file(path.as_ref())?;
        let count = imported.len();

        if replace {
            self.replace_all(imported)?;
            Ok(count)
        } else {
            self.merge(imported)
        }
    }

    fn save(&self) -> Result<()> {
        write_file(&self.path, &self.to_json()?)?;
        tracing::debug!(count = self.presets.len(), path = %self.path.display(), "saved stations");
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<Vec<Preset>> {
    let text = fs::read_to_string(path).map_err(|source| PresetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_presets(&text)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    let io_err = |source| PresetError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)
}

fn dedup_by_name(presets: Vec<Preset>) -> Vec<Preset> {
    let mut seen = HashSet::new();
    presets
        .into_iter()
        .filter(|p| seen.insert(p.name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> PresetStore {
        PresetStore::open(dir.path().join("stations.json"))
    }

    #[test]
    fn test_missing_file_is_seeded_with_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.presets(), default_presets().as_slice());
        assert!(store.path().exists());
    }

    #[test]
    fn test_parent_directory_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/stations.json");
        let _store = PresetStore::open(&path);
        assert!(path.exists());
    }

    #[test]
    fn test_corrupt_file_falls_back_without_overwriting() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stations.json");
        fs::write(&path, "not json").unwrap();

        let store = PresetStore::open(&path);

        assert_eq!(store.presets(), default_presets().as_slice());
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
    }

    #[test]
    fn test_add_upserts_in_place() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.add("NPR", "http://npr/other").unwrap();
        store.add("KEXP", "http://kexp/live").unwrap();

        let names: Vec<_> = store.presets().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["NPR", "Classic FM", "KEXP"]);
        assert_eq!(store.get("NPR").unwrap().uri, "http://npr/other");
    }

    #[test]
    fn test_mutations_persist() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add("KEXP", "http://kexp/live").unwrap();
        store.remove("NPR").unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.presets(), store.presets());
    }

    #[test]
    fn test_remove_unknown_is_false() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        assert!(!store.remove("Nope").unwrap());
        assert!(store.remove("NPR").unwrap());
        assert!(store.get("NPR").is_none());
    }

    #[test]
    fn test_remove_many() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let none: [&str; 0] = [];
        assert!(!store.remove_many(&none).unwrap());
        assert!(!store.remove_many(&["X", "Y"]).unwrap());
        assert!(store.remove_many(&["NPR", "X"]).unwrap());
        assert_eq!(store.presets().len(), 1);
    }

    #[test]
    fn test_merge_appends_new_names_only() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let added = store
            .merge(vec![
                Preset::new("NPR", "http://changed"),
                Preset::new("KEXP", "http://kexp/live"),
                Preset::new("KEXP", "http://kexp/dup"),
            ])
            .unwrap();

        assert_eq!(added, 1);
        assert_eq!(store.get("NPR").unwrap().uri, "https://npr-ice.streamguys1.com/live.mp3");
        assert_eq!(store.get("KEXP").unwrap().uri, "http://kexp/live");
    }

    #[test]
    fn test_replace_all_and_reset() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store
            .replace_all(vec![Preset::new("Only", "http://only")])
            .unwrap();
        assert_eq!(store.presets().len(), 1);

        store.reset_to_defaults().unwrap();
        assert_eq!(store.presets(), default_presets().as_slice());
    }

    #[test]
    fn test_export_then_import_replace() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add("KEXP", "http://kexp/live").unwrap();

        let export = dir.path().join("export.json");
        store.export_json(&export).unwrap();

        let mut other = PresetStore::open(dir.path().join("other.json"));
        other.replace_all(Vec::new()).unwrap();
        let count = other.import_json(&export, true).unwrap();

        assert_eq!(count, 3);
        assert_eq!(other.presets(), store.presets());
    }

    #[test]
    fn test_invalid_import_leaves_store_untouched() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let bad = dir.path().join("bad.json");
        fs::write(&bad, r#"[{"name": "No URI"}]"#).unwrap();

        let err = store.import_json(&bad, true).unwrap_err();

        assert!(matches!(err, PresetError::InvalidFormat(_)));
        assert_eq!(store.presets(), default_presets().as_slice());
    }

    #[test]
    fn test_to_json_is_pretty_array() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let json = store.to_json().unwrap();

        assert!(json.starts_with("[\n"));
        assert!(json.contains(r#""name": "NPR""#));
    }
}
