//! [`CheckpointStore`]: TSV-backed save/load/clean for per-agent augmented
//! state, keyed by `(type, outer, inner)` — spec.md §4.7/§6, grounded in
//! `original_source/src/checkpoint/Checkpoint.cxx`.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{CheckpointError, CheckpointResult};

const FILE_PREFIX: &str = "checkpoint_";
const FILE_SUFFIX: &str = ".tsv";

/// A directory of `checkpoint_<type>_<outer>_<inner>.tsv` files, one per
/// completed inner step of one agent type.
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// Open (creating if absent) the checkpoint directory. Mirrors the
    /// original's constructor behaviour of failing hard when the directory
    /// cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> CheckpointResult<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .map_err(|source| CheckpointError::CreateDir { path: dir.display().to_string(), source })?;
        }
        Ok(Self { dir })
    }

    fn path_for(&self, type_name: &str, outer: u32, inner: u32) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{type_name}_{outer}_{inner}{FILE_SUFFIX}"))
    }

    /// Write `node_names[i] -> node_values[i]` as `nodeName\tnodeValue` rows
    /// under a `checkpoint_<type>_<outer>_<inner>.tsv` file. Body is the
    /// agent's full `inputAugmented`, in augmented-graph node order.
    pub fn save(
        &self,
        type_name: &str,
        outer: u32,
        inner: u32,
        node_names: &[String],
        node_values: &[f64],
    ) -> CheckpointResult<()> {
        let path = self.path_for(type_name, outer, inner);
        let mut file =
            File::create(&path).map_err(|source| CheckpointError::OpenFile { path: path.display().to_string(), source })?;
        writeln!(file, "nodeName\tnodeValue")
            .map_err(|source| CheckpointError::OpenFile { path: path.display().to_string(), source })?;
        for (name, value) in node_names.iter().zip(node_values) {
            writeln!(file, "{name}\t{value}")
                .map_err(|source| CheckpointError::OpenFile { path: path.display().to_string(), source })?;
        }
        Ok(())
    }

    /// Parse `checkpoint_<type>_<outer>_<inner>.tsv` into `(type, outer,
    /// inner)`. Splits on `_` and takes the last two fields as the
    /// iteration indices so agent type names may themselves contain `_`.
    fn parse_filename(file_name: &str) -> Option<(String, u32, u32)> {
        let stem = file_name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
        let parts: Vec<&str> = stem.split('_').collect();
        if parts.len() < 3 {
            return None;
        }
        let inner: u32 = parts[parts.len() - 1].parse().ok()?;
        let outer: u32 = parts[parts.len() - 2].parse().ok()?;
        let type_name = parts[..parts.len() - 2].join("_");
        Some((type_name, outer, inner))
    }

    fn checkpoints_for_type(&self, type_name: &str) -> CheckpointResult<Vec<(PathBuf, u32, u32)>> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|source| CheckpointError::ReadDir { path: self.dir.display().to_string(), source })?;
        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| CheckpointError::ReadDir { path: self.dir.display().to_string(), source })?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some((found_type, outer, inner)) = Self::parse_filename(name) {
                if found_type == type_name {
                    found.push((entry.path(), outer, inner));
                }
            }
        }
        Ok(found)
    }

    /// Restore the most recently completed `(outer, inner)` checkpoint for
    /// `type_name` — the tuple with the greatest `(outer, inner)` ordering,
    /// not merely the first match found, so resume always picks up the
    /// latest successful step.
    pub fn load_latest(&self, type_name: &str) -> CheckpointResult<(u32, u32, Vec<(String, f64)>)> {
        let mut candidates = self.checkpoints_for_type(type_name)?;
        candidates.sort_by_key(|(_, outer, inner)| (*outer, *inner));
        let (path, outer, inner) = candidates.into_iter().last().ok_or_else(|| CheckpointError::NotFound(type_name.to_string()))?;
        let rows = Self::read_rows(&path)?;
        Ok((outer, inner, rows))
    }

    fn read_rows(path: &Path) -> CheckpointResult<Vec<(String, f64)>> {
        let file = File::open(path).map_err(|source| CheckpointError::OpenFile { path: path.display().to_string(), source })?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        lines.next(); // header

        let mut rows = Vec::new();
        for line in lines {
            let line = line.map_err(|source| CheckpointError::OpenFile { path: path.display().to_string(), source })?;
            if line.is_empty() {
                continue;
            }
            let mut fields = line.splitn(2, '\t');
            let (Some(name), Some(value_str)) = (fields.next(), fields.next()) else {
                warn!(row = %line, "skipping malformed checkpoint row");
                continue;
            };
            match value_str.trim().parse::<f64>() {
                Ok(value) => rows.push((name.to_string(), value)),
                Err(_) => warn!(row = %line, "skipping malformed checkpoint row"),
            }
        }
        Ok(rows)
    }

    /// Delete every checkpoint file for `type_name`.
    pub fn clean(&self, type_name: &str) -> CheckpointResult<()> {
        for (path, _, _) in self.checkpoints_for_type(type_name)? {
            fs::remove_file(&path).map_err(|source| CheckpointError::Delete { path: path.display().to_string(), source })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pert-checkpoint-test-{label}-{}", std::process::id()))
    }

    #[test]
    fn save_then_load_round_trips_values() {
        let dir = scratch_dir("roundtrip");
        let store = CheckpointStore::new(&dir).unwrap();
        let names = vec!["a".to_string(), "b".to_string()];
        let values = vec![1.5, -2.25];
        store.save("Human", 2, 1, &names, &values).unwrap();

        let (outer, inner, rows) = store.load_latest("Human").unwrap();
        assert_eq!((outer, inner), (2, 1));
        assert_eq!(rows, vec![("a".to_string(), 1.5), ("b".to_string(), -2.25)]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_latest_picks_greatest_outer_inner() {
        let dir = scratch_dir("latest");
        let store = CheckpointStore::new(&dir).unwrap();
        let names = vec!["a".to_string()];
        store.save("Human", 0, 0, &names, &[1.0]).unwrap();
        store.save("Human", 2, 1, &names, &[2.0]).unwrap();
        store.save("Human", 1, 5, &names, &[3.0]).unwrap();

        let (outer, inner, rows) = store.load_latest("Human").unwrap();
        assert_eq!((outer, inner), (2, 1));
        assert_eq!(rows[0].1, 2.0);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_latest_missing_type_errors() {
        let dir = scratch_dir("missing");
        let store = CheckpointStore::new(&dir).unwrap();
        assert!(store.load_latest("Nobody").is_err());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn clean_removes_only_matching_type() {
        let dir = scratch_dir("clean");
        let store = CheckpointStore::new(&dir).unwrap();
        let names = vec!["a".to_string()];
        store.save("Human", 0, 0, &names, &[1.0]).unwrap();
        store.save("Mosquito", 0, 0, &names, &[1.0]).unwrap();
        store.clean("Human").unwrap();
        assert!(store.load_latest("Human").is_err());
        assert!(store.load_latest("Mosquito").is_ok());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn type_name_with_underscore_is_parsed_correctly() {
        let dir = scratch_dir("underscore");
        let store = CheckpointStore::new(&dir).unwrap();
        let names = vec!["a".to_string()];
        store.save("Type_With_Underscore", 3, 4, &names, &[9.0]).unwrap();
        let (outer, inner, _) = store.load_latest("Type_With_Underscore").unwrap();
        assert_eq!((outer, inner), (3, 4));
        fs::remove_dir_all(&dir).ok();
    }
}
