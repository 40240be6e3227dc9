use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{Persistence, StoreError};

/// Stores each collection as `<data_dir>/<name>.json`.
///
/// Replacement writes a sibling temporary file, syncs it, and renames it over
/// the original, so a crash mid-write leaves the previous contents intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if necessary.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            collection: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }
}

impl Persistence for JsonFileStore {
    fn read(&self, collection: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path(collection)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                collection: collection.to_string(),
                source,
            }),
        }
    }

    fn replace(&self, collection: &str, contents: &[u8]) -> Result<(), StoreError> {
        let path = self.path(collection);
        let tmp_path = path.with_extension("json.tmp");
        let write = || -> std::io::Result<()> {
            let mut file = File::create(&tmp_path)?;
            file.write_all(contents)?;
            file.sync_all()?;
            fs::rename(&tmp_path, &path)
        };
        write().map_err(|source| {
            error!("Failed to replace collection {collection} at {}", path.display());
            StoreError::Io {
                collection: collection.to_string(),
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(store.read("ballots").unwrap(), None);
    }

    #[test]
    fn replace_overwrites_and_leaves_no_temporary() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("nested")).unwrap();

        store.replace("ballots", b"[1]").unwrap();
        store.replace("ballots", b"[1, 2]").unwrap();

        assert_eq!(store.read("ballots").unwrap(), Some(b"[1, 2]".to_vec()));
        assert!(store.dir().join("ballots.json").exists());
        assert!(!store.dir().join("ballots.json.tmp").exists());
    }
}
