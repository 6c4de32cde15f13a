use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::error::StorageError;

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
                key: dir.display().to_string(),
                source,
            })?;
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

fn io_err(key: &str) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl KeyValueStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(key)(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(io_err(key))?;
        fs::rename(&tmp, &path).map_err(io_err(key))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(key)(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn round_trips_through_disk() {
        let temp_dir = TempDir::new().unwrap();
        let kv = FileKv::new(temp_dir.path().join("store")).unwrap();

        assert_eq!(kv.get("libraryData").unwrap(), None);
        kv.set("libraryData", r#"{"items":[]}"#).unwrap();
        assert_eq!(
            kv.get("libraryData").unwrap().as_deref(),
            Some(r#"{"items":[]}"#)
        );
        assert!(temp_dir.path().join("store/libraryData.json").exists());

        kv.remove("libraryData").unwrap();
        kv.remove("libraryData").unwrap();
        assert_eq!(kv.get("libraryData").unwrap(), None);
    }

    #[test]
    fn sanitises_key_into_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let kv = FileKv::new(temp_dir.path()).unwrap();
        kv.set("../escape/me", "x").unwrap();
        assert!(temp_dir.path().join("___escape_me.json").exists());
    }
}
