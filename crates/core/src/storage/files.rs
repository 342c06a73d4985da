//! Session-scoped tier: one file per key in a directory
//!
//! File names are the URL-safe base64 of the key, so any key maps to a
//! valid name and `clear` can tell its own files apart from strangers.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use super::traits::{StorageTier, TierKind};
use crate::error::Result;

const EXTENSION: &str = "kv";

pub struct FileTier {
    dir: PathBuf,
}

impl FileTier {
    /// Use (and create) the given directory
    pub fn open(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name = URL_SAFE_NO_PAD.encode(key.as_bytes());
        self.dir.join(format!("{}.{}", name, EXTENSION))
    }
}

impl StorageTier for FileTier {
    fn kind(&self) -> TierKind {
        TierKind::Session
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        // Write then rename so a crash never leaves a half-written value
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<()> {
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(EXTENSION) {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}
