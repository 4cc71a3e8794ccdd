use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use blockfall_engine::HighScoreStore;

use crate::util;

/// High-score store backed by a JSON object file.
///
/// The whole map is rewritten on every `set`. The storage trait has no way to
/// report failures, so the first write error is kept and handed out by
/// [`JsonFileStore::finish`].
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, u64>,
    error: Option<anyhow::Error>,
}

impl JsonFileStore {
    /// Loads the store at `path`; a missing file is an empty store.
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            util::read_json_file("high score", &path)?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            values,
            error: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes `key` and writes the file.
    pub fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.values.remove(key);
        self.save()
    }

    /// Returns the first write error, if any happened.
    pub fn finish(self) -> anyhow::Result<()> {
        self.error.map_or(Ok(()), Err)
    }

    fn save(&self) -> anyhow::Result<()> {
        util::write_json_file("high score", &self.path, &self.values)
    }
}

impl HighScoreStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<u64> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: u64) {
        self.values.insert(key.to_owned(), value);
        if let Err(e) = self.save()
            && self.error.is_none()
        {
            self.error = Some(e);
        }
    }
}
