//! One JSON document per entity in a directory.

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::store::DurableStore;

const EXTENSION: &str = "json";

/// Directory-backed [`DurableStore`] writing `<dir>/<id>.json`.
#[derive(Debug)]
pub struct JsonFileStore<T> {
    dir: PathBuf,
    _entity: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    /// Opens `dir`, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            _entity: PhantomData,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        validate_id(id)?;
        Ok(self.dir.join(format!("{}.{}", id, EXTENSION)))
    }
}

/// Ids become file names, so only `[A-Za-z0-9_-]` is allowed.
fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 128 {
        return Err(Error::validation("id", "must be 1 to 128 characters"));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::validation(
            "id",
            "may only contain letters, digits, '-' and '_'",
        ));
    }
    Ok(())
}

#[async_trait]
impl<T> DurableStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn save(&self, id: &str, entity: &T) -> Result<()> {
        let path = self.path_for(id)?;
        let body = serde_json::to_vec_pretty(entity)?;
        // Write aside then rename so readers never see a half-written document
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body).await?;
        if let Err(err) = fs::rename(&tmp, &path).await {
            if let Err(cleanup) = fs::remove_file(&tmp).await {
                warn!(path = %tmp.display(), error = %cleanup, "failed to remove temp document");
            }
            return Err(err.into());
        }
        debug!(path = %path.display(), "saved document");
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<T>> {
        let path = self.path_for(id)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let path = self.path_for(id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn list_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_id(stem).is_ok() {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}
