//! Memory manager: tagged free-text notes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use crate::cache::{CacheConfig, CacheStats};
use crate::error::{Error, Result};
use crate::manager::{next_id, required_block, MAX_CONTENT_LENGTH};
use crate::store::{DurableStore, EntityStore};
use crate::task::IdKey;

const MAX_TAGS: usize = 32;
const MAX_TAG_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewMemory {
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryUpdate {
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Lower-cases, trims and de-duplicates tags.
fn normalize_tags(tags: Vec<String>) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            continue;
        }
        if tag.chars().count() > MAX_TAG_LENGTH || tag.chars().any(char::is_control) {
            return Err(Error::validation(
                "tags",
                format!("tag '{}' is not allowed", tag),
            ));
        }
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    if out.len() > MAX_TAGS {
        return Err(Error::validation(
            "tags",
            format!("at most {} tags", MAX_TAGS),
        ));
    }
    Ok(out)
}

pub struct MemoryManager {
    store: EntityStore<Memory>,
    write_lock: Mutex<()>,
}

impl MemoryManager {
    pub fn new(durable: Arc<dyn DurableStore<Memory>>, cache: CacheConfig) -> Result<Self> {
        Ok(Self {
            store: EntityStore::new("memory", durable, cache)?,
            write_lock: Mutex::new(()),
        })
    }

    pub async fn create(&self, input: NewMemory) -> Result<Memory> {
        let content = required_block("content", &input.content, MAX_CONTENT_LENGTH)?;
        let tags = normalize_tags(input.tags)?;

        let _guard = self.write_lock.lock().await;
        let ids = self.store.list_ids().await?;
        let now = Utc::now();
        let memory = Memory {
            id: next_id(ids.iter().map(String::as_str))?,
            content,
            tags,
            created_at: now,
            updated_at: now,
        };
        self.store.save(&memory.id, &memory).await?;
        info!(memory_id = %memory.id, "memory created");
        Ok(memory)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Memory>> {
        self.store.load(id).await
    }

    pub async fn update(&self, id: &str, update: MemoryUpdate) -> Result<Memory> {
        let content = update
            .content
            .as_deref()
            .map(|c| required_block("content", c, MAX_CONTENT_LENGTH))
            .transpose()?;
        let tags = update.tags.map(normalize_tags).transpose()?;

        let _guard = self.write_lock.lock().await;
        let mut memory = self.store.require(id).await?;
        if let Some(content) = content {
            memory.content = content;
        }
        if let Some(tags) = tags {
            memory.tags = tags;
        }
        memory.updated_at = Utc::now();
        self.store.save(&memory.id, &memory).await?;
        Ok(memory)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        self.store.delete(id).await
    }

    /// All memories in id order, optionally only those carrying `tag`.
    pub async fn list(&self, tag: Option<&str>) -> Result<Vec<Memory>> {
        let tag = tag.map(|t| t.trim().to_lowercase());
        let mut all = self.store.load_all().await?;
        all.retain(|m| tag.as_ref().map_or(true, |t| m.tags.contains(t)));
        all.sort_by(|a, b| IdKey::new(&a.id).cmp(&IdKey::new(&b.id)));
        Ok(all)
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.store.stats().await
    }
}
