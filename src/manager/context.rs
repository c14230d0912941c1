//! Context manager: named context documents.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use crate::cache::{CacheConfig, CacheStats};
use crate::error::Result;
use crate::manager::{
    next_id, optional_text, required_text, MAX_CONTENT_LENGTH, MAX_TITLE_LENGTH,
};
use crate::store::{DurableStore, EntityStore};
use crate::task::IdKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewContext {
    pub name: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContextUpdate {
    pub name: Option<String>,
    pub content: Option<String>,
}

pub struct ContextManager {
    store: EntityStore<ContextEntry>,
    write_lock: Mutex<()>,
}

impl ContextManager {
    pub fn new(durable: Arc<dyn DurableStore<ContextEntry>>, cache: CacheConfig) -> Result<Self> {
        Ok(Self {
            store: EntityStore::new("context", durable, cache)?,
            write_lock: Mutex::new(()),
        })
    }

    pub async fn create(&self, input: NewContext) -> Result<ContextEntry> {
        let name = required_text("name", &input.name, MAX_TITLE_LENGTH)?;
        let content = optional_text("content", &input.content, MAX_CONTENT_LENGTH)?;

        let _guard = self.write_lock.lock().await;
        let ids = self.store.list_ids().await?;
        let now = Utc::now();
        let entry = ContextEntry {
            id: next_id(ids.iter().map(String::as_str))?,
            name,
            content,
            created_at: now,
            updated_at: now,
        };
        self.store.save(&entry.id, &entry).await?;
        info!(context_id = %entry.id, name = %entry.name, "context created");
        Ok(entry)
    }

    pub async fn get(&self, id: &str) -> Result<Option<ContextEntry>> {
        self.store.load(id).await
    }

    pub async fn update(&self, id: &str, update: ContextUpdate) -> Result<ContextEntry> {
        let name = update
            .name
            .as_deref()
            .map(|n| required_text("name", n, MAX_TITLE_LENGTH))
            .transpose()?;
        let content = update
            .content
            .as_deref()
            .map(|c| optional_text("content", c, MAX_CONTENT_LENGTH))
            .transpose()?;

        let _guard = self.write_lock.lock().await;
        let mut entry = self.store.require(id).await?;
        if let Some(name) = name {
            entry.name = name;
        }
        if let Some(content) = content {
            entry.content = content;
        }
        entry.updated_at = Utc::now();
        self.store.save(&entry.id, &entry).await?;
        Ok(entry)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        self.store.delete(id).await
    }

    pub async fn list(&self) -> Result<Vec<ContextEntry>> {
        let mut all = self.store.load_all().await?;
        all.sort_by(|a, b| IdKey::new(&a.id).cmp(&IdKey::new(&b.id)));
        Ok(all)
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.store.stats().await
    }
}
