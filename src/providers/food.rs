use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// One dish and its price on each delivery platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub category: String,
    pub prices: BTreeMap<String, u32>,
}

impl FoodItem {
    pub fn new(name: &str, category: &str, prices: &[(&str, u32)]) -> Self {
        Self {
            name: name.to_owned(),
            category: category.to_owned(),
            prices: prices.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }
}

/// The collection written by `seed-food`.
pub fn sample_items() -> Vec<FoodItem> {
    vec![
        FoodItem::new("Pizza", "Fast Food", &[("swiggy", 240), ("zomato", 220), ("ubereats", 250)]),
        FoodItem::new("Burger", "Fast Food", &[("swiggy", 120), ("zomato", 100), ("ubereats", 130)]),
        FoodItem::new("Pasta", "Italian", &[("swiggy", 200), ("zomato", 210), ("ubereats", 205)]),
    ]
}

/// Food collection backed by a JSON file, held in memory.
#[derive(Debug, Clone)]
pub struct FoodStore {
    path: Option<PathBuf>,
    items: Arc<RwLock<Vec<FoodItem>>>,
}

impl FoodStore {
    /// Open the store at `path`. A missing file opens as an empty collection.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let items = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str::<Vec<FoodItem>>(&content)
                .map_err(|e| anyhow!("invalid food data in '{}': {}", path.display(), e))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "food data file not found, starting empty");
                Vec::new()
            }
            Err(e) => return Err(anyhow!("cannot read food data '{}': {}", path.display(), e)),
        };
        info!(path = %path.display(), items = items.len(), "food store opened");

        Ok(Self {
            path: Some(path),
            items: Arc::new(RwLock::new(items)),
        })
    }

    /// Store bound to `path` without reading it; the next `replace_all` overwrites the file.
    pub fn create(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            items: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Store without a backing file.
    pub fn in_memory(items: Vec<FoodItem>) -> Self {
        Self {
            path: None,
            items: Arc::new(RwLock::new(items)),
        }
    }

    pub async fn find_all(&self) -> Vec<FoodItem> {
        self.items.read().await.clone()
    }

    /// Case-insensitive exact match on the item name.
    pub async fn find_by_name(&self, name: &str) -> Option<FoodItem> {
        let wanted = name.to_lowercase();
        self.items
            .read()
            .await
            .iter()
            .find(|item| item.name.to_lowercase() == wanted)
            .cloned()
    }

    /// Replace the whole collection and persist it.
    pub async fn replace_all(&self, items: Vec<FoodItem>) -> Result<()> {
        let mut slot = self.items.write().await;
        if let Some(path) = &self.path {
            write_atomic(path, &serde_json::to_vec_pretty(&items)?).await?;
        }
        info!(items = items.len(), "food collection replaced");
        *slot = items;
        Ok(())
    }
}

// tmp -> rename keeps readers from seeing a half-written file
async fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, content).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
