//! Local filesystem job store.
//!
//! All ads live in one JSON document:
//!
//! ```text
//! {root}/
//! ├── config.toml
//! └── jobads.json           # { updated_at, count, ads: [...] }
//! ```
//!
//! Every write replaces the file atomically (temp file, then rename).
//! Read-modify-write cycles hold an async mutex so concurrent callers in one
//! process never lose each other's rows.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{Field, JobAd};
use crate::storage::{
    AdQuery, JobStore, LanguageUpdate, Recommendation, STORE_FILE, StoreData,
};

type Key = (String, String);

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    file_name: String,
    lock: Arc<Mutex<()>>,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self::with_file(root_dir, STORE_FILE)
    }

    /// Create a LocalStorage using a custom store file name.
    pub fn with_file(root_dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            file_name: file_name.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Full path of the store file.
    pub fn store_path(&self) -> PathBuf {
        self.path(&self.file_name)
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Load every stored ad. A missing file is an empty store.
    async fn load_ads(&self) -> Result<Vec<JobAd>> {
        match self.read_json::<StoreData>(&self.file_name).await? {
            Some(data) => Ok(data.ads),
            None => {
                log::debug!("No {} found, starting empty", self.file_name);
                Ok(Vec::new())
            }
        }
    }

    async fn save_ads(&self, ads: Vec<JobAd>) -> Result<()> {
        let data = StoreData::new(ads);
        self.write_json(&self.file_name, &data).await?;
        log::debug!("{} ads written to {}", data.count, self.file_name);
        Ok(())
    }

    /// Apply `update` to the stored row with each key; returns rows touched.
    async fn patch_rows<T>(
        &self,
        updates: &[T],
        key_of: impl Fn(&T) -> (&str, &str),
        mut update: impl FnMut(&mut JobAd, &T),
    ) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let mut ads = self.load_ads().await?;
        let positions = index_by_key(&ads);

        let mut touched = 0;
        for item in updates {
            let (site, id) = key_of(item);
            match positions.get(&(site.to_string(), id.to_string())) {
                Some(&pos) => {
                    update(&mut ads[pos], item);
                    touched += 1;
                }
                None => log::warn!("No stored ad for ({site}, {id}), update skipped"),
            }
        }

        if touched > 0 {
            self.save_ads(ads).await?;
        }
        Ok(touched)
    }
}

fn owned_key(ad: &JobAd) -> Option<Key> {
    ad.key()
        .map(|(site, id)| (site.to_string(), id.to_string()))
}

fn index_by_key(ads: &[JobAd]) -> HashMap<Key, usize> {
    ads.iter()
        .enumerate()
        .filter_map(|(pos, ad)| owned_key(ad).map(|key| (key, pos)))
        .collect()
}

#[async_trait]
impl JobStore for LocalStorage {
    async fn store_ads(&self, ads: &[JobAd]) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let mut stored = self.load_ads().await?;
        let mut keys: HashSet<Key> = stored.iter().filter_map(owned_key).collect();
        let today = Local::now().date_naive();

        let mut inserted = 0;
        for ad in ads {
            if !ad.all_fields_present(&Field::STORABLE) {
                log::warn!(
                    "Skipping ad without required columns (site {:?}, id {:?})",
                    ad.site,
                    ad.id
                );
                continue;
            }
            let Some(key) = owned_key(ad) else {
                continue;
            };
            if !keys.insert(key) {
                continue;
            }

            stored.push(JobAd {
                date: Some(today),
                language: None,
                relevant: None,
                recommendation: None,
                ..ad.clone()
            });
            inserted += 1;
        }

        if inserted > 0 {
            self.save_ads(stored).await?;
        }
        log::debug!("{} of {} ads were new", inserted, ads.len());
        Ok(inserted)
    }

    async fn update_ads(&self, ads: &[JobAd]) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let mut stored = self.load_ads().await?;
        let mut positions = index_by_key(&stored);

        let mut written = 0;
        for ad in ads {
            let Some(key) = owned_key(ad) else {
                log::warn!("Skipping update of ad without site and id");
                continue;
            };
            match positions.get(&key) {
                Some(&pos) => stored[pos] = ad.clone(),
                None => {
                    positions.insert(key, stored.len());
                    stored.push(ad.clone());
                }
            }
            written += 1;
        }

        if written > 0 {
            self.save_ads(stored).await?;
        }
        Ok(written)
    }

    async fn get_ads(&self, query: &AdQuery) -> Result<Vec<JobAd>> {
        let ads = self.load_ads().await?;
        Ok(ads.into_iter().filter(|ad| query.matches(ad)).collect())
    }

    async fn get_ad(&self, site: &str, id: &str) -> Result<Option<JobAd>> {
        let ads = self.load_ads().await?;
        Ok(ads
            .into_iter()
            .find(|ad| ad.key() == Some((site, id))))
    }

    async fn update_recommendations(&self, updates: &[Recommendation]) -> Result<usize> {
        self.patch_rows(
            updates,
            |u| (u.site.as_str(), u.id.as_str()),
            |ad, u| ad.recommendation = u.recommendation,
        )
        .await
    }

    async fn update_languages(&self, updates: &[LanguageUpdate]) -> Result<usize> {
        self.patch_rows(
            updates,
            |u| (u.site.as_str(), u.id.as_str()),
            |ad, u| ad.language = u.language,
        )
        .await
    }
}
