use std::{collections::HashMap, hash::Hash, path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};
use tracing::debug;

use crate::errors::ServiceError;

/// Generic JSON file-backed map store.
///
/// Keeps a `HashMap<K, V>` in memory and writes the whole map back to disk
/// after every mutation. Writes go to a sibling `.tmp` file that is renamed
/// over the target, so a crash mid-write leaves the previous snapshot intact.
pub struct JsonMapStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone + Send + Sync,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone + Send + Sync,
{
    /// Open the store at `path`, creating an empty file if missing.
    /// A file that exists but does not parse is an error rather than silently reset.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(ServiceError::db)?;
            }
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::Db(format!("corrupt store file {}: {e}", file_path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty: HashMap<K, V> = HashMap::new();
                write_atomic(&file_path, &empty).await?;
                empty
            }
            Err(e) => return Err(ServiceError::db(e)),
        };
        debug!(path = %file_path.display(), entries = map.len(), "json map store opened");

        Ok(Arc::new(Self { inner: RwLock::new(map), file_path }))
    }

    /// Snapshot of every value.
    pub async fn values(&self) -> Vec<V> {
        let map = self.inner.read().await;
        map.values().cloned().collect()
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Insert or replace a value and persist.
    ///
    /// If the write fails the map is restored, so memory never holds a value
    /// the file does not.
    pub async fn insert(&self, key: K, value: V) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        let previous = map.insert(key.clone(), value);
        if let Err(e) = write_atomic(&self.file_path, &*map).await {
            match previous {
                Some(p) => { map.insert(key, p); }
                None => { map.remove(&key); }
            }
            return Err(e);
        }
        Ok(())
    }

    /// Mutate the value under `key` if `f` accepts it, then persist.
    ///
    /// `f` returns `false` to leave the entry untouched (nothing is written).
    /// Returns the updated value, or `None` when the key is absent or rejected.
    pub async fn modify<F>(&self, key: &K, f: F) -> Result<Option<V>, ServiceError>
    where
        F: FnOnce(&mut V) -> bool,
    {
        let mut map = self.inner.write().await;
        let Some(v) = map.get_mut(key) else { return Ok(None) };
        let original = v.clone();
        if !f(v) {
            *v = original;
            return Ok(None);
        }
        let updated = v.clone();
        if let Err(e) = write_atomic(&self.file_path, &*map).await {
            map.insert(key.clone(), original);
            return Err(e);
        }
        Ok(Some(updated))
    }

    /// Remove the entry under `key` when `pred` holds, then persist.
    pub async fn remove_if<F>(&self, key: &K, pred: F) -> Result<Option<V>, ServiceError>
    where
        F: FnOnce(&V) -> bool,
    {
        let mut map = self.inner.write().await;
        if !map.get(key).is_some_and(pred) {
            return Ok(None);
        }
        let Some(removed) = map.remove(key) else { return Ok(None) };
        if let Err(e) = write_atomic(&self.file_path, &*map).await {
            map.insert(key.clone(), removed);
            return Err(e);
        }
        Ok(Some(removed))
    }
}

async fn write_atomic<T: serde::Serialize>(path: &PathBuf, value: &T) -> Result<(), ServiceError> {
    let data = serde_json::to_vec(value).map_err(ServiceError::db)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data).await.map_err(ServiceError::db)?;
    fs::rename(&tmp, path).await.map_err(ServiceError::db)?;
    Ok(())
}
