use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fd_lock::RwLock;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::debug;

use super::StoreError;

/// On-disk form of one collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CollectionFile<K: Ord, V> {
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
    /// Last sequence number handed out (auto-increment collections only).
    #[serde(default)]
    pub last_seq: u64,
    #[serde(default = "BTreeMap::new")]
    pub records: BTreeMap<K, V>,
}

impl<K: Ord, V> Default for CollectionFile<K, V> {
    fn default() -> Self {
        Self {
            saved_at: None,
            last_seq: 0,
            records: BTreeMap::new(),
        }
    }
}

/// A JSON-file backed collection with a single writer at a time.
///
/// Writers inside one process queue on an async mutex. Writers in different
/// processes (or separate `LocalStore`s on the same directory) queue on an
/// exclusive lock of `<name>.lock`, held from load until the new file has
/// been renamed into place. Readers take no lock; they always see the last
/// committed file.
pub(crate) struct Collection<K, V> {
    name: &'static str,
    dir: PathBuf,
    path: PathBuf,
    lock_path: PathBuf,
    lock: Mutex<()>,
    _records: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Collection<K, V>
where
    K: Ord + Serialize + DeserializeOwned + Send + 'static,
    V: Serialize + DeserializeOwned + Send + 'static,
{
    pub fn new(dir: &Path, name: &'static str) -> Self {
        Self {
            name,
            dir: dir.to_path_buf(),
            path: dir.join(format!("{}.json", name)),
            lock_path: dir.join(format!("{}.lock", name)),
            lock: Mutex::new(()),
            _records: PhantomData,
        }
    }

    pub async fn read<R>(
        &self,
        f: impl FnOnce(&CollectionFile<K, V>) -> R,
    ) -> Result<R, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(source) => {
                return Err(StoreError::Io {
                    collection: self.name,
                    source,
                })
            }
        };
        let file = decode(self.name, contents)?;
        Ok(f(&file))
    }

    /// Run a read-modify-write transaction.
    ///
    /// The closure returns its result and whether it changed the file. The
    /// file is rewritten only when it did, so `saved_at` tracks real changes.
    pub async fn update<R, F>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut CollectionFile<K, V>) -> (R, bool) + Send + 'static,
        R: Send + 'static,
    {
        let _guard = self.lock.lock().await;

        let name = self.name;
        let dir = self.dir.clone();
        let path = self.path.clone();
        let lock_path = self.lock_path.clone();

        tokio::task::spawn_blocking(move || -> Result<R, StoreError> {
            let io_err = |source: io::Error| StoreError::Io {
                collection: name,
                source,
            };

            let mut lock = RwLock::new(open_lock_file(&lock_path).map_err(io_err)?);
            let _held = lock.write().map_err(io_err)?;

            let contents = match std::fs::read_to_string(&path) {
                Ok(contents) => Some(contents),
                Err(e) if e.kind() == io::ErrorKind::NotFound => None,
                Err(source) => return Err(io_err(source)),
            };
            let mut file = decode(name, contents)?;

            let (result, changed) = f(&mut file);
            if changed {
                file.saved_at = Some(Utc::now());
                let contents = serde_json::to_vec_pretty(&file)
                    .map_err(|source| StoreError::Serialize {
                        collection: name,
                        source,
                    })?;
                write_atomic(&dir, &path, &contents).map_err(io_err)?;
                debug!(collection = name, records = file.records.len(), "Collection committed");
            }
            Ok(result)
        })
        .await
        .map_err(|e| StoreError::Aborted {
            collection: self.name,
            reason: e.to_string(),
        })?
    }
}

fn decode<K, V>(
    name: &'static str,
    contents: Option<String>,
) -> Result<CollectionFile<K, V>, StoreError>
where
    K: Ord + DeserializeOwned,
    V: DeserializeOwned,
{
    match contents {
        Some(contents) => serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
            collection: name,
            source,
        }),
        None => Ok(CollectionFile::default()),
    }
}

fn open_lock_file(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(path)
}

/// Write to a uniquely named temp file in `dir`, fsync, then rename over `path`.
fn write_atomic(dir: &Path, path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
