//! File Store - keep uploaded spreadsheets and their metadata on disk
//!
//! Raw bytes live next to an `index.json` holding every [`UploadedFile`]
//! record. The index is rewritten after each mutation, so a restarted
//! server sees the same list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::models::{FileStatus, FileType, UploadedFile};

/// Index file name inside the storage directory
const INDEX_FILE: &str = "index.json";

/// A registry entry: the public record plus where its bytes are kept
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredFile {
    #[serde(flatten)]
    file: UploadedFile,
    /// Blob name inside the storage directory
    stored_name: String,
}

/// On-disk layout of `index.json`
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreIndex {
    next_id: u64,
    files: Vec<StoredFile>,
}

/// Bytes of an upload written to disk but not registered yet
#[derive(Debug)]
pub struct StagedBlob {
    stored_name: String,
    size: u64,
}

/// Store shared between handlers and processing tasks
pub type SharedStore = Arc<RwLock<FileStore>>;

/// Registry of uploaded files
pub struct FileStore {
    /// Directory holding blobs and the index
    dir: PathBuf,
    /// Loaded entries (id -> entry)
    files: BTreeMap<u64, StoredFile>,
    /// Next id to hand out; ids are never reused
    next_id: u64,
}

impl FileStore {
    /// Open (or create) a store in `dir`, loading the existing index
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = PathBuf::from(dir.as_ref());
        fs::create_dir_all(&dir)?;

        let index_path = dir.join(INDEX_FILE);
        let index = if index_path.exists() {
            let content = fs::read_to_string(&index_path)?;
            serde_json::from_str::<StoreIndex>(&content)?
        } else {
            StoreIndex::default()
        };

        let files: BTreeMap<u64, StoredFile> =
            index.files.into_iter().map(|f| (f.file.id, f)).collect();
        let highest = files.keys().next_back().copied().unwrap_or(0);

        Ok(Self {
            dir,
            files,
            next_id: index.next_id.max(highest + 1),
        })
    }

    /// Wrap into a [`SharedStore`]
    pub fn shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    /// All files, newest first
    pub fn list(&self) -> Vec<UploadedFile> {
        self.files.values().rev().map(|f| f.file.clone()).collect()
    }

    /// Get a file by id
    pub fn get(&self, id: u64) -> Option<&UploadedFile> {
        self.files.get(&id).map(|f| &f.file)
    }

    /// Ids of entries still waiting for processing
    pub fn pending_ids(&self) -> Vec<u64> {
        self.files
            .values()
            .filter(|f| f.file.status == FileStatus::Processing)
            .map(|f| f.file.id)
            .collect()
    }

    /// Storage directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the bytes of a new upload to a fresh blob.
    ///
    /// Nothing is registered yet; pass the result to [`FileStore::commit`].
    /// Runs without the store lock.
    pub async fn stage(dir: &Path, file_type: FileType, bytes: &[u8]) -> StoreResult<StagedBlob> {
        let stored_name = blob_name(file_type);
        tokio::fs::write(dir.join(&stored_name), bytes).await?;
        Ok(StagedBlob {
            stored_name,
            size: bytes.len() as u64,
        })
    }

    /// Register a staged blob as a new upload in the `processing` state.
    ///
    /// If the index cannot be written the store is left unchanged and the
    /// blob is deleted.
    pub fn commit(
        &mut self,
        original_filename: &str,
        file_type: FileType,
        blob: StagedBlob,
    ) -> StoreResult<UploadedFile> {
        let id = self.next_id;
        let file = UploadedFile {
            id,
            original_filename: original_filename.to_string(),
            file_type,
            file_size: Some(blob.size),
            status: FileStatus::Processing,
            processed_data: None,
            error_message: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        self.next_id += 1;
        self.files.insert(
            id,
            StoredFile {
                file: file.clone(),
                stored_name: blob.stored_name.clone(),
            },
        );

        if let Err(e) = self.save_index() {
            self.files.remove(&id);
            self.next_id = id;
            remove_blob(&self.dir.join(&blob.stored_name));
            return Err(e);
        }
        Ok(file)
    }

    /// Store a new upload in one step (blocking I/O)
    pub fn insert(
        &mut self,
        original_filename: &str,
        file_type: FileType,
        bytes: &[u8],
    ) -> StoreResult<UploadedFile> {
        let stored_name = blob_name(file_type);
        fs::write(self.dir.join(&stored_name), bytes)?;
        let blob = StagedBlob {
            stored_name,
            size: bytes.len() as u64,
        };
        self.commit(original_filename, file_type, blob)
    }

    /// Path of an upload's raw bytes
    pub fn blob_path(&self, id: u64) -> StoreResult<PathBuf> {
        let entry = self.files.get(&id).ok_or(StoreError::NotFound(id))?;
        Ok(self.dir.join(&entry.stored_name))
    }

    /// Read back the raw bytes of an upload (blocking I/O)
    pub fn read_bytes(&self, id: u64) -> StoreResult<Vec<u8>> {
        Ok(fs::read(self.blob_path(id)?)?)
    }

    /// Apply a change to a record and persist it
    pub fn update(&mut self, id: u64, change: impl FnOnce(&mut UploadedFile)) -> StoreResult<()> {
        let entry = self.files.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        let previous = entry.file.clone();
        change(&mut entry.file);

        if let Err(e) = self.save_index() {
            if let Some(entry) = self.files.get_mut(&id) {
                entry.file = previous;
            }
            return Err(e);
        }
        Ok(())
    }

    /// Unregister an upload and return its record and blob path.
    ///
    /// The blob is left on disk for the caller to delete. If the index
    /// cannot be written the entry is put back.
    pub fn detach(&mut self, id: u64) -> StoreResult<(UploadedFile, PathBuf)> {
        let entry = self.files.remove(&id).ok_or(StoreError::NotFound(id))?;

        if let Err(e) = self.save_index() {
            self.files.insert(id, entry);
            return Err(e);
        }
        let path = self.dir.join(&entry.stored_name);
        Ok((entry.file, path))
    }

    /// Delete a record and its bytes (blocking I/O)
    pub fn remove(&mut self, id: u64) -> StoreResult<UploadedFile> {
        let (file, path) = self.detach(id)?;
        remove_blob(&path);
        Ok(file)
    }

    /// Rewrite `index.json` atomically
    fn save_index(&self) -> StoreResult<()> {
        let index = StoreIndex {
            next_id: self.next_id,
            files: self.files.values().cloned().collect(),
        };
        let content = serde_json::to_vec(&index)?;

        let tmp = self.dir.join(format!("{}.tmp", INDEX_FILE));
        fs::write(&tmp, content)?;
        fs::rename(&tmp, self.dir.join(INDEX_FILE))?;
        Ok(())
    }
}

fn blob_name(file_type: FileType) -> String {
    format!("{}.{}", uuid::Uuid::new_v4(), file_type.extension())
}

fn remove_blob(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        tracing::warn!("Could not remove blob {}: {}", path.display(), e);
    }
}
