use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::models::domain::Upload;

const INDEX_FILE: &str = "uploads.json";
const CAPTURE_DIR: &str = "pcaps";
const DEFAULT_FILE_NAME: &str = "capture.pcap";

#[derive(Debug, Default, Serialize, Deserialize)]
struct UploadIndex {
    next_id: u64,
    uploads: Vec<Upload>,
}

/// Capture files on disk plus a JSON index of who uploaded what.
#[derive(Clone)]
pub struct UploadStore {
    media_dir: PathBuf,
    index: Arc<Mutex<UploadIndex>>,
}

impl UploadStore {
    pub async fn open(media_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let media_dir = media_dir.into();
        fs::create_dir_all(media_dir.join(CAPTURE_DIR)).await?;

        let index_path = media_dir.join(INDEX_FILE);
        let index = match fs::read(&index_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => UploadIndex::default(),
            Err(e) => return Err(e.into()),
        };
        info!(dir = %media_dir.display(), uploads = index.uploads.len(), "upload store opened");

        Ok(Self {
            media_dir,
            index: Arc::new(Mutex::new(index)),
        })
    }

    /// Stores a new capture for `owner` and records it in the index.
    pub async fn save(&self, owner: &str, client_name: &str, bytes: &[u8]) -> Result<Upload, StoreError> {
        if bytes.is_empty() {
            return Err(StoreError::EmptyUpload);
        }

        let mut index = self.index.lock().await;
        let id = index.next_id.max(1);
        let file_name = sanitize_file_name(client_name);
        let stored_path = self
            .media_dir
            .join(CAPTURE_DIR)
            .join(format!("{}_{}", id, file_name));
        fs::write(&stored_path, bytes).await?;

        let upload = Upload {
            id,
            owner: owner.to_string(),
            file_name,
            stored_path,
            uploaded_at: Utc::now(),
        };
        index.next_id = id + 1;
        index.uploads.push(upload.clone());

        if let Err(e) = self.persist(&index).await {
            // keep index and disk in step
            index.uploads.pop();
            index.next_id = id;
            if let Err(cleanup) = fs::remove_file(&upload.stored_path).await {
                warn!(path = %upload.stored_path.display(), error = %cleanup, "orphaned capture file left behind");
            }
            return Err(e);
        }

        info!(id, upload = %upload, bytes = bytes.len(), "capture uploaded");
        Ok(upload)
    }

    /// The owner's uploads, newest first.
    pub async fn list_for(&self, owner: &str) -> Vec<Upload> {
        let index = self.index.lock().await;
        let mut uploads: Vec<Upload> = index
            .uploads
            .iter()
            .filter(|u| u.owner == owner)
            .cloned()
            .collect();
        uploads.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        uploads
    }

    /// Looks up an upload, but only if `owner` owns it.
    pub async fn get_for(&self, id: u64, owner: &str) -> Option<Upload> {
        let index = self.index.lock().await;
        index
            .uploads
            .iter()
            .find(|u| u.id == id && u.owner == owner)
            .cloned()
    }

    async fn persist(&self, index: &UploadIndex) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(index)?;
        let tmp = self.media_dir.join(format!("{}.tmp", INDEX_FILE));
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, self.media_dir.join(INDEX_FILE)).await?;
        Ok(())
    }
}

/// Keeps only the final path component and a conservative character set.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        DEFAULT_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}
