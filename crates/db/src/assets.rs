//! Filesystem-backed asset storage.
//!
//! Files are written to `<root>/<bucket>/<uuid>-<sanitized name>` and served
//! by the API under `<public_base_url>/<bucket>/<key>`.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use questline_core::error::CoreError;
use questline_core::store::AssetStore;
use regex::Regex;

/// Bucket names: lowercase alphanumerics and dashes, 3-63 characters.
static BUCKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]{2,62}$").expect("valid regex"));

/// Characters not allowed in stored file names.
static UNSAFE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid regex"));

const MAX_FILE_NAME_LEN: usize = 120;

/// `<uuid>-` prefix on stored keys.
const KEY_PREFIX_LEN: usize = 37;

pub fn validate_bucket(bucket: &str) -> Result<(), CoreError> {
    if BUCKET_RE.is_match(bucket) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Invalid bucket name '{bucket}'")))
    }
}

/// Reduce an uploaded file name to a safe single path segment.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned = UNSAFE_CHARS_RE.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');
    let mut out: String = cleaned.chars().take(MAX_FILE_NAME_LEN).collect();
    if out.is_empty() {
        out.push_str("file");
    }
    out
}

pub struct LocalAssetStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, CoreError> {
        validate_bucket(bucket)?;
        if key.is_empty() || key != sanitize_file_name(key) {
            return Err(CoreError::Validation(format!("Invalid asset key '{key}'")));
        }
        Ok(self.root.join(bucket).join(key))
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn upload(
        &self,
        bucket: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, CoreError> {
        // Keep the tail so the extension survives.
        let name = sanitize_file_name(file_name);
        let excess = name
            .chars()
            .count()
            .saturating_sub(MAX_FILE_NAME_LEN - KEY_PREFIX_LEN);
        let name: String = name.chars().skip(excess).collect();
        let key = format!("{}-{name}", uuid::Uuid::new_v4());
        let path = self.object_path(bucket, &key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::Store(format!("Failed to create asset directory: {e}")))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| CoreError::Store(format!("Failed to write asset: {e}")))?;

        tracing::info!(bucket, key = %key, size = bytes.len(), "Stored asset");
        Ok(format!("{}/{bucket}/{key}", self.public_base_url))
    }

    /// Removing an asset that does not exist succeeds.
    async fn remove(&self, bucket: &str, path: &str) -> Result<(), CoreError> {
        let key = path.rsplit('/').next().unwrap_or(path);
        let file = self.object_path(bucket, key)?;
        match tokio::fs::remove_file(&file).await {
            Ok(()) => {
                tracing::info!(bucket, key, "Removed asset");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Store(format!("Failed to remove asset: {e}"))),
        }
    }
}
