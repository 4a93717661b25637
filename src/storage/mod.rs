use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::backend::ObjectStorage;
use crate::config::Config;
use crate::error::{LedgerError, LedgerResult};

/// A file picked by the user to attach to an invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Read a local file into memory, keeping only its file name.
    pub async fn read(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());

        Ok(Self { name, bytes })
    }
}

/// Object path for a new upload: `<user id>/<random uuid>.<extension>`.
///
/// The extension is whatever follows the last `.` of the original name; a name
/// without a dot is used whole.
pub fn upload_path(user_id: Uuid, file_name: &str) -> String {
    let ext = file_name.rsplit('.').next().unwrap_or(file_name);
    format!("{}/{}.{}", user_id, Uuid::new_v4(), ext)
}

/// Bucket-style object store on the local filesystem.
pub struct FileStorage {
    root: PathBuf,
    bucket: String,
    public_base: String,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>, bucket: &str, public_base: &str) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.to_string(),
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.storage_root.clone(),
            &config.storage_bucket,
            &config.storage_public_url,
        )
    }

    fn object_path(&self, path: &str) -> LedgerResult<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if path.is_empty() || escapes {
            return Err(LedgerError::Storage(format!("invalid object path: {path}")));
        }

        Ok(self.root.join(&self.bucket).join(relative))
    }
}

#[async_trait]
impl ObjectStorage for FileStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> LedgerResult<()> {
        let target = self.object_path(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(LedgerError::Storage(format!("object already exists: {path}")));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(&bytes).await?;
        file.flush().await?;

        debug!(path, size = bytes.len(), "object uploaded");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.public_base, self.bucket, path)
    }

    async fn remove(&self, paths: Vec<String>) -> LedgerResult<()> {
        for path in paths {
            let target = self.object_path(&path)?;
            match fs::remove_file(&target).await {
                Ok(()) => debug!(%path, "object removed"),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    warn!(%path, "object already gone");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}
