//! On-disk output: token logs and scannable-code images, plus safe lookup for downloads.

use std::path::{Path, PathBuf};

use common::ServiceError;
use tracing::debug;

/// Which output directory a download refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `tokens_<timestamp>.txt` batch logs.
    TokenLog,
    /// `<first>_<cert_id>.svg` scannable codes.
    QrCode,
}

impl FileKind {
    /// MIME type sent with the download.
    pub fn content_type(self) -> &'static str {
        match self {
            FileKind::TokenLog => "text/plain; charset=utf-8",
            FileKind::QrCode => "image/svg+xml",
        }
    }
}

/// Output directories for issued artefacts.
#[derive(Debug, Clone)]
pub struct Storage {
    output_dir: PathBuf,
    qr_dir: PathBuf,
}

impl Storage {
    pub fn new(output_dir: impl Into<PathBuf>, qr_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            qr_dir: qr_dir.into(),
        }
    }

    /// Create both directories if they do not exist yet.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        tokio::fs::create_dir_all(&self.qr_dir).await
    }

    fn dir(&self, kind: FileKind) -> &Path {
        match kind {
            FileKind::TokenLog => &self.output_dir,
            FileKind::QrCode => &self.qr_dir,
        }
    }

    /// Write `contents` to `file_name` in the directory for `kind`, replacing
    /// any existing file.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Internal`] on a rejected name or any I/O failure.
    pub async fn write(
        &self,
        kind: FileKind,
        file_name: &str,
        contents: impl AsRef<[u8]>,
    ) -> Result<(), ServiceError> {
        let path = self
            .resolve(kind, file_name)
            .ok_or_else(|| ServiceError::Internal(format!("refusing to write {file_name:?}")))?;
        tokio::fs::create_dir_all(self.dir(kind))
            .await
            .map_err(|e| ServiceError::Internal(format!("create {}: {e}", self.dir(kind).display())))?;
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| ServiceError::Internal(format!("write {}: {e}", path.display())))?;
        debug!(path = %path.display(), "wrote output file");
        Ok(())
    }

    /// Read a previously written file for download.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] if the name is not a plain file name or the
    /// file does not exist; [`ServiceError::Internal`] for other I/O errors.
    pub async fn read(&self, kind: FileKind, file_name: &str) -> Result<Vec<u8>, ServiceError> {
        let path = self
            .resolve(kind, file_name)
            .ok_or_else(|| ServiceError::NotFound("the requested file does not exist".into()))?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ServiceError::NotFound(
                "the requested file does not exist".into(),
            )),
            Err(e) => Err(ServiceError::Internal(format!(
                "read {}: {e}",
                path.display()
            ))),
        }
    }

    /// Join `file_name` onto the directory for `kind`, or `None` if the name
    /// could escape it.
    fn resolve(&self, kind: FileKind, file_name: &str) -> Option<PathBuf> {
        if !is_plain_file_name(file_name) {
            return None;
        }
        Some(self.dir(kind).join(file_name))
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains(['/', '\\', '\0'])
}
