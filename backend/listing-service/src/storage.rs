//! Local disk storage for listing images.
//!
//! Files are written flat into one directory as `<unix-millis><ext>` and
//! served back from `/uploads/<file>`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

/// Extensions accepted for uploaded images.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Public URL prefix under which stored files are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Persist `bytes` and return the stored file name.
    ///
    /// The name is the current unix time in milliseconds plus the lowercased
    /// extension of `original_name`. On a same-millisecond collision the
    /// timestamp is bumped until a free name is found.
    pub async fn save(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }
        if bytes.len() > self.max_bytes {
            return Err(AppError::BadRequest(format!(
                "Uploaded file exceeds {} bytes",
                self.max_bytes
            )));
        }

        let ext = image_extension(original_name)?;
        self.ensure_dir().await?;

        let mut millis = chrono::Utc::now().timestamp_millis();
        for _ in 0..16 {
            let file_name = format!("{}.{}", millis, ext);
            let path = self.dir.join(&file_name);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    if let Err(e) = write_fully(&mut file, bytes).await {
                        drop(file);
                        // A partial file would be served under this name.
                        if let Err(cleanup) = fs::remove_file(&path).await {
                            tracing::warn!(
                                file = %file_name,
                                error = %cleanup,
                                "failed to remove partial upload"
                            );
                        }
                        return Err(e.into());
                    }
                    tracing::info!(file = %file_name, size = bytes.len(), "stored upload");
                    return Ok(file_name);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => millis += 1,
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Internal(
            "Could not allocate a file name for the upload".to_string(),
        ))
    }

    /// Delete a stored file. Unsafe or already missing names are a no-op.
    pub async fn remove(&self, file_name: &str) -> Result<()> {
        if !is_safe_file_name(file_name) {
            return Ok(());
        }
        match fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => {
                tracing::info!(file = %file_name, "removed upload");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Read a stored file. `None` when the name is unsafe or nothing is there.
    pub async fn read(&self, file_name: &str) -> Result<Option<Vec<u8>>> {
        if !is_safe_file_name(file_name) {
            return Ok(None);
        }
        match fs::read(self.dir.join(file_name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_fully(file: &mut fs::File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await
}

pub fn public_url(file_name: &str) -> String {
    format!("{}/{}", UPLOADS_URL_PREFIX, file_name)
}

/// Content type from a file name's extension.
pub fn content_type_for(file_name: &str) -> mime::Mime {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        Some("png") => mime::IMAGE_PNG,
        Some("gif") => mime::IMAGE_GIF,
        Some("webp") => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

fn image_extension(original_name: Option<&str>) -> Result<String> {
    let ext = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| AppError::BadRequest("Uploaded file must have an extension".to_string()))?;

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AppError::BadRequest(format!(
            "Unsupported image type: .{}",
            ext
        )))
    }
}

/// Only flat names made of `[A-Za-z0-9._-]`, never `.` or `..`.
fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}
