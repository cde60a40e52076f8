use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::errors::ProviderError;

const MAX_NAME_COLLISIONS: i64 = 1_000;

pub trait ImageStore {
    /// Persists `bytes` for `subject_name`, returning the file name it was saved under.
    async fn save_image(&self, subject_name: &str, bytes: &[u8]) -> Result<String, ProviderError>;
}

pub fn image_file_name(subject_name: &str, unix_millis: i64) -> String {
    format!("{}_{}.jpg", subject_name, unix_millis)
}

pub struct FileImageStore {
    dir: PathBuf,
}

impl FileImageStore {
    pub fn new(dir: PathBuf) -> Self {
        FileImageStore { dir }
    }
}

impl ImageStore for FileImageStore {
    async fn save_image(&self, subject_name: &str, bytes: &[u8]) -> Result<String, ProviderError> {
        fs::create_dir_all(&self.dir).await?;

        let stamp = chrono::Utc::now().timestamp_millis();
        // Same subject in the same millisecond: move to the next free stamp.
        for offset in 0..MAX_NAME_COLLISIONS {
            let file_name = image_file_name(subject_name, stamp + offset);
            let path = self.dir.join(&file_name);

            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => {
                    write_or_remove(file, &path, bytes).await?;
                    info!("Image saved to {}", path.display());
                    return Ok(file_name);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("{} already exists, trying next stamp", path.display());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ProviderError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free file name for {} in {}", subject_name, self.dir.display()),
        )))
    }
}

/// Writes the whole image into a freshly created file. A short write leaves
/// no truncated image behind.
async fn write_or_remove<W>(mut file: W, path: &Path, bytes: &[u8]) -> Result<(), ProviderError>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        file.write_all(bytes).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        if let Err(remove_err) = fs::remove_file(path).await {
            warn!("Cannot remove partial image {}: {}", path.display(), remove_err);
        }
        return Err(e.into());
    }
    Ok(())
}
