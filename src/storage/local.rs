use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::storage::unique_filename;

/// A flat directory of images exposed under a public URL prefix.
#[derive(Clone, Debug)]
pub struct ImageStore {
    base_dir: PathBuf,
    url_prefix: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredFile {
    pub filename: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageEntry {
    pub filename: String,
    pub url: String,
    pub mtime: i64,
}

impl ImageStore {
    pub fn new(base_dir: PathBuf, url_prefix: &str) -> Self {
        let url_prefix = format!("/{}", url_prefix.trim_matches('/'));
        Self {
            base_dir,
            url_prefix,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.base_dir).await?;
        Ok(())
    }

    pub fn public_url(&self, filename: &str) -> String {
        format!("{}/{}", self.url_prefix, filename.trim_start_matches('/'))
    }

    /// Writes `data` under a fresh unique name. Existing files are never
    /// overwritten.
    pub async fn save(&self, prefix: &str, ext: &str, data: &[u8]) -> Result<StoredFile> {
        self.ensure_dir().await?;
        let filename = unique_filename(prefix, ext);
        write_new(&self.base_dir.join(&filename), data).await?;
        Ok(StoredFile {
            url: self.public_url(&filename),
            filename,
        })
    }

    /// Files with the given extension, newest first. A missing directory
    /// lists as empty.
    pub async fn list(&self, ext: &str) -> Result<Vec<ImageEntry>> {
        let mut dir = match fs::read_dir(&self.base_dir).await {
            Ok(dir) => dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut found: Vec<(SystemTime, String)> = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|value| value.to_str()) != Some(ext) {
                continue;
            }
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|value| value.to_str()) else {
                continue;
            };
            let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
            found.push((modified, name.to_string()));
        }
        found.sort_by(|a, b| b.cmp(a));

        Ok(found
            .into_iter()
            .map(|(modified, filename)| ImageEntry {
                url: self.public_url(&filename),
                mtime: modified
                    .duration_since(UNIX_EPOCH)
                    .map(|value| value.as_secs() as i64)
                    .unwrap_or_default(),
                filename,
            })
            .collect())
    }
}

/// Fails with `AlreadyExists` instead of truncating an existing file.
async fn write_new(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(data).await?;
    file.flush().await
}
