//! Image upload storage.
//!
//! Files land in a local directory under a randomly-suffixed name and are
//! served back from the `/uploads` path prefix. Replaced images are not
//! cleaned up; the old file simply stops being referenced.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Public URL prefix that [`UploadStore`] paths are rooted at.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Opens the store, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] if the directory cannot be created.
    pub async fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the bytes under a fresh randomly-suffixed name and returns the
    /// public path (e.g. `/uploads/cold-brew-3fa94c21b07e.png`).
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] if the file cannot be written.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, std::io::Error> {
        let file_name = unique_file_name(original_name);
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;
        tracing::debug!(file = %file_name, size = bytes.len(), "stored uploaded image");
        Ok(format!("{PUBLIC_PREFIX}/{file_name}"))
    }
}

/// Builds `<sanitized-stem>-<12 hex chars>[.<ext>]` from a client-supplied
/// file name. The stem is reduced to ASCII alphanumerics and dashes so the
/// name is safe to join onto the uploads directory; the extension is kept
/// only if it is plain alphanumeric.
fn unique_file_name(original: &str) -> String {
    let path = Path::new(original);
    let stem: String = path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("upload")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let stem = stem.trim_matches('-');
    let stem = if stem.is_empty() { "upload" } else { stem };

    // 48 random bits rendered as 12 hex characters.
    let suffix = format!("{:012x}", rand::random::<u64>() >> 16);

    match path.extension().and_then(OsStr::to_str) {
        Some(ext) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            format!("{stem}-{suffix}.{}", ext.to_ascii_lowercase())
        }
        _ => format!("{stem}-{suffix}"),
    }
}
