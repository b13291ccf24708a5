//! Upload paths and on-disk media storage.

use std::path::{Path, PathBuf};

use tokio::{fs, io::AsyncWriteExt};

use crate::error::{AppError, AppResult, FieldError};

/// Relative path of a product preview or gallery image.
pub fn product_image_path(product_id: i32, filename: &str) -> String {
    format!("products/preview_{product_id}/{filename}")
}

/// Relative path of a catalog preview image.
pub fn catalog_image_path(catalog_id: i32, filename: &str) -> String {
    format!("catalog/preview_{catalog_id}/{filename}")
}

/// Reduce a client-supplied filename to its last path component.
pub fn sanitize_filename(raw: &str) -> AppResult<String> {
    let name = raw
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .map(str::trim)
        .unwrap_or_default();
    if name.is_empty() || name == "." || name == ".." {
        return Err(AppError::Validation(vec![FieldError::new(
            "filename",
            "a file name is required",
        )]));
    }
    Ok(name.to_string())
}

const MAX_NAME_ATTEMPTS: usize = 16;

/// `dir/name.ext` becomes `dir/name_<7 random chars>.ext`.
fn alternative_name(relative: &str) -> String {
    let suffix = &uuid::Uuid::new_v4().simple().to_string()[..7];
    let (dir, file) = match relative.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, relative),
    };
    let file = match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{suffix}.{ext}"),
        _ => format!("{file}_{suffix}"),
    };
    match dir {
        Some(dir) => format!("{dir}/{file}"),
        None => file,
    }
}

#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    base_url: String,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under the media root and return the relative path actually used.
    /// An existing file is never replaced: a taken name gets a random suffix before the
    /// extension.
    pub async fn save(&self, relative: &str, bytes: &[u8]) -> AppResult<String> {
        if bytes.is_empty() {
            return Err(AppError::Validation(vec![FieldError::new(
                "file",
                "the uploaded file is empty",
            )]));
        }
        if let Some(parent) = self.root.join(relative).parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(e.into()))?;
        }

        let mut candidate = relative.to_string();
        for _ in 0..MAX_NAME_ATTEMPTS {
            let target = self.root.join(&candidate);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
                .await
            {
                Ok(mut file) => {
                    file.write_all(bytes)
                        .await
                        .map_err(|e| AppError::Internal(e.into()))?;
                    file.flush()
                        .await
                        .map_err(|e| AppError::Internal(e.into()))?;
                    tracing::debug!(path = %target.display(), size = bytes.len(), "stored upload");
                    return Ok(candidate);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    candidate = alternative_name(relative);
                }
                Err(e) => return Err(AppError::Internal(e.into())),
            }
        }
        Err(AppError::Internal(anyhow::anyhow!(
            "no free file name for {relative}"
        )))
    }

    /// Remove a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, relative: &str) -> AppResult<()> {
        match fs::remove_file(self.root.join(relative)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(e.into())),
        }
    }

    pub fn url(&self, relative: &str) -> String {
        format!("{}{}", self.base_url, relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_images_are_keyed_by_product() {
        assert_eq!(product_image_path(3, "a.png"), "products/preview_3/a.png");
    }

    #[test]
    fn catalog_path_uses_identifier_once() {
        let path = catalog_image_path(12, "cover.jpg");
        assert_eq!(path, "catalog/preview_12/cover.jpg");
        assert_eq!(path.matches("12").count(), 1);
    }

    #[test]
    fn filenames_lose_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_filename("C:\\tmp\\photo.jpg").unwrap(), "photo.jpg");
        assert!(sanitize_filename("dir/").is_err());
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("  ").is_err());
    }

    #[tokio::test]
    async fn save_and_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path(), "/media/");
        let rel = product_image_path(1, "x.png");

        let stored = storage.save(&rel, b"png").await.unwrap();
        assert_eq!(stored, rel);
        assert_eq!(std::fs::read(dir.path().join(&rel)).unwrap(), b"png");
        assert_eq!(storage.url(&rel), "/media/products/preview_1/x.png");

        storage.remove(&rel).await.unwrap();
        assert!(!dir.path().join(&rel).exists());
        storage.remove(&rel).await.unwrap();
    }

    #[tokio::test]
    async fn taken_names_are_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path(), "/media/");
        let rel = product_image_path(1, "a.png");

        let first = storage.save(&rel, b"PREVIEW").await.unwrap();
        let second = storage.save(&rel, b"GALLERY").await.unwrap();
        assert_eq!(first, rel);
        assert_ne!(second, first);
        assert!(second.starts_with("products/preview_1/a_"));
        assert!(second.ends_with(".png"));
        assert_eq!(std::fs::read(dir.path().join(&first)).unwrap(), b"PREVIEW");
        assert_eq!(std::fs::read(dir.path().join(&second)).unwrap(), b"GALLERY");
    }

    #[test]
    fn alternative_names_keep_directory_and_extension() {
        let name = alternative_name("catalog/preview_2/cover.tar.gz");
        assert!(name.starts_with("catalog/preview_2/cover.tar_"));
        assert!(name.ends_with(".gz"));
        assert_eq!(alternative_name("README").len(), "README_".len() + 7);
        assert!(alternative_name(".env").starts_with(".env_"));
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path(), "/media/");
        let err = storage.save("a/b.png", b"").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
