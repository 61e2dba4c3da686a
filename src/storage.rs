use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

/// Blob storage behind the upload handlers. Keys are always server-generated
/// (`dir/prefix-uuid.ext`), never taken from client input.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()>;
    /// `None` when the key does not exist.
    async fn get_object(&self, key: &str) -> anyhow::Result<Option<Bytes>>;
    /// Returns whether a file was actually removed.
    async fn delete_object(&self, key: &str) -> anyhow::Result<bool>;
}

/// Public URL under which a stored key is served (see the `/uploads` route).
pub fn public_url(key: &str) -> String {
    format!("/uploads/{key}")
}

/// Local-disk storage rooted at the configured upload directory.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub async fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("create upload root {}", root.display()))?;
        Ok(Self { root })
    }

    fn resolve(&self, key: &str) -> anyhow::Result<PathBuf> {
        let rel = Path::new(key);
        let sane = !key.is_empty()
            && rel.is_relative()
            && rel.components().all(|c| matches!(c, Component::Normal(_)));
        anyhow::ensure!(sane, "invalid storage key: {key}");
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl StorageClient for LocalStorage {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create upload directory for {key}"))?;
        }
        // Write then rename so a stored key never points at a partial file.
        let tmp = path.with_extension(format!("tmp-{}", Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, &body)
            .await
            .with_context(|| format!("write upload {key}"))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("move upload into place {key}"))?;
        Ok(())
    }

    async fn get_object(&self, key: &str) -> anyhow::Result<Option<Bytes>> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read upload {key}")),
        }
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<bool> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("delete upload {key}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_storage() -> LocalStorage {
        let root = std::env::temp_dir().join(format!("devshowcase-storage-{}", Uuid::new_v4()));
        LocalStorage::new(root).await.expect("create storage root")
    }

    #[tokio::test]
    async fn put_get_delete_roundtrip() {
        let storage = temp_storage().await;
        let key = "projects/project-abc.png";
        storage
            .put_object(key, Bytes::from_static(b"fake png"))
            .await
            .expect("put");
        let body = storage.get_object(key).await.expect("get").expect("exists");
        assert_eq!(&body[..], b"fake png");
        assert!(storage.delete_object(key).await.expect("delete"));
        assert!(storage.get_object(key).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn delete_missing_is_not_an_error() {
        let storage = temp_storage().await;
        assert!(!storage.delete_object("documents/doc-missing.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn rejects_traversal_keys() {
        let storage = temp_storage().await;
        assert!(storage.get_object("../etc/passwd").await.is_err());
        assert!(storage.put_object("/abs/path", Bytes::new()).await.is_err());
        assert!(storage.delete_object("").await.is_err());
    }

    #[test]
    fn public_url_prefixes_uploads() {
        assert_eq!(public_url("profiles/profile-x.jpg"), "/uploads/profiles/profile-x.jpg");
    }
}
