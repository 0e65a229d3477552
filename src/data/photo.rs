use crate::error::{CreateUploadDirectorySnafu, RollcallResult, WriteUploadSnafu};
use axum::body::Bytes;
use jiff::Timestamp;
use snafu::ResultExt;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use uuid::Uuid;

/// An image attached to a create/update request, not yet on disk.
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub original_file_name: Option<String>,
    pub bytes: Bytes,
}

impl NewPhoto {
    /// Browsers send an empty `image` part when no file was chosen.
    pub fn from_part(original_file_name: Option<String>, bytes: Bytes) -> Option<Self> {
        let has_name = original_file_name.as_deref().is_some_and(|name| !name.is_empty());
        if !has_name && bytes.is_empty() {
            return None;
        }
        Some(Self {
            original_file_name,
            bytes,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    directory: Arc<PathBuf>,
}

impl UploadStore {
    pub async fn new(directory: PathBuf) -> RollcallResult<Self> {
        tokio::fs::create_dir_all(&directory)
            .await
            .context(CreateUploadDirectorySnafu {
                path: directory.clone(),
            })?;

        Ok(Self {
            directory: Arc::new(directory),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.directory.join(file_name)
    }

    /// `<unix millis>-<uuid><.ext>`, unique even for uploads landing in the same millisecond.
    pub fn generate_file_name(photo: &NewPhoto) -> String {
        let extension = extension_for(photo.original_file_name.as_deref(), &photo.bytes)
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        format!(
            "{}-{}{extension}",
            Timestamp::now().as_millisecond(),
            Uuid::new_v4().simple()
        )
    }

    pub async fn write(&self, file_name: &str, bytes: &[u8]) -> RollcallResult<()> {
        let write = async {
            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.path_of(file_name))
                .await?;
            file.write_all(bytes).await?;
            file.flush().await
        };

        write.await.context(WriteUploadSnafu { file_name })?;
        debug!(?file_name, len = bytes.len(), "Stored upload");
        Ok(())
    }

    ///failures are logged rather than returned - by the time we remove a file, the record is already settled
    pub async fn remove(&self, file_name: &str) {
        match tokio::fs::remove_file(self.path_of(file_name)).await {
            Ok(()) => debug!(?file_name, "Removed upload"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(?e, ?file_name, "Unable to remove upload"),
        }
    }
}

fn extension_for(original_file_name: Option<&str>, bytes: &[u8]) -> Option<String> {
    original_file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .or_else(|| infer::get(bytes).map(|kind| kind.extension().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;
    use tokio::task::JoinSet;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn photo(name: Option<&str>, bytes: &'static [u8]) -> NewPhoto {
        NewPhoto {
            original_file_name: name.map(ToString::to_string),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn extension_comes_from_the_original_name() {
        assert_eq!(extension_for(Some("ada.JPG"), b"whatever"), Some("jpg".into()));
        assert_eq!(extension_for(Some("no_extension"), b"plain"), None);
        assert_eq!(extension_for(Some("odd.p/g"), b"plain"), None);
    }

    #[test]
    fn extension_is_sniffed_when_the_name_has_none() {
        assert_eq!(extension_for(None, PNG_MAGIC), Some("png".into()));
        assert_eq!(extension_for(Some("blob"), PNG_MAGIC), Some("png".into()));
    }

    #[test]
    fn empty_parts_are_not_uploads() {
        assert!(NewPhoto::from_part(Some(String::new()), Bytes::new()).is_none());
        assert!(NewPhoto::from_part(None, Bytes::new()).is_none());
        assert!(NewPhoto::from_part(Some("a.png".into()), Bytes::new()).is_some());
    }

    #[test]
    fn generated_names_keep_the_extension() {
        let name = UploadStore::generate_file_name(&photo(Some("portrait.png"), b"x"));
        assert!(name.ends_with(".png"));
        let (millis, _) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn simultaneous_uploads_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path().join("uploads")).await.unwrap();

        let mut set = JoinSet::new();
        for i in 0..64_u32 {
            let store = store.clone();
            set.spawn(async move {
                let contents = format!("photo number {i}");
                let name = UploadStore::generate_file_name(&NewPhoto {
                    original_file_name: Some("same.png".into()),
                    bytes: Bytes::from(contents.clone()),
                });
                store.write(&name, contents.as_bytes()).await.unwrap();
                (name, contents)
            });
        }

        let mut names = HashSet::new();
        while let Some(result) = set.join_next().await {
            let (name, contents) = result.unwrap();
            let on_disk = tokio::fs::read_to_string(store.path_of(&name)).await.unwrap();
            assert_eq!(on_disk, contents);
            assert!(names.insert(name));
        }
        assert_eq!(names.len(), 64);
    }

    #[tokio::test]
    async fn existing_files_are_never_overwritten() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path().to_path_buf()).await.unwrap();

        store.write("taken.png", b"first").await.unwrap();
        assert!(store.write("taken.png", b"second").await.is_err());
        assert_eq!(tokio::fs::read(store.path_of("taken.png")).await.unwrap(), b"first");
    }

    #[tokio::test]
    async fn removing_a_missing_file_is_quiet() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path().to_path_buf()).await.unwrap();

        store.write("gone.png", b"bytes").await.unwrap();
        store.remove("gone.png").await;
        store.remove("gone.png").await;
        assert!(!store.path_of("gone.png").exists());
    }
}
