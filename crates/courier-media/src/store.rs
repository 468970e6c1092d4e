// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local content store for ingested media.
//!
//! Files live under `<content_root>/<user_id>/<unix_millis>_<n>.<ext>`
//! where `n` is the attachment's index within its message. The filename
//! doubles as the public path segment of the signed retrieval URL.

use std::path::{Path, PathBuf};

use chrono::Utc;
use courier_core::error::CourierError;
use tokio::fs;

/// Extension chosen for content types the store does not recognize.
const FALLBACK_EXTENSION: &str = "bin";

fn extension_for(content_type: &str) -> &'static str {
    match content_type.split(';').next().unwrap_or_default().trim() {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "application/pdf" => "pdf",
        "audio/ogg" => "ogg",
        "audio/mpeg" => "mp3",
        "video/mp4" => "mp4",
        "text/vcard" => "vcf",
        _ => FALLBACK_EXTENSION,
    }
}

/// Reverse of [`extension_for`], used when serving stored files back out.
pub fn content_type_for(file: &str) -> &'static str {
    match file.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default() {
        "jpg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "ogg" => "audio/ogg",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "vcf" => "text/vcard",
        _ => "application/octet-stream",
    }
}

fn map_io(message: &str, error: std::io::Error) -> CourierError {
    CourierError::Media {
        message: message.to_string(),
        source: Some(Box::new(error)),
    }
}

/// Filesystem-backed store rooted at `media.content_root`.
#[derive(Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist one attachment and return its filename within the user's
    /// directory.
    pub async fn save(
        &self,
        user_id: &str,
        index: usize,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, CourierError> {
        let dir = self.root.join(user_id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| map_io("failed to create content directory", e))?;
        let file = format!(
            "{}_{index}.{}",
            Utc::now().timestamp_millis(),
            extension_for(content_type)
        );
        fs::write(dir.join(&file), bytes)
            .await
            .map_err(|e| map_io("failed to write media file", e))?;
        Ok(file)
    }

    /// Resolve a public path pair to a file on disk.
    ///
    /// Rejects path separators and parent references so a crafted URL
    /// cannot escape the content root. Returns `None` when no such file
    /// exists.
    pub fn resolve(&self, user_id: &str, file: &str) -> Option<PathBuf> {
        for segment in [user_id, file] {
            if segment.is_empty()
                || segment.contains('/')
                || segment.contains('\\')
                || segment.contains("..")
            {
                return None;
            }
        }
        let path = self.root.join(user_id).join(file);
        path.is_file().then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_names_files_by_millis_index_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        let file = store.save("u-1", 2, b"fake-jpeg", "image/jpeg").await.unwrap();
        assert!(file.ends_with("_2.jpg"), "unexpected filename {file}");
        let on_disk = dir.path().join("u-1").join(&file);
        assert_eq!(std::fs::read(on_disk).unwrap(), b"fake-jpeg");
    }

    #[tokio::test]
    async fn save_strips_content_type_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        let file = store
            .save("u-1", 0, b"ogg", "audio/ogg; codecs=opus")
            .await
            .unwrap();
        assert!(file.ends_with("_0.ogg"));
    }

    #[tokio::test]
    async fn unknown_content_type_falls_back_to_bin() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        let file = store
            .save("u-1", 0, b"??", "application/x-mystery")
            .await
            .unwrap();
        assert!(file.ends_with("_0.bin"));
    }

    #[tokio::test]
    async fn resolve_finds_saved_files_and_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        let file = store.save("u-1", 0, b"x", "image/png").await.unwrap();

        assert!(store.resolve("u-1", &file).is_some());
        assert!(store.resolve("u-1", "missing.png").is_none());
        assert!(store.resolve("..", &file).is_none());
        assert!(store.resolve("u-1", "../secret.png").is_none());
        assert!(store.resolve("u-1/nested", &file).is_none());
    }

    #[test]
    fn content_type_round_trips_known_extensions() {
        assert_eq!(content_type_for("1_0.jpg"), "image/jpeg");
        assert_eq!(content_type_for("1_0.pdf"), "application/pdf");
        assert_eq!(content_type_for("1_0.bin"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
