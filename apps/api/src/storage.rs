use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::candidature::DocumentKind;

/// Upload cap per file, inclusive: a file of exactly this size is accepted.
pub const MAX_FILE_BYTES: usize = 20 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: &[&str] =
    &["pdf", "doc", "docx", "txt", "jpg", "jpeg", "png", "gif"];

/// Validation and write failures for uploaded documents.
/// `ExtensionNotAllowed` and `TooLarge` are the candidate's fault (400);
/// `Io` and `VerifyFailed` are ours (500).
#[derive(Debug, Error)]
pub enum FileError {
    #[error("extension non autorisée: .{0}")]
    ExtensionNotAllowed(String),

    #[error("fichier trop volumineux ({0} octets, maximum {MAX_FILE_BYTES})")]
    TooLarge(usize),

    #[error("écriture du fichier impossible: {0}")]
    Io(#[from] std::io::Error),

    #[error("fichier absent ou vide après écriture: {0}")]
    VerifyFailed(String),
}

impl FileError {
    /// True when the upload itself was invalid, as opposed to a server-side
    /// write failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, FileError::ExtensionNotAllowed(_) | FileError::TooLarge(_))
    }
}

/// Writes validated uploads into the configured directory.
///
/// Stored names are `{timestamp}_{owner}_{kind}_{suffix}.{ext}` where the
/// random suffix keeps two same-second submissions from the same candidate
/// for the same document kind from colliding.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn store(
        &self,
        original_name: &str,
        data: &[u8],
        owner: &str,
        kind: DocumentKind,
    ) -> Result<String, FileError> {
        let ext = extension_of(original_name);
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(FileError::ExtensionNotAllowed(ext));
        }
        if data.len() > MAX_FILE_BYTES {
            return Err(FileError::TooLarge(data.len()));
        }

        let suffix = Uuid::new_v4().simple().to_string();
        let filename = format!(
            "{}_{}_{}_{}.{}",
            Utc::now().format("%Y%m%d%H%M%S"),
            sanitize_owner_name(owner),
            kind.as_str(),
            &suffix[..8],
            ext
        );

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, data).await?;

        // The filename is only handed back once the write is observable on disk.
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.len() > 0 => Ok(filename),
            _ => Err(FileError::VerifyFailed(filename)),
        }
    }
}

/// Case-insensitive extension taken from the final dot-segment of the
/// original filename. Empty when there is no dot.
fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Keeps alphanumerics, spaces and underscores, then collapses whitespace
/// runs to single underscores. Falls back to a placeholder when nothing
/// survives.
fn sanitize_owner_name(owner: &str) -> String {
    let kept: String = owner
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '_')
        .collect();
    let joined = kept.split_whitespace().collect::<Vec<_>>().join("_");
    if joined.is_empty() {
        "candidat".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn extension_is_final_dot_segment_lowercased() {
        assert_eq!(extension_of("resume.PDF"), "pdf");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("no_extension"), "");
    }

    #[test]
    fn sanitize_strips_punctuation_and_collapses_spaces() {
        assert_eq!(sanitize_owner_name("Jean-Pierre  O'Neil"), "JeanPierre_ONeil");
        assert_eq!(sanitize_owner_name("Marie Essomba"), "Marie_Essomba");
        assert_eq!(sanitize_owner_name("déjà_vu"), "déjà_vu");
    }

    #[test]
    fn sanitize_falls_back_when_empty() {
        assert_eq!(sanitize_owner_name(""), "candidat");
        assert_eq!(sanitize_owner_name("!!!"), "candidat");
        assert_eq!(sanitize_owner_name("   "), "candidat");
    }

    #[tokio::test]
    async fn rejects_disallowed_extension() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let err = store
            .store("resume.exe", b"MZ", "Marie", DocumentKind::Cv)
            .await
            .unwrap_err();
        assert!(matches!(err, FileError::ExtensionNotAllowed(ext) if ext == "exe"));
    }

    #[tokio::test]
    async fn accepts_uppercase_extension() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let name = store
            .store("resume.PDF", b"%PDF-1.4", "Marie", DocumentKind::Cv)
            .await
            .unwrap();
        assert!(name.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn size_cap_is_inclusive() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let at_cap = vec![0u8; MAX_FILE_BYTES];
        assert!(store
            .store("cv.pdf", &at_cap, "Marie", DocumentKind::Cv)
            .await
            .is_ok());

        let over_cap = vec![0u8; MAX_FILE_BYTES + 1];
        let err = store
            .store("cv.pdf", &over_cap, "Marie", DocumentKind::Cv)
            .await
            .unwrap_err();
        assert!(matches!(err, FileError::TooLarge(n) if n == MAX_FILE_BYTES + 1));
    }

    #[tokio::test]
    async fn stored_name_carries_owner_and_kind() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let name = store
            .store("lettre.docx", b"contenu", "Jean Dupont", DocumentKind::LettreMotivation)
            .await
            .unwrap();
        assert!(name.contains("Jean_Dupont"));
        assert!(name.contains("lettre_motivation"));
        assert!(name.ends_with(".docx"));
        assert!(dir.path().join(&name).exists());
    }

    #[tokio::test]
    async fn two_stores_in_the_same_second_do_not_collide() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let a = store
            .store("cv.pdf", b"a", "Marie", DocumentKind::Cv)
            .await
            .unwrap();
        let b = store
            .store("cv.pdf", b"b", "Marie", DocumentKind::Cv)
            .await
            .unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("uploads").join("2026");
        let store = FileStore::new(&nested);
        let name = store
            .store("photo.png", b"\x89PNG", "Marie", DocumentKind::PortfolioFichier)
            .await
            .unwrap();
        assert!(nested.join(name).exists());
    }
}
