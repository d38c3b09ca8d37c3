use std::path::Path;

use anyhow::{Context, Result};

/// A file chosen in the upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            file_name,
            mime_type,
            bytes: bytes.into(),
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_mime_from_extension() {
        assert_eq!(UploadFile::new("cv.pdf", b"%PDF".to_vec()).mime_type, "application/pdf");
        assert_eq!(
            UploadFile::new("cv.unknownext", Vec::new()).mime_type,
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn reads_file_name_and_bytes_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, "hello").expect("write");

        let file = UploadFile::from_path(&path).await.expect("load");
        assert_eq!(file.file_name, "resume.txt");
        assert_eq!(file.bytes, b"hello");
        assert_eq!(file.mime_type, "text/plain");
        assert_eq!(file.len(), 5);
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let err = UploadFile::from_path(Path::new("/definitely/not/here.pdf"))
            .await
            .expect_err("missing");
        assert!(err.to_string().contains("/definitely/not/here.pdf"));
    }
}
