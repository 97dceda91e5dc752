//! Plain-text extraction from uploaded files.

use std::path::Path;

use plansmith_core::memory::Document;
use tracing::{info, warn};

/// Extract text from in-memory file content based on its extension.
///
/// Supports `.txt` and `.md`. Anything else (including binary formats such
/// as PDF or DOCX) returns `None`, as does content that is not valid UTF-8.
pub fn extract_text(file_name: &str, content: &[u8]) -> Option<String> {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".txt") || lower.ends_with(".md") {
        String::from_utf8(content.to_vec()).ok()
    } else {
        None
    }
}

/// Read files from disk and keep the ones text could be extracted from.
///
/// Unreadable or unsupported files are logged and skipped.
pub async fn load_documents(paths: &[impl AsRef<Path>]) -> Vec<Document> {
    let mut docs = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(file = %filename, error = %e, "Could not read document");
                continue;
            }
        };

        match extract_text(&filename, &bytes) {
            Some(text) => {
                info!(file = %filename, "Successfully processed document");
                docs.push(Document {
                    filename,
                    content: text.trim().to_string(),
                });
            }
            None => warn!(file = %filename, "Could not extract text from document"),
        }
    }

    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_files_are_decoded() {
        assert_eq!(
            extract_text("notes.txt", b"Exam on Friday").as_deref(),
            Some("Exam on Friday")
        );
        assert!(extract_text("README.MD", b"# Plan").is_some());
    }

    #[test]
    fn unsupported_extensions_are_skipped() {
        assert!(extract_text("syllabus.pdf", b"%PDF-1.7").is_none());
        assert!(extract_text("notes.docx", b"PK").is_none());
    }

    #[test]
    fn invalid_utf8_is_skipped() {
        assert!(extract_text("broken.txt", &[0xff, 0xfe, 0x00]).is_none());
    }

    #[tokio::test]
    async fn load_skips_missing_and_unsupported() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let good = dir.join("classes.txt");
        let binary = dir.join("scan.pdf");
        tokio::fs::write(&good, "  Chemistry lab Thursdays 1-3 PM \n").await.unwrap();
        tokio::fs::write(&binary, b"%PDF").await.unwrap();

        let docs = load_documents(&[good, binary, dir.join("missing.txt")]).await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].filename, "classes.txt");
        assert_eq!(docs[0].content, "Chemistry lab Thursdays 1-3 PM");
    }
}
