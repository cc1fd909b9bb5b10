//! Input document loading and validation.

use std::ffi::OsStr;
use std::path::Path;

use tokio::io::AsyncReadExt;

use crate::AiError;
use crate::conf::{C_MIME_PDF, N_BYTES_PDF_MAX, V_MAGIC_PDF};

/// A validated PDF ready to be sent for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecPdfDocument {
    /// Source file name (no directories), used to name the workbook.
    pub file_name: Option<String>,
    /// Always [`C_MIME_PDF`] once validated.
    pub mime_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl SpecPdfDocument {
    /// Read and validate a PDF from disk.
    ///
    /// Type and size are checked from the file name, the first bytes and the
    /// file metadata before the whole file is read.
    ///
    /// # Errors
    ///
    /// [`AiError::Io`] if the file cannot be read, [`AiError::InvalidInput`]
    /// if it is not a PDF or exceeds [`N_BYTES_PDF_MAX`].
    pub async fn from_path(path: &Path) -> Result<Self, AiError> {
        let map_io = |source: std::io::Error| AiError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file_name = path
            .file_name()
            .and_then(OsStr::to_str)
            .map(ToString::to_string);
        let metadata = tokio::fs::metadata(path).await.map_err(map_io)?;
        let n_bytes = usize::try_from(metadata.len()).unwrap_or(usize::MAX);

        let if_named_pdf = derive_if_named_pdf(file_name.as_deref());
        let if_magic_pdf = if if_named_pdf || n_bytes == 0 {
            false
        } else {
            let mut v_header = Vec::with_capacity(V_MAGIC_PDF.len());
            tokio::fs::File::open(path)
                .await
                .map_err(map_io)?
                .take(V_MAGIC_PDF.len() as u64)
                .read_to_end(&mut v_header)
                .await
                .map_err(map_io)?;
            v_header.starts_with(V_MAGIC_PDF)
        };
        ensure_pdf_type(n_bytes, if_named_pdf || if_magic_pdf)?;
        ensure_pdf_size(n_bytes)?;

        let bytes = tokio::fs::read(path).await.map_err(map_io)?;
        Self::from_bytes(file_name, bytes)
    }

    /// Validate an in-memory document.
    ///
    /// The type is accepted from a `.pdf` file name or the `%PDF-` header;
    /// the type check runs before the size check.
    ///
    /// # Errors
    ///
    /// [`AiError::InvalidInput`] with a user-facing message.
    pub fn from_bytes(file_name: Option<String>, bytes: Vec<u8>) -> Result<Self, AiError> {
        let if_pdf =
            derive_if_named_pdf(file_name.as_deref()) || bytes.starts_with(V_MAGIC_PDF);
        ensure_pdf_type(bytes.len(), if_pdf)?;
        ensure_pdf_size(bytes.len())?;

        log::debug!(
            "Accepted document {:?} ({} bytes)",
            file_name.as_deref().unwrap_or("<unnamed>"),
            bytes.len()
        );
        Ok(Self {
            file_name,
            mime_type: C_MIME_PDF.to_string(),
            bytes,
        })
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the document has no bytes. Never true after validation.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn derive_if_named_pdf(file_name: Option<&str>) -> bool {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn ensure_pdf_type(n_bytes: usize, if_pdf: bool) -> Result<(), AiError> {
    if n_bytes == 0 || !if_pdf {
        return Err(AiError::InvalidInput {
            message: "Please upload a valid PDF file.".to_string(),
        });
    }
    Ok(())
}

fn ensure_pdf_size(n_bytes: usize) -> Result<(), AiError> {
    if n_bytes > N_BYTES_PDF_MAX {
        return Err(AiError::InvalidInput {
            message: format!(
                "File is too large (Max {}MB).",
                N_BYTES_PDF_MAX / (1024 * 1024)
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_pdf_by_name_or_magic() {
        let doc = SpecPdfDocument::from_bytes(Some("10-K.PDF".to_string()), b"data".to_vec())
            .expect("named pdf");
        assert_eq!(doc.mime_type, "application/pdf");

        let doc = SpecPdfDocument::from_bytes(None, b"%PDF-1.7\n...".to_vec()).expect("magic");
        assert_eq!(doc.file_name, None);
        assert_eq!(doc.len(), 12);
    }

    #[test]
    fn test_rejects_other_types_before_size() {
        let err = SpecPdfDocument::from_bytes(Some("report.docx".to_string()), vec![0; 10])
            .expect_err("not a pdf");
        assert_eq!(err.to_string(), "Please upload a valid PDF file.");

        let err = SpecPdfDocument::from_bytes(Some("empty.pdf".to_string()), vec![])
            .expect_err("empty");
        assert_eq!(err.to_string(), "Please upload a valid PDF file.");

        let err = SpecPdfDocument::from_bytes(
            Some("big.txt".to_string()),
            vec![0; N_BYTES_PDF_MAX + 1],
        )
        .expect_err("wrong type wins");
        assert_eq!(err.to_string(), "Please upload a valid PDF file.");
    }

    #[test]
    fn test_rejects_oversized_pdf() {
        let mut v_bytes = V_MAGIC_PDF.to_vec();
        v_bytes.resize(N_BYTES_PDF_MAX + 1, b' ');
        let err = SpecPdfDocument::from_bytes(None, v_bytes).expect_err("too large");
        assert_eq!(err.to_string(), "File is too large (Max 20MB).");

        let mut v_bytes = V_MAGIC_PDF.to_vec();
        v_bytes.resize(N_BYTES_PDF_MAX, b' ');
        assert!(SpecPdfDocument::from_bytes(None, v_bytes).is_ok());
    }

    fn derive_temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("finextract_doc_{}_{name}", std::process::id()))
    }

    #[tokio::test]
    async fn test_from_path_reports_missing_file() {
        let path = std::env::temp_dir().join("finextract_missing_input_0.pdf");
        let err = SpecPdfDocument::from_path(&path).await.expect_err("missing");
        assert!(matches!(err, AiError::Io { .. }));
    }

    #[tokio::test]
    async fn test_from_path_rejects_oversized_file_from_metadata() {
        let path = derive_temp_path("sparse.pdf");
        let file = std::fs::File::create(&path).expect("create sparse file");
        file.set_len(N_BYTES_PDF_MAX as u64 * 64)
            .expect("extend sparse file");
        drop(file);

        let result = SpecPdfDocument::from_path(&path).await;
        let _ = std::fs::remove_file(&path);

        let err = result.expect_err("too large");
        assert_eq!(err.to_string(), "File is too large (Max 20MB).");
    }

    #[tokio::test]
    async fn test_from_path_checks_header_of_unnamed_pdf() {
        let path_magic = derive_temp_path("scan.bin");
        std::fs::write(&path_magic, b"%PDF-1.7\n").expect("write magic");
        let path_text = derive_temp_path("notes.txt");
        std::fs::write(&path_text, b"plain text").expect("write text");

        let doc = SpecPdfDocument::from_path(&path_magic).await;
        let err = SpecPdfDocument::from_path(&path_text).await;
        let _ = std::fs::remove_file(&path_magic);
        let _ = std::fs::remove_file(&path_text);

        let doc = doc.expect("magic header accepted");
        assert!(doc.file_name.as_deref().is_some_and(|name| name.ends_with("scan.bin")));
        assert_eq!(doc.len(), 9);
        assert_eq!(
            err.expect_err("text rejected").to_string(),
            "Please upload a valid PDF file."
        );
    }
}
