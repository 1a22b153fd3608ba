use bytes::Bytes;

/// An uploaded résumé file. The bytes are opaque to everything except the
/// backend's text extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub bytes: Bytes,
}

impl Document {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Lowercased extension of the file name, without the dot.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// True when there is nothing to upload: no name or no content.
    pub fn is_empty(&self) -> bool {
        self.file_name.trim().is_empty() || self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased() {
        let doc = Document::new("Resume.PDF", "x");
        assert_eq!(doc.extension().as_deref(), Some("pdf"));
    }

    #[test]
    fn test_extension_missing() {
        assert_eq!(Document::new("resume", "x").extension(), None);
        assert_eq!(Document::new(".bashrc", "x").extension(), None);
        assert_eq!(Document::new("resume.", "x").extension(), None);
    }

    #[test]
    fn test_empty_document() {
        assert!(Document::new("resume.txt", "").is_empty());
        assert!(Document::new("  ", "content").is_empty());
        assert!(!Document::new("resume.txt", "content").is_empty());
    }
}
