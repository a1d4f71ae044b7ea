//! Pre-network validation: file type, file size, pasted-text length.
//!
//! Everything here runs before the first byte leaves the machine, so a bad
//! selection surfaces instantly with the specific violated constraint
//! instead of a round-trip later.

use crate::config::FlowConfig;
use crate::error::ProfileAiError;
use std::path::Path;

/// MIME types accepted for a CV import.
pub const CV_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// MIME types accepted for supporting documents (id scans, references).
pub const DOCUMENT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "image/png",
    "image/jpeg",
];

/// What the uploaded file is for; decides the accepted MIME set and the
/// `fileType` tag sent with the upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPurpose {
    Cv,
    SupportingDocument,
}

impl UploadPurpose {
    /// MIME types accepted for this purpose.
    pub fn allowed_mime_types(&self) -> &'static [&'static str] {
        match self {
            UploadPurpose::Cv => CV_MIME_TYPES,
            UploadPurpose::SupportingDocument => DOCUMENT_MIME_TYPES,
        }
    }

    /// The `fileType` tag the upload endpoint expects.
    pub fn tag(&self) -> &'static str {
        match self {
            UploadPurpose::Cv => "cv",
            UploadPurpose::SupportingDocument => "document",
        }
    }
}

/// An in-memory file ready for upload.
#[derive(Debug, Clone)]
pub struct CvFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl CvFile {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Load a file from disk, deriving the MIME type from the extension.
    ///
    /// Unknown extensions get `application/octet-stream`, which validation
    /// then rejects with the full list of accepted types.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ProfileAiError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ProfileAiError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "cv".to_string());
        Ok(Self {
            mime_type: mime_from_extension(path).to_string(),
            file_name,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Map a file extension to the MIME type the upload endpoint understands.
pub fn mime_from_extension(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Reject a file before upload if its type or size is out of bounds.
pub fn validate_file(
    file: &CvFile,
    purpose: UploadPurpose,
    config: &FlowConfig,
) -> Result<(), ProfileAiError> {
    let allowed = purpose.allowed_mime_types();
    if !allowed.contains(&file.mime_type.as_str()) {
        return Err(ProfileAiError::UnsupportedFileType {
            mime: file.mime_type.clone(),
            accepted: allowed.join(", "),
        });
    }
    if file.size() > config.max_file_bytes {
        return Err(ProfileAiError::FileTooLarge {
            size: file.size(),
            limit: config.max_file_bytes,
        });
    }
    Ok(())
}

/// Reject pasted text before the parse call if it is out of bounds.
pub fn validate_pasted_text(text: &str, config: &FlowConfig) -> Result<(), ProfileAiError> {
    let len = text.chars().count();
    if len < config.min_text_chars {
        return Err(ProfileAiError::TextTooShort {
            len,
            min: config.min_text_chars,
        });
    }
    if len > config.max_text_chars {
        return Err(ProfileAiError::TextTooLong {
            len,
            max: config.max_text_chars,
        });
    }
    Ok(())
}
