//! Upload gateway: base64-encode the document and submit it.
//!
//! The upload endpoint takes the file inline in the JSON body as standard
//! base64 (no data-URI prefix), plus the original filename, MIME type, and
//! a purpose tag. Validation has already happened in
//! [`crate::pipeline::validate`]; this stage only encodes and transmits.
//!
//! Extraction-specific failures ("bad XRef", "corrupted", ...) are
//! classified by [`crate::error::ProfileAiError::from_server_message`]
//! inside the backend's response decoding, so by the time an error reaches
//! this layer it already carries the paste-fallback signal.

use crate::api::{ProfileApi, UploadRequest, UploadResponse};
use crate::config::FlowConfig;
use crate::error::ProfileAiError;
use crate::pipeline::validate::{self, CvFile, UploadPurpose};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;
use tracing::{debug, info};

/// Validate, encode, and upload a document; returns the source-file id.
pub async fn upload_document(
    api: &Arc<dyn ProfileApi>,
    file: &CvFile,
    purpose: UploadPurpose,
    config: &FlowConfig,
) -> Result<UploadResponse, ProfileAiError> {
    validate::validate_file(file, purpose, config)?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_upload_start(&file.file_name, file.size());
    }

    let request = UploadRequest {
        file_data: STANDARD.encode(&file.bytes),
        file_name: file.file_name.clone(),
        mime_type: file.mime_type.clone(),
        file_type: purpose.tag().to_string(),
    };
    debug!(
        "Encoded {} ({} bytes → {} base64 chars)",
        file.file_name,
        file.size(),
        request.file_data.len()
    );

    let response = api.upload_cv(&request).await?;
    info!("Uploaded {} as {}", file.file_name, response.source_file_id);

    if let Some(ref cb) = config.progress_callback {
        cb.on_upload_complete(&response.source_file_id);
    }

    Ok(response)
}
