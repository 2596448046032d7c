//! Reading local files into attachments.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use mailpilot_remote::Attachment;
use mime_guess::MimeGuess;
use std::path::Path;

/// Largest file the backend can forward (Gmail's 15 MiB limit).
pub const MAX_ATTACHMENT_SIZE: u64 = 15 * 1024 * 1024;

/// Infers a MIME type from the file extension, defaulting to
/// `application/octet-stream`.
#[must_use]
pub fn mime_type_for(path: &Path) -> String {
    MimeGuess::from_path(path).first_or_octet_stream().to_string()
}

/// Reads `path` into an enabled, base64-encoded attachment.
///
/// # Errors
///
/// Returns [`Error::AttachmentTooLarge`] for files over
/// [`MAX_ATTACHMENT_SIZE`], or an I/O error if the file cannot be read.
pub async fn read_attachment(path: impl AsRef<Path>) -> Result<Attachment> {
    let path = path.as_ref();

    let size = tokio::fs::metadata(path).await?.len();
    if size > MAX_ATTACHMENT_SIZE {
        return Err(Error::AttachmentTooLarge {
            path: path.to_path_buf(),
            size,
            limit: MAX_ATTACHMENT_SIZE,
        });
    }

    let data = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    Ok(Attachment::new(
        path.display().to_string(),
        file_name,
        BASE64_STANDARD.encode(data),
        mime_type_for(path),
    ))
}

/// Reads every path, skipping (and logging) files that cannot be attached.
///
/// Order of the returned attachments follows `paths`.
pub async fn read_attachments<I, P>(paths: I) -> Vec<Attachment>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut attachments = Vec::new();
    for path in paths {
        let path = path.as_ref();
        match read_attachment(path).await {
            Ok(attachment) => attachments.push(attachment),
            Err(e) => tracing::error!("Failed to read attachment {}: {e}", path.display()),
        }
    }
    tracing::info!("Loaded {} attachments", attachments.len());
    attachments
}
