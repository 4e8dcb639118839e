//! The advertisement under analysis: either an uploaded image or a remote URL.

use bytes::Bytes;
use std::path::Path;

use crate::domain::foundation::ValidationError;

/// Image extensions accepted for uploaded ads, with their MIME types.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
];

/// The ad creative sent for analysis.
///
/// Exactly one representation exists at a time, so the request body can never
/// carry both `ad_file` and `ad_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdInput {
    /// Binary image content uploaded as a file part.
    File {
        bytes: Bytes,
        filename: String,
        mime_type: String,
    },
    /// Image hosted elsewhere, referenced by URL.
    Url { url: String },
}

impl AdInput {
    /// Creates a file ad, inferring the MIME type from the filename.
    ///
    /// Falls back to `application/octet-stream` for unknown extensions;
    /// [`AdInput::validate`] rejects those.
    pub fn file(bytes: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let mime_type = image_mime_type(&filename)
            .unwrap_or("application/octet-stream")
            .to_string();
        Self::File {
            bytes: bytes.into(),
            filename,
            mime_type,
        }
    }

    /// Creates a URL ad.
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url {
            url: url.into().trim().to_string(),
        }
    }

    /// Reads an ad image from disk.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if the file cannot be read or is not an image
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ValidationError::invalid_format("ad_file", "path has no file name"))?
            .to_string();

        if image_mime_type(&filename).is_none() {
            return Err(ValidationError::invalid_format(
                "ad_file",
                format!("'{}' is not an image", filename),
            ));
        }

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ValidationError::invalid_format(
                "ad_file",
                format!("cannot read {}: {}", path.display(), e),
            )
        })?;

        Ok(Self::file(bytes, filename))
    }

    /// Returns true for the uploaded-file variant.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }

    /// Short human label: the file name or the URL.
    pub fn label(&self) -> &str {
        match self {
            Self::File { filename, .. } => filename,
            Self::Url { url } => url,
        }
    }

    /// Checks the ad against upload rules.
    ///
    /// # Errors
    ///
    /// - `EmptyField` for an empty file, filename or URL
    /// - `InvalidFormat` for a non-image file or non-http(s) URL
    /// - `TooLarge` if the file exceeds `max_file_bytes`
    pub fn validate(&self, max_file_bytes: u64) -> Result<(), ValidationError> {
        match self {
            Self::File {
                bytes,
                filename,
                mime_type,
            } => {
                if filename.trim().is_empty() {
                    return Err(ValidationError::empty_field("ad_file.filename"));
                }
                if bytes.is_empty() {
                    return Err(ValidationError::empty_field("ad_file"));
                }
                if !mime_type.starts_with("image/") {
                    return Err(ValidationError::invalid_format(
                        "ad_file",
                        format!("file must be an image, got {}", mime_type),
                    ));
                }
                let size = bytes.len() as u64;
                if size > max_file_bytes {
                    return Err(ValidationError::too_large("ad_file", max_file_bytes, size));
                }
                Ok(())
            }
            Self::Url { url } => {
                if url.is_empty() {
                    return Err(ValidationError::empty_field("ad_url"));
                }
                require_http_url("ad_url", url)
            }
        }
    }
}

/// Returns the image MIME type for a filename's extension, if it is an image.
pub fn image_mime_type(filename: &str) -> Option<&'static str> {
    let ext = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, mime)| *mime)
}

pub(crate) fn require_http_url(field: &str, url: &str) -> Result<(), ValidationError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::invalid_format(
            field,
            "must be a valid HTTP/HTTPS URL",
        ))
    }
}
