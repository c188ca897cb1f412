//! Locally selected images and the checks they pass before upload.

use std::path::{Path, PathBuf};

use crate::error::ValidationError;

/// 10 MiB
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// Name stem of the multipart part, e.g. `photo.png`.
const UPLOAD_FILE_STEM: &str = "photo";

/// An image the user picked, either a file on disk or bytes without a name
/// (clipboard paste, drag-drop).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedImage {
    File { path: PathBuf, size: Option<u64> },
    Stream { bytes: Vec<u8>, media_type: String },
}

impl SelectedImage {
    /// Size comes from file metadata; unreadable metadata leaves it unknown.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let size = std::fs::metadata(&path).ok().map(|meta| meta.len());
        SelectedImage::File { path, size }
    }

    /// The media type is stored normalized, as it will be validated and sent.
    pub fn from_bytes(bytes: Vec<u8>, media_type: &str) -> Self {
        SelectedImage::Stream {
            bytes,
            media_type: normalize_media_type(media_type),
        }
    }

    pub fn size(&self) -> Option<u64> {
        match self {
            SelectedImage::File { size, .. } => *size,
            SelectedImage::Stream { bytes, .. } => Some(bytes.len() as u64),
        }
    }

    /// Lowercase file extension, for file sources only.
    pub fn extension(&self) -> Option<String> {
        match self {
            SelectedImage::File { path, .. } => extension_of(path),
            SelectedImage::Stream { .. } => None,
        }
    }

    /// Short label for display and snapshots.
    pub fn describe(&self) -> String {
        match self {
            SelectedImage::File { path, .. } => path.display().to_string(),
            SelectedImage::Stream { media_type, .. } => format!("pasted {}", media_type),
        }
    }

    /// `photo.<ext>`, where `<ext>` is the file extension or the media subtype.
    pub fn upload_file_name(&self) -> String {
        let ext = match self {
            SelectedImage::File { path, .. } => extension_of(path).unwrap_or_default(),
            SelectedImage::Stream { media_type, .. } => {
                media_subtype(&normalize_media_type(media_type)).to_string()
            }
        };
        format!("{}.{}", UPLOAD_FILE_STEM, ext)
    }

    /// `image/<ext>` for files, the normalized declared type for streams.
    pub fn upload_media_type(&self) -> String {
        match self {
            SelectedImage::File { path, .. } => {
                format!("image/{}", extension_of(path).unwrap_or_default())
            }
            SelectedImage::Stream { media_type, .. } => normalize_media_type(media_type),
        }
    }

    pub async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match self {
            SelectedImage::File { path, .. } => tokio::fs::read(path).await,
            SelectedImage::Stream { bytes, .. } => Ok(bytes.clone()),
        }
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

/// ` Image/PNG; charset=binary` -> `image/png`
fn normalize_media_type(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

fn media_subtype(media_type: &str) -> &str {
    media_type
        .split_once('/')
        .map(|(_, sub)| sub)
        .unwrap_or(media_type)
}

/// Check size first, then type. Unknown sizes pass.
pub fn validate_image(image: &SelectedImage) -> Result<(), ValidationError> {
    if let Some(size) = image.size().filter(|size| *size > MAX_IMAGE_BYTES) {
        return Err(ValidationError::TooLarge {
            size,
            limit: MAX_IMAGE_BYTES,
        });
    }

    let supported = match image {
        SelectedImage::File { path, .. } => extension_of(path)
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str())),
        SelectedImage::Stream { media_type, .. } => normalize_media_type(media_type)
            .strip_prefix("image/")
            .is_some_and(|sub| !sub.trim().is_empty()),
    };

    if !supported {
        return Err(ValidationError::UnsupportedType {
            name: image.describe(),
        });
    }

    Ok(())
}
