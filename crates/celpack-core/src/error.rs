use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CelpackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("PNG decoding error: {0}")]
    PngDecode(#[from] png::DecodingError),
    #[error("PNG encoding error: {0}")]
    PngEncode(#[from] png::EncodingError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("No files matching frame-<n>-layer-<n>.png in {}", .dir.display())]
    NoMatchingFiles { dir: PathBuf },
    #[error("Decoded images have no pixel area")]
    EmptyCanvas,
    #[error("There is no active sprite")]
    NoActiveSprite,
    #[error("The sprite must be saved to a file before exporting")]
    UnsavedSprite,
    #[error("The sprite has unsaved changes; save it before exporting")]
    ModifiedSprite,
    #[error("Palette bank analysis requires an indexed sprite")]
    NotIndexed,
    #[error("No cel at layer {layer}, frame {frame}")]
    CelNotFound { layer: usize, frame: u32 },
    #[error("Invalid sprite document: {0}")]
    InvalidDocument(String),
    #[error("Unsupported PNG: {0}")]
    UnsupportedPng(String),
}

pub type Result<T> = std::result::Result<T, CelpackError>;
