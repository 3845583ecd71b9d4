use thiserror::Error;

use crate::element::ElementId;

/// Errors raised by raster jobs, export and configuration loading.
///
/// Model mutators never fail; they report unknown ids through their return
/// value instead.
#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Failed to load image {location}: {reason}")]
    ImageLoad { location: String, reason: String },
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Invalid data URL: {0}")]
    DataUrl(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode image: {0}")]
    Encode(String),
    #[error("Invalid font data")]
    Font,
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Invalid canvas size {width}x{height}")]
    CanvasSize { width: u32, height: u32 },
    #[error("Invalid zoom range {min}..={max} with step {step}")]
    ZoomRange { min: f32, max: f32, step: f32 },
    #[error("Element {0} is not an image")]
    NotAnImage(ElementId),
}

pub type BoardResult<T> = Result<T, BoardError>;
