use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a pipeline run. No partial scheme is ever returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    /// A configuration value no scheme can satisfy.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The bitmap is zero-sized or its buffer does not match its dimensions.
    #[error("invalid bitmap: {reason}")]
    ImageDecode { reason: String },

    /// Sampling left no opaque pixels to extract colors from.
    #[error("no usable pixels: the image is empty or fully transparent")]
    Extraction,
}

/// A [`PipelineConfig`](crate::config::PipelineConfig) value out of its
/// supported range.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("alert hue range {start}°..{end}° spans {width:.1}°, at least {min}° is required")]
    AlertHueTooNarrow {
        start: f32,
        end: f32,
        width: f32,
        min: f32,
    },

    #[error("minimum ANSI distance {value} is outside 0..={max}")]
    AnsiDistanceOutOfRange { value: f32, max: f32 },

    #[error("minimum contrast {value} is outside 1..=21")]
    ContrastOutOfRange { value: f32 },
}

/// Error returned when a hex color string cannot be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseColorError {
    #[error("invalid hex color {0:?}: expected 6 hex digits")]
    InvalidLength(String),

    #[error("invalid hex color {0:?}: not a hexadecimal number")]
    InvalidDigit(String),
}

/// Errors from reading or writing a portable scheme document.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("malformed scheme document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
