pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod preview;
pub mod scheme;

pub use pipeline::{derive_scheme, Bitmap};
