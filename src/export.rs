use std::path::Path;

use crate::error::ExportError;
use crate::scheme::ColorScheme;

/// Serialize a scheme as a pretty-printed JSON object with one
/// `"camelCaseSlot": "#rrggbb"` entry per slot.
pub fn to_json(scheme: &ColorScheme) -> Result<String, ExportError> {
    let mut out = serde_json::to_string_pretty(scheme)?;
    out.push('\n');
    Ok(out)
}

/// Parse a scheme document. Every one of the 21 slots must be present and
/// hold a valid hex color; unknown keys are ignored.
pub fn from_json(json: &str) -> Result<ColorScheme, ExportError> {
    Ok(serde_json::from_str(json)?)
}

pub fn write_to(scheme: &ColorScheme, path: &Path) -> Result<(), ExportError> {
    let content = to_json(scheme)?;
    std::fs::write(path, content).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "wrote scheme");
    Ok(())
}

pub fn read_from(path: &Path) -> Result<ColorScheme, ExportError> {
    let content = std::fs::read_to_string(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_json(&content)
}
