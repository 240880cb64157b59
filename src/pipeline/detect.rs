use crate::cli::ThemeMode;
use crate::pipeline::extract::PaletteEntry;

/// Weighted Oklch lightness below which an image counts as dark.
const DARK_THRESHOLD: f32 = 0.5;

/// Detect whether the image is predominantly dark or light from the
/// weight-averaged lightness of its palette.
pub fn detect_mode(palette: &[PaletteEntry]) -> ThemeMode {
    let (sum, weight) = palette.iter().fold((0.0f32, 0.0f32), |(sum, weight), e| {
        (sum + e.color.lightness() * e.weight, weight + e.weight)
    });
    if weight <= 0.0 || sum / weight < DARK_THRESHOLD {
        ThemeMode::Dark
    } else {
        ThemeMode::Light
    }
}
