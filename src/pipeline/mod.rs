pub mod assign;
pub mod contrast;
pub mod detect;
pub mod extract;
pub mod optimize;
pub mod sample;

pub use sample::Bitmap;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::scheme::ColorScheme;

/// Derive a complete 21-slot color scheme from a decoded bitmap.
///
/// Runs sampling, palette extraction, mode detection (unless `config.mode`
/// forces one), slot mapping and optimization. Either every slot is filled
/// or an error is returned.
pub fn derive_scheme(
    bitmap: &Bitmap,
    config: &PipelineConfig,
) -> Result<ColorScheme, PipelineError> {
    config.validate()?;
    let pixels = sample::sample_pixels(bitmap, config.max_sample_dim)?;
    tracing::debug!(
        width = bitmap.width,
        height = bitmap.height,
        sampled = pixels.len(),
        "sampled bitmap"
    );

    let palette = extract::extract_colors(
        &pixels,
        config.effective_palette_size(),
        config.merge_distance,
    )?;

    let mode = config
        .mode
        .unwrap_or_else(|| detect::detect_mode(&palette));
    tracing::debug!(?mode, forced = config.mode.is_some(), "theme mode");

    let mapped = assign::assign_slots(&palette, mode);
    let scheme = optimize::optimize(&mapped, config);
    tracing::debug!(
        background = %scheme.background,
        foreground = %scheme.foreground,
        "derived scheme"
    );
    Ok(scheme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn solid_bitmap_fills_every_slot() {
        let bitmap = Bitmap::solid(1, 1, [40, 90, 160, 255]);
        let scheme = derive_scheme(&bitmap, &PipelineConfig::default()).unwrap();
        assert_eq!(scheme.iter().count(), 21);
        assert!(Color::contrast_ratio(&scheme.foreground, &scheme.background) >= 4.5);
    }

    #[test]
    fn transparent_bitmap_is_an_extraction_error() {
        let bitmap = Bitmap::solid(8, 8, [255, 0, 0, 0]);
        assert_eq!(
            derive_scheme(&bitmap, &PipelineConfig::default()),
            Err(PipelineError::Extraction)
        );
    }

    #[test]
    fn malformed_bitmap_is_a_decode_error() {
        let bitmap = Bitmap::new(4, 4, vec![0; 10]);
        assert!(matches!(
            derive_scheme(&bitmap, &PipelineConfig::default()),
            Err(PipelineError::ImageDecode { .. })
        ));
    }

    #[test]
    fn unsatisfiable_config_is_rejected_up_front() {
        let bitmap = Bitmap::solid(2, 2, [40, 90, 160, 255]);
        let config = PipelineConfig {
            alert_hue: crate::config::HueRange::new(100.0, 101.0),
            ..PipelineConfig::default()
        };
        assert!(matches!(
            derive_scheme(&bitmap, &config),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn forced_mode_overrides_detection() {
        let bitmap = Bitmap::solid(4, 4, [10, 10, 10, 255]);
        let config = PipelineConfig {
            mode: Some(crate::cli::ThemeMode::Light),
            ..PipelineConfig::default()
        };
        let scheme = derive_scheme(&bitmap, &config).unwrap();
        assert!(scheme.background.lightness() > 0.5, "{}", scheme.background);
    }
}
