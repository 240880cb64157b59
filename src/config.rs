//! Pipeline tuning knobs.
//!
//! Every threshold the pipeline uses is a named constant here, and the
//! overridable ones are collected in [`PipelineConfig`].

use crate::cli::ThemeMode;
use crate::error::ConfigError;

/// Default number of palette entries extracted from an image.
pub const DEFAULT_PALETTE_SIZE: usize = 30;

/// Longest edge, in pixels, of the working sample.
pub const DEFAULT_MAX_SAMPLE_DIM: u32 = 500;

/// WCAG AA body-text contrast between foreground and background.
pub const DEFAULT_MIN_CONTRAST: f32 = 4.5;

/// Minimum CIEDE2000 distance between any two ANSI colors.
pub const DEFAULT_MIN_ANSI_DISTANCE: f32 = 5.0;

/// Palette entries closer than this (CIEDE2000) are merged.
pub const DEFAULT_MERGE_DISTANCE: f32 = 3.0;

/// Largest accepted minimum ANSI distance. Sixteen colors can always be
/// spread this far apart within sRGB; much beyond it they cannot.
pub const MAX_MIN_ANSI_DISTANCE: f32 = 12.0;

/// Narrowest accepted alert hue range, in degrees. Narrower ranges can
/// miss every 8-bit color of sufficient chroma.
pub const MIN_ALERT_HUE_WIDTH: f32 = 10.0;

/// Largest palette `kmeans_colors` can index (cluster ids are `u8`).
pub const MAX_PALETTE_SIZE: usize = u8::MAX as usize;

/// An Oklch hue interval, walked clockwise from `start` to `end`.
/// `start > end` wraps through 0°.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HueRange {
    pub start: f32,
    pub end: f32,
}

impl HueRange {
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Reds and oranges: 350° through 70° in Oklch.
    pub const ALERT: HueRange = HueRange::new(350.0, 70.0);

    pub fn contains(&self, hue: f32) -> bool {
        let hue = hue.rem_euclid(360.0);
        let (start, end) = (self.start.rem_euclid(360.0), self.end.rem_euclid(360.0));
        if start <= end {
            hue >= start && hue <= end
        } else {
            hue >= start || hue <= end
        }
    }

    /// Angular extent of the interval, in [0, 360).
    pub fn width(&self) -> f32 {
        (self.end - self.start).rem_euclid(360.0)
    }

    /// Midpoint of the interval.
    pub fn center(&self) -> f32 {
        (self.start + self.width() / 2.0).rem_euclid(360.0)
    }
}

/// Overridable pipeline configuration. No other state feeds the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Upper bound on extracted palette entries (`K`).
    pub palette_size: usize,
    /// Longest edge of the working sample, in pixels.
    pub max_sample_dim: u32,
    /// Minimum WCAG contrast ratio between foreground and background.
    pub min_contrast: f32,
    /// Minimum CIEDE2000 distance between any two ANSI colors.
    pub min_ansi_distance: f32,
    /// Palette entries closer than this are merged.
    pub merge_distance: f32,
    /// Hue interval the urgent border must fall in.
    pub alert_hue: HueRange,
    /// Force a dark or light scheme; detected from the image when `None`.
    pub mode: Option<ThemeMode>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            palette_size: DEFAULT_PALETTE_SIZE,
            max_sample_dim: DEFAULT_MAX_SAMPLE_DIM,
            min_contrast: DEFAULT_MIN_CONTRAST,
            min_ansi_distance: DEFAULT_MIN_ANSI_DISTANCE,
            merge_distance: DEFAULT_MERGE_DISTANCE,
            alert_hue: HueRange::ALERT,
            mode: None,
        }
    }
}

impl PipelineConfig {
    /// Reject values that no scheme can satisfy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=MAX_MIN_ANSI_DISTANCE).contains(&self.min_ansi_distance) {
            return Err(ConfigError::AnsiDistanceOutOfRange {
                value: self.min_ansi_distance,
                max: MAX_MIN_ANSI_DISTANCE,
            });
        }
        if !(1.0..=21.0).contains(&self.min_contrast) {
            return Err(ConfigError::ContrastOutOfRange {
                value: self.min_contrast,
            });
        }
        let width = self.alert_hue.width();
        if width < MIN_ALERT_HUE_WIDTH {
            return Err(ConfigError::AlertHueTooNarrow {
                start: self.alert_hue.start,
                end: self.alert_hue.end,
                width,
                min: MIN_ALERT_HUE_WIDTH,
            });
        }
        Ok(())
    }

    /// Palette size clamped to what the clusterer supports.
    pub fn effective_palette_size(&self) -> usize {
        self.palette_size.clamp(1, MAX_PALETTE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_range_wraps_through_zero() {
        let range = HueRange::ALERT;
        assert!(range.contains(0.0));
        assert!(range.contains(355.0));
        assert!(range.contains(29.0));
        assert!(range.contains(70.0));
        assert!(!range.contains(110.0));
        assert!(!range.contains(264.0));
    }

    #[test]
    fn non_wrapping_range() {
        let range = HueRange::new(100.0, 200.0);
        assert!(range.contains(150.0));
        assert!(!range.contains(50.0));
        assert_eq!(range.center(), 150.0);
    }

    #[test]
    fn center_of_wrapping_range() {
        assert_eq!(HueRange::ALERT.center(), 30.0);
    }

    #[test]
    fn palette_size_is_clamped() {
        let mut config = PipelineConfig {
            palette_size: 0,
            ..PipelineConfig::default()
        };
        assert_eq!(config.effective_palette_size(), 1);
        config.palette_size = 10_000;
        assert_eq!(config.effective_palette_size(), MAX_PALETTE_SIZE);
        assert_eq!(PipelineConfig::default().effective_palette_size(), 30);
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(PipelineConfig::default().validate(), Ok(()));
        assert_eq!(HueRange::ALERT.width(), 80.0);
    }

    #[test]
    fn narrow_alert_range_is_rejected() {
        let config = PipelineConfig {
            alert_hue: HueRange::new(100.0, 101.0),
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::AlertHueTooNarrow { .. })
        ));

        let config = PipelineConfig {
            alert_hue: HueRange::new(355.0, 5.0),
            ..PipelineConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn ansi_distance_ceiling_is_enforced() {
        let at_ceiling = PipelineConfig {
            min_ansi_distance: MAX_MIN_ANSI_DISTANCE,
            ..PipelineConfig::default()
        };
        assert_eq!(at_ceiling.validate(), Ok(()));

        for value in [20.0, -1.0, f32::NAN] {
            let config = PipelineConfig {
                min_ansi_distance: value,
                ..PipelineConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::AnsiDistanceOutOfRange { .. })),
                "{value}"
            );
        }
    }

    #[test]
    fn unreachable_contrast_is_rejected() {
        let config = PipelineConfig {
            min_contrast: 22.0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ContrastOutOfRange { .. })
        ));
    }
}
