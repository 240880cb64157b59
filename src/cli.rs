use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    PipelineConfig, DEFAULT_MAX_SAMPLE_DIM, DEFAULT_MIN_ANSI_DISTANCE, DEFAULT_MIN_CONTRAST,
    DEFAULT_PALETTE_SIZE, MAX_MIN_ANSI_DISTANCE,
};

/// Generate terminal and window-manager color schemes from images.
#[derive(Parser, Debug)]
#[command(name = "chromatic", version, about)]
pub struct Args {
    /// Path to the input image
    #[arg(required_unless_present = "import")]
    pub image: Option<PathBuf>,

    /// Repair an existing JSON scheme instead of reading an image
    #[arg(long, conflicts_with = "image")]
    pub import: Option<PathBuf>,

    /// Scheme name (defaults to the input filename stem)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Force dark or light mode (auto-detected if omitted)
    #[arg(short, long, value_enum)]
    pub mode: Option<ThemeMode>,

    /// Write the scheme to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the scheme to <name>.json in the current directory
    #[arg(long, conflicts_with = "output")]
    pub save: bool,

    /// Print a colored terminal preview of the scheme to stderr
    #[arg(long)]
    pub preview: bool,

    /// Maximum number of extracted palette colors
    #[arg(short = 'k', long = "colors", default_value_t = DEFAULT_PALETTE_SIZE)]
    pub colors: usize,

    /// Minimum foreground/background contrast ratio (1 to 21)
    #[arg(long, default_value_t = DEFAULT_MIN_CONTRAST, value_parser = parse_contrast)]
    pub min_contrast: f32,

    /// Minimum perceptual distance (CIEDE2000) between ANSI colors (0 to 12)
    #[arg(long, default_value_t = DEFAULT_MIN_ANSI_DISTANCE, value_parser = parse_min_distance)]
    pub min_distance: f32,

    /// Longest edge of the pixel sample
    #[arg(long, default_value_t = DEFAULT_MAX_SAMPLE_DIM)]
    pub max_dim: u32,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Pipeline configuration with command-line overrides applied.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            palette_size: self.colors,
            max_sample_dim: self.max_dim,
            min_contrast: self.min_contrast,
            min_ansi_distance: self.min_distance,
            mode: self.mode,
            ..PipelineConfig::default()
        }
    }

    /// Name used for `--save`, falling back to the input file stem.
    pub fn scheme_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.image
            .as_ref()
            .or(self.import.as_ref())
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "colorscheme".to_string())
    }
}

fn parse_bounded(s: &str, lo: f32, hi: f32) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if (lo..=hi).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in {lo}..={hi}"))
    }
}

fn parse_contrast(s: &str) -> Result<f32, String> {
    parse_bounded(s, 1.0, 21.0)
}

fn parse_min_distance(s: &str) -> Result<f32, String> {
    parse_bounded(s, 0.0, MAX_MIN_ANSI_DISTANCE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ThemeMode {
    Dark,
    Light,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pipeline_defaults() {
        let args = Args::parse_from(["chromatic", "wall.png"]);
        assert_eq!(args.pipeline_config(), PipelineConfig::default());
        assert_eq!(args.scheme_name(), "wall");
    }

    #[test]
    fn overrides_flow_into_config() {
        let args = Args::parse_from([
            "chromatic",
            "wall.png",
            "-k",
            "12",
            "--min-contrast",
            "7",
            "--mode",
            "light",
            "--name",
            "sunset",
        ]);
        let config = args.pipeline_config();
        assert_eq!(config.palette_size, 12);
        assert_eq!(config.min_contrast, 7.0);
        assert_eq!(config.mode, Some(ThemeMode::Light));
        assert_eq!(args.scheme_name(), "sunset");
    }

    #[test]
    fn image_or_import_is_required() {
        assert!(Args::try_parse_from(["chromatic"]).is_err());
        let args = Args::try_parse_from(["chromatic", "--import", "scheme.json"]).unwrap();
        assert!(args.image.is_none());
        assert_eq!(args.scheme_name(), "scheme");
    }

    #[test]
    fn save_conflicts_with_output() {
        assert!(Args::try_parse_from(["chromatic", "a.png", "--save", "-o", "x.json"]).is_err());
    }

    #[test]
    fn out_of_range_thresholds_are_rejected() {
        for args in [
            ["chromatic", "wall.png", "--min-distance", "20"],
            ["chromatic", "wall.png", "--min-distance", "-1"],
            ["chromatic", "wall.png", "--min-contrast", "30"],
            ["chromatic", "wall.png", "--min-contrast", "abc"],
        ] {
            assert!(Args::try_parse_from(args).is_err(), "{args:?}");
        }
        let args = Args::parse_from(["chromatic", "wall.png", "--min-distance", "12"]);
        assert_eq!(args.pipeline_config().min_ansi_distance, MAX_MIN_ANSI_DISTANCE);
    }
}
