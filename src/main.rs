use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chromatic::cli::Args;
use chromatic::pipeline::optimize::optimize;
use chromatic::scheme::ColorScheme;
use chromatic::{derive_scheme, export, preview, Bitmap};

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "chromatic=debug"
    } else {
        "chromatic=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let config = args.pipeline_config();
    config.validate()?;
    let scheme = match (&args.import, &args.image) {
        (Some(path), _) => {
            let imported = export::read_from(path)
                .with_context(|| format!("failed to import scheme from {}", path.display()))?;
            optimize(&imported, &config)
        }
        (None, Some(path)) => {
            let bitmap = load_bitmap(path)?;
            derive_scheme(&bitmap, &config)
                .with_context(|| format!("failed to derive a scheme from {}", path.display()))?
        }
        (None, None) => anyhow::bail!("an image path or --import is required"),
    };

    if args.preview {
        let mut stderr = std::io::stderr().lock();
        preview::render(&mut stderr, &scheme).context("failed to render preview")?;
    }

    output(&args, &scheme)
}

/// Decode an image file into an RGBA bitmap.
fn load_bitmap(path: &Path) -> Result<Bitmap> {
    let img = image::open(path).with_context(|| {
        if !path.exists() {
            format!("file not found: {}", path.display())
        } else {
            format!(
                "unsupported or corrupt image: {}. Supported formats: PNG, JPEG, WebP, BMP, TIFF, GIF",
                path.display()
            )
        }
    })?;
    Ok(Bitmap::from(img.to_rgba8()))
}

fn output(args: &Args, scheme: &ColorScheme) -> Result<()> {
    let path = match (&args.output, args.save) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(PathBuf::from(format!("{}.json", args.scheme_name()))),
        (None, false) => None,
    };

    match path {
        Some(path) => {
            export::write_to(scheme, &path)?;
            eprintln!("Scheme written to {}", path.display());
        }
        None => {
            let json = export::to_json(scheme)?;
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(json.as_bytes())
                .context("failed to write scheme to stdout")?;
        }
    }
    Ok(())
}
