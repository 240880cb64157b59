use std::collections::BTreeSet;

use kmeans_colors::get_kmeans_hamerly;
use palette::Lab;

use crate::color::Color;
use crate::error::PipelineError;

/// A color extracted from the image with its share of the sampled pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteEntry {
    pub color: Color,
    pub weight: f32,
}

const MAX_ITER: usize = 20;
const CONVERGE: f32 = 5.0;
const SEED: u64 = 42;

/// Cluster the sampled pixels into at most `k` weighted colors.
///
/// Runs Hamerly k-means in CIELAB with a fixed-seed k-means++ start, so the
/// result depends only on the input. `k` is capped at the number of distinct
/// colors in the sample. Entries closer than `merge_distance` (CIEDE2000) are
/// merged, and the result is sorted by descending weight.
pub fn extract_colors(
    pixels: &[Color],
    k: usize,
    merge_distance: f32,
) -> Result<Vec<PaletteEntry>, PipelineError> {
    if pixels.is_empty() {
        return Err(PipelineError::Extraction);
    }

    let distinct: BTreeSet<Color> = pixels.iter().copied().collect();
    let k = k.clamp(1, distinct.len());
    let total = pixels.len() as f32;

    let mut entries = if distinct.len() == 1 {
        vec![PaletteEntry {
            color: pixels[0],
            weight: 1.0,
        }]
    } else if k == 1 {
        vec![PaletteEntry {
            color: mean_color(pixels),
            weight: 1.0,
        }]
    } else {
        let lab: Vec<Lab> = pixels.iter().map(|c| c.to_lab()).collect();
        let result = get_kmeans_hamerly(k, MAX_ITER, CONVERGE, false, &lab, SEED);

        // One accumulation pass over the assignment index array.
        let counts = result
            .indices
            .iter()
            .fold(vec![0u32; result.centroids.len()], |mut counts, &idx| {
                counts[idx as usize] += 1;
                counts
            });

        result
            .centroids
            .iter()
            .zip(&counts)
            .filter(|(_, count)| **count > 0)
            .map(|(lab, &count)| PaletteEntry {
                color: Color::from_lab(*lab),
                weight: count as f32 / total,
            })
            .collect()
    };

    sort_by_weight(&mut entries);
    let mut entries = merge_similar(entries, merge_distance);
    sort_by_weight(&mut entries);

    tracing::debug!(
        sampled = pixels.len(),
        distinct = distinct.len(),
        k,
        palette = entries.len(),
        "extracted palette"
    );

    Ok(entries)
}

/// Mean color of the sample, averaged in CIELAB.
fn mean_color(pixels: &[Color]) -> Color {
    let (l, a, b) = pixels.iter().fold((0.0f64, 0.0f64, 0.0f64), |acc, c| {
        let lab = c.to_lab();
        (acc.0 + lab.l as f64, acc.1 + lab.a as f64, acc.2 + lab.b as f64)
    });
    let n = pixels.len() as f64;
    Color::from_lab(Lab::new((l / n) as f32, (a / n) as f32, (b / n) as f32))
}

/// Descending weight; equal weights fall back to the color value so the
/// order never depends on clustering internals.
fn sort_by_weight(entries: &mut [PaletteEntry]) {
    entries.sort_by(|a, b| {
        b.weight
            .total_cmp(&a.weight)
            .then_with(|| a.color.cmp(&b.color))
    });
}

/// Fold near-duplicates into the heaviest entry they are close to.
/// Expects `entries` sorted by descending weight.
fn merge_similar(entries: Vec<PaletteEntry>, merge_distance: f32) -> Vec<PaletteEntry> {
    let mut kept: Vec<PaletteEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match kept
            .iter_mut()
            .find(|k| Color::perceptual_distance(&k.color, &entry.color) < merge_distance)
        {
            Some(existing) => existing.weight += entry.weight,
            None => kept.push(entry),
        }
    }
    kept
}
