//! Repairing a mapped scheme so it is legible and unambiguous.
//!
//! Four invariants are enforced, each over its own set of slots, and each
//! repair only runs when its check fails. That makes [`optimize`] a fixed
//! point: running it on its own output changes nothing. The background is
//! never modified.

use palette::Oklch;

use crate::color::Color;
use crate::config::{HueRange, PipelineConfig};
use crate::pipeline::assign::role;
use crate::pipeline::contrast::enforce_contrast;
use crate::scheme::{ColorScheme, Slot};

/// Upper bound on sweeps over the ANSI pairs.
const MAX_SEPARATION_PASSES: usize = 64;

/// Hue increment, in degrees, when searching for a free spot.
const HUE_NUDGE: f32 = 10.0;

/// Lightness increment when searching for a free spot.
const LIGHTNESS_NUDGE: f32 = 0.03;

/// Largest number of hue / lightness increments tried in each direction.
const MAX_HUE_NUDGES: i32 = 18;
const MAX_LIGHTNESS_NUDGES: i32 = 33;

/// Chroma given to a neutral color when its hue has to move, and the
/// stronger chromas tried when no spot clears at that one.
const NUDGE_CHROMAS: [f32; 3] = [0.04, 0.10, 0.16];

/// Margin by which the active border must beat the inactive one.
const SALIENCE_MARGIN: f32 = 0.02;

/// Lightness gap opened between borders that are indistinguishable.
const BORDER_GAP: f32 = 0.15;

/// Below this chroma the urgent border has no meaningful hue.
const ALERT_MIN_CHROMA: f32 = 0.08;

/// Chroma of a replacement urgent border, before gamut mapping.
const ALERT_CHROMA: f32 = 0.17;

/// Lightness offsets tried, in order, around a replacement's target.
const ALERT_LIGHTNESS_OFFSETS: [f32; 9] = [0.0, 0.05, -0.05, 0.1, -0.1, 0.15, -0.15, 0.2, -0.2];

/// Repair `scheme` so that it satisfies the contrast, distinctness and
/// border invariants in `config`. Returns a new scheme; no slot is removed.
pub fn optimize(scheme: &ColorScheme, config: &PipelineConfig) -> ColorScheme {
    let mut out = *scheme;

    out.foreground = enforce_contrast(out.foreground, out.background, config.min_contrast);
    separate_ansi(&mut out, config.min_ansi_distance);
    order_borders(&mut out);
    out.urgent_border = enforce_alert_hue(out.urgent_border, out.background, &config.alert_hue);

    let remaining = ansi_collisions(&out.ansi(), config.min_ansi_distance);
    if !remaining.is_empty() {
        tracing::warn!(pairs = ?remaining, "ANSI colors still closer than the minimum distance");
    }
    debug_assert!(is_more_salient(out.active_border, out.inactive_border));
    debug_assert!(
        config.validate().is_err() || is_alert(out.urgent_border, &config.alert_hue),
        "urgent border {} outside a satisfiable alert range",
        out.urgent_border
    );

    out
}

/// Index pairs of ANSI colors closer than `min_distance`.
pub fn ansi_collisions(colors: &[Color; 16], min_distance: f32) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..colors.len() {
        for j in i + 1..colors.len() {
            if Color::perceptual_distance(&colors[i], &colors[j]) < min_distance {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Push apart every pair of ANSI colors closer than `min_distance`,
/// moving the member with the lower role priority.
fn separate_ansi(scheme: &mut ColorScheme, min_distance: f32) {
    let mut colors = scheme.ansi();
    let priorities = Slot::ANSI.map(|slot| role(slot).priority);
    let mut collisions = ansi_collisions(&colors, min_distance).len();

    for pass in 0..MAX_SEPARATION_PASSES {
        if collisions == 0 {
            break;
        }
        for i in 0..colors.len() {
            for j in i + 1..colors.len() {
                if Color::perceptual_distance(&colors[i], &colors[j]) >= min_distance {
                    continue;
                }
                let (anchor, mover) = if priorities[i] >= priorities[j] {
                    (i, j)
                } else {
                    (j, i)
                };
                let before = colors[mover];
                colors[mover] = find_free_spot(&colors, mover, min_distance)
                    .unwrap_or_else(|| step_away(before, colors[anchor]));
                tracing::trace!(
                    pass,
                    slot = %Slot::ANSI[mover],
                    from = %before,
                    to = %colors[mover],
                    "separated ANSI color"
                );
            }
        }
        let left = ansi_collisions(&colors, min_distance).len();
        if left >= collisions {
            tracing::debug!(pass, collisions = left, "ANSI separation stalled");
            break;
        }
        collisions = left;
    }

    for (slot, color) in Slot::ANSI.iter().zip(colors) {
        scheme.set(*slot, color);
    }
}

/// The smallest hue/lightness move of `colors[mover]` that clears every
/// other ANSI color by `min_distance`. Stronger chroma is only tried once
/// the whole grid fails at the weaker one.
fn find_free_spot(colors: &[Color; 16], mover: usize, min_distance: f32) -> Option<Color> {
    let origin = colors[mover].to_oklch();
    let l0 = origin.l.clamp(0.0, 1.0);
    let h0 = origin.hue.into_positive_degrees();

    let mut offsets: Vec<(i32, i32)> = (-MAX_HUE_NUDGES..=MAX_HUE_NUDGES)
        .flat_map(|dh| (-MAX_LIGHTNESS_NUDGES..=MAX_LIGHTNESS_NUDGES).map(move |dl| (dh, dl)))
        .filter(|&offset| offset != (0, 0))
        .collect();
    offsets.sort_by_key(|&(dh, dl)| (dh.abs() + dl.abs(), dh.abs(), dh, dl));

    let mut grid = NUDGE_CHROMAS
        .iter()
        .filter(|&&floor| floor == NUDGE_CHROMAS[0] || floor > origin.chroma)
        .flat_map(|&floor| offsets.iter().map(move |&offset| (floor, offset)));

    grid.find_map(|(floor, (dh, dl))| {
        let l = l0 + dl as f32 * LIGHTNESS_NUDGE;
        if !(0.0..=1.0).contains(&l) {
            return None;
        }
        let chroma = if dh == 0 && floor == NUDGE_CHROMAS[0] {
            origin.chroma
        } else {
            origin.chroma.max(floor)
        };
        let candidate = Color::from_oklch(Oklch::new(l, chroma, h0 + dh as f32 * HUE_NUDGE));
        let clear = colors
            .iter()
            .enumerate()
            .filter(|&(k, _)| k != mover)
            .all(|(_, other)| Color::perceptual_distance(&candidate, other) >= min_distance);
        clear.then_some(candidate)
    })
}

/// Fallback when no free spot exists: one lightness step away from `anchor`.
fn step_away(color: Color, anchor: Color) -> Color {
    let l = color.lightness();
    let anchor_l = anchor.lightness();
    let up = if l == anchor_l { l < 0.5 } else { l > anchor_l };
    let delta = if up { LIGHTNESS_NUDGE } else { -LIGHTNESS_NUDGE };
    if (0.0..=1.0).contains(&(l + delta)) {
        color.adjust_lightness(delta)
    } else {
        color.adjust_lightness(-delta)
    }
}

/// Whether `active` stands out from `inactive` by chroma or lightness.
pub fn is_more_salient(active: Color, inactive: Color) -> bool {
    let (a, i) = (active.to_oklch(), inactive.to_oklch());
    a.chroma > i.chroma + SALIENCE_MARGIN || a.l > i.l + SALIENCE_MARGIN
}

/// Make the active border more salient than the inactive one: swap them if
/// that suffices, otherwise open a lightness gap between them.
fn order_borders(scheme: &mut ColorScheme) {
    let (active, inactive) = (scheme.active_border, scheme.inactive_border);
    if is_more_salient(active, inactive) {
        return;
    }
    if is_more_salient(inactive, active) {
        scheme.active_border = inactive;
        scheme.inactive_border = active;
        tracing::trace!("swapped active and inactive borders");
        return;
    }

    let active_l = active.lightness();
    if active_l >= BORDER_GAP + SALIENCE_MARGIN {
        scheme.inactive_border = inactive.with_lightness(active_l - BORDER_GAP);
    } else {
        scheme.active_border = active.with_lightness(inactive.lightness() + BORDER_GAP);
    }
    tracing::trace!(
        active = %scheme.active_border,
        inactive = %scheme.inactive_border,
        "separated border lightness"
    );
}

/// Whether `color` reads as an alert: colorful and inside `range`.
pub fn is_alert(color: Color, range: &HueRange) -> bool {
    color.chroma() >= ALERT_MIN_CHROMA && range.contains(color.hue())
}

/// Keep `urgent` if it already reads as an alert, otherwise derive an
/// alert color inside `range` with lightness set off from `bg`.
///
/// Candidates start at the center of the range and the target lightness
/// and move outwards in hue (1° steps, staying inside the range) and then
/// lightness, until one still reads as an alert after 8-bit quantization.
/// The result depends only on `bg` and `range`.
pub fn enforce_alert_hue(urgent: Color, bg: Color, range: &HueRange) -> Color {
    if is_alert(urgent, range) {
        return urgent;
    }
    let bg_l = bg.lightness();
    let target = if bg_l < 0.5 {
        (bg_l + 0.6).clamp(0.6, 0.75)
    } else {
        (bg_l - 0.5).clamp(0.4, 0.5)
    };
    let center = range.center();
    let half_steps = (range.width() / 2.0).floor() as i32;

    let replacement = ALERT_LIGHTNESS_OFFSETS
        .iter()
        .map(|dl| (target + dl).clamp(0.0, 1.0))
        .flat_map(|l| {
            (0..=half_steps)
                .flat_map(|step| [step, -step])
                .map(move |dh| Color::from_oklch(Oklch::new(l, ALERT_CHROMA, center + dh as f32)))
        })
        .find(|candidate| is_alert(*candidate, range))
        .unwrap_or_else(|| {
            let fallback = Color::from_oklch(Oklch::new(target, ALERT_CHROMA, center));
            tracing::warn!(
                start = range.start,
                end = range.end,
                "no 8-bit color reads as an alert inside the hue range"
            );
            fallback
        });
    tracing::trace!(from = %urgent, to = %replacement, "replaced urgent border");
    replacement
}
