//! Mapping palette entries onto the 21 scheme slots.
//!
//! Every slot has a static [`SlotRole`]: an optional Oklch hue center, a
//! lightness band per theme mode, a minimum chroma and a priority. Slots
//! are filled in priority order (background, foreground, base ANSI colors,
//! bright variants, borders) so earlier slots get first pick of the palette.

use std::cmp::Reverse;

use palette::Oklch;

use crate::cli::ThemeMode;
use crate::color::{hue_distance, Color};
use crate::pipeline::extract::PaletteEntry;
use crate::scheme::{ColorScheme, Slot};

/// Lowest score a palette entry needs to be used for a slot.
pub const MIN_SCORE: f32 = 0.6;

/// Minimum Oklch lightness gained by a bright variant over its base color.
pub const BRIGHT_BOOST: f32 = 0.12;

/// Hue distance at which the hue component of a score reaches zero.
const HUE_WINDOW: f32 = 45.0;

/// Lightness distance outside a band at which the lightness fit reaches zero.
const LIGHTNESS_FALLOFF: f32 = 0.25;

/// Chroma at which a neutral slot's chroma fit reaches zero.
const NEUTRAL_CHROMA: f32 = 0.12;

/// How far a palette bright candidate may drift in hue from its base.
const BRIGHT_HUE_WINDOW: f32 = 20.0;

/// Entries below this chroma do not count towards the dominant hue.
const DOMINANT_MIN_CHROMA: f32 = 0.03;

/// Chroma cap for synthesized neutral slots.
const NEUTRAL_TINT: f32 = 0.02;

/// Closed Oklch lightness interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub lo: f32,
    pub hi: f32,
}

impl Band {
    const fn new(lo: f32, hi: f32) -> Self {
        Self { lo, hi }
    }

    pub fn mid(&self) -> f32 {
        (self.lo + self.hi) / 2.0
    }

    /// Distance from `l` to the band, 0 inside it.
    pub fn distance(&self, l: f32) -> f32 {
        if l < self.lo {
            self.lo - l
        } else if l > self.hi {
            l - self.hi
        } else {
            0.0
        }
    }

    pub fn clamp(&self, l: f32) -> f32 {
        l.clamp(self.lo, self.hi)
    }
}

/// Static matching constraints for one slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotRole {
    /// Oklch hue center; `None` for slots matched on lightness alone.
    pub hue: Option<f32>,
    pub min_chroma: f32,
    pub dark: Band,
    pub light: Band,
    /// Higher is assigned first and is trusted more during repair.
    pub priority: u8,
}

impl SlotRole {
    pub fn band(&self, mode: ThemeMode) -> Band {
        match mode {
            ThemeMode::Dark => self.dark,
            ThemeMode::Light => self.light,
        }
    }
}

// Oklch hue angles of the sRGB primaries and secondaries.
const RED: f32 = 29.0;
const YELLOW: f32 = 110.0;
const GREEN: f32 = 142.0;
const CYAN: f32 = 195.0;
const BLUE: f32 = 264.0;
const MAGENTA: f32 = 328.0;

const fn neutral(dark: Band, light: Band, priority: u8) -> SlotRole {
    SlotRole {
        hue: None,
        min_chroma: 0.0,
        dark,
        light,
        priority,
    }
}

const fn accent(hue: f32, dark: Band, light: Band, priority: u8) -> SlotRole {
    SlotRole {
        hue: Some(hue),
        min_chroma: 0.08,
        dark,
        light,
        priority,
    }
}

const ACCENT_DARK: Band = Band::new(0.58, 0.75);
const ACCENT_LIGHT: Band = Band::new(0.42, 0.58);
const YELLOW_DARK: Band = Band::new(0.70, 0.85);
const YELLOW_LIGHT: Band = Band::new(0.55, 0.68);
const BRIGHT_DARK: Band = Band::new(0.70, 0.87);
const BRIGHT_LIGHT: Band = Band::new(0.54, 0.70);
const BRIGHT_YELLOW_DARK: Band = Band::new(0.82, 0.95);
const BRIGHT_YELLOW_LIGHT: Band = Band::new(0.67, 0.80);

/// Constraint lookup for a slot.
pub fn role(slot: Slot) -> SlotRole {
    match slot {
        Slot::Background => neutral(Band::new(0.0, 0.28), Band::new(0.88, 1.0), 100),
        Slot::Foreground => neutral(Band::new(0.82, 1.0), Band::new(0.0, 0.30), 95),
        Slot::Black => neutral(Band::new(0.12, 0.32), Band::new(0.12, 0.32), 90),
        Slot::White => neutral(Band::new(0.75, 0.90), Band::new(0.75, 0.90), 89),
        Slot::Red => accent(RED, ACCENT_DARK, ACCENT_LIGHT, 80),
        Slot::Green => accent(GREEN, ACCENT_DARK, ACCENT_LIGHT, 79),
        Slot::Blue => accent(BLUE, ACCENT_DARK, ACCENT_LIGHT, 78),
        Slot::Yellow => accent(YELLOW, YELLOW_DARK, YELLOW_LIGHT, 77),
        Slot::Magenta => accent(MAGENTA, ACCENT_DARK, ACCENT_LIGHT, 76),
        Slot::Cyan => accent(CYAN, ACCENT_DARK, ACCENT_LIGHT, 75),
        Slot::BrightBlack => neutral(Band::new(0.40, 0.55), Band::new(0.40, 0.55), 60),
        Slot::BrightWhite => neutral(Band::new(0.90, 1.0), Band::new(0.90, 1.0), 59),
        Slot::BrightRed => accent(RED, BRIGHT_DARK, BRIGHT_LIGHT, 58),
        Slot::BrightGreen => accent(GREEN, BRIGHT_DARK, BRIGHT_LIGHT, 57),
        Slot::BrightBlue => accent(BLUE, BRIGHT_DARK, BRIGHT_LIGHT, 56),
        Slot::BrightYellow => accent(YELLOW, BRIGHT_YELLOW_DARK, BRIGHT_YELLOW_LIGHT, 55),
        Slot::BrightMagenta => accent(MAGENTA, BRIGHT_DARK, BRIGHT_LIGHT, 54),
        Slot::BrightCyan => accent(CYAN, BRIGHT_DARK, BRIGHT_LIGHT, 53),
        Slot::UrgentBorder => accent(RED, Band::new(0.55, 0.75), Band::new(0.45, 0.62), 42),
        Slot::ActiveBorder => SlotRole {
            hue: None,
            min_chroma: 0.08,
            dark: Band::new(0.55, 0.85),
            light: Band::new(0.40, 0.65),
            priority: 41,
        },
        Slot::InactiveBorder => neutral(Band::new(0.22, 0.40), Band::new(0.70, 0.85), 40),
    }
}

/// How well `color` fits `role`, in [0, 1].
pub fn score(color: Color, role: &SlotRole, mode: ThemeMode) -> f32 {
    let oklch = color.to_oklch();
    let l = oklch.l.clamp(0.0, 1.0);
    let chroma = oklch.chroma.max(0.0);
    let lightness_fit = (1.0 - role.band(mode).distance(l) / LIGHTNESS_FALLOFF).max(0.0);

    match role.hue {
        Some(center) => {
            if chroma < role.min_chroma * 0.5 {
                return 0.0;
            }
            let distance = hue_distance(oklch.hue.into_positive_degrees(), center);
            let hue_fit = (1.0 - distance / HUE_WINDOW).max(0.0);
            if hue_fit == 0.0 {
                return 0.0;
            }
            let chroma_fit = (chroma / role.min_chroma).min(1.0);
            0.6 * hue_fit + 0.25 * lightness_fit + 0.15 * chroma_fit
        }
        None => {
            let chroma_fit = (1.0 - chroma / NEUTRAL_CHROMA).max(0.0);
            0.7 * lightness_fit + 0.3 * chroma_fit
        }
    }
}

/// Hue and chroma of the heaviest colorful palette entry.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Dominant {
    hue: f32,
    chroma: f32,
}

impl Dominant {
    fn of(palette: &[PaletteEntry]) -> Self {
        palette
            .iter()
            .find(|e| e.color.chroma() >= DOMINANT_MIN_CHROMA)
            .or_else(|| palette.first())
            .map(|e| {
                let oklch = e.color.to_oklch();
                Self {
                    hue: oklch.hue.into_positive_degrees(),
                    chroma: oklch.chroma.max(0.0),
                }
            })
            .unwrap_or(Self {
                hue: 0.0,
                chroma: 0.0,
            })
    }
}

/// A stand-in color for a slot no palette entry fits: the dominant hue at
/// the middle of the slot's lightness band.
fn synthesize(slot: Slot, mode: ThemeMode, dominant: Dominant) -> Color {
    let role = role(slot);
    let chroma = match role.hue {
        Some(_) => dominant.chroma.max(role.min_chroma),
        None => dominant.chroma.min(NEUTRAL_TINT),
    };
    let color = Color::from_oklch(Oklch::new(role.band(mode).mid(), chroma, dominant.hue));
    tracing::trace!(%slot, %color, "synthesized fallback");
    color
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefer {
    /// Highest score, ties to the heavier entry.
    Score,
    /// Heaviest entry among those that qualify, ties to the higher score.
    Weight,
}

/// Index of the best qualifying palette entry for `slot`.
fn best_entry(
    palette: &[PaletteEntry],
    slot: Slot,
    mode: ThemeMode,
    used: &[bool],
    prefer: Prefer,
) -> Option<usize> {
    let role = role(slot);
    let mut best: Option<(usize, f32)> = None;
    for (i, entry) in palette.iter().enumerate() {
        if used[i] {
            continue;
        }
        let s = score(entry.color, &role, mode);
        if s < MIN_SCORE {
            continue;
        }
        let better = match best {
            None => true,
            Some((j, best_score)) => {
                let w = entry.weight;
                let best_w = palette[j].weight;
                match prefer {
                    Prefer::Score => s > best_score || (s == best_score && w > best_w),
                    Prefer::Weight => w > best_w || (w == best_w && s > best_score),
                }
            }
        };
        if better {
            best = Some((i, s));
        }
    }
    best.map(|(i, _)| i)
}

/// A palette entry that can stand in as the bright variant of `base`:
/// close in hue and at least [`BRIGHT_BOOST`] lighter.
fn bright_from_palette(
    palette: &[PaletteEntry],
    base: Color,
    bright_band: Band,
    min_chroma: f32,
) -> Option<Color> {
    let base = base.to_oklch();
    if base.chroma < min_chroma * 0.5 {
        return None;
    }
    let base_hue = base.hue.into_positive_degrees();
    palette
        .iter()
        .filter(|e| {
            let c = e.color.to_oklch();
            c.chroma >= min_chroma * 0.5
                && hue_distance(c.hue.into_positive_degrees(), base_hue) <= BRIGHT_HUE_WINDOW
                && c.l >= base.l + BRIGHT_BOOST
                && c.l <= bright_band.hi + 0.05
        })
        .max_by(|a, b| {
            a.weight
                .total_cmp(&b.weight)
                .then_with(|| b.color.cmp(&a.color))
        })
        .map(|e| e.color)
}

/// Base color lifted by [`BRIGHT_BOOST`], and at least into the bright band.
fn boost(base: Color, bright_band: Band) -> Color {
    let l = (base.lightness() + BRIGHT_BOOST).max(bright_band.lo).min(1.0);
    base.with_lightness(l)
}

/// Move `color` into `band` along its hue, if it lies outside.
fn fit_to_band(color: Color, band: Band) -> Color {
    let l = color.lightness();
    if band.distance(l) > 0.0 {
        color.with_lightness(band.clamp(l))
    } else {
        color
    }
}

/// Map extracted colors to all 21 scheme slots.
///
/// Deterministic: identical palettes always produce identical schemes.
/// Every slot is filled, falling back to a synthesized color when no palette
/// entry scores at least [`MIN_SCORE`].
pub fn assign_slots(palette: &[PaletteEntry], mode: ThemeMode) -> ColorScheme {
    let dominant = Dominant::of(palette);
    let mut scheme = ColorScheme::filled(Color::BLACK);
    let none_used = vec![false; palette.len()];

    let pick = |slot: Slot, used: &[bool], prefer: Prefer| {
        best_entry(palette, slot, mode, used, prefer)
    };

    // Background and foreground: lightness extremes.
    let background = pick(Slot::Background, &none_used, Prefer::Weight)
        .map(|i| palette[i].color)
        .unwrap_or_else(|| synthesize(Slot::Background, mode, dominant));
    scheme.set(Slot::Background, background);

    let foreground = pick(Slot::Foreground, &none_used, Prefer::Score)
        .map(|i| palette[i].color)
        .unwrap_or_else(|| synthesize(Slot::Foreground, mode, dominant));
    scheme.set(Slot::Foreground, foreground);

    // Base ANSI colors by priority. Chromatic slots each claim their entry.
    let mut base_slots: Vec<Slot> = Slot::ANSI[..8].to_vec();
    base_slots.sort_by_key(|s| Reverse(role(*s).priority));
    let mut used = vec![false; palette.len()];
    for slot in base_slots {
        let slot_role = role(slot);
        let color = if slot_role.hue.is_some() {
            match pick(slot, &used, Prefer::Score) {
                Some(i) => {
                    used[i] = true;
                    fit_to_band(palette[i].color, slot_role.band(mode))
                }
                None => synthesize(slot, mode, dominant),
            }
        } else {
            pick(slot, &none_used, Prefer::Score)
                .map(|i| palette[i].color)
                .unwrap_or_else(|| synthesize(slot, mode, dominant))
        };
        scheme.set(slot, color);
    }

    // Bright variants, always lighter than their base.
    for &base_slot in &Slot::ANSI[..8] {
        let Some(bright_slot) = base_slot.bright() else {
            continue;
        };
        let base = scheme.get(base_slot);
        let bright_role = role(bright_slot);
        let bright_band = bright_role.band(mode);
        let color = bright_role
            .hue
            .and_then(|_| bright_from_palette(palette, base, bright_band, bright_role.min_chroma))
            .unwrap_or_else(|| boost(base, bright_band));
        scheme.set(bright_slot, color);
    }

    // Borders reuse what is already assigned.
    let active = [
        Slot::BrightRed,
        Slot::BrightGreen,
        Slot::BrightBlue,
        Slot::BrightYellow,
        Slot::BrightMagenta,
        Slot::BrightCyan,
    ]
    .iter()
    .map(|&slot| scheme.get(slot))
    .fold(None::<Color>, |best, c| match best {
        Some(b) if b.chroma() >= c.chroma() => Some(b),
        _ => Some(c),
    })
    .unwrap_or(foreground);
    scheme.set(Slot::ActiveBorder, active);
    scheme.set(
        Slot::InactiveBorder,
        background.mix(scheme.get(Slot::BrightBlack), 0.5),
    );
    scheme.set(Slot::UrgentBorder, scheme.get(Slot::Red));

    tracing::debug!(?mode, palette = palette.len(), "assigned slots");

    scheme
}
