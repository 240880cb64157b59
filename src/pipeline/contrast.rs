use crate::color::Color;

/// Oklch lightness moved per step while searching for enough contrast.
const LIGHTNESS_STEP: f32 = 0.02;

/// Adjust `fg` until its WCAG contrast against `bg` is at least `min_contrast`.
///
/// Lightness is pushed away from the background's along the foreground's
/// own hue. If that direction runs out of room the other one is tried, and
/// if neither reaches the target the better of pure black and pure white is
/// returned. A foreground that already passes is returned unchanged.
pub fn enforce_contrast(fg: Color, bg: Color, min_contrast: f32) -> Color {
    if Color::contrast_ratio(&fg, &bg) >= min_contrast {
        return fg;
    }

    let fg_l = fg.lightness();
    let bg_l = bg.lightness();
    let first = if fg_l > bg_l {
        1.0
    } else if fg_l < bg_l {
        -1.0
    } else if bg_l < 0.5 {
        1.0
    } else {
        -1.0
    };

    for direction in [first, -first] {
        if let Some(color) = walk_lightness(fg, bg, direction, min_contrast) {
            tracing::trace!(from = %fg, to = %color, "raised foreground contrast");
            return color;
        }
    }

    let best = best_extreme(bg);
    tracing::trace!(from = %fg, to = %best, "foreground contrast unreachable, using extreme");
    best
}

/// Step lightness in `direction` until the contrast target is met or the
/// lightness clamp is hit.
fn walk_lightness(fg: Color, bg: Color, direction: f32, min_contrast: f32) -> Option<Color> {
    let mut l = fg.lightness();
    loop {
        l = (l + direction * LIGHTNESS_STEP).clamp(0.0, 1.0);
        let candidate = fg.with_lightness(l);
        if Color::contrast_ratio(&candidate, &bg) >= min_contrast {
            return Some(candidate);
        }
        if l <= 0.0 || l >= 1.0 {
            return None;
        }
    }
}

/// Pure black or pure white, whichever contrasts more with `bg`.
pub fn best_extreme(bg: Color) -> Color {
    if Color::contrast_ratio(&Color::WHITE, &bg) >= Color::contrast_ratio(&Color::BLACK, &bg) {
        Color::WHITE
    } else {
        Color::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passing_foreground_is_untouched() {
        let fg = Color::new(220, 220, 210);
        let bg = Color::new(20, 20, 30);
        assert_eq!(enforce_contrast(fg, bg, 4.5), fg);
    }

    #[test]
    fn identical_colors_on_dark_background_get_lighter() {
        let fg = Color::BLACK;
        let fixed = enforce_contrast(fg, Color::BLACK, 4.5);
        assert!(Color::contrast_ratio(&fixed, &Color::BLACK) >= 4.5);
        assert!(fixed.lightness() > 0.5);
    }

    #[test]
    fn dim_foreground_on_light_background_gets_darker() {
        let fg = Color::new(200, 180, 160);
        let bg = Color::new(240, 235, 225);
        let fixed = enforce_contrast(fg, bg, 4.5);
        assert!(Color::contrast_ratio(&fixed, &bg) >= 4.5);
        assert!(fixed.lightness() < fg.lightness());
    }

    #[test]
    fn hue_is_kept_while_pushing() {
        let fg = Color::new(60, 70, 140);
        let bg = Color::new(40, 40, 60);
        let fixed = enforce_contrast(fg, bg, 4.5);
        assert!(Color::contrast_ratio(&fixed, &bg) >= 4.5);
        assert!(fixed.b > fixed.r, "bluish foreground should stay bluish: {fixed}");
    }

    #[test]
    fn switches_direction_when_clamped() {
        // Light foreground on mid-light background: going up cannot reach 4.5.
        let bg = Color::new(150, 150, 150);
        let fg = Color::new(170, 170, 170);
        let fixed = enforce_contrast(fg, bg, 4.5);
        assert!(Color::contrast_ratio(&fixed, &bg) >= 4.5);
        assert!(fixed.lightness() < bg.lightness());
    }

    #[test]
    fn unreachable_target_uses_best_extreme() {
        let bg = Color::new(119, 119, 119);
        let fixed = enforce_contrast(Color::new(130, 130, 130), bg, 10.0);
        assert_eq!(fixed, best_extreme(bg));
        assert_eq!(enforce_contrast(fixed, bg, 10.0), fixed);
    }

    #[test]
    fn result_is_a_fixed_point() {
        for (fg, bg) in [
            (Color::new(90, 90, 90), Color::new(60, 60, 60)),
            (Color::new(200, 40, 40), Color::new(180, 30, 30)),
            (Color::new(250, 250, 250), Color::new(255, 255, 255)),
        ] {
            let once = enforce_contrast(fg, bg, 4.5);
            assert_eq!(enforce_contrast(once, bg, 4.5), once);
        }
    }
}
