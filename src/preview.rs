use std::io::Write;

use crossterm::queue;
use crossterm::style::{
    Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};

use crate::color::Color;
use crate::scheme::{ColorScheme, Slot};

const SLOT_NAMES: [&str; 8] = ["Blk", "Red", "Grn", "Yel", "Blu", "Mag", "Cyn", "Wht"];

const BORDERS: [(Slot, &str); 3] = [
    (Slot::ActiveBorder, "Act"),
    (Slot::InactiveBorder, "Ina"),
    (Slot::UrgentBorder, "Urg"),
];

fn to_term(c: Color) -> TermColor {
    TermColor::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Black or white text, whichever reads on `c`.
fn label_color(c: Color) -> TermColor {
    if c.relative_luminance() > 0.4 {
        TermColor::Black
    } else {
        TermColor::White
    }
}

fn swatch(out: &mut impl Write, color: Color, label: &str) -> std::io::Result<()> {
    queue!(
        out,
        SetBackgroundColor(to_term(color)),
        SetForegroundColor(label_color(color)),
        Print(format!("{label:^6}")),
        ResetColor,
        Print(" ")
    )
}

/// A row of eight ANSI swatches starting at palette index `start`.
fn swatch_row(out: &mut impl Write, ansi: &[Color; 16], start: usize) -> std::io::Result<()> {
    queue!(out, Print("  "))?;
    for (i, &color) in ansi[start..start + 8].iter().enumerate() {
        swatch(out, color, SLOT_NAMES[i])?;
    }
    queue!(out, Print("\n"))
}

/// Print colored swatches of every slot, a sample line of foreground text
/// on the background, and the foreground contrast ratio.
pub fn render(out: &mut impl Write, scheme: &ColorScheme) -> std::io::Result<()> {
    let ansi = scheme.ansi();

    queue!(out, Print("  Normal\n"))?;
    swatch_row(out, &ansi, 0)?;
    queue!(out, Print("  Bright\n"))?;
    swatch_row(out, &ansi, 8)?;

    queue!(out, Print("  Borders\n  "))?;
    for (slot, label) in BORDERS {
        swatch(out, scheme.get(slot), label)?;
    }
    queue!(out, Print("\n\n"))?;

    let ratio = Color::contrast_ratio(&scheme.foreground, &scheme.background);
    queue!(
        out,
        Print("  "),
        SetBackgroundColor(to_term(scheme.background)),
        SetForegroundColor(to_term(scheme.foreground)),
        Print(" The quick brown fox jumps over the lazy dog "),
        SetAttribute(Attribute::Bold),
        Print("(bold) "),
        SetAttribute(Attribute::Reset),
        ResetColor,
        Print(format!(
            "\n  fg {}  bg {}  contrast {ratio:.1}:1\n",
            scheme.foreground, scheme.background
        ))
    )?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(scheme: &ColorScheme) -> String {
        let mut buf = Vec::new();
        render(&mut buf, scheme).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn preview_labels_every_ansi_slot() {
        let text = rendered(&ColorScheme::filled(Color::new(30, 30, 30)));
        for name in SLOT_NAMES {
            assert_eq!(text.matches(name).count(), 2, "{name}");
        }
        assert!(text.contains("Normal") && text.contains("Bright"));
    }

    #[test]
    fn border_swatches_match_ansi_width() {
        let text = rendered(&ColorScheme::filled(Color::new(30, 30, 30)));
        let plain = regex::Regex::new(r"\x1b\[[0-9;]*m")
            .unwrap()
            .replace_all(&text, "")
            .into_owned();
        let lines: Vec<&str> = plain.lines().collect();

        let normal = lines[1];
        assert_eq!(normal.len(), 2 + 8 * 7, "{normal:?}");
        let borders = lines[5];
        assert_eq!(
            borders,
            format!("  {:^6} {:^6} {:^6} ", "Act", "Ina", "Urg"),
            "{plain}"
        );
    }

    #[test]
    fn preview_reports_contrast() {
        let mut scheme = ColorScheme::filled(Color::BLACK);
        scheme.foreground = Color::WHITE;
        let text = rendered(&scheme);
        assert!(text.contains("contrast 21.0:1"), "{text}");
        assert!(text.contains("fg #ffffff  bg #000000"));
    }

    #[test]
    fn preview_emits_truecolor_escapes() {
        let mut scheme = ColorScheme::filled(Color::BLACK);
        scheme.red = Color::new(205, 49, 49);
        let text = rendered(&scheme);
        assert!(text.contains("\x1b[48;2;205;49;49m"), "{text:?}");
    }

    #[test]
    fn label_is_readable_on_swatch() {
        assert_eq!(label_color(Color::WHITE), TermColor::Black);
        assert_eq!(label_color(Color::BLACK), TermColor::White);
    }
}
