use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Identifies one of the 21 scheme slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    Background,
    Foreground,
    ActiveBorder,
    InactiveBorder,
    UrgentBorder,
}

impl Slot {
    /// All slots in canonical document order.
    pub const ALL: [Slot; 21] = [
        Slot::Black,
        Slot::Red,
        Slot::Green,
        Slot::Yellow,
        Slot::Blue,
        Slot::Magenta,
        Slot::Cyan,
        Slot::White,
        Slot::BrightBlack,
        Slot::BrightRed,
        Slot::BrightGreen,
        Slot::BrightYellow,
        Slot::BrightBlue,
        Slot::BrightMagenta,
        Slot::BrightCyan,
        Slot::BrightWhite,
        Slot::Background,
        Slot::Foreground,
        Slot::ActiveBorder,
        Slot::InactiveBorder,
        Slot::UrgentBorder,
    ];

    /// The 16 indexed terminal colors, in palette index order.
    pub const ANSI: [Slot; 16] = [
        Slot::Black,
        Slot::Red,
        Slot::Green,
        Slot::Yellow,
        Slot::Blue,
        Slot::Magenta,
        Slot::Cyan,
        Slot::White,
        Slot::BrightBlack,
        Slot::BrightRed,
        Slot::BrightGreen,
        Slot::BrightYellow,
        Slot::BrightBlue,
        Slot::BrightMagenta,
        Slot::BrightCyan,
        Slot::BrightWhite,
    ];

    /// Key used in the JSON document.
    pub fn key(self) -> &'static str {
        match self {
            Slot::Black => "black",
            Slot::Red => "red",
            Slot::Green => "green",
            Slot::Yellow => "yellow",
            Slot::Blue => "blue",
            Slot::Magenta => "magenta",
            Slot::Cyan => "cyan",
            Slot::White => "white",
            Slot::BrightBlack => "brightBlack",
            Slot::BrightRed => "brightRed",
            Slot::BrightGreen => "brightGreen",
            Slot::BrightYellow => "brightYellow",
            Slot::BrightBlue => "brightBlue",
            Slot::BrightMagenta => "brightMagenta",
            Slot::BrightCyan => "brightCyan",
            Slot::BrightWhite => "brightWhite",
            Slot::Background => "background",
            Slot::Foreground => "foreground",
            Slot::ActiveBorder => "activeBorder",
            Slot::InactiveBorder => "inactiveBorder",
            Slot::UrgentBorder => "urgentBorder",
        }
    }

    /// The bright counterpart of a base ANSI slot.
    pub fn bright(self) -> Option<Slot> {
        let index = Slot::ANSI.iter().position(|s| *s == self)?;
        (index < 8).then(|| Slot::ANSI[index + 8])
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A complete color scheme: 16 ANSI colors, background/foreground and
/// three window-border roles. Every slot is always populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorScheme {
    pub black: Color,
    pub red: Color,
    pub green: Color,
    pub yellow: Color,
    pub blue: Color,
    pub magenta: Color,
    pub cyan: Color,
    pub white: Color,
    pub bright_black: Color,
    pub bright_red: Color,
    pub bright_green: Color,
    pub bright_yellow: Color,
    pub bright_blue: Color,
    pub bright_magenta: Color,
    pub bright_cyan: Color,
    pub bright_white: Color,
    pub background: Color,
    pub foreground: Color,
    pub active_border: Color,
    pub inactive_border: Color,
    pub urgent_border: Color,
}

impl ColorScheme {
    /// A scheme with every slot set to `color`.
    pub fn filled(color: Color) -> Self {
        Self {
            black: color,
            red: color,
            green: color,
            yellow: color,
            blue: color,
            magenta: color,
            cyan: color,
            white: color,
            bright_black: color,
            bright_red: color,
            bright_green: color,
            bright_yellow: color,
            bright_blue: color,
            bright_magenta: color,
            bright_cyan: color,
            bright_white: color,
            background: color,
            foreground: color,
            active_border: color,
            inactive_border: color,
            urgent_border: color,
        }
    }

    pub fn get(&self, slot: Slot) -> Color {
        match slot {
            Slot::Black => self.black,
            Slot::Red => self.red,
            Slot::Green => self.green,
            Slot::Yellow => self.yellow,
            Slot::Blue => self.blue,
            Slot::Magenta => self.magenta,
            Slot::Cyan => self.cyan,
            Slot::White => self.white,
            Slot::BrightBlack => self.bright_black,
            Slot::BrightRed => self.bright_red,
            Slot::BrightGreen => self.bright_green,
            Slot::BrightYellow => self.bright_yellow,
            Slot::BrightBlue => self.bright_blue,
            Slot::BrightMagenta => self.bright_magenta,
            Slot::BrightCyan => self.bright_cyan,
            Slot::BrightWhite => self.bright_white,
            Slot::Background => self.background,
            Slot::Foreground => self.foreground,
            Slot::ActiveBorder => self.active_border,
            Slot::InactiveBorder => self.inactive_border,
            Slot::UrgentBorder => self.urgent_border,
        }
    }

    pub fn set(&mut self, slot: Slot, color: Color) {
        *self.slot_mut(slot) = color;
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Color {
        match slot {
            Slot::Black => &mut self.black,
            Slot::Red => &mut self.red,
            Slot::Green => &mut self.green,
            Slot::Yellow => &mut self.yellow,
            Slot::Blue => &mut self.blue,
            Slot::Magenta => &mut self.magenta,
            Slot::Cyan => &mut self.cyan,
            Slot::White => &mut self.white,
            Slot::BrightBlack => &mut self.bright_black,
            Slot::BrightRed => &mut self.bright_red,
            Slot::BrightGreen => &mut self.bright_green,
            Slot::BrightYellow => &mut self.bright_yellow,
            Slot::BrightBlue => &mut self.bright_blue,
            Slot::BrightMagenta => &mut self.bright_magenta,
            Slot::BrightCyan => &mut self.bright_cyan,
            Slot::BrightWhite => &mut self.bright_white,
            Slot::Background => &mut self.background,
            Slot::Foreground => &mut self.foreground,
            Slot::ActiveBorder => &mut self.active_border,
            Slot::InactiveBorder => &mut self.inactive_border,
            Slot::UrgentBorder => &mut self.urgent_border,
        }
    }

    /// Iterate over all 21 slots in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, Color)> + '_ {
        Slot::ALL.iter().map(move |&slot| (slot, self.get(slot)))
    }

    /// The 16 ANSI colors in palette index order.
    pub fn ansi(&self) -> [Color; 16] {
        Slot::ANSI.map(|slot| self.get(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_slots_are_unique() {
        let mut keys: Vec<&str> = Slot::ALL.iter().map(|s| s.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 21);
    }

    #[test]
    fn get_and_set_cover_every_slot() {
        let mut scheme = ColorScheme::filled(Color::BLACK);
        for (i, slot) in Slot::ALL.iter().enumerate() {
            scheme.set(*slot, Color::new(i as u8, 0, 0));
        }
        for (i, slot) in Slot::ALL.iter().enumerate() {
            assert_eq!(scheme.get(*slot), Color::new(i as u8, 0, 0), "{slot}");
        }
    }

    #[test]
    fn bright_counterparts() {
        assert_eq!(Slot::Red.bright(), Some(Slot::BrightRed));
        assert_eq!(Slot::White.bright(), Some(Slot::BrightWhite));
        assert_eq!(Slot::BrightRed.bright(), None);
        assert_eq!(Slot::Background.bright(), None);
    }

    #[test]
    fn serde_keys_match_slot_keys() {
        let scheme = ColorScheme::filled(Color::new(0x12, 0x34, 0x56));
        let value = serde_json::to_value(scheme).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 21);
        for slot in Slot::ALL {
            assert_eq!(object[slot.key()], "#123456", "missing key {}", slot.key());
        }
    }

    #[test]
    fn ansi_order() {
        let mut scheme = ColorScheme::filled(Color::BLACK);
        scheme.bright_white = Color::WHITE;
        let ansi = scheme.ansi();
        assert_eq!(ansi[15], Color::WHITE);
        assert_eq!(ansi[0], Color::BLACK);
    }
}
