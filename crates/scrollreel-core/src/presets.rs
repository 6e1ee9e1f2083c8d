//! Choices offered by the configuration panel.

use serde::Serialize;

/// A named frame store the operator can switch the hero to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SequencePreset {
    pub name: &'static str,
    pub url: &'static str,
}

/// A named accent color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeColor {
    pub name: &'static str,
    pub value: &'static str,
}

/// The first entry is the default sequence.
pub const SEQUENCE_PRESETS: &[SequencePreset] = &[
    SequencePreset {
        name: "Cyber Motion (Default)",
        url: "https://acrimldaoexwwnibqcwu.supabase.co/storage/v1/object/public/Portfolio/webp-frames/",
    },
    // Same store for now; a second upload will get its own path.
    SequencePreset {
        name: "Blue Data Flow",
        url: "https://acrimldaoexwwnibqcwu.supabase.co/storage/v1/object/public/Portfolio/webp-frames/",
    },
];

/// The first entry is the default accent.
pub const THEME_COLORS: &[ThemeColor] = &[
    ThemeColor {
        name: "Orange",
        value: "#F97316",
    },
    ThemeColor {
        name: "Blue",
        value: "#3B82F6",
    },
    ThemeColor {
        name: "Purple",
        value: "#A855F7",
    },
    ThemeColor {
        name: "Emerald",
        value: "#10B981",
    },
    ThemeColor {
        name: "Rose",
        value: "#F43F5E",
    },
    ThemeColor {
        name: "Cyan",
        value: "#06B6D4",
    },
];

/// Look up a theme color by case-insensitive name.
pub fn theme_color(name: &str) -> Option<&'static ThemeColor> {
    THEME_COLORS
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name))
}
