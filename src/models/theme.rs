//! Explicit style configuration for the card

use plotters::style::RGBColor;

/// Bar colors, assigned to bars by position
pub const BAR_PALETTE: [RGBColor; 10] = [
    RGBColor(0xF9, 0xA8, 0x25), // custom yellow, dark
    RGBColor(0xC6, 0x28, 0x28), // error, dark
    RGBColor(0x15, 0x65, 0xC0), // primary, dark
    RGBColor(0x1B, 0x5E, 0x20), // success, dark
    RGBColor(0x5E, 0x35, 0xB1), // deep purple 600
    RGBColor(0xEC, 0x40, 0x7A), // pink 400
    RGBColor(0x4F, 0xC3, 0xF7), // light blue 300
    RGBColor(0x26, 0xA6, 0x9A), // teal 400
    RGBColor(0xBA, 0x68, 0xC8), // purple 300
    RGBColor(0xCD, 0xDC, 0x39), // lime 500
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl std::str::FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(format!("unknown theme mode '{}', expected light or dark", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub mode: ThemeMode,
    pub text_primary: RGBColor,
    pub text_secondary: RGBColor,
    pub paper: RGBColor,
    pub divider: RGBColor,
    pub palette: [RGBColor; 10],
}

impl Theme {
    pub fn light() -> Self {
        Self {
            mode: ThemeMode::Light,
            text_primary: RGBColor(0x21, 0x21, 0x21),
            text_secondary: RGBColor(0x75, 0x75, 0x75),
            paper: RGBColor(0xFF, 0xFF, 0xFF),
            divider: RGBColor(0xE0, 0xE0, 0xE0),
            palette: BAR_PALETTE,
        }
    }

    pub fn dark() -> Self {
        Self {
            mode: ThemeMode::Dark,
            text_primary: RGBColor(0xFF, 0xFF, 0xFF),
            text_secondary: RGBColor(0xB3, 0xB3, 0xB3),
            paper: RGBColor(0x12, 0x12, 0x12),
            divider: RGBColor(0x3D, 0x3D, 0x3D),
            palette: BAR_PALETTE,
        }
    }

    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::light(),
            ThemeMode::Dark => Self::dark(),
        }
    }

    /// Data labels use primary text on dark backgrounds, secondary otherwise
    pub fn data_label_color(&self) -> RGBColor {
        match self.mode {
            ThemeMode::Dark => self.text_primary,
            ThemeMode::Light => self.text_secondary,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
