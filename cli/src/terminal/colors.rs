use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 130, g: 200, b: 255 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 190, b: 90 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 205, g: 205, b: 205 };

pub const IPV4_ADDR: Color = Color::TrueColor { r: 120, g: 220, b: 140 };
pub const IPV4_PREFIX: Color = Color::TrueColor { r: 80, g: 160, b: 100 };
pub const MAC_ADDR: Color = Color::TrueColor { r: 230, g: 150, b: 230 };
pub const VENDOR: Color = Color::TrueColor { r: 240, g: 220, b: 130 };
pub const UNKNOWN: Color = Color::BrightBlack;

pub const PORT_OPEN: Color = Color::TrueColor { r: 120, g: 220, b: 140 };
pub const SERVICE: Color = Color::TrueColor { r: 130, g: 200, b: 255 };
