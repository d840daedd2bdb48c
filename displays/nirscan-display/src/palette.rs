//! Colour palette

use embedded_graphics::pixelcolor::Rgb888;

/// Background, very dark blue-black
pub const BG: Rgb888 = Rgb888::new(10, 15, 20);
/// HUD chrome, cyan
pub const HUD: Rgb888 = Rgb888::new(0, 200, 255);
/// Body text
pub const TEXT: Rgb888 = Rgb888::new(200, 230, 255);
/// Success and activity, green
pub const ACCENT: Rgb888 = Rgb888::new(0, 255, 100);
/// Failure and no-match, red
pub const ALERT: Rgb888 = Rgb888::new(255, 50, 50);
/// Secondary labels
pub const DIM: Rgb888 = Rgb888::new(50, 70, 80);
/// Background grid lines
pub const GRID: Rgb888 = Rgb888::new(20, 30, 40);
/// Fill behind the focused menu item
pub const FOCUS_FILL: Rgb888 = Rgb888::new(0, 50, 60);
