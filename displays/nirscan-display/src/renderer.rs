//! View composition
//!
//! Draws each UI view onto any RGB888 draw target. Layout is relative
//! to the target size; the default tuning assumes a 320×240 canvas.

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10, FONT_9X15_BOLD};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyle, TextStyleBuilder};
use nirscan_core::scan::{ScanError, ScanOutcome};
use nirscan_core::state::{MenuItem, ScanStatus, View};

use crate::palette;

/// Grid pitch (px)
const GRID_STEP: usize = 40;
/// Header bar height on the menu
const HEADER_H: u32 = 30;
/// Status bar separator row on the scan view
const STATUS_Y: i32 = 25;
/// Target box size
const BOX_W: u32 = 200;
const BOX_H: u32 = 140;
/// Corner bracket arm length
const BRACKET_LEN: i32 = 15;
/// Scan line step per frame (px)
const SCAN_STEP: i32 = 3;
/// Blink half-period for the analyzing banner (ms)
const BLINK_MS: u64 = 200;

/// Width in characters of a small-font line
fn small_cols(width: u32) -> usize {
    (width as usize / 6).saturating_sub(2)
}

fn centered() -> TextStyle {
    TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Top)
        .build()
}

fn left() -> TextStyle {
    TextStyleBuilder::new()
        .alignment(Alignment::Left)
        .baseline(Baseline::Top)
        .build()
}

/// Cut a string to at most `n` characters
fn clip(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

/// Status bar label for a view
fn status_label(view: &View<'_>) -> &'static str {
    match view {
        View::Menu { .. } | View::ScanIdle => ScanStatus::Idle.name(),
        View::Scanning => ScanStatus::Scanning.name(),
        View::ScanResult(_) => ScanStatus::Result.name(),
        View::ScanError(_) => ScanStatus::Error.name(),
    }
}

/// Bouncing scan line state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScanLine {
    offset: i32,
    direction: i32,
}

impl ScanLine {
    fn step(&mut self, span: i32) {
        self.offset += SCAN_STEP * self.direction;
        if self.offset > span {
            self.direction = -1;
        }
        if self.offset < 0 {
            self.direction = 1;
        }
    }
}

/// Stateful frame composer
///
/// Holds only animation state; what to draw comes from the [`View`].
#[derive(Debug, Clone)]
pub struct Renderer {
    line: ScanLine,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            line: ScanLine {
                offset: 0,
                direction: 1,
            },
        }
    }

    /// Current scan line offset from the top of the target box
    pub fn scan_line_offset(&self) -> i32 {
        self.line.offset
    }

    /// Compose one frame
    ///
    /// `now_ms` is a monotonic clock used for blinking.
    pub fn compose<D>(
        &mut self,
        view: View<'_>,
        now_ms: u64,
        target: &mut D,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        target.clear(palette::BG)?;
        self.draw_grid(target)?;

        match view {
            View::Menu { focus } => self.draw_menu(focus, target),
            _ => self.draw_scan(&view, now_ms, target),
        }
    }

    fn draw_grid<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let size = target.bounding_box().size;
        let (w, h) = (size.width as i32, size.height as i32);
        let style = PrimitiveStyle::with_stroke(palette::GRID, 1);
        for x in (0..w).step_by(GRID_STEP) {
            Line::new(Point::new(x, 0), Point::new(x, h - 1))
                .into_styled(style)
                .draw(target)?;
        }
        for y in (0..h).step_by(GRID_STEP) {
            Line::new(Point::new(0, y), Point::new(w - 1, y))
                .into_styled(style)
                .draw(target)?;
        }
        Ok(())
    }

    fn draw_menu<D>(&self, focus: MenuItem, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let size = target.bounding_box().size;
        let cx = size.width as i32 / 2;

        Rectangle::new(Point::zero(), Size::new(size.width, HEADER_H))
            .into_styled(PrimitiveStyle::with_fill(palette::HUD))
            .draw(target)?;
        Text::with_text_style(
            "SYSTEM MAIN MENU",
            Point::new(10, 8),
            MonoTextStyle::new(&FONT_9X15_BOLD, palette::BG),
            left(),
        )
        .draw(target)?;

        for item in MenuItem::ALL {
            let center_y = 100 + item.index() as i32 * 60;
            if item == focus {
                let rect = Rectangle::new(
                    Point::new(40, center_y - 20),
                    Size::new(size.width.saturating_sub(80), 40),
                );
                rect.into_styled(PrimitiveStyle::with_fill(palette::FOCUS_FILL))
                    .draw(target)?;
                rect.into_styled(PrimitiveStyle::with_stroke(palette::HUD, 2))
                    .draw(target)?;
                let label = format!("> {} <", item.label());
                Text::with_text_style(
                    &label,
                    Point::new(cx, center_y - 7),
                    MonoTextStyle::new(&FONT_9X15_BOLD, palette::ACCENT),
                    centered(),
                )
                .draw(target)?;
            } else {
                Text::with_text_style(
                    item.label(),
                    Point::new(cx, center_y - 7),
                    MonoTextStyle::new(&FONT_9X15_BOLD, palette::DIM),
                    centered(),
                )
                .draw(target)?;
            }
        }
        Ok(())
    }

    fn draw_scan<D>(&mut self, view: &View<'_>, now_ms: u64, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let size = target.bounding_box().size;
        let (w, h) = (size.width as i32, size.height as i32);
        let cx = w / 2;

        // Status bar
        Line::new(Point::new(0, STATUS_Y), Point::new(w - 1, STATUS_Y))
            .into_styled(PrimitiveStyle::with_stroke(palette::HUD, 1))
            .draw(target)?;
        let status = format!("STATUS: {}", status_label(view));
        Text::with_text_style(
            &status,
            Point::new(10, 8),
            MonoTextStyle::new(&FONT_6X10, palette::HUD),
            left(),
        )
        .draw(target)?;

        // Target box
        let box_x = (w - BOX_W as i32) / 2;
        let box_y = (h - BOX_H as i32) / 2 + 10;
        let bracket = match view {
            View::ScanError(_) | View::ScanResult(ScanOutcome::Undetected) => palette::ALERT,
            View::ScanResult(_) => palette::ACCENT,
            _ => palette::HUD,
        };
        self.draw_brackets(Point::new(box_x, box_y), bracket, target)?;

        let small = MonoTextStyle::new(&FONT_6X10, palette::DIM);
        match *view {
            View::ScanIdle | View::Menu { .. } => {
                Text::with_text_style(
                    "READY",
                    Point::new(cx, h / 2),
                    MonoTextStyle::new(&FONT_9X15_BOLD, palette::TEXT),
                    centered(),
                )
                .draw(target)?;
                Text::with_text_style(
                    "[ENTER] TO INITIATE",
                    Point::new(cx, h - 20),
                    small,
                    centered(),
                )
                .draw(target)?;
            }
            View::Scanning => {
                self.line.step(BOX_H as i32);
                let ly = box_y + self.line.offset;
                Line::new(Point::new(box_x + 5, ly), Point::new(box_x + BOX_W as i32 - 5, ly))
                    .into_styled(PrimitiveStyle::with_stroke(palette::ACCENT, 2))
                    .draw(target)?;
                if (now_ms / BLINK_MS) % 2 == 0 {
                    Text::with_text_style(
                        "ANALYZING...",
                        Point::new(cx, box_y - 20),
                        MonoTextStyle::new(&FONT_9X15_BOLD, palette::ACCENT),
                        centered(),
                    )
                    .draw(target)?;
                }
            }
            View::ScanResult(ScanOutcome::Detected { label, confidence }) => {
                Text::with_text_style(
                    "SUBSTANCE DETECTED",
                    Point::new(cx, box_y + 20),
                    small,
                    centered(),
                )
                .draw(target)?;
                let name = label.to_uppercase();
                Text::with_text_style(
                    &name,
                    Point::new(cx, box_y + 40),
                    MonoTextStyle::new(&FONT_10X20, palette::ACCENT),
                    centered(),
                )
                .draw(target)?;
                let conf = format!("{:.1}%", confidence * 100.0);
                Text::with_text_style(
                    &conf,
                    Point::new(cx, box_y + 80),
                    MonoTextStyle::new(&FONT_9X15_BOLD, palette::HUD),
                    centered(),
                )
                .draw(target)?;
            }
            View::ScanResult(ScanOutcome::Failed(e)) | View::ScanError(e) => {
                self.draw_failure(e, cx, box_y, size.width, target)?;
            }
            View::ScanResult(ScanOutcome::Undetected) => {
                Text::with_text_style(
                    "NO MATCH FOUND",
                    Point::new(cx, box_y + 30),
                    small,
                    centered(),
                )
                .draw(target)?;
                Text::with_text_style(
                    "UNDETECTED",
                    Point::new(cx, box_y + 55),
                    MonoTextStyle::new(&FONT_10X20, palette::ALERT),
                    centered(),
                )
                .draw(target)?;
            }
        }
        Ok(())
    }

    fn draw_failure<D>(
        &self,
        error: &ScanError,
        cx: i32,
        box_y: i32,
        width: u32,
        target: &mut D,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        Text::with_text_style(
            "FAILURE",
            Point::new(cx, box_y + 40),
            MonoTextStyle::new(&FONT_10X20, palette::ALERT),
            centered(),
        )
        .draw(target)?;
        let small = MonoTextStyle::new(&FONT_6X10, palette::DIM);
        let code = format!("CODE {}", error.code());
        Text::with_text_style(&code, Point::new(cx, box_y + 80), small, centered()).draw(target)?;
        Text::with_text_style(
            clip(&error.detail, small_cols(width)),
            Point::new(cx, box_y + 95),
            small,
            centered(),
        )
        .draw(target)?;
        Ok(())
    }

    fn draw_brackets<D>(&self, origin: Point, color: Rgb888, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let style = PrimitiveStyle::with_stroke(color, 2);
        let (x0, y0) = (origin.x, origin.y);
        let (x1, y1) = (x0 + BOX_W as i32, y0 + BOX_H as i32);
        let corners = [
            (Point::new(x0, y0), 1, 1),
            (Point::new(x1, y0), -1, 1),
            (Point::new(x0, y1), 1, -1),
            (Point::new(x1, y1), -1, -1),
        ];
        for (corner, dx, dy) in corners {
            Line::new(corner, corner + Point::new(dx * BRACKET_LEN, 0))
                .into_styled(style)
                .draw(target)?;
            Line::new(corner, corner + Point::new(0, dy * BRACKET_LEN))
                .into_styled(style)
                .draw(target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use nirscan_core::scan::ScanErrorKind;

    // Default 320x240 layout: box at (60, 60), 200x140
    const BOX: Point = Point::new(60, 60);

    fn render(renderer: &mut Renderer, view: View<'_>, now_ms: u64) -> Canvas {
        let mut canvas = Canvas::default();
        renderer.compose(view, now_ms, &mut canvas).unwrap();
        canvas
    }

    fn count(canvas: &Canvas, color: Rgb888) -> usize {
        canvas.count(Point::zero(), canvas.size(), color)
    }

    #[test]
    fn test_menu_layout() {
        let canvas = render(&mut Renderer::new(), View::Menu { focus: MenuItem::InitiateScan }, 0);
        // Header bar
        assert_eq!(canvas.pixel(315, 2), Some(palette::HUD));
        // Focus box around the first item, not the second
        assert_eq!(canvas.pixel(45, 85), Some(palette::FOCUS_FILL));
        assert_ne!(canvas.pixel(45, 145), Some(palette::FOCUS_FILL));
        assert!(count(&canvas, palette::ACCENT) > 0);
    }

    #[test]
    fn test_menu_focus_moves() {
        let canvas = render(&mut Renderer::new(), View::Menu { focus: MenuItem::SystemOff }, 0);
        assert_eq!(canvas.pixel(45, 145), Some(palette::FOCUS_FILL));
        assert_ne!(canvas.pixel(45, 85), Some(palette::FOCUS_FILL));
    }

    #[test]
    fn test_grid_drawn() {
        let canvas = render(&mut Renderer::new(), View::ScanIdle, 0);
        assert_eq!(canvas.pixel(40, 230), Some(palette::GRID));
        assert_eq!(canvas.pixel(41, 230), Some(palette::BG));
    }

    #[test]
    fn test_bracket_colour_by_state() {
        let mut r = Renderer::new();
        let idle = render(&mut r, View::ScanIdle, 0);
        assert_eq!(idle.pixel(BOX.x as u32 + 5, BOX.y as u32), Some(palette::HUD));

        let detected = ScanOutcome::detected("Salt", 0.95);
        let canvas = render(&mut r, View::ScanResult(&detected), 0);
        assert_eq!(canvas.pixel(BOX.x as u32 + 5, BOX.y as u32), Some(palette::ACCENT));

        let undetected = ScanOutcome::Undetected;
        let canvas = render(&mut r, View::ScanResult(&undetected), 0);
        assert_eq!(canvas.pixel(BOX.x as u32 + 5, BOX.y as u32), Some(palette::ALERT));

        let err = ScanError::new(ScanErrorKind::Acquisition, "exit status 1");
        let canvas = render(&mut r, View::ScanError(&err), 0);
        assert_eq!(canvas.pixel(BOX.x as u32 + 5, BOX.y as u32), Some(palette::ALERT));
    }

    #[test]
    fn test_scan_line_bounces() {
        let mut r = Renderer::new();
        for _ in 0..10 {
            render(&mut r, View::Scanning, 0);
        }
        assert_eq!(r.scan_line_offset(), 30);
        for _ in 0..200 {
            render(&mut r, View::Scanning, 0);
            assert!((-SCAN_STEP..=BOX_H as i32 + SCAN_STEP).contains(&r.scan_line_offset()));
        }
    }

    #[test]
    fn test_analyzing_blinks() {
        let banner = Rectangle::new(Point::new(60, BOX.y - 20), Size::new(200, 15));
        let on = render(&mut Renderer::new(), View::Scanning, 0);
        let off = render(&mut Renderer::new(), View::Scanning, 250);
        assert!(on.count(banner.top_left, banner.size, palette::ACCENT) > 0);
        assert_eq!(off.count(banner.top_left, banner.size, palette::ACCENT), 0);
    }

    #[test]
    fn test_failure_text_drawn() {
        let err = ScanError::new(ScanErrorKind::ArtifactNotFound, "x".repeat(200));
        let canvas = render(&mut Renderer::new(), View::ScanError(&err), 0);
        let body = Rectangle::new(Point::new(0, BOX.y + 40), Size::new(320, 20));
        assert!(canvas.count(body.top_left, body.size, palette::ALERT) > 0);
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("hello", 3), "hel");
        assert_eq!(clip("hi", 3), "hi");
        assert_eq!(small_cols(320), 51);
    }
}
