//! Virtual frame buffer
//!
//! All views are composed at a fixed virtual resolution; backends scale
//! the result to the physical panel.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

/// Default virtual width (px)
pub const VIRTUAL_WIDTH: u32 = 320;
/// Default virtual height (px)
pub const VIRTUAL_HEIGHT: u32 = 240;

/// In-memory RGB888 frame
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgb888>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(VIRTUAL_WIDTH, VIRTUAL_HEIGHT)
    }
}

impl core::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Canvas({}x{})", self.width, self.height)
    }
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb888::BLACK; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Colour at a pixel, `None` outside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Nearest-neighbour sample for a pixel of an `out_w`×`out_h` output
    pub fn sample(&self, x: u32, y: u32, out_w: u32, out_h: u32) -> Rgb888 {
        if out_w == 0 || out_h == 0 || self.pixels.is_empty() {
            return Rgb888::BLACK;
        }
        let sx = (u64::from(x) * u64::from(self.width) / u64::from(out_w)) as u32;
        let sy = (u64::from(y) * u64::from(self.height) / u64::from(out_h)) as u32;
        let sx = sx.min(self.width - 1);
        let sy = sy.min(self.height - 1);
        self.pixels[(sy * self.width + sx) as usize]
    }

    /// Count pixels of one colour inside a rectangle (clipped)
    pub fn count(&self, top_left: Point, size: Size, color: Rgb888) -> usize {
        let mut n = 0;
        for y in top_left.y.max(0)..(top_left.y + size.height as i32) {
            for x in top_left.x.max(0)..(top_left.x + size.width as i32) {
                if self.pixel(x as u32, y as u32) == Some(color) {
                    n += 1;
                }
            }
        }
        n
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                let (x, y) = (point.x as u32, point.y as u32);
                if x < self.width && y < self.height {
                    self.pixels[(y * self.width + x) as usize] = color;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_draw_clips() {
        let mut canvas = Canvas::new(4, 4);
        Rectangle::new(Point::new(2, 2), Size::new(10, 10))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::RED))
            .draw(&mut canvas)
            .unwrap();
        assert_eq!(canvas.pixel(3, 3), Some(Rgb888::RED));
        assert_eq!(canvas.pixel(1, 1), Some(Rgb888::BLACK));
        assert_eq!(canvas.pixel(4, 0), None);
        assert_eq!(canvas.count(Point::zero(), Size::new(4, 4), Rgb888::RED), 4);
    }

    #[test]
    fn test_sample_upscale() {
        let mut canvas = Canvas::new(2, 2);
        Pixel(Point::new(1, 0), Rgb888::GREEN).draw(&mut canvas).unwrap();
        // 2x2 -> 4x4: right half of the top two rows is green
        assert_eq!(canvas.sample(2, 0, 4, 4), Rgb888::GREEN);
        assert_eq!(canvas.sample(3, 1, 4, 4), Rgb888::GREEN);
        assert_eq!(canvas.sample(1, 1, 4, 4), Rgb888::BLACK);
        assert_eq!(canvas.sample(3, 2, 4, 4), Rgb888::BLACK);
    }

    #[test]
    fn test_sample_non_integer_ratio() {
        let canvas = Canvas::new(320, 240);
        // 480x320 panel: last output pixel maps inside the canvas
        assert_eq!(canvas.sample(479, 319, 480, 320), Rgb888::BLACK);
    }
}
