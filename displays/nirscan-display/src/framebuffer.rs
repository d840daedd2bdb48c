//! Linux framebuffer backend
//!
//! Writes whole frames to a framebuffer device node. The panel geometry
//! and depth come from configuration; rows are assumed unpadded
//! (`stride = width * bytes_per_pixel`).

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::*;
use tracing::info;

use crate::backend::{DisplayBackend, DisplayError};
use crate::canvas::Canvas;

/// Framebuffer pixel layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 16-bit 5-6-5, little-endian
    Rgb565,
    /// 32-bit, blue in the lowest byte, top byte unused
    Xrgb8888,
}

impl PixelFormat {
    pub fn from_bits(bits: u8) -> Result<Self, DisplayError> {
        match bits {
            16 => Ok(PixelFormat::Rgb565),
            32 => Ok(PixelFormat::Xrgb8888),
            other => Err(DisplayError::UnsupportedDepth(other)),
        }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgb565 => 2,
            PixelFormat::Xrgb8888 => 4,
        }
    }

    /// Append one pixel to `out`
    pub fn encode(&self, color: Rgb888, out: &mut Vec<u8>) {
        match self {
            PixelFormat::Rgb565 => {
                let raw: RawU16 = Rgb565::from(color).into();
                out.extend_from_slice(&raw.into_inner().to_le_bytes());
            }
            PixelFormat::Xrgb8888 => {
                out.extend_from_slice(&[color.b(), color.g(), color.r(), 0]);
            }
        }
    }
}

/// Frame sink writing to `/dev/fbN` (or any seekable file)
pub struct FramebufferDisplay {
    file: File,
    width: u32,
    height: u32,
    format: PixelFormat,
    buf: Vec<u8>,
}

impl FramebufferDisplay {
    /// Open the device for writing
    pub fn open(
        path: impl AsRef<Path>,
        width: u32,
        height: u32,
        bits_per_pixel: u8,
    ) -> Result<Self, DisplayError> {
        if width == 0 || height == 0 {
            return Err(DisplayError::InvalidDimensions(width, height));
        }
        let format = PixelFormat::from_bits(bits_per_pixel)?;
        let path = path.as_ref();
        let file = OpenOptions::new().write(true).open(path)?;
        info!(
            "Framebuffer {} {}x{} {:?}",
            path.display(),
            width,
            height,
            format
        );
        Ok(Self {
            file,
            width,
            height,
            format,
            buf: Vec::with_capacity(width as usize * height as usize * format.bytes_per_pixel()),
        })
    }

    /// Scale and encode a frame into the staging buffer
    fn encode_frame(&mut self, frame: &Canvas) {
        self.buf.clear();
        for y in 0..self.height {
            for x in 0..self.width {
                let color = frame.sample(x, y, self.width, self.height);
                self.format.encode(color, &mut self.buf);
            }
        }
    }
}

impl DisplayBackend for FramebufferDisplay {
    fn present(&mut self, frame: &Canvas) -> Result<(), DisplayError> {
        self.encode_frame(frame);
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&self.buf)?;
        self.file.flush()?;
        Ok(())
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_rgb565() {
        let mut out = Vec::new();
        PixelFormat::Rgb565.encode(Rgb888::new(255, 0, 0), &mut out);
        PixelFormat::Rgb565.encode(Rgb888::new(0, 255, 0), &mut out);
        PixelFormat::Rgb565.encode(Rgb888::new(0, 0, 255), &mut out);
        assert_eq!(out, vec![0x00, 0xF8, 0xE0, 0x07, 0x1F, 0x00]);
    }

    #[test]
    fn test_encode_xrgb() {
        let mut out = Vec::new();
        PixelFormat::Xrgb8888.encode(Rgb888::new(1, 2, 3), &mut out);
        assert_eq!(out, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_bad_depth() {
        assert!(matches!(
            PixelFormat::from_bits(24),
            Err(DisplayError::UnsupportedDepth(24))
        ));
    }

    #[test]
    fn test_present_writes_scaled_frame() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut display = FramebufferDisplay::open(file.path(), 4, 2, 32).unwrap();

        let mut canvas = Canvas::new(2, 1);
        Pixel(Point::new(1, 0), Rgb888::new(9, 8, 7))
            .draw(&mut canvas)
            .unwrap();
        display.present(&canvas).unwrap();
        // Presenting twice overwrites rather than appends
        display.present(&canvas).unwrap();

        let bytes = std::fs::read(file.path()).unwrap();
        assert_eq!(bytes.len(), 4 * 2 * 4);
        // Row 0: two black, two coloured
        assert_eq!(&bytes[0..4], &[0, 0, 0, 0]);
        assert_eq!(&bytes[8..12], &[7, 8, 9, 0]);
        // Row 1 repeats row 0
        assert_eq!(&bytes[16..32], &bytes[0..16]);
    }

    #[test]
    fn test_missing_device() {
        assert!(matches!(
            FramebufferDisplay::open("/nonexistent/fb9", 480, 320, 16),
            Err(DisplayError::Io(_))
        ));
    }
}
