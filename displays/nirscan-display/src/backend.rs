//! Display backend trait
//!
//! Defines the present step for finished frames.

use tracing::trace;

use crate::canvas::Canvas;

/// Display backend errors
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    /// Device could not be opened or written
    #[error("display I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Unsupported pixel depth
    #[error("unsupported pixel depth: {0} bits")]
    UnsupportedDepth(u8),
    /// Zero-sized panel
    #[error("invalid display dimensions {0}x{1}")]
    InvalidDimensions(u32, u32),
}

/// Display backend trait
///
/// Implementations scale the virtual frame to the physical panel.
pub trait DisplayBackend {
    /// Push a finished frame to the panel
    fn present(&mut self, frame: &Canvas) -> Result<(), DisplayError>;

    /// Physical dimensions in pixels (width, height)
    fn dimensions(&self) -> (u32, u32);
}

impl<T: DisplayBackend + ?Sized> DisplayBackend for Box<T> {
    fn present(&mut self, frame: &Canvas) -> Result<(), DisplayError> {
        (**self).present(frame)
    }

    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }
}

/// Backend with no panel attached
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    frames: u64,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames presented so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl DisplayBackend for HeadlessDisplay {
    fn present(&mut self, frame: &Canvas) -> Result<(), DisplayError> {
        self.frames += 1;
        trace!("Headless frame {} ({:?})", self.frames, frame);
        Ok(())
    }

    fn dimensions(&self) -> (u32, u32) {
        (0, 0)
    }
}
