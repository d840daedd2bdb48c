//! Frame composition and display backends for the spectrometer UI
//!
//! This crate provides:
//! - `Canvas`, the fixed-resolution virtual frame every view is drawn on
//! - `Renderer`, which composes the menu and scan views onto any
//!   `embedded-graphics` draw target
//! - `DisplayBackend` trait for presenting a finished frame
//!
//! # Architecture
//!
//! The render loop draws into a virtual canvas (320×240 by default) and
//! hands it to a backend, which scales it to the physical panel:
//!
//! - **Framebuffer** (Live): nearest-neighbour scaled and written to a
//!   Linux framebuffer device as RGB565 or XRGB8888.
//! - **Headless** (Simulated): frames are counted and dropped.

pub mod backend;
pub mod canvas;
pub mod framebuffer;
pub mod palette;
pub mod renderer;

// Re-export key types
pub use backend::{DisplayBackend, DisplayError, HeadlessDisplay};
pub use canvas::Canvas;
pub use framebuffer::{FramebufferDisplay, PixelFormat};
pub use renderer::Renderer;
