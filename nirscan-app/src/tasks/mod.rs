//! Long-running loops
//!
//! Each loop owns its own timing domain and communicates only through
//! the statics in `channels`.

pub mod input;
pub mod ui;

pub use input::input_task;
pub use ui::ui_task;
