//! Terminal User Interface module.
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling for the feed, video view and dialogs
//! - `events` - Background task event processing
//! - `render` - View rendering dispatch
//! - `helpers` - Task spawning with panic capture
//! - `feed_list` - Feed list widget and footer
//! - `video` - Video detail and comment thread
//! - `overlays` - Toast stack and dialog overlays
//! - `status` - Status bar widget

mod events;
mod feed_list;
mod helpers;
mod input;
mod loop_runner;
mod overlays;
mod render;
mod status;
mod video;

pub use loop_runner::{run, Action};
