//! Client core for a paginated paid-video feed.
//!
//! The terminal UI in `main.rs` drives everything through
//! [`controller::Controller`]; this library holds the parts that do not
//! depend on a terminal so they can be exercised directly by tests.

pub mod actions;
pub mod api;
pub mod config;
pub mod controller;
pub mod dialog;
pub mod feed;
pub mod notify;
pub mod session;
pub mod util;
