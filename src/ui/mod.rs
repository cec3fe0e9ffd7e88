//! UI Module
//!
//! This module exports the UI components for the vizlab TUI:
//!
//! - `app`: Application state and event loop
//! - `views`: Rendering functions for both visualizer tabs
//!
//! The views only read state; every change goes through `App`.

mod app;
mod views;

pub use app::{run_app, App, Tab};
