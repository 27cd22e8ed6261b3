//! Terminal rendering using ratatui.
//!
//! Each view gets its own module; [`common`] holds the chrome shared by
//! all of them (header, tab bar, status bar, help overlay).

pub mod common;
pub mod detail;
pub mod gauges;
pub mod overview;
pub mod theme;

pub use theme::Theme;
