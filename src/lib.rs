//! xlite - minimal X11 windowing, drawing, and event library
//!
//! This library opens simple windows, draws primitive shapes or blits a
//! caller-owned pixel buffer, and reads keyboard/mouse input, all without
//! linking against Xlib at build time. The first window to open binds
//! `libX11` through the dynamic loader and resolves every required entry
//! point; the last window to close unbinds it again.
//!
//! Everything is single-threaded and blocking by design: a
//! [`WindowHandle`] holds raw native pointers and stays on the thread that
//! opened it.

pub mod error;
pub mod event;
pub mod window;
pub mod xlib;

mod draw;

pub use error::{BindError, OpenError};
pub use event::{Event, EventKind};
pub use window::WindowHandle;

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Window configuration
///
/// Every field has a default, so partial TOML fragments deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title stored on the native window and kept on the handle.
    pub title: String,
    /// Initial width of the window in pixels.
    pub width: u32,
    /// Initial height of the window in pixels.
    pub height: u32,
    /// Polling interval for [`WindowHandle::wait_for_key`], in
    /// milliseconds. Floored at 1 ms.
    pub poll_interval_ms: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "xlite".to_owned(),
            width: 640,
            height: 480,
            poll_interval_ms: 5,
        }
    }
}

impl WindowConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Opens a window with this configuration.
    pub fn open(&self) -> Result<WindowHandle, OpenError> {
        WindowHandle::open_with(self)
    }
}

/// Suspends the calling thread for `ms` milliseconds.
pub fn sleep_ms(ms: u64) {
    thread::sleep(Duration::from_millis(ms));
}

/// Suspends the calling thread for `us` microseconds.
pub fn sleep_us(us: u64) {
    thread::sleep(Duration::from_micros(us));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = WindowConfig::default();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 480);
        assert_eq!(config.poll_interval_ms, 5);
    }

    #[test]
    fn config_from_partial_toml() {
        let config = WindowConfig::from_toml_str(
            r#"
            title = "demo"
            width = 800
            "#,
        )
        .unwrap();
        assert_eq!(config.title, "demo");
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 480);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = WindowConfig {
            title: "roundtrip".to_owned(),
            width: 320,
            height: 200,
            poll_interval_ms: 16,
        };
        let text = toml::to_string(&config).unwrap();
        let back = WindowConfig::from_toml_str(&text).unwrap();
        assert_eq!(back.title, config.title);
        assert_eq!(back.width, config.width);
        assert_eq!(back.height, config.height);
        assert_eq!(back.poll_interval_ms, config.poll_interval_ms);
    }
}
