//! Error types for binding and window setup
//!
//! Drawing and event calls report failure through their return values; only
//! the two operations that can leave the caller without a usable window get
//! structured errors.

use thiserror::Error;

/// Failure to bind the native Xlib library at runtime.
///
/// There is no recovery path inside the library: without the binding no
/// window can exist. Surfacing this as a value (rather than aborting) leaves
/// the decision to terminate or degrade to the application.
#[derive(Debug, Error)]
pub enum BindError {
    /// The shared library could not be opened by the dynamic loader.
    #[error("could not open libX11: {source}")]
    OpenFailed {
        #[source]
        source: libloading::Error,
    },

    /// The library opened but a required entry point was absent.
    #[error("missing Xlib symbol `{symbol}`: {source}")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },
}

/// Failure to open a window.
#[derive(Debug, Error)]
pub enum OpenError {
    /// The runtime Xlib binding could not be established.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// The X server refused or could not accept a display connection.
    #[error("unable to connect to the X server")]
    DisplayUnavailable,

    /// The requested window title contains an interior NUL byte and cannot
    /// be stored as a C string.
    #[error("window title contains a NUL byte")]
    InvalidTitle,
}
