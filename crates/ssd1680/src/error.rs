//! Error types for the driver
//!
//! - [`BuilderError`]: rejected configuration
//! - [`Error`]: runtime failures, wrapping the transport error
//!
//! ```
//! use ssd1680::{Builder, BuilderError, Dimensions};
//!
//! assert!(matches!(Builder::new().build(), Err(BuilderError::MissingDimensions)));
//! assert!(Dimensions::new(296, 130).is_err());
//! ```

use core::fmt;

use crate::interface::DisplayInterface;

/// Gate outputs (rows) driven by the SSD1680.
pub const MAX_GATE_OUTPUTS: u16 = 296;

/// Source outputs (columns) driven by the SSD1680.
pub const MAX_SOURCE_OUTPUTS: u16 = 176;

pub enum Error<I: DisplayInterface> {
    /// SPI or GPIO failure from the [`DisplayInterface`].
    Interface(I::Error),
    /// The frame buffer is smaller than `dimensions.buffer_size()`.
    BufferTooSmall { required: usize, provided: usize },
}

// Manual impl: only the transport error needs to be `Debug`, not the
// interface itself.
impl<I: DisplayInterface> fmt::Debug for Error<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Interface(e) => f.debug_tuple("Interface").field(e).finish(),
            Error::BufferTooSmall { required, provided } => f
                .debug_struct("BufferTooSmall")
                .field("required", required)
                .field("provided", provided)
                .finish(),
        }
    }
}

impl<I: DisplayInterface> fmt::Display for Error<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Interface(e) => write!(f, "Interface error: {e:?}"),
            Error::BufferTooSmall { required, provided } => {
                write!(
                    f,
                    "Buffer too small: required {required} bytes, provided {provided}"
                )
            }
        }
    }
}

impl<I: DisplayInterface> core::error::Error for Error<I> {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
    MissingDimensions,
    InvalidDimensions { rows: u16, cols: u16 },
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuilderError::MissingDimensions => write!(f, "Dimensions must be specified"),
            BuilderError::InvalidDimensions { rows, cols } => write!(
                f,
                "Invalid dimensions {rows}x{cols} (max {MAX_GATE_OUTPUTS}x{MAX_SOURCE_OUTPUTS}, cols must be multiple of 8)"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}
