//! Display abstraction shared by the OLED and e-paper drivers.

use core::fmt::Debug;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

/// Width of one text cell at scale 1.
pub const BASE_CHAR_WIDTH: u32 = 6;
/// Height of one text cell (and one menu row) at scale 1.
pub const BASE_CHAR_HEIGHT: u32 = 8;

/// A physical display with an in-memory frame.
///
/// `BinaryColor::On` is the foreground (lit on the OLED, white on the
/// e-paper) and `BinaryColor::Off` the background.
pub trait Panel:
    DrawTarget<Color = BinaryColor, Error: Debug> + OriginDimensions + Send
{
    type FlushError: Debug;

    /// Push the frame to the hardware. May take hundreds of milliseconds.
    fn flush(&mut self) -> Result<(), Self::FlushError>;

    /// Integer UI scale relative to a 128x64 layout.
    fn scale(&self) -> u32 {
        scale_for(self.size())
    }
}

/// UI scale for a surface of `size`.
pub fn scale_for(size: Size) -> u32 {
    let scale_x = (size.width / 128).max(1);
    let scale_y = (size.height / 64).max(1);
    scale_x.min(scale_y)
}

/// Busy/ready signalling around slow work (the status LED on device).
pub trait StatusIndicator: Send + Sync {
    fn set_busy(&self);
    fn set_ready(&self);
}

/// Indicator for targets without a status LED.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIndicator;

impl StatusIndicator for NoIndicator {
    fn set_busy(&self) {}
    fn set_ready(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_follows_smaller_axis() {
        assert_eq!(scale_for(Size::new(128, 64)), 1);
        assert_eq!(scale_for(Size::new(296, 128)), 2);
        assert_eq!(scale_for(Size::new(128, 296)), 1);
        assert_eq!(scale_for(Size::new(64, 32)), 1);
        assert_eq!(scale_for(Size::new(400, 300)), 3);
    }
}
