//! Framebuffer panel for host tests.
//!
//! `MockDisplay` from embedded-graphics panics when a pixel is drawn twice,
//! which doesn't work for screens that clear backgrounds then draw on top.
//! This panel allows overdraw and records every flush so tests can count
//! physical refreshes and inspect what was last pushed.

use std::time::Duration;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

use crate::panel::Panel;

/// Returned by [`TestPanel::flush`] after [`TestPanel::fail_next_flush`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushFailed;

/// Simple framebuffer panel for tests that allows overdraw.
pub struct TestPanel {
    pixels: Vec<BinaryColor>,
    flushed: Vec<BinaryColor>,
    width: u32,
    height: u32,
    flushes: usize,
    flush_delay: Duration,
    fail_next: bool,
}

impl TestPanel {
    /// Create a new test panel with the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width * height) as usize;
        Self {
            pixels: vec![BinaryColor::Off; len],
            flushed: vec![BinaryColor::Off; len],
            width,
            height,
            flushes: 0,
            flush_delay: Duration::ZERO,
            fail_next: false,
        }
    }

    /// 128x64, the SSD1306 OLED.
    pub fn oled() -> Self {
        Self::new(128, 64)
    }

    /// 296x128, the 2.9" e-paper in landscape.
    pub fn epaper() -> Self {
        Self::new(296, 128)
    }

    /// Make every flush sleep, emulating a slow e-paper refresh.
    pub fn with_flush_delay(mut self, delay: Duration) -> Self {
        self.flush_delay = delay;
        self
    }

    pub fn fail_next_flush(&mut self) {
        self.fail_next = true;
    }

    /// Number of completed physical flushes.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Current frame, row-major.
    pub fn pixels(&self) -> &[BinaryColor] {
        &self.pixels
    }

    /// Frame as it was at the most recent successful flush.
    pub fn flushed_pixels(&self) -> &[BinaryColor] {
        &self.flushed
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<BinaryColor> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Count of foreground pixels in the current frame.
    pub fn lit_pixel_count(&self) -> usize {
        self.pixels
            .iter()
            .filter(|p| **p == BinaryColor::On)
            .count()
    }

    /// Count of foreground pixels inside one row band `[y, y + h)`.
    pub fn lit_pixels_in_rows(&self, y: u32, h: u32) -> usize {
        let end = (y + h).min(self.height);
        (y.min(end)..end)
            .flat_map(|row| (0..self.width).map(move |col| (col, row)))
            .filter(|(col, row)| self.pixel(*col, *row) == Some(BinaryColor::On))
            .count()
    }
}

impl DrawTarget for TestPanel {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x >= 0
                && coord.y >= 0
                && (coord.x as u32) < self.width
                && (coord.y as u32) < self.height
            {
                let idx = (coord.y as u32 * self.width + coord.x as u32) as usize;
                self.pixels[idx] = color;
            }
        }
        Ok(())
    }
}

impl OriginDimensions for TestPanel {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl Panel for TestPanel {
    type FlushError = FlushFailed;

    fn flush(&mut self) -> Result<(), FlushFailed> {
        if !self.flush_delay.is_zero() {
            std::thread::sleep(self.flush_delay);
        }
        if self.fail_next {
            self.fail_next = false;
            return Err(FlushFailed);
        }
        self.flushed.copy_from_slice(&self.pixels);
        self.flushes += 1;
        Ok(())
    }
}
