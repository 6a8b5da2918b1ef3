//! embedded-graphics support
//!
//! [`GraphicDisplay`] owns a 1 bpp frame buffer in front of a
//! [`Display`](crate::display::Display). `BinaryColor::On` is ink (black),
//! `Off` is paper (white).
//!
//! ```rust,ignore
//! let mut epd = GraphicDisplay::new(display, vec![0u8; Dimensions::PANEL_2IN9.buffer_size()]);
//! epd.clear(BinaryColor::Off);
//! Text::new("Hello", Point::new(4, 12), style).draw(&mut epd)?;
//! epd.update(RefreshMode::Partial, &mut delay)?;
//! ```

use core::convert::Infallible;
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::BinaryColor,
    Pixel,
};
use embedded_hal::delay::DelayNs;

use crate::config::Rotation;
use crate::display::{Display, RefreshMode};
use crate::error::Error;
use crate::interface::DisplayInterface;

pub struct GraphicDisplay<I, B>
where
    I: DisplayInterface,
    B: AsMut<[u8]>,
{
    display: Display<I>,
    buffer: B,
}

impl<I, B> GraphicDisplay<I, B>
where
    I: DisplayInterface,
    B: AsMut<[u8]>,
{
    /// `buffer` must hold at least `dimensions.buffer_size()` bytes.
    pub fn new(display: Display<I>, buffer: B) -> Self {
        Self { display, buffer }
    }

    /// Fill the whole buffer with `color`.
    pub fn clear(&mut self, color: BinaryColor) {
        self.buffer.as_mut().fill(byte_for(color));
    }

    /// Send the buffer to the panel and refresh it.
    pub fn update<D: DelayNs>(&mut self, mode: RefreshMode, delay: &mut D) -> Result<(), Error<I>> {
        self.display.update(self.buffer.as_mut(), mode, delay)
    }

    pub fn display(&self) -> &Display<I> {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut Display<I> {
        &mut self.display
    }

    pub fn buffer(&mut self) -> &[u8] {
        self.buffer.as_mut()
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: BinaryColor) {
        let dims = *self.display.dimensions();
        let (index, mask) = buffer_location(
            x,
            y,
            dims.cols as u32,
            dims.rows as u32,
            self.display.rotation(),
        );
        let Some(byte) = self.buffer.as_mut().get_mut(index) else {
            return;
        };
        match color {
            BinaryColor::On => *byte &= !mask,
            BinaryColor::Off => *byte |= mask,
        }
    }
}

fn byte_for(color: BinaryColor) -> u8 {
    match color {
        BinaryColor::On => 0x00,
        BinaryColor::Off => 0xFF,
    }
}

/// Map a point on the rotated surface to (byte index, bit mask) in the
/// native row-major buffer of a `width` x `height` panel.
pub(crate) fn buffer_location(
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    rotation: Rotation,
) -> (usize, u8) {
    let (px, py) = match rotation {
        Rotation::Rotate0 => (x, y),
        Rotation::Rotate90 => (width - 1 - y, x),
        Rotation::Rotate180 => (width - 1 - x, height - 1 - y),
        Rotation::Rotate270 => (y, height - 1 - x),
    };
    let index = (py * (width / 8) + px / 8) as usize;
    (index, 0x80 >> (px % 8))
}

impl<I, B> DrawTarget for GraphicDisplay<I, B>
where
    I: DisplayInterface,
    B: AsMut<[u8]>,
{
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let size = self.size();
        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 {
                continue;
            }
            let (x, y) = (x as u32, y as u32);
            if x < size.width && y < size.height {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        GraphicDisplay::clear(self, color);
        Ok(())
    }
}

impl<I, B> OriginDimensions for GraphicDisplay<I, B>
where
    I: DisplayInterface,
    B: AsMut<[u8]>,
{
    fn size(&self) -> Size {
        let (width, height) = self.display.config().rotated_size();
        Size::new(width, height)
    }
}
