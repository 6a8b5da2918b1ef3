//! Scaled monospace text and the row cursor used by list screens.
//!
//! Every layout is designed for a 128x64 panel with a 6x8 character cell.
//! Larger panels multiply all coordinates by the integer UI scale, so glyphs
//! are rendered at scale 1 into a [`Scaled`] adapter that blows each pixel up
//! into a `scale x scale` block.

use std::borrow::Cow;

use embedded_graphics::{
    mono_font::{ascii::FONT_5X8, MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::Rectangle,
    text::{Baseline, Text},
};

use crate::panel::{scale_for, BASE_CHAR_HEIGHT, BASE_CHAR_WIDTH};

/// 5x8 glyphs with one column of spacing: a 6x8 cell.
const GLYPHS: MonoFont<'static> = MonoFont {
    character_spacing: 1,
    ..FONT_5X8
};

/// Pixel geometry of a surface at its UI scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub scale: u32,
    pub char_width: u32,
    pub char_height: u32,
    pub width: u32,
    pub height: u32,
}

impl Metrics {
    pub fn of<D: OriginDimensions>(target: &D) -> Self {
        Self::for_size(target.size())
    }

    pub fn for_size(size: Size) -> Self {
        let scale = scale_for(size);
        Self {
            scale,
            char_width: BASE_CHAR_WIDTH * scale,
            char_height: BASE_CHAR_HEIGHT * scale,
            width: size.width,
            height: size.height,
        }
    }

    /// Width in pixels of `text` at this scale.
    pub fn text_width(&self, text: &str) -> u32 {
        text.chars().count() as u32 * self.char_width
    }

    /// Whole characters that fit in `pixels`.
    pub fn chars_in(&self, pixels: u32) -> usize {
        (pixels / self.char_width) as usize
    }

    /// Whole text rows that fit on the surface.
    pub fn rows(&self) -> u32 {
        self.height / self.char_height
    }
}

/// Draw target adapter that magnifies every pixel by an integer factor.
pub struct Scaled<'a, D> {
    target: &'a mut D,
    origin: Point,
    scale: u32,
}

impl<'a, D> Scaled<'a, D> {
    pub fn new(target: &'a mut D, origin: Point, scale: u32) -> Self {
        Self {
            target,
            origin,
            scale: scale.max(1),
        }
    }
}

impl<D: DrawTarget> DrawTarget for Scaled<'_, D> {
    type Color = D::Color;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let step = self.scale as i32;
        for Pixel(point, color) in pixels {
            let block = Rectangle::new(
                self.origin + point * step,
                Size::new_equal(self.scale),
            );
            self.target.fill_solid(&block, color)?;
        }
        Ok(())
    }
}

impl<D: Dimensions> Dimensions for Scaled<'_, D> {
    fn bounding_box(&self) -> Rectangle {
        let outer = self.target.bounding_box();
        Rectangle::new(
            (outer.top_left - self.origin) / self.scale as i32,
            outer.size / self.scale,
        )
    }
}

/// Draw `text` with its top-left corner at `position`.
///
/// Returns the position just right of the last character.
pub fn draw_text<D>(
    target: &mut D,
    text: &str,
    position: Point,
    scale: u32,
    color: BinaryColor,
) -> Result<Point, D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(&GLYPHS, color);
    let mut scaled = Scaled::new(target, position, scale);
    let end = Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut scaled)?;
    Ok(position + Point::new(end.x * scale.max(1) as i32, 0))
}

/// Draw `text` horizontally centred on the surface at row `y`.
pub fn draw_centered<D>(target: &mut D, text: &str, y: i32, color: BinaryColor) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions,
{
    let metrics = Metrics::of(target);
    let x = (metrics.width as i32 - metrics.text_width(text) as i32).max(0) / 2;
    draw_text(target, text, Point::new(x, y), metrics.scale, color)?;
    Ok(())
}

pub fn fill_rect<D>(target: &mut D, top_left: Point, size: Size, color: BinaryColor) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    target.fill_solid(&Rectangle::new(top_left, size), color)
}

/// Truncate `text` to `max_chars`, ending with `...` when there is room for it.
pub fn fit_to_width(text: &str, max_chars: usize) -> Cow<'_, str> {
    let len = text.chars().count();
    if len <= max_chars {
        Cow::Borrowed(text)
    } else if max_chars > 3 {
        let mut cut: String = text.chars().take(max_chars - 3).collect();
        cut.push_str("...");
        Cow::Owned(cut)
    } else {
        Cow::Owned(text.chars().take(max_chars).collect())
    }
}

/// Row-oriented text cursor.
#[derive(Debug, Clone, Copy)]
pub struct TextCursor {
    pub x: i32,
    pub y: i32,
    metrics: Metrics,
}

impl TextCursor {
    pub fn new(metrics: Metrics) -> Self {
        Self { x: 0, y: 0, metrics }
    }

    pub fn at_row(metrics: Metrics, row: u32) -> Self {
        Self {
            x: 0,
            y: (row * metrics.char_height) as i32,
            metrics,
        }
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub fn reset(&mut self) {
        self.x = 0;
        self.y = 0;
    }

    pub fn newline(&mut self) {
        self.x = 0;
        self.y += self.metrics.char_height as i32;
    }

    /// Print `text` at the cursor and advance past it. With `invert`, the
    /// text cell is filled and the glyphs are cut out of it.
    pub fn print<D>(&mut self, target: &mut D, text: &str, invert: bool) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let width = self.metrics.text_width(text);
        let color = if invert {
            fill_rect(
                target,
                Point::new(self.x, self.y),
                Size::new(width, self.metrics.char_height),
                BinaryColor::On,
            )?;
            BinaryColor::Off
        } else {
            BinaryColor::On
        };
        draw_text(target, text, Point::new(self.x, self.y), self.metrics.scale, color)?;
        self.x += width as i32;
        Ok(())
    }

    /// Print the rest of the row and move to the next one. With `invert`, the
    /// whole row is highlighted. Text that does not fit is truncated.
    pub fn println<D>(&mut self, target: &mut D, text: &str, invert: bool) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let color = if invert {
            fill_rect(
                target,
                Point::new(0, self.y),
                Size::new(self.metrics.width, self.metrics.char_height),
                BinaryColor::On,
            )?;
            BinaryColor::Off
        } else {
            BinaryColor::On
        };

        let available = (self.metrics.width as i32 - self.x).max(0) as u32;
        let fitted = fit_to_width(text, self.metrics.chars_in(available));
        draw_text(target, &fitted, Point::new(self.x, self.y), self.metrics.scale, color)?;
        self.newline();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_panel::TestPanel;

    #[test]
    fn metrics_scale_cells() {
        let oled = Metrics::for_size(Size::new(128, 64));
        assert_eq!((oled.char_width, oled.char_height), (6, 8));
        assert_eq!(oled.rows(), 8);

        let epaper = Metrics::for_size(Size::new(296, 128));
        assert_eq!((epaper.char_width, epaper.char_height), (12, 16));
        assert_eq!(epaper.chars_in(296), 24);
        assert_eq!(epaper.text_width("abc"), 36);
    }

    #[test]
    fn fit_to_width_truncates() {
        assert_eq!(fit_to_width("Settings", 10), "Settings");
        assert_eq!(fit_to_width("Applications", 8), "Appli...");
        assert_eq!(fit_to_width("Games", 3), "Gam");
        assert_eq!(fit_to_width("Games", 0), "");
    }

    #[test]
    fn text_stays_inside_its_cell() {
        let mut panel = TestPanel::oled();
        let end = draw_text(&mut panel, "Hi", Point::new(6, 8), 1, BinaryColor::On).unwrap();
        assert_eq!(end.y, 8);
        assert!(end.x >= 6 + 11 && end.x <= 18);
        assert!(panel.lit_pixel_count() > 0);
        assert_eq!(panel.lit_pixels_in_rows(0, 8), 0);
        assert_eq!(panel.lit_pixels_in_rows(16, 48), 0);
    }

    #[test]
    fn scaled_text_multiplies_pixels() {
        let mut small = TestPanel::oled();
        draw_text(&mut small, "A", Point::zero(), 1, BinaryColor::On).unwrap();
        let mut large = TestPanel::epaper();
        draw_text(&mut large, "A", Point::zero(), 2, BinaryColor::On).unwrap();
        assert_eq!(large.lit_pixel_count(), small.lit_pixel_count() * 4);
        assert_eq!(large.lit_pixels_in_rows(16, 112), 0);
    }

    #[test]
    fn inverted_println_highlights_full_row() {
        let mut panel = TestPanel::oled();
        let mut cursor = TextCursor::new(Metrics::of(&panel));
        cursor.println(&mut panel, "", true).unwrap();
        assert_eq!(panel.lit_pixels_in_rows(0, 8), 128 * 8);
        assert_eq!(cursor.y, 8);
        assert_eq!(cursor.x, 0);

        cursor.print(&mut panel, "ab", true).unwrap();
        assert_eq!(cursor.x, 12);
        assert!(panel.lit_pixels_in_rows(8, 8) < 12 * 8);
        assert!(panel.lit_pixels_in_rows(8, 8) > 0);
        assert_eq!(panel.pixel(12, 8), Some(BinaryColor::Off));
    }
}
