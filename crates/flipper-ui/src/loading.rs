//! Loading screens: the framed spinner and the optional bitmap overlay.

use core::fmt;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

use crate::filesystem::FileSystem;
use crate::text::{draw_centered, draw_text, fill_rect, Metrics};

/// Where the firmware looks for a custom loading bitmap.
pub const LOADING_SCREEN_PATH: &str = "/assets/loading_screen.txt";
const MAX_SIDE: u32 = 512;
const BORDER_INSET: i32 = 8;
const BORDER_WIDTH: u32 = 2;

/// Draw a framed loading screen: centred title, optional subtitle and an
/// optional three-dot spinner with `frame % 3` highlighted.
pub fn show_loading<D>(
    target: &mut D,
    title: &str,
    subtitle: Option<&str>,
    spinner_frame: Option<usize>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions,
{
    target.clear(BinaryColor::Off)?;
    let metrics = Metrics::of(target);
    let (w, h) = (metrics.width as i32, metrics.height as i32);
    let char_h = metrics.char_height as i32;

    let title_y = h / 2 - char_h;
    draw_centered(target, title, title_y, BinaryColor::On)?;

    if let Some(subtitle) = subtitle.filter(|s| !s.is_empty()) {
        draw_centered(target, subtitle, title_y + char_h + 4, BinaryColor::On)?;
    }

    if let Some(frame) = spinner_frame {
        let center_x = w / 2;
        let spin_y = title_y - char_h - 12;
        let dot = 3 * metrics.scale as i32;
        let spacing = dot * 2;
        for i in 0..3i32 {
            let dx = (i - 1) * spacing;
            if i as usize == frame % 3 {
                fill_rect(
                    target,
                    Point::new(center_x + dx - dot / 2, spin_y),
                    Size::new_equal(dot as u32),
                    BinaryColor::On,
                )?;
            } else {
                fill_rect(
                    target,
                    Point::new(center_x + dx - 1, spin_y + 1),
                    Size::new_equal(2),
                    BinaryColor::On,
                )?;
            }
        }
    }

    let inner_w = (w - 2 * BORDER_INSET).max(0) as u32;
    let inner_h = (h - 2 * BORDER_INSET).max(0) as u32;
    let far_x = w - BORDER_INSET - BORDER_WIDTH as i32;
    let far_y = h - BORDER_INSET - BORDER_WIDTH as i32;
    let inset = Point::new(BORDER_INSET, BORDER_INSET);
    fill_rect(target, inset, Size::new(inner_w, BORDER_WIDTH), BinaryColor::On)?;
    fill_rect(target, Point::new(BORDER_INSET, far_y), Size::new(inner_w, BORDER_WIDTH), BinaryColor::On)?;
    fill_rect(target, inset, Size::new(BORDER_WIDTH, inner_h), BinaryColor::On)?;
    fill_rect(target, Point::new(far_x, BORDER_INSET), Size::new(BORDER_WIDTH, inner_h), BinaryColor::On)?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadingScreenError {
    /// First line is not `"<width> <height>"`.
    InvalidHeader,
    /// Width or height outside `1..=512`.
    InvalidDimensions { width: u32, height: u32 },
    /// Fewer characters than `width * height` after the header.
    InsufficientData { found: usize, expected: usize },
}

impl fmt::Display for LoadingScreenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadingScreenError::InvalidHeader => write!(f, "Invalid loading screen format"),
            LoadingScreenError::InvalidDimensions { width, height } => {
                write!(f, "Invalid loading screen dimensions: {}x{}", width, height)
            }
            LoadingScreenError::InsufficientData { found, expected } => write!(
                f,
                "Loading screen file has insufficient data: {} bytes, expected at least {}",
                found, expected
            ),
        }
    }
}

impl std::error::Error for LoadingScreenError {}

/// Monochrome bitmap shown while a slow app starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingScreen {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl LoadingScreen {
    /// Parse the text format: a `"W H"` header line, then `W * H` cells of
    /// `'1'` (lit) or anything else (dark). Whitespace between cells is
    /// ignored.
    pub fn parse(source: &str) -> Result<Self, LoadingScreenError> {
        let (header, body) = source.split_once('\n').unwrap_or((source, ""));
        let (width, height) = header
            .trim()
            .split_once(' ')
            .and_then(|(w, h)| Some((w.trim().parse::<u32>().ok()?, h.trim().parse::<u32>().ok()?)))
            .ok_or(LoadingScreenError::InvalidHeader)?;

        if !(1..=MAX_SIDE).contains(&width) || !(1..=MAX_SIDE).contains(&height) {
            return Err(LoadingScreenError::InvalidDimensions { width, height });
        }

        let body = body.trim();
        let expected = (width * height) as usize;
        if body.len() < expected {
            return Err(LoadingScreenError::InsufficientData {
                found: body.len(),
                expected,
            });
        }

        let mut cells: Vec<bool> = body
            .chars()
            .filter(|c| !matches!(c, '\n' | '\r' | ' ' | '\t'))
            .take(expected)
            .map(|c| c == '1')
            .collect();
        cells.resize(expected, false);

        log::info!("Loaded loading screen: {}x{}", width, height);
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Load [`LOADING_SCREEN_PATH`]. The bitmap is optional, so any failure
    /// is logged and yields `None`.
    pub fn load(fs: &mut dyn FileSystem) -> Option<Self> {
        let source = match fs.read_file(LOADING_SCREEN_PATH) {
            Ok(source) => source,
            Err(err) => {
                log::info!("No loading screen at {} ({})", LOADING_SCREEN_PATH, err);
                return None;
            }
        };
        match Self::parse(&source) {
            Ok(screen) => Some(screen),
            Err(err) => {
                log::warn!("{}", err);
                None
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_lit(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.cells[(y * self.width + x) as usize]
    }

    /// Clear the target and draw the bitmap scaled to cover it, centred, with
    /// optional `text` centred near the top.
    pub fn draw_overlay<D>(&self, target: &mut D, text: Option<&str>) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor> + OriginDimensions,
    {
        target.clear(BinaryColor::Off)?;
        let size = target.size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        let scale = f32::max(
            size.width as f32 / self.width as f32,
            size.height as f32 / self.height as f32,
        );
        let scaled_w = (self.width as f32 * scale) as i32;
        let scaled_h = (self.height as f32 * scale) as i32;
        let offset_x = (size.width as i32 - scaled_w) / 2;
        let offset_y = (size.height as i32 - scaled_h) / 2;

        let bounds = target.bounding_box();
        let lit = (0..scaled_h)
            .flat_map(|y| (0..scaled_w).map(move |x| (x, y)))
            .filter(|&(x, y)| self.is_lit((x as f32 / scale) as u32, (y as f32 / scale) as u32))
            .map(|(x, y)| Pixel(Point::new(offset_x + x, offset_y + y), BinaryColor::On))
            .filter(|Pixel(p, _)| bounds.contains(*p));
        target.draw_iter(lit)?;

        if let Some(text) = text.filter(|t| !t.is_empty()) {
            let metrics = Metrics::of(target);
            let x = (metrics.width as i32 - metrics.text_width(text) as i32).max(0) / 2;
            draw_text(target, text, Point::new(x, 8), metrics.scale, BinaryColor::On)?;
        }
        Ok(())
    }
}
