//! Display configuration types and builder

pub use crate::error::{BuilderError, MAX_GATE_OUTPUTS, MAX_SOURCE_OUTPUTS};

/// Native panel geometry: `rows` gates by `cols` sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    pub rows: u16,
    pub cols: u16,
}

impl Dimensions {
    /// The 2.9" module: 296 gates by 128 sources.
    pub const PANEL_2IN9: Dimensions = Dimensions {
        rows: 296,
        cols: 128,
    };

    /// # Errors
    ///
    /// `BuilderError::InvalidDimensions` unless `1 <= rows <= 296` and `cols`
    /// is a non-zero multiple of 8 no larger than 176.
    pub fn new(rows: u16, cols: u16) -> Result<Self, BuilderError> {
        let rows_ok = rows > 0 && rows <= MAX_GATE_OUTPUTS;
        let cols_ok = cols > 0 && cols <= MAX_SOURCE_OUTPUTS && cols % 8 == 0;
        if rows_ok && cols_ok {
            Ok(Self { rows, cols })
        } else {
            Err(BuilderError::InvalidDimensions { rows, cols })
        }
    }

    /// Bytes in a 1 bpp frame.
    pub fn buffer_size(&self) -> usize {
        self.rows as usize * self.cols as usize / 8
    }

    /// Bytes per gate line.
    pub fn row_bytes(&self) -> usize {
        self.cols as usize / 8
    }
}

/// Rotation of the drawing surface relative to the native orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    Rotate0,
    Rotate90,
    Rotate180,
    Rotate270,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub dimensions: Dimensions,
    pub rotation: Rotation,
    /// Third byte of DRIVER_OUTPUT_CONTROL (gate scan direction).
    pub gate_scanning: u8,
    pub border_waveform: u8,
    pub data_entry_mode: u8,
    pub temp_sensor_control: u8,
}

impl Config {
    /// Drawing surface size after rotation, as (width, height).
    pub fn rotated_size(&self) -> (u32, u32) {
        let (w, h) = (self.dimensions.cols as u32, self.dimensions.rows as u32);
        match self.rotation {
            Rotation::Rotate0 | Rotation::Rotate180 => (w, h),
            Rotation::Rotate90 | Rotation::Rotate270 => (h, w),
        }
    }
}

/// ```
/// use ssd1680::{Builder, Dimensions, Rotation};
///
/// let config = Builder::new()
///     .dimensions(Dimensions::PANEL_2IN9)
///     .rotation(Rotation::Rotate90)
///     .build()
///     .unwrap();
/// assert_eq!(config.rotated_size(), (296, 128));
/// ```
pub struct Builder {
    dimensions: Option<Dimensions>,
    rotation: Rotation,
    gate_scanning: u8,
    border_waveform: u8,
    data_entry_mode: u8,
    temp_sensor_control: u8,
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            dimensions: None,
            rotation: Rotation::Rotate0,
            gate_scanning: 0x00,
            // Follow LUT, VSS border
            border_waveform: 0x05,
            data_entry_mode: crate::command::DATA_ENTRY_XINC_YINC,
            // Internal temperature sensor
            temp_sensor_control: 0x80,
        }
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Required.
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn gate_scanning(mut self, value: u8) -> Self {
        self.gate_scanning = value;
        self
    }

    pub fn border_waveform(mut self, value: u8) -> Self {
        self.border_waveform = value;
        self
    }

    pub fn data_entry_mode(mut self, value: u8) -> Self {
        self.data_entry_mode = value;
        self
    }

    pub fn temp_sensor_control(mut self, value: u8) -> Self {
        self.temp_sensor_control = value;
        self
    }

    /// # Errors
    ///
    /// `BuilderError::MissingDimensions` if no dimensions were given.
    pub fn build(self) -> Result<Config, BuilderError> {
        Ok(Config {
            dimensions: self.dimensions.ok_or(BuilderError::MissingDimensions)?,
            rotation: self.rotation,
            gate_scanning: self.gate_scanning,
            border_waveform: self.border_waveform,
            data_entry_mode: self.data_entry_mode,
            temp_sensor_control: self.temp_sensor_control,
        })
    }
}
