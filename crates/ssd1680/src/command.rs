// SSD1680 command set

// Initialization and reset
pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;
pub const DEEP_SLEEP: u8 = 0x10;
pub const DATA_ENTRY_MODE: u8 = 0x11;
pub const SOFT_RESET: u8 = 0x12;
pub const TEMP_SENSOR_CONTROL: u8 = 0x18;
pub const BORDER_WAVEFORM: u8 = 0x3C;

// Update sequence
pub const MASTER_ACTIVATION: u8 = 0x20;
pub const DISPLAY_UPDATE_CTRL1: u8 = 0x21;
pub const DISPLAY_UPDATE_CTRL2: u8 = 0x22;
pub const CTRL1_NORMAL: u8 = 0x00;
/// Source output S8..S167 as used by 128-source panels.
pub const CTRL1_SOURCE_S8: u8 = 0x80;
/// Clock + analog on, load temperature and LUT, display, power off.
pub const CTRL2_FULL: u8 = 0xF7;
/// As [`CTRL2_FULL`] but in display mode 2 (differential).
pub const CTRL2_PARTIAL: u8 = 0xFC;
pub const CTRL2_POWER_OFF: u8 = 0x03;

// RAM
pub const WRITE_RAM_BW: u8 = 0x24;
/// "Red" RAM holds the previous frame for differential updates.
pub const WRITE_RAM_RED: u8 = 0x26;
pub const SET_RAM_X_RANGE: u8 = 0x44;
pub const SET_RAM_Y_RANGE: u8 = 0x45;
pub const SET_RAM_X_COUNTER: u8 = 0x4E;
pub const SET_RAM_Y_COUNTER: u8 = 0x4F;

// Data entry: X increment, Y increment
pub const DATA_ENTRY_XINC_YINC: u8 = 0x03;
