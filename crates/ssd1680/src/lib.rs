//! Driver for the SSD1680 e-paper controller (2.9" 128x296 modules), using
//! embedded-hal 1.0.
//!
//! ```rust,ignore
//! let interface = Interface::new(spi, dc, rst, busy);
//! let config = Builder::new()
//!     .dimensions(Dimensions::PANEL_2IN9)
//!     .rotation(Rotation::Rotate90)
//!     .build()?;
//! let mut display = Display::new(interface, config);
//! display.reset(&mut delay)?;
//! ```

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

pub mod command;
pub mod config;
pub mod display;
pub mod error;
#[cfg(feature = "graphics")]
pub mod graphics;
pub mod interface;

pub use config::{Builder, Config, Dimensions, Rotation};
pub use display::{Display, RefreshMode};
pub use error::{BuilderError, Error, MAX_GATE_OUTPUTS, MAX_SOURCE_OUTPUTS};
#[cfg(feature = "graphics")]
pub use graphics::GraphicDisplay;
pub use interface::{DisplayInterface, Interface, InterfaceError, BUSY_TIMEOUT_MS};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::*;
    use embedded_hal::delay::DelayNs;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Command(u8),
        Data(Vec<u8>),
        Reset,
    }

    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
    }

    impl Recorder {
        fn commands(&self) -> Vec<u8> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Command(c) => Some(*c),
                    _ => None,
                })
                .collect()
        }

        /// Data sent right after `command`, for each occurrence.
        fn data_after(&self, command: u8) -> Vec<Vec<u8>> {
            self.ops
                .windows(2)
                .filter_map(|pair| match pair {
                    [Op::Command(c), Op::Data(d)] if *c == command => Some(d.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl DisplayInterface for Recorder {
        type Error = core::convert::Infallible;

        fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
            self.ops.push(Op::Command(command));
            Ok(())
        }

        fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
            self.ops.push(Op::Data(data.to_vec()));
            Ok(())
        }

        fn reset<D: DelayNs>(&mut self, _delay: &mut D) {
            self.ops.push(Op::Reset);
        }

        fn busy_wait<D: DelayNs>(&mut self, _delay: &mut D) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn display(rotation: Rotation) -> Display<Recorder> {
        let config = Builder::new()
            .dimensions(Dimensions::PANEL_2IN9)
            .rotation(rotation)
            .build()
            .unwrap();
        Display::new(Recorder::default(), config)
    }

    #[test]
    fn dimensions_are_validated() {
        assert!(Dimensions::new(296, 128).is_ok());
        assert!(Dimensions::new(296, 176).is_ok());
        assert_eq!(
            Dimensions::new(300, 128),
            Err(BuilderError::InvalidDimensions { rows: 300, cols: 128 })
        );
        assert!(Dimensions::new(296, 130).is_err());
        assert!(Dimensions::new(0, 128).is_err());
        assert_eq!(Dimensions::PANEL_2IN9.buffer_size(), 4736);
    }

    #[test]
    fn reset_programs_panel_geometry() {
        let mut display = display(Rotation::Rotate0);
        display.reset(&mut NoDelay).unwrap();
        let rec = display.interface();

        assert_eq!(rec.ops[0], Op::Reset);
        assert_eq!(rec.commands()[0], SOFT_RESET);
        assert_eq!(rec.data_after(DRIVER_OUTPUT_CONTROL), vec![vec![0x27, 0x01, 0x00]]);
        assert_eq!(rec.data_after(SET_RAM_X_RANGE), vec![vec![0x00, 0x0F]]);
        assert_eq!(
            rec.data_after(SET_RAM_Y_RANGE),
            vec![vec![0x00, 0x00, 0x27, 0x01]]
        );
    }

    #[test]
    fn first_update_is_full_then_partial_keeps_base_frame() {
        let mut display = display(Rotation::Rotate0);
        display.reset(&mut NoDelay).unwrap();
        let frame = vec![0xAA; Dimensions::PANEL_2IN9.buffer_size()];

        display.update(&frame, RefreshMode::Partial, &mut NoDelay).unwrap();
        assert_eq!(display.interface().data_after(DISPLAY_UPDATE_CTRL2), vec![vec![CTRL2_FULL]]);

        display.update(&frame, RefreshMode::Partial, &mut NoDelay).unwrap();
        let rec = display.interface();
        assert_eq!(
            rec.data_after(DISPLAY_UPDATE_CTRL2),
            vec![vec![CTRL2_FULL], vec![CTRL2_PARTIAL]]
        );
        // Full writes both planes; partial writes BW, then RED after refreshing.
        assert_eq!(rec.data_after(WRITE_RAM_BW).len(), 2);
        assert_eq!(rec.data_after(WRITE_RAM_RED).len(), 2);
        let cmds = rec.commands();
        let activation = cmds.iter().rposition(|c| *c == MASTER_ACTIVATION).unwrap();
        assert_eq!(cmds.last(), Some(&WRITE_RAM_RED));
        assert!(activation < cmds.len() - 1);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let mut display = display(Rotation::Rotate0);
        let err = display.update(&[0u8; 10], RefreshMode::Full, &mut NoDelay).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferTooSmall {
                required: 4736,
                provided: 10
            }
        ));
    }

    #[test]
    fn deep_sleep_powers_down_first() {
        let mut display = display(Rotation::Rotate0);
        display.deep_sleep(&mut NoDelay).unwrap();
        assert_eq!(
            display.interface().commands(),
            vec![DISPLAY_UPDATE_CTRL2, MASTER_ACTIVATION, DEEP_SLEEP]
        );
    }

    #[cfg(feature = "graphics")]
    mod graphics {
        use super::{display, NoDelay, Recorder};
        use crate::command::WRITE_RAM_BW;
        use crate::{Dimensions, GraphicDisplay, RefreshMode, Rotation};
        use embedded_graphics_core::{
            draw_target::DrawTarget,
            geometry::{OriginDimensions, Point, Size},
            pixelcolor::BinaryColor,
            Pixel,
        };

        fn graphic(rotation: Rotation) -> GraphicDisplay<Recorder, Vec<u8>> {
            GraphicDisplay::new(
                display(rotation),
                vec![0xFF; Dimensions::PANEL_2IN9.buffer_size()],
            )
        }

        #[test]
        fn landscape_rotation_swaps_size() {
            assert_eq!(graphic(Rotation::Rotate0).size(), Size::new(128, 296));
            assert_eq!(graphic(Rotation::Rotate90).size(), Size::new(296, 128));
        }

        #[test]
        fn ink_clears_bits_msb_first() {
            let mut epd = graphic(Rotation::Rotate0);
            epd.draw_iter([Pixel(Point::new(1, 0), BinaryColor::On)]).unwrap();
            assert_eq!(epd.buffer()[0], 0b1011_1111);

            epd.draw_iter([Pixel(Point::new(1, 0), BinaryColor::Off)]).unwrap();
            assert_eq!(epd.buffer()[0], 0xFF);
        }

        #[test]
        fn rotated_pixels_land_in_native_buffer() {
            let mut epd = graphic(Rotation::Rotate90);
            // Logical (0, 0) is the top-right of the native panel.
            epd.draw_iter([Pixel(Point::new(0, 0), BinaryColor::On)]).unwrap();
            assert_eq!(epd.buffer()[15], 0xFE);

            // Off-surface pixels are ignored.
            epd.draw_iter([Pixel(Point::new(296, 0), BinaryColor::On)]).unwrap();
            epd.draw_iter([Pixel(Point::new(-1, 3), BinaryColor::On)]).unwrap();
            assert_eq!(epd.buffer().iter().filter(|b| **b != 0xFF).count(), 1);
        }

        #[test]
        fn clear_fills_paper_or_ink() {
            let mut epd = graphic(Rotation::Rotate90);
            DrawTarget::clear(&mut epd, BinaryColor::On).unwrap();
            assert!(epd.buffer().iter().all(|b| *b == 0x00));
            epd.update(RefreshMode::Full, &mut NoDelay).unwrap();
            assert_eq!(epd.display().interface().data_after(WRITE_RAM_BW)[0].len(), 4736);
        }
    }
}
