//! Built-in 8x8 menu icons.
//!
//! Bitmaps are column-major: byte `i` is column `i`, bit `j` of it is row `j`.

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

use crate::text::fill_rect;

pub const ICON_SIZE: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Icon {
    pub id: &'static str,
    pub columns: [u8; 8],
}

impl Icon {
    pub const fn is_set(&self, x: u32, y: u32) -> bool {
        x < ICON_SIZE && y < ICON_SIZE && self.columns[x as usize] & (1 << y) != 0
    }
}

pub const FOLDER: Icon = Icon {
    id: "folder",
    columns: [0x00, 0x70, 0x48, 0x7E, 0x42, 0x42, 0x7E, 0x00],
};
pub const FILE: Icon = Icon {
    id: "file",
    columns: [0x1C, 0x14, 0x1C, 0x10, 0x1C, 0x10, 0x1C, 0x00],
};
pub const APP: Icon = Icon {
    id: "app",
    columns: [0x18, 0x3C, 0xDB, 0xFF, 0xFF, 0xDB, 0x3C, 0x18],
};
pub const BACK: Icon = Icon {
    id: "back",
    columns: [0x10, 0x30, 0x7F, 0xFF, 0xFF, 0x7F, 0x30, 0x10],
};
pub const SETTINGS: Icon = Icon {
    id: "settings",
    columns: [0x44, 0x44, 0x7C, 0x44, 0x22, 0x3E, 0x22, 0x22],
};
pub const INFO: Icon = Icon {
    id: "info",
    columns: [0x3C, 0x42, 0x99, 0x81, 0x99, 0x99, 0x42, 0x3C],
};
pub const SD: Icon = Icon {
    id: "sd",
    columns: [0x7E, 0x7E, 0x42, 0x42, 0x7E, 0x7E, 0x7E, 0x7E],
};
pub const GAME: Icon = Icon {
    id: "game",
    columns: [0x00, 0x7E, 0xFF, 0xDB, 0xDB, 0xFF, 0x7E, 0x00],
};
pub const MUSIC: Icon = Icon {
    id: "music",
    columns: [0x0F, 0x09, 0x09, 0x09, 0x79, 0xF9, 0xF0, 0x60],
};
pub const PHOTO: Icon = Icon {
    id: "photo",
    columns: [0x00, 0x7E, 0x81, 0xA5, 0xA5, 0x81, 0x7E, 0x00],
};
pub const WIFI: Icon = Icon {
    id: "wifi",
    columns: [0x00, 0x7E, 0x81, 0x3C, 0x42, 0x18, 0x24, 0x18],
};
pub const BLUETOOTH: Icon = Icon {
    id: "bluetooth",
    columns: [0x08, 0x4A, 0x2C, 0x18, 0x18, 0x2C, 0x4A, 0x08],
};
pub const USB: Icon = Icon {
    id: "usb",
    columns: [0x18, 0x18, 0x18, 0x5A, 0x5A, 0x3C, 0x18, 0x18],
};
pub const GPIO: Icon = Icon {
    id: "gpio",
    columns: [0x55, 0x55, 0x55, 0x7F, 0x7F, 0x55, 0x55, 0x55],
};

static ALL: [Icon; 14] = [
    FOLDER, FILE, APP, BACK, SETTINGS, INFO, SD, GAME, MUSIC, PHOTO, WIFI, BLUETOOTH, USB, GPIO,
];

/// Find a built-in icon by id.
pub fn lookup(id: &str) -> Option<&'static Icon> {
    ALL.iter().find(|icon| icon.id == id)
}

/// Draw `icon` with its top-left corner at `position`, each bit as a
/// `scale x scale` block in `color`. Unset bits are left untouched.
pub fn draw_icon<D>(
    target: &mut D,
    icon: &Icon,
    position: Point,
    scale: u32,
    color: BinaryColor,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let scale = scale.max(1);
    for x in 0..ICON_SIZE {
        for y in 0..ICON_SIZE {
            if icon.is_set(x, y) {
                let offset = Point::new((x * scale) as i32, (y * scale) as i32);
                fill_rect(target, position + offset, Size::new_equal(scale), color)?;
            }
        }
    }
    Ok(())
}
