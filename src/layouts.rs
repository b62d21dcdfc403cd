use crate::error::KsResult;
use crate::geometry::{Geometry, COLS, KEY_COUNT};
use crate::layout::Layout;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Thumb slot that receives the space bar on built-in layouts.
const SPACE_SLOT: usize = 3 * COLS + 2;

#[derive(Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum KnownLayout {
    Qwerty,
    Dvorak,
    Colemak,
    ColemakDh,
    Workman,
    Graphite,
}

impl KnownLayout {
    /// The standard 30-key block, row by row, left to right.
    pub fn get_str(&self) -> &'static str {
        match self {
            Self::Qwerty => "qwertyuiopasdfghjkl;zxcvbnm,./",
            Self::Dvorak => "',.pyfgcrlaoeuidhtns;qjkxbmwvz",
            Self::Colemak => "qwfpgjluy;arstdhneiozxcvbkm,./",
            Self::ColemakDh => "qwfpbjluy;arstgmneiozxcdvkh,./",
            Self::Workman => "qdrwbjfup;ashtgyneoizxmcvkl,./",
            Self::Graphite => "bldwz'foujnrtsgyhaeiqxmcvkp.,/",
        }
    }

    /// Places the 30-key block on the inner ten columns of each finger row,
    /// leaving the outer pinky columns empty, and puts space on the left thumb.
    pub fn to_layout(&self, geometry: Geometry) -> KsResult<Layout> {
        let mut keys = [None; KEY_COUNT];
        for (i, c) in self.get_str().chars().enumerate() {
            let row = i / 10;
            let col = i % 10 + 1;
            keys[row * COLS + col] = Some(c);
        }
        keys[SPACE_SLOT] = Some(' ');
        Layout::from_keys(&self.to_string(), geometry, keys)
    }
}

pub fn get_all_layouts(geometry: Geometry) -> KsResult<Vec<Layout>> {
    KnownLayout::iter()
        .map(|known| known.to_layout(geometry))
        .collect()
}
