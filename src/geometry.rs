use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;
use strum_macros::{Display, EnumIter, EnumString};

/// Finger rows (top, home, bottom).
pub const FINGER_ROWS: usize = 3;
/// Columns per finger row (6 per half).
pub const COLS: usize = 12;
/// Thumb keys (3 per half).
pub const THUMB_KEYS: usize = 6;
/// Total key slots on a split layout.
pub const KEY_COUNT: usize = FINGER_ROWS * COLS + THUMB_KEYS;

pub const HOME_ROW: u8 = 1;
pub const THUMB_ROW: u8 = 3;
const HALF: u8 = 6;
const HALF_THUMB: u8 = 3;

/// Column -> finger for the finger rows.
/// 0 L-pinky, 1 L-ring, 2 L-middle, 3 L-index, 6 R-index, 7 R-middle, 8 R-ring, 9 R-pinky.
pub const FINGER_TABLE: [u8; COLS] = [0, 0, 1, 2, 3, 3, 6, 6, 7, 8, 9, 9];
pub const LEFT_THUMB: u8 = 4;
pub const RIGHT_THUMB: u8 = 5;
pub const FINGER_COUNT: usize = 10;

/// Fingers that make a scissor when they sit on the lower row of a pair.
pub const SCISSOR_FINGERS: [u8; 4] = [1, 2, 7, 8];

/// Inner columns next to the hand gap, and the columns they stretch against.
pub const LSB_INNER_COLS: [u8; 2] = [5, 6];
pub const LSB_OUTER_COLS: [u8; 2] = [3, 8];

const SQRT_5: f64 = 2.236_067_977_499_79;

// Horizontal shift per finger row on a row-staggered board.
const ROW_STAGGER: [f64; FINGER_ROWS] = [0.0, 0.25, 0.75];

// Vertical shift per column on a column-staggered board.
const COL_STAGGER: [f64; COLS] = [
    0.35, 0.35, 0.1, 0.0, 0.1, 0.2, 0.2, 0.1, 0.0, 0.1, 0.35, 0.35,
];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, EnumIter, Display,
    Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Geometry {
    Ortho,
    #[default]
    RowStag,
    ColStag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn index(self) -> usize {
        match self {
            Hand::Left => 0,
            Hand::Right => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyPos {
    pub row: u8,
    pub col: u8,
}

impl KeyPos {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Slot index in the flat 42-key sequence (finger rows first, then thumbs).
    pub fn slot(self) -> usize {
        if self.row == THUMB_ROW {
            FINGER_ROWS * COLS + self.col as usize
        } else {
            self.row as usize * COLS + self.col as usize
        }
    }

    pub fn from_slot(slot: usize) -> Self {
        debug_assert!(slot < KEY_COUNT);
        if slot >= FINGER_ROWS * COLS {
            Self::new(THUMB_ROW, (slot - FINGER_ROWS * COLS) as u8)
        } else {
            Self::new((slot / COLS) as u8, (slot % COLS) as u8)
        }
    }

    pub fn is_thumb(self) -> bool {
        self.row == THUMB_ROW
    }
}

/// Everything the analyser needs to know about the key a character sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    pub pos: KeyPos,
    pub hand: Hand,
    pub finger: u8,
}

impl KeyInfo {
    pub fn at(pos: KeyPos) -> Self {
        let (hand, finger) = derive_key_info(pos.row, pos.col);
        Self { pos, hand, finger }
    }
}

/// Hand and finger are a pure function of the key position.
pub fn derive_key_info(row: u8, col: u8) -> (Hand, u8) {
    let left = (row < THUMB_ROW && col < HALF) || (row == THUMB_ROW && col < HALF_THUMB);
    let hand = if left { Hand::Left } else { Hand::Right };
    let finger = if row == THUMB_ROW {
        if left {
            LEFT_THUMB
        } else {
            RIGHT_THUMB
        }
    } else {
        FINGER_TABLE[col as usize]
    };
    (hand, finger)
}

/// Physical distance between two keys, uncached.
///
/// Returns 0 across hands and between a thumb key and a finger-row key.
pub fn key_distance(geometry: Geometry, a: KeyPos, b: KeyPos) -> f64 {
    let (hand_a, _) = derive_key_info(a.row, a.col);
    let (hand_b, _) = derive_key_info(b.row, b.col);
    if hand_a != hand_b || a.is_thumb() != b.is_thumb() {
        return 0.0;
    }
    if a.is_thumb() {
        return (a.col as f64 - b.col as f64).abs();
    }

    match geometry {
        Geometry::Ortho => {
            let dx = a.col.abs_diff(b.col);
            let dy = a.row.abs_diff(b.row);
            match (dx, dy) {
                (0, d) | (d, 0) => d as f64,
                (1, 1) => SQRT_2,
                (1, 2) | (2, 1) => SQRT_5,
                (2, 2) => 2.0 * SQRT_2,
                (dx, dy) => euclid(dx as f64, dy as f64),
            }
        }
        Geometry::RowStag => {
            let xa = a.col as f64 + ROW_STAGGER[a.row as usize];
            let xb = b.col as f64 + ROW_STAGGER[b.row as usize];
            euclid(xa - xb, a.row as f64 - b.row as f64)
        }
        Geometry::ColStag => {
            let ya = a.row as f64 + COL_STAGGER[a.col as usize];
            let yb = b.row as f64 + COL_STAGGER[b.col as usize];
            euclid(a.col as f64 - b.col as f64, ya - yb)
        }
    }
}

#[inline(always)]
fn euclid(dx: f64, dy: f64) -> f64 {
    (dx * dx + dy * dy).sqrt()
}
