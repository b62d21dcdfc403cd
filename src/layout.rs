use crate::error::{KeySolveError, KsResult};
use crate::geometry::{
    key_distance, Geometry, KeyInfo, KeyPos, COLS, FINGER_ROWS, KEY_COUNT, THUMB_KEYS,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Marks a slot without a key in layout files.
pub const NO_KEY: char = '~';
/// Stands for the space character in layout files.
pub const SPACE_TOKEN: char = '_';
/// Extension used when scanning a directory for layouts.
pub const LAYOUT_EXT: &str = "kb";

/// Memoised key distances, keyed by unordered position pair.
#[derive(Debug, Clone, Default)]
struct DistanceCache {
    entries: RefCell<HashMap<(KeyPos, KeyPos), f64>>,
}

impl DistanceCache {
    fn get_or_compute(&self, geometry: Geometry, a: KeyPos, b: KeyPos) -> f64 {
        let key = if a <= b { (a, b) } else { (b, a) };
        if let Some(&d) = self.entries.borrow().get(&key) {
            return d;
        }
        let d = key_distance(geometry, key.0, key.1);
        self.entries.borrow_mut().insert(key, d);
        d
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

/// A split keyboard layout: 3x12 finger keys plus 6 thumb keys.
///
/// Each character sits in at most one slot. Pin flags travel with the layout so a
/// clone carries them without any side table.
#[derive(Debug, Clone)]
pub struct Layout {
    pub name: String,
    pub geometry: Geometry,
    keys: [Option<char>; KEY_COUNT],
    pinned: [bool; KEY_COUNT],
    key_info: HashMap<char, KeyInfo>,
    distances: DistanceCache,
}

impl Layout {
    pub fn from_keys(
        name: &str,
        geometry: Geometry,
        keys: [Option<char>; KEY_COUNT],
    ) -> KsResult<Self> {
        let mut key_info = HashMap::new();
        for (slot, c) in keys.iter().enumerate() {
            if let Some(c) = *c {
                let info = KeyInfo::at(KeyPos::from_slot(slot));
                if key_info.insert(c, info).is_some() {
                    return Err(KeySolveError::Format(format!(
                        "layout '{}': character '{}' appears more than once",
                        name, c
                    )));
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            geometry,
            keys,
            pinned: [false; KEY_COUNT],
            key_info,
            distances: DistanceCache::default(),
        })
    }

    /// Parses the 4-line layout format: three rows of 12 tokens, one row of 6 thumbs.
    pub fn parse(name: &str, content: &str, geometry: Geometry) -> KsResult<Self> {
        let lines: Vec<&str> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !is_comment(l))
            .collect();

        if lines.len() != FINGER_ROWS + 1 {
            return Err(KeySolveError::Format(format!(
                "layout '{}': expected {} rows, found {}",
                name,
                FINGER_ROWS + 1,
                lines.len()
            )));
        }

        let mut keys = [None; KEY_COUNT];
        let mut slot = 0;
        for (row, line) in lines.iter().enumerate() {
            let expected = if row < FINGER_ROWS { COLS } else { THUMB_KEYS };
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != expected {
                return Err(KeySolveError::Format(format!(
                    "layout '{}': row {} has {} keys, expected {}",
                    name,
                    row + 1,
                    tokens.len(),
                    expected
                )));
            }
            for token in tokens {
                keys[slot] = parse_token(name, token)?;
                slot += 1;
            }
        }

        Self::from_keys(name, geometry, keys)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P, geometry: Geometry) -> KsResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "unnamed".to_string());
        debug!("Loading layout '{}' from {}", name, path.display());
        Self::parse(&name, &content, geometry)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> KsResult<()> {
        fs::write(path, self.to_layout_string())?;
        Ok(())
    }

    /// Serialises back to the 4-line file format.
    pub fn to_layout_string(&self) -> String {
        let token = |c: Option<char>| match c {
            None => NO_KEY.to_string(),
            Some(' ') => SPACE_TOKEN.to_string(),
            Some(c) => c.to_string(),
        };
        let half_line = |slots: &[Option<char>]| {
            let mid = slots.len() / 2;
            let left: Vec<String> = slots[..mid].iter().map(|&c| token(c)).collect();
            let right: Vec<String> = slots[mid..].iter().map(|&c| token(c)).collect();
            format!("{}  {}", left.join(" "), right.join(" "))
        };

        let mut out = String::new();
        for row in 0..FINGER_ROWS {
            out.push_str(&half_line(&self.keys[row * COLS..(row + 1) * COLS]));
            out.push('\n');
        }
        out.push_str(&half_line(&self.keys[FINGER_ROWS * COLS..]));
        out.push('\n');
        out
    }

    pub fn key_info(&self, c: char) -> Option<&KeyInfo> {
        self.key_info.get(&c)
    }

    pub fn contains(&self, c: char) -> bool {
        self.key_info.contains_key(&c)
    }

    pub fn char_at(&self, slot: usize) -> Option<char> {
        self.keys[slot]
    }

    pub fn keys(&self) -> &[Option<char>; KEY_COUNT] {
        &self.keys
    }

    /// All assigned characters in slot order.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.keys.iter().filter_map(|c| *c)
    }

    /// Character -> key info, as used by the analyser.
    pub fn key_map(&self) -> &HashMap<char, KeyInfo> {
        &self.key_info
    }

    pub fn is_pinned(&self, slot: usize) -> bool {
        self.pinned[slot]
    }

    pub fn is_char_pinned(&self, c: char) -> bool {
        self.key_info
            .get(&c)
            .is_some_and(|info| self.pinned[info.pos.slot()])
    }

    pub fn pin_slot(&mut self, slot: usize) {
        self.pinned[slot] = true;
    }

    pub fn pin_row(&mut self, row: u8) {
        for slot in 0..KEY_COUNT {
            if KeyPos::from_slot(slot).row == row {
                self.pinned[slot] = true;
            }
        }
    }

    /// Pins the slots holding the given characters; characters not on the layout are ignored.
    pub fn pin_chars(&mut self, chars: &str) {
        for c in chars.chars() {
            if let Some(info) = self.key_info.get(&c) {
                self.pinned[info.pos.slot()] = true;
            }
        }
    }

    pub fn pinned_count(&self) -> usize {
        self.pinned.iter().filter(|&&p| p).count()
    }

    /// Exchanges the contents of two slots and refreshes the derived key info.
    pub fn swap_slots(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.keys.swap(a, b);
        for slot in [a, b] {
            if let Some(c) = self.keys[slot] {
                self.key_info.insert(c, KeyInfo::at(KeyPos::from_slot(slot)));
            }
        }
    }

    /// Swaps the keys of two characters. Returns false when either is missing.
    pub fn swap_chars(&mut self, a: char, b: char) -> bool {
        match (self.key_info.get(&a), self.key_info.get(&b)) {
            (Some(ia), Some(ib)) => {
                let (sa, sb) = (ia.pos.slot(), ib.pos.slot());
                self.swap_slots(sa, sb);
                true
            }
            _ => false,
        }
    }

    /// Memoised physical distance between two key positions.
    pub fn distance(&self, a: KeyPos, b: KeyPos) -> f64 {
        self.distances.get_or_compute(self.geometry, a, b)
    }

    /// Distance between the keys of two characters; `None` if either is missing.
    pub fn char_distance(&self, a: char, b: char) -> Option<f64> {
        let ia = self.key_info.get(&a)?;
        let ib = self.key_info.get(&b)?;
        Some(self.distance(ia.pos, ib.pos))
    }

    pub fn cached_distances(&self) -> usize {
        self.distances.len()
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_layout_string())
    }
}

/// A `#` line is a comment unless it reads as a full key row, so `#` can still be a key
/// in the first column.
fn is_comment(line: &str) -> bool {
    if !line.starts_with('#') {
        return false;
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let row_sized = tokens.len() == COLS || tokens.len() == THUMB_KEYS;
    !(row_sized && tokens.iter().all(|t| t.chars().count() == 1))
}

fn parse_token(name: &str, token: &str) -> KsResult<Option<char>> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(NO_KEY), None) => Ok(None),
        (Some(SPACE_TOKEN), None) => Ok(Some(' ')),
        (Some(c), None) => Ok(Some(c)),
        _ => Err(KeySolveError::Format(format!(
            "layout '{}': key '{}' must be a single character",
            name, token
        ))),
    }
}

/// Loads every `.kb` file in a directory, sorted by name. Broken files are skipped.
pub fn load_layout_dir<P: AsRef<Path>>(dir: P, geometry: Geometry) -> KsResult<Vec<Layout>> {
    let dir = dir.as_ref();
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == LAYOUT_EXT))
        .collect();
    paths.sort();

    let mut layouts = Vec::with_capacity(paths.len());
    for path in paths {
        match Layout::load_from_file(&path, geometry) {
            Ok(layout) => layouts.push(layout),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    info!("📂 Loaded {} layouts from {}", layouts.len(), dir.display());
    Ok(layouts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QWERTY: &str = "\
~ q w e r t  y u i o p ~
~ a s d f g  h j k l ; '
~ z x c v b  n m , . / ~
~ ~ _  ~ ~ ~
";

    #[test]
    fn parses_space_and_empty_slots() {
        let layout = Layout::parse("qwerty", QWERTY, Geometry::RowStag).unwrap();
        assert_eq!(layout.char_at(0), None);
        assert_eq!(layout.char_at(1), Some('q'));
        let space = layout.key_info(' ').unwrap();
        assert!(space.pos.is_thumb());
        assert_eq!(layout.chars().count(), 32);
    }

    #[test]
    fn distance_cache_is_shared_between_orders() {
        let layout = Layout::parse("qwerty", QWERTY, Geometry::Ortho).unwrap();
        let d1 = layout.char_distance('q', 'a').unwrap();
        let d2 = layout.char_distance('a', 'q').unwrap();
        assert_eq!(d1, d2);
        assert_eq!(layout.cached_distances(), 1);
    }

    #[test]
    fn swap_updates_key_info() {
        let mut layout = Layout::parse("qwerty", QWERTY, Geometry::Ortho).unwrap();
        let before_q = *layout.key_info('q').unwrap();
        let before_a = *layout.key_info('a').unwrap();
        assert!(layout.swap_chars('q', 'a'));
        assert_eq!(layout.key_info('q').unwrap().pos, before_a.pos);
        assert_eq!(layout.key_info('a').unwrap().pos, before_q.pos);
    }
}
