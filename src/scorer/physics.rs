use crate::geometry::{KeyInfo, LSB_INNER_COLS, LSB_OUTER_COLS, SCISSOR_FINGERS};
use crate::scorer::types::Metric;

/// Classification of two keys pressed one after the other (or with one key between).
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PairAnalysis {
    pub is_same_hand: bool,
    pub is_sfb: bool,
    pub is_lsb: bool,
    pub is_fsb: bool,
    pub is_hsb: bool,
    pub row_diff: u8,
}

impl PairAnalysis {
    /// Bigram metrics matched by this pair. Skipgram callers map them across.
    pub fn matches(&self) -> impl Iterator<Item = Metric> {
        [
            (self.is_sfb, Metric::Sfb),
            (self.is_lsb, Metric::Lsb),
            (self.is_fsb, Metric::Fsb),
            (self.is_hsb, Metric::Hsb),
        ]
        .into_iter()
        .filter_map(|(hit, m)| hit.then_some(m))
    }
}

pub fn skipgram_metric(bigram: Metric) -> Metric {
    match bigram {
        Metric::Sfb => Metric::Sfs,
        Metric::Lsb => Metric::Lss,
        Metric::Fsb => Metric::Fss,
        Metric::Hsb => Metric::Hss,
        other => other,
    }
}

/// SFB excludes the stretch and scissor checks (those need two fingers).
/// LSB and scissors are checked independently and may both hit.
/// Stretches and scissors only apply to the finger rows.
pub fn analyze_pair(k1: &KeyInfo, k2: &KeyInfo) -> PairAnalysis {
    let mut res = PairAnalysis::default();
    if k1.hand != k2.hand {
        return res;
    }
    res.is_same_hand = true;
    res.row_diff = k1.pos.row.abs_diff(k2.pos.row);

    if k1.finger == k2.finger {
        res.is_sfb = k1.pos != k2.pos;
        return res;
    }

    if k1.pos.is_thumb() || k2.pos.is_thumb() {
        return res;
    }

    let (c1, c2) = (k1.pos.col, k2.pos.col);
    res.is_lsb = (LSB_INNER_COLS.contains(&c1) && LSB_OUTER_COLS.contains(&c2))
        || (LSB_INNER_COLS.contains(&c2) && LSB_OUTER_COLS.contains(&c1));

    if res.row_diff > 0 {
        let lower = if k1.pos.row > k2.pos.row { k1 } else { k2 };
        if SCISSOR_FINGERS.contains(&lower.finger) {
            res.is_fsb = res.row_diff == 2;
            res.is_hsb = res.row_diff == 1;
        }
    }

    res
}
