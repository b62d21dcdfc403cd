use crate::geometry::{FINGER_COUNT, FINGER_ROWS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumString, Display,
    Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum Metric {
    // Bigrams
    Sfb,
    Lsb,
    Fsb,
    Hsb,
    // Skipgrams (first and third character of a trigram)
    Sfs,
    Lss,
    Fss,
    Hss,
    // Trigrams
    Alt,
    Rol,
    One,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Bigram,
    Skipgram,
    Trigram,
}

impl Metric {
    pub fn kind(self) -> MetricKind {
        match self {
            Metric::Sfb | Metric::Lsb | Metric::Fsb | Metric::Hsb => MetricKind::Bigram,
            Metric::Sfs | Metric::Lss | Metric::Fss | Metric::Hss => MetricKind::Skipgram,
            Metric::Alt | Metric::Rol | Metric::One | Metric::Red => MetricKind::Trigram,
        }
    }

    /// Whether an n-gram listing is kept for this metric.
    pub fn has_details(self) -> bool {
        self.kind() != MetricKind::Trigram
    }
}

/// One offending n-gram in a metric listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NgramDetail {
    pub ngram: String,
    pub count: u64,
    pub percentage: f64,
    pub distance: f64,
}

/// Share of all corpus characters typed by each hand, finger and row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub hands: [f64; 2],
    pub fingers: [f64; FINGER_COUNT],
    pub rows: [f64; FINGER_ROWS + 1],
}

impl UsageStats {
    pub fn hand_total(&self) -> f64 {
        self.hands.iter().sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub layout_name: String,
    pub corpus_name: String,

    /// Percentages, 0-100.
    pub metrics: BTreeMap<Metric, f64>,
    /// Raw matching counts behind each percentage.
    pub counts: BTreeMap<Metric, u64>,
    /// Offenders per bigram/skipgram metric, count descending.
    pub details: BTreeMap<Metric, Vec<NgramDetail>>,

    pub usage: UsageStats,

    /// Corpus characters missing from the layout, count descending.
    pub unsupported: Vec<(char, u64)>,
    pub unsupported_bigrams: u64,
    pub unsupported_trigrams: u64,
}

impl AnalysisResult {
    pub fn metric(&self, metric: Metric) -> f64 {
        self.metrics.get(&metric).copied().unwrap_or(0.0)
    }

    pub fn count(&self, metric: Metric) -> u64 {
        self.counts.get(&metric).copied().unwrap_or(0)
    }

    pub fn details(&self, metric: Metric) -> &[NgramDetail] {
        self.details.get(&metric).map(Vec::as_slice).unwrap_or(&[])
    }
}
