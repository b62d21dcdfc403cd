use crate::error::{KeySolveError, KsResult};
use crate::layout::Layout;
use crate::scorer::{AnalysisResult, Analyser, Metric, MetricKind};
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Per-metric weights. Positive weights penalise a metric, negative ones reward it,
/// unset metrics contribute nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weights {
    values: BTreeMap<Metric, f64>,
}

impl Default for Weights {
    fn default() -> Self {
        let values = [
            (Metric::Sfb, 3.0),
            (Metric::Lsb, 1.0),
            (Metric::Fsb, 1.0),
            (Metric::Hsb, 0.5),
            (Metric::Sfs, 1.5),
            (Metric::Lss, 0.5),
            (Metric::Fss, 0.5),
            (Metric::Hss, 0.25),
            (Metric::Alt, -0.5),
            (Metric::Rol, -0.5),
            (Metric::One, -0.25),
            (Metric::Red, 1.0),
        ]
        .into_iter()
        .collect();
        Self { values }
    }
}

impl Weights {
    /// No weights at all; every metric contributes zero until set.
    pub fn empty() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        self.values.get(&metric).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, metric: Metric, weight: f64) {
        self.values.insert(metric, weight);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.values.iter().map(|(&m, &w)| (m, w))
    }

    /// Applies `METRIC=value,...` overrides (case-insensitive) on top of these weights.
    pub fn merge_from_str(&mut self, overrides: &str) -> KsResult<()> {
        for pair in overrides.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').ok_or_else(|| {
                KeySolveError::Parse(format!("weight '{}' is not METRIC=value", pair))
            })?;
            let metric = Metric::from_str(name.trim())
                .map_err(|_| KeySolveError::Parse(format!("unknown metric '{}'", name.trim())))?;
            let weight: f64 = value
                .trim()
                .parse()
                .ok()
                .filter(|w: &f64| w.is_finite())
                .ok_or_else(|| {
                    KeySolveError::Parse(format!("weight for {} is not a number: '{}'", metric, value))
                })?;
            self.values.insert(metric, weight);
        }
        Ok(())
    }
}

impl FromStr for Weights {
    type Err = KeySolveError;

    /// Defaults with the given overrides.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut weights = Weights::default();
        weights.merge_from_str(s)?;
        Ok(weights)
    }
}

/// Named groups of metrics, for display and for choosing which metrics a ranking scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, EnumIter, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MetricSet {
    Bigrams,
    Skipgrams,
    Trigrams,
    #[default]
    All,
}

impl MetricSet {
    pub fn parse(name: &str) -> KsResult<Self> {
        Self::from_str(name.trim()).map_err(|_| {
            let known: Vec<String> = Self::iter().map(|s| s.to_string()).collect();
            KeySolveError::Parse(format!(
                "unknown metric set '{}' (expected one of: {})",
                name,
                known.join(", ")
            ))
        })
    }

    pub fn metrics(self) -> Vec<Metric> {
        let kind = match self {
            MetricSet::Bigrams => Some(MetricKind::Bigram),
            MetricSet::Skipgrams => Some(MetricKind::Skipgram),
            MetricSet::Trigrams => Some(MetricKind::Trigram),
            MetricSet::All => None,
        };
        Metric::iter()
            .filter(|m| kind.map_or(true, |k| m.kind() == k))
            .collect()
    }
}

/// Robust scaling parameters for one metric across a population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Normalisation {
    pub median: f64,
    pub iqr: f64,
}

impl Normalisation {
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let q1 = quantile(&sorted, 0.25);
        let q3 = quantile(&sorted, 0.75);
        Self {
            median: quantile(&sorted, 0.5),
            iqr: q3 - q1,
        }
    }

    /// `(value - median) / IQR`; a zero IQR scales everything to 0.
    pub fn scale(&self, value: f64) -> f64 {
        if self.iqr == 0.0 {
            0.0
        } else {
            (value - self.median) / self.iqr
        }
    }
}

/// Linear-interpolation quantile of sorted values: position `q * (n - 1)`.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedLayout {
    pub name: String,
    pub score: f64,
    /// Scaled value per metric, before weighting.
    pub scaled: BTreeMap<Metric, f64>,
    pub result: AnalysisResult,
}

/// Weighted robust-scaled score for each result, best (lowest) first. Only metrics in
/// `set` count towards the score; `scaled` still covers every metric.
pub fn rank_results(results: Vec<AnalysisResult>, weights: &Weights, set: MetricSet) -> Vec<RankedLayout> {
    let scored = set.metrics();
    let norms: BTreeMap<Metric, Normalisation> = Metric::iter()
        .map(|m| {
            let values: Vec<f64> = results.iter().map(|r| r.metric(m)).collect();
            (m, Normalisation::from_values(&values))
        })
        .collect();

    let mut ranked: Vec<RankedLayout> = results
        .into_iter()
        .map(|result| {
            let scaled: BTreeMap<Metric, f64> = norms
                .iter()
                .map(|(&m, norm)| (m, norm.scale(result.metric(m))))
                .collect();
            let score = scored
                .iter()
                .filter_map(|m| scaled.get(m).map(|s| weights.get(*m) * s))
                .sum();
            RankedLayout {
                name: result.layout_name.clone(),
                score,
                scaled,
                result,
            }
        })
        .collect();

    ranked.sort_by(|a, b| a.score.total_cmp(&b.score).then_with(|| a.name.cmp(&b.name)));
    ranked
}

/// Analyses the layouts in parallel, then ranks them.
pub fn rank_layouts(
    analyser: &Analyser,
    layouts: Vec<Layout>,
    weights: &Weights,
    set: MetricSet,
) -> Vec<RankedLayout> {
    rank_results(analyser.analyse_all(layouts), weights, set)
}
