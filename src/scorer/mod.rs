pub mod engine;
pub mod flow;
pub mod physics;
pub mod types;

pub use self::types::{AnalysisResult, Metric, MetricKind, NgramDetail, UsageStats};
use crate::corpus::{Bigram, Corpus};
use crate::layout::Layout;
use rayon::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisOptions {
    /// Use the no-space totals for bigram and skipgram metrics and drop
    /// whitespace n-grams from their numerators.
    pub exclude_space: bool,
    /// Keep at most this many entries per offender listing.
    pub detail_limit: Option<usize>,
}

/// Classifies a read-only corpus against any number of layouts.
pub struct Analyser {
    pub corpus: Arc<Corpus>,
    pub options: AnalysisOptions,
}

impl Analyser {
    pub fn new(corpus: Arc<Corpus>, options: AnalysisOptions) -> Self {
        Self { corpus, options }
    }

    /// Detailed analysis for reports and ranking.
    pub fn analyse(&self, layout: &Layout) -> AnalysisResult {
        engine::analyse(self, layout)
    }

    /// Analyses layouts in parallel; results keep the input order.
    pub fn analyse_all(&self, layouts: Vec<Layout>) -> Vec<AnalysisResult> {
        layouts
            .into_par_iter()
            .map(|layout| self.analyse(&layout))
            .collect()
    }

    /// Fast path used by the optimiser's mutation operator.
    pub fn sfb_list(&self, layout: &Layout) -> Vec<(Bigram, u64)> {
        engine::sfb_list(self, layout)
    }

    /// Fast path used as the optimiser's fitness.
    pub fn sfb_fraction(&self, layout: &Layout) -> f64 {
        engine::sfb_fraction(self, layout)
    }
}
