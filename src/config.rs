use crate::error::{KeySolveError, KsResult};
use crate::geometry::THUMB_ROW;
use crate::optimizer::{AcceptSchedule, OptimizationOptions};
use crate::ranking::{MetricSet, Weights};
use crate::scorer::AnalysisOptions;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct SearchParams {
    /// Number of generations per run.
    #[arg(short = 'g', long, default_value_t = 10_000)]
    pub generations: usize,

    /// Acceptance schedule: always, never, temp, cold, drop-slow, drop-fast.
    #[arg(short = 'a', long, default_value = "temp")]
    pub accept: String,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    /// Independent restarts, run in parallel; the best result is kept.
    #[arg(short = 'r', long, default_value_t = 1)]
    pub restarts: usize,

    /// Rows whose keys never move (0-3, 3 is the thumb row).
    #[arg(long, value_delimiter = ',')]
    pub pin_rows: Vec<u8>,

    /// Characters whose keys never move.
    #[arg(long, default_value = "")]
    pub pin_keys: String,
}

impl SearchParams {
    pub fn schedule(&self) -> KsResult<AcceptSchedule> {
        AcceptSchedule::parse(&self.accept)
    }

    pub fn pinned_rows(&self) -> KsResult<Vec<u8>> {
        if let Some(bad) = self.pin_rows.iter().find(|&&r| r > THUMB_ROW) {
            return Err(KeySolveError::Config(format!(
                "pin row {} is out of range (0-{})",
                bad,
                THUMB_ROW
            )));
        }
        Ok(self.pin_rows.clone())
    }
}

impl TryFrom<&SearchParams> for OptimizationOptions {
    type Error = KeySolveError;

    fn try_from(params: &SearchParams) -> KsResult<Self> {
        let options = Self {
            generations: params.generations,
            schedule: params.schedule()?,
            seed: params.seed,
            restarts: params.restarts,
        };
        options.validate()?;
        Ok(options)
    }
}

#[derive(Args, Debug, Clone)]
pub struct AnalysisParams {
    /// Offenders listed per metric.
    #[arg(short = 't', long, default_value_t = 10)]
    pub top: usize,

    /// Metric columns to show: bigrams, skipgrams, trigrams, all.
    #[arg(short = 'm', long, default_value = "all")]
    pub metrics: String,
}

impl AnalysisParams {
    pub fn metric_set(&self) -> KsResult<MetricSet> {
        MetricSet::parse(&self.metrics)
    }

    pub fn options(&self, exclude_space: bool) -> AnalysisOptions {
        AnalysisOptions {
            exclude_space,
            detail_limit: Some(self.top),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RankingParams {
    /// Overrides as METRIC=value, comma-separated (e.g. "sfb=4,alt=-1").
    #[arg(short = 'w', long, default_value = "")]
    pub weights: String,
}

impl RankingParams {
    pub fn weights(&self) -> KsResult<Weights> {
        self.weights.parse()
    }
}
