use super::mutation::{crossover, sfb_mutation};
use super::schedule::AcceptSchedule;
use crate::error::{KeySolveError, KsResult};
use crate::layout::Layout;
use crate::scorer::Analyser;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct OptimizationOptions {
    pub generations: usize,
    pub schedule: AcceptSchedule,
    /// Base seed; a random one is drawn when absent.
    pub seed: Option<u64>,
    /// Independent runs for `run_restarts`, seeded `seed`, `seed + 1`, ...
    pub restarts: usize,
}

impl Default for OptimizationOptions {
    fn default() -> Self {
        Self {
            generations: 1000,
            schedule: AcceptSchedule::default(),
            seed: None,
            restarts: 1,
        }
    }
}

impl OptimizationOptions {
    pub fn new(generations: usize, schedule: &str) -> KsResult<Self> {
        let options = Self {
            generations,
            schedule: AcceptSchedule::parse(schedule)?,
            ..Default::default()
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> KsResult<()> {
        if self.generations == 0 {
            return Err(KeySolveError::Config(
                "generation count must be positive".to_string(),
            ));
        }
        if self.restarts == 0 {
            return Err(KeySolveError::Config(
                "restart count must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Hall of fame: the best layout seen during the run.
    pub layout: Layout,
    /// SFB fraction of `layout`, in [0, 1].
    pub fitness: f64,
    pub initial_fitness: f64,
    pub generations_run: usize,
    pub accepted: usize,
    pub improvements: usize,
    pub cancelled: bool,
    pub seed: u64,
}

/// Receives every strict improvement of the hall of fame.
/// Returning false stops the run after the current generation.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, generation: usize, fitness: f64, best: &Layout) -> bool;
}

impl<F> ProgressCallback for F
where
    F: Fn(usize, f64, &Layout) -> bool + Send + Sync,
{
    fn on_progress(&self, generation: usize, fitness: f64, best: &Layout) -> bool {
        self(generation, fitness, best)
    }
}

/// Callback that never stops the run.
pub struct Silent;

impl ProgressCallback for Silent {
    fn on_progress(&self, _: usize, _: f64, _: &Layout) -> bool {
        true
    }
}

/// Single-genome annealing search minimising the SFB fraction.
pub struct Optimizer {
    analyser: Arc<Analyser>,
    options: OptimizationOptions,
    cancel: Arc<AtomicBool>,
}

impl Optimizer {
    pub fn new(analyser: Arc<Analyser>, options: OptimizationOptions) -> Self {
        Self {
            analyser,
            options,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shares an externally owned cancellation flag.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn options(&self) -> &OptimizationOptions {
        &self.options
    }

    fn base_seed(&self) -> u64 {
        self.options.seed.unwrap_or_else(|| fastrand::u64(..))
    }

    /// One run from `start`. Pinned slots never change.
    pub fn run<CB: ProgressCallback>(&self, start: Layout, callback: &CB) -> KsResult<OptimizationResult> {
        self.options.validate()?;
        Ok(self.run_seeded(start, self.base_seed(), callback))
    }

    /// Independent seeded runs in parallel; the fittest result wins, ties to the lower seed.
    pub fn run_restarts<CB: ProgressCallback>(
        &self,
        start: &Layout,
        callback: &CB,
    ) -> KsResult<OptimizationResult> {
        self.options.validate()?;
        let base = self.base_seed();
        let jobs: Vec<(u64, Layout)> = (0..self.options.restarts as u64)
            .map(|i| (base.wrapping_add(i), start.clone()))
            .collect();

        info!("🚀 Starting {} restarts from seed {}", jobs.len(), base);
        let results: Vec<OptimizationResult> = jobs
            .into_par_iter()
            .map(|(seed, layout)| self.run_seeded(layout, seed, callback))
            .collect();

        results
            .into_iter()
            .min_by(|a, b| a.fitness.total_cmp(&b.fitness).then_with(|| a.seed.cmp(&b.seed)))
            .ok_or_else(|| KeySolveError::Config("no restarts were run".to_string()))
    }

    fn run_seeded<CB: ProgressCallback>(&self, start: Layout, seed: u64, callback: &CB) -> OptimizationResult {
        let mut rng = fastrand::Rng::with_seed(seed);
        let total = self.options.generations;
        let schedule = self.options.schedule;

        let initial_fitness = self.analyser.sfb_fraction(&start);
        let mut current_fitness = initial_fitness;
        let mut best = start.clone();
        let mut best_fitness = initial_fitness;
        let mut current = start;

        let mut accepted = 0;
        let mut improvements = 0;
        let mut generations_run = 0;
        let mut cancelled = false;

        debug!(
            "seed {}: {} generations, schedule {}, start SFB {:.4}",
            seed, total, schedule, initial_fitness
        );

        for generation in 0..total {
            if self.cancel.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }
            generations_run = generation + 1;

            let mut candidate = crossover(&current, &best);
            let sfbs = self.analyser.sfb_list(&candidate);
            if sfb_mutation(&mut rng, &mut candidate, &sfbs).is_none() {
                debug!("seed {}: fewer than two movable keys, stopping", seed);
                break;
            }
            let fitness = self.analyser.sfb_fraction(&candidate);

            let t = 1.0 - generation as f64 / total as f64;
            if fitness <= current_fitness || rng.f64() < schedule.probability(t) {
                current = candidate;
                current_fitness = fitness;
                accepted += 1;
            }

            if current_fitness < best_fitness {
                best = current.clone();
                best_fitness = current_fitness;
                improvements += 1;
                if !callback.on_progress(generation, best_fitness, &best) {
                    break;
                }
            }
        }

        info!(
            "🏁 seed {}: SFB {:.3}% -> {:.3}% after {} generations ({} accepted)",
            seed,
            initial_fitness * 100.0,
            best_fitness * 100.0,
            generations_run,
            accepted
        );

        OptimizationResult {
            layout: best,
            fitness: best_fitness,
            initial_fitness,
            generations_run,
            accepted,
            improvements,
            cancelled,
            seed,
        }
    }
}
