use super::resolve_layout;
use crate::reports;
use clap::Args;
use keysolve::config::SearchParams;
use keysolve::corpus::Corpus;
use keysolve::error::KsResult;
use keysolve::geometry::Geometry;
use keysolve::layout::Layout;
use keysolve::optimizer::{OptimizationOptions, Optimizer};
use keysolve::ranking::MetricSet;
use keysolve::scorer::{AnalysisOptions, Analyser};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct OptimiseArgs {
    /// Starting layout: a file or a built-in layout name.
    pub layout: String,

    #[command(flatten)]
    pub search: SearchParams,

    /// Save the best layout here.
    #[arg(short = 'o', long)]
    pub out: Option<PathBuf>,
}

pub fn run(
    args: OptimiseArgs,
    corpus: Arc<Corpus>,
    geometry: Geometry,
    exclude_space: bool,
) -> KsResult<()> {
    // Configuration errors surface before any work is done.
    let options = OptimizationOptions::try_from(&args.search)?;
    let pin_rows = args.search.pinned_rows()?;

    let mut start = resolve_layout(&args.layout, geometry)?;
    for row in pin_rows {
        start.pin_row(row);
    }
    start.pin_chars(&args.search.pin_keys);
    info!(
        "📌 {} of {} keys pinned",
        start.pinned_count(),
        start.chars().count()
    );

    let analyser = Arc::new(Analyser::new(
        corpus,
        AnalysisOptions {
            exclude_space,
            detail_limit: Some(0),
        },
    ));
    let optimizer = Optimizer::new(Arc::clone(&analyser), options);

    let progress = |generation: usize, fitness: f64, _: &Layout| {
        info!("✨ Generation {}: SFB {:.3}%", generation, fitness * 100.0);
        true
    };
    let result = if optimizer.options().restarts > 1 {
        optimizer.run_restarts(&start, &progress)?
    } else {
        optimizer.run(start.clone(), &progress)?
    };

    let mut best = result.layout;
    best.name = match &args.out {
        Some(out) => out
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("{}-opt", start.name)),
        None => format!("{}-opt", start.name),
    };

    reports::print_layout_grid(&best);
    let before = analyser.analyse(&start);
    let after = analyser.analyse(&best);
    reports::print_metric_table(&[before, after], &MetricSet::All.metrics());
    println!(
        "SFB {:.3}% -> {:.3}% (seed {}, {} generations, {} accepted)",
        result.initial_fitness * 100.0,
        result.fitness * 100.0,
        result.seed,
        result.generations_run,
        result.accepted
    );

    if let Some(out) = &args.out {
        best.save_to_file(out)?;
        info!("💾 Saved {} to {}", best.name, out.display());
    }
    Ok(())
}
