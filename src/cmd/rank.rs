use crate::reports;
use clap::Args;
use keysolve::config::RankingParams;
use keysolve::corpus::Corpus;
use keysolve::error::{KeySolveError, KsResult};
use keysolve::geometry::Geometry;
use keysolve::layout::load_layout_dir;
use keysolve::layouts::get_all_layouts;
use keysolve::ranking::{rank_layouts, MetricSet};
use keysolve::scorer::{AnalysisOptions, Analyser};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct RankArgs {
    /// Directory of `.kb` layouts; the built-in layouts are ranked when omitted.
    pub dir: Option<PathBuf>,

    /// Add the built-in layouts to those loaded from the directory.
    #[arg(long, default_value_t = false)]
    pub builtin: bool,

    #[command(flatten)]
    pub ranking: RankingParams,

    /// Metrics to score and show: bigrams, skipgrams, trigrams, all.
    #[arg(short = 'm', long, default_value = "all")]
    pub metrics: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: RankArgs, corpus: Arc<Corpus>, geometry: Geometry, exclude_space: bool) -> KsResult<()> {
    let weights = args.ranking.weights()?;
    let set = MetricSet::parse(&args.metrics)?;
    let metrics = set.metrics();

    let mut layouts = match &args.dir {
        Some(dir) => load_layout_dir(dir, geometry)?,
        None => Vec::new(),
    };
    if args.dir.is_none() || args.builtin {
        let loaded: HashSet<String> = layouts.iter().map(|l| l.name.clone()).collect();
        for layout in get_all_layouts(geometry)? {
            if loaded.contains(&layout.name) {
                warn!("Skipping built-in '{}': a layout file has the same name", layout.name);
            } else {
                layouts.push(layout);
            }
        }
    }
    if layouts.is_empty() {
        return Err(KeySolveError::Format("no layouts to rank".to_string()));
    }

    info!("⚖️  Ranking {} layouts", layouts.len());
    let options = AnalysisOptions {
        exclude_space,
        detail_limit: Some(0),
    };
    let analyser = Analyser::new(corpus, options);
    let ranked = rank_layouts(&analyser, layouts, &weights, set);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
    } else {
        reports::print_ranking(&ranked, &metrics);
    }
    Ok(())
}
