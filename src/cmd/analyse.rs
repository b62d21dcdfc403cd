use super::resolve_layout;
use crate::reports;
use clap::Args;
use keysolve::config::AnalysisParams;
use keysolve::corpus::Corpus;
use keysolve::error::KsResult;
use keysolve::geometry::Geometry;
use keysolve::layout::Layout;
use keysolve::scorer::Analyser;
use std::sync::Arc;

#[derive(Args, Debug, Clone)]
pub struct AnalyseArgs {
    /// Layout files or built-in layout names.
    #[arg(required = true)]
    pub layouts: Vec<String>,

    #[command(flatten)]
    pub params: AnalysisParams,

    /// Print the full results as JSON instead of tables.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(
    args: AnalyseArgs,
    corpus: Arc<Corpus>,
    geometry: Geometry,
    exclude_space: bool,
) -> KsResult<()> {
    let metrics = args.params.metric_set()?.metrics();
    let layouts = args
        .layouts
        .iter()
        .map(|source| resolve_layout(source, geometry))
        .collect::<KsResult<Vec<Layout>>>()?;

    let analyser = Analyser::new(corpus, args.params.options(exclude_space));

    if args.json {
        let results = analyser.analyse_all(layouts);
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let mut results = Vec::with_capacity(layouts.len());
    for layout in &layouts {
        let result = analyser.analyse(layout);
        reports::print_layout_grid(layout);
        reports::print_usage(&result);
        reports::print_offenders(&result, &metrics);
        results.push(result);
    }
    reports::print_metric_table(&results, &metrics);
    Ok(())
}
