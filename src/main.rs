use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use keysolve::error::KsResult;
use keysolve::geometry::Geometry;
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Text file or `.tsv` n-gram cache.
    #[arg(global = true, short, long, default_value = "data/corpus.tsv")]
    corpus: PathBuf,

    /// Physical key arrangement: ortho, rowstag, colstag.
    #[arg(global = true, long, default_value = "rowstag")]
    geometry: Geometry,

    /// Ignore n-grams containing whitespace in bigram and skipgram metrics.
    #[arg(global = true, long, default_value_t = false)]
    exclude_space: bool,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build an n-gram cache from a text file.
    Corpus(cmd::corpus::CorpusArgs),
    /// Metrics, usage and worst offenders for one or more layouts.
    Analyse(cmd::analyse::AnalyseArgs),
    /// Rank layouts by weighted, robust-scaled metrics.
    Rank(cmd::rank::RankArgs),
    /// Reduce same-finger bigrams by simulated annealing.
    Optimise(cmd::optimise::OptimiseArgs),
}

fn init_tracing(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn execute(cli: Cli) -> KsResult<()> {
    let Cli {
        command,
        corpus,
        geometry,
        exclude_space,
        ..
    } = cli;

    match command {
        Commands::Corpus(args) => cmd::corpus::run(args),
        Commands::Analyse(args) => {
            let corpus = cmd::load_corpus(&corpus)?;
            cmd::analyse::run(args, corpus, geometry, exclude_space)
        }
        Commands::Rank(args) => {
            let corpus = cmd::load_corpus(&corpus)?;
            cmd::rank::run(args, corpus, geometry, exclude_space)
        }
        Commands::Optimise(args) => {
            let corpus = cmd::load_corpus(&corpus)?;
            cmd::optimise::run(args, corpus, geometry, exclude_space)
        }
    }
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    init_tracing(cli.debug);
    info!("🚀 keysolve {} ({} geometry)", env!("CARGO_PKG_VERSION"), cli.geometry);

    if let Err(e) = execute(cli) {
        error!("❌ {}", e);
        process::exit(1);
    }
}
