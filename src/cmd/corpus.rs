use crate::reports;
use clap::Args;
use keysolve::corpus::Corpus;
use keysolve::error::KsResult;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct CorpusArgs {
    /// Plain text to scan.
    #[arg(long)]
    pub text: PathBuf,

    /// Write the n-gram cache here (tab-separated).
    #[arg(short = 'o', long)]
    pub out: Option<PathBuf>,

    /// Most frequent bigrams and trigrams to list.
    #[arg(short = 't', long, default_value_t = 10)]
    pub top: usize,
}

pub fn run(args: CorpusArgs) -> KsResult<()> {
    let corpus = Corpus::from_text_file(&args.text)?;

    if let Some(out) = &args.out {
        corpus.save_ngrams(out)?;
        info!("💾 Saved n-gram cache to {}", out.display());
    }

    reports::print_corpus_summary(&corpus, args.top);
    Ok(())
}
