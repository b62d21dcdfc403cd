pub mod analyse;
pub mod corpus;
pub mod optimise;
pub mod rank;

use keysolve::corpus::Corpus;
use keysolve::error::{KeySolveError, KsResult};
use keysolve::geometry::Geometry;
use keysolve::layout::Layout;
use keysolve::layouts::KnownLayout;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// A layout file path, or the name of a built-in layout.
pub fn resolve_layout(source: &str, geometry: Geometry) -> KsResult<Layout> {
    let path = Path::new(source);
    if path.exists() {
        debug!("Reading layout file {}", path.display());
        return Layout::load_from_file(path, geometry);
    }
    match KnownLayout::from_str(source) {
        Ok(known) => known.to_layout(geometry),
        Err(_) => Err(KeySolveError::Format(format!(
            "'{}' is neither a layout file nor a built-in layout",
            source
        ))),
    }
}

pub fn load_corpus(path: &Path) -> KsResult<Arc<Corpus>> {
    info!("📚 Loading corpus: {}", path.display());
    Corpus::load(path).map(Arc::new)
}
