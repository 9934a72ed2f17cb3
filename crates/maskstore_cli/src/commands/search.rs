//! Search command.

use super::{print_masks, OutputFormat, StoreOptions};
use tracing::debug;

/// Prints user masks matching `query`.
pub fn run(
    options: &StoreOptions,
    query: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open_read_only()?;
    let hits = store.search(query);
    debug!(query, hits = hits.len(), "search finished");
    print_masks(&hits, format)
}
