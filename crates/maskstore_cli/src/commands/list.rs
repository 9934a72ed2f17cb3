//! List and show commands.

use super::{print_masks, CliError, OutputFormat, StoreOptions};

/// Lists masks, newest first, optionally followed by built-ins.
pub fn run(
    options: &StoreOptions,
    builtins: bool,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open_read_only()?;
    print_masks(&store.get_all(builtins), format)
}

/// Prints one mask (user or built-in) as JSON.
pub fn show(options: &StoreOptions, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open_read_only()?;
    let mask = store
        .get(Some(id))
        .or_else(|| {
            store
                .get_all(true)
                .into_iter()
                .find(|m| m.builtin && m.id.as_str() == id)
        })
        .ok_or_else(|| CliError::MaskNotFound(id.to_string()))?;

    println!("{}", serde_json::to_string_pretty(&mask)?);
    Ok(())
}
