//! Delete command.

use super::{CliError, StoreOptions};

/// Deletes a user mask.
pub fn run(options: &StoreOptions, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open()?;
    if !store.delete(id) {
        return Err(CliError::MaskNotFound(id.to_string()).into());
    }
    store.flush()?;
    println!("Deleted {id}");
    Ok(())
}
