//! Create command.

use super::{summary_line, StoreOptions};
use maskstore_core::MaskDraft;

/// Fields accepted by `maskstore create`.
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Display name.
    pub name: Option<String>,
    /// Avatar code point.
    pub avatar: Option<String>,
    /// Locale tag.
    pub lang: Option<String>,
    /// Hide the seed conversation.
    pub hide_context: Option<bool>,
    /// Track the global model config.
    pub sync_global_config: bool,
}

impl CreateArgs {
    fn into_draft(self) -> MaskDraft {
        let mut draft = MaskDraft::new().sync_global_config(self.sync_global_config);
        if let Some(name) = self.name {
            draft = draft.name(name);
        }
        if let Some(avatar) = self.avatar {
            draft = draft.avatar(avatar);
        }
        if let Some(lang) = self.lang {
            draft = draft.lang(lang.as_str());
        }
        if let Some(hide) = self.hide_context {
            draft = draft.hide_context(hide);
        }
        draft
    }
}

/// Creates a mask and prints it.
pub fn run(options: &StoreOptions, args: CreateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open()?;
    let mask = store.create(Some(args.into_draft()));
    // Surface write errors the store only logged.
    store.flush()?;

    println!("Created mask");
    println!("{}", summary_line(&mask));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions {
            path: Some(dir.path().to_path_buf()),
            ..StoreOptions::default()
        };
        let args = CreateArgs {
            name: Some("Cli".to_string()),
            sync_global_config: false,
            ..CreateArgs::default()
        };
        run(&options, args).unwrap();

        let store = options.open().unwrap();
        let masks = store.get_all(false);
        assert_eq!(masks.len(), 1);
        assert_eq!(masks[0].name, "Cli");
        assert_eq!(masks[0].sync_global_config, Some(false));
    }
}
