//! Update command.

use super::{summary_line, CliError, StoreOptions};
use maskstore_core::Lang;

/// Fields accepted by `maskstore update`.
#[derive(Debug, Clone, Default)]
pub struct UpdateArgs {
    /// New display name.
    pub name: Option<String>,
    /// New avatar.
    pub avatar: Option<String>,
    /// New locale tag.
    pub lang: Option<String>,
    /// New sampling temperature.
    pub temperature: Option<f64>,
}

/// Applies the given fields to a user mask.
pub fn run(
    options: &StoreOptions,
    id: &str,
    args: UpdateArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open()?;
    let updated = store.update(id, |mask| {
        if let Some(name) = args.name {
            mask.name = name;
        }
        if let Some(avatar) = args.avatar {
            mask.avatar = avatar;
        }
        if let Some(lang) = args.lang {
            mask.lang = Lang::new(lang);
        }
        if let Some(temperature) = args.temperature {
            mask.model_config.temperature = temperature;
        }
    });
    if !updated {
        return Err(CliError::MaskNotFound(id.to_string()).into());
    }
    store.flush()?;

    if let Some(mask) = store.get(Some(id)) {
        println!("Updated mask");
        println!("{}", summary_line(&mask));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use maskstore_core::MaskDraft;

    #[test]
    fn update_changes_only_given_fields() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions {
            path: Some(dir.path().to_path_buf()),
            ..StoreOptions::default()
        };
        let id = options
            .open()
            .unwrap()
            .create(Some(MaskDraft::new().name("Before")))
            .id;

        let args = UpdateArgs {
            temperature: Some(0.8),
            ..UpdateArgs::default()
        };
        run(&options, id.as_str(), args).unwrap();

        let mask = options.open().unwrap().get(Some(id.as_str())).unwrap();
        assert_eq!(mask.name, "Before");
        assert_eq!(mask.model_config.temperature, 0.8);
    }

    #[test]
    fn update_of_unknown_id_fails() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions {
            path: Some(dir.path().to_path_buf()),
            ..StoreOptions::default()
        };
        assert!(run(&options, "missing", UpdateArgs::default()).is_err());
    }
}
