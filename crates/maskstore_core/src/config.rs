//! Store configuration.

/// Default key under which the snapshot is stored.
pub const DEFAULT_STORE_KEY: &str = "mask-store";

/// Default number of change events kept for polling.
pub const DEFAULT_CHANGE_FEED_HISTORY: usize = 1024;

/// Configuration for opening a [`crate::MaskStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Storage key; also the default file stem (`<store_key>.json`).
    pub store_key: String,

    /// Whether snapshots are written as indented JSON.
    pub pretty_json: bool,

    /// Whether search also matches seed conversation content.
    pub search_context: bool,

    /// Number of change events kept for polling.
    pub change_feed_history: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_key: DEFAULT_STORE_KEY.to_string(),
            pretty_json: false,
            search_context: true,
            change_feed_history: DEFAULT_CHANGE_FEED_HISTORY,
        }
    }
}

impl Config {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the storage key.
    #[must_use]
    pub fn store_key(mut self, key: impl Into<String>) -> Self {
        self.store_key = key.into();
        self
    }

    /// Sets whether snapshots are pretty-printed.
    #[must_use]
    pub fn pretty_json(mut self, value: bool) -> Self {
        self.pretty_json = value;
        self
    }

    /// Sets whether search covers seed conversation content.
    #[must_use]
    pub fn search_context(mut self, value: bool) -> Self {
        self.search_context = value;
        self
    }

    /// Sets the change feed history limit.
    #[must_use]
    pub fn change_feed_history(mut self, limit: usize) -> Self {
        self.change_feed_history = limit;
        self
    }

    /// File name used for the snapshot when only a directory is given.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.json", self.store_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.store_key, "mask-store");
        assert!(!config.pretty_json);
        assert!(config.search_context);
        assert_eq!(config.change_feed_history, 1024);
        assert_eq!(config.file_name(), "mask-store.json");
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .store_key("presets")
            .pretty_json(true)
            .search_context(false)
            .change_feed_history(8);

        assert_eq!(config.file_name(), "presets.json");
        assert!(config.pretty_json);
        assert!(!config.search_context);
        assert_eq!(config.change_feed_history, 8);
    }
}
