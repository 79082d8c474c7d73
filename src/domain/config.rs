use std::{num::NonZeroUsize, path::Path};

use serde::{Deserialize, Serialize};

/// Configuration for the records store.
///
/// This struct holds the fixed sizes of the store's bounded structures. The
/// defaults are the store's standard sizes; a config file only needs
/// to name the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The number of buckets in the course hash index.
    ///
    /// Course IDs are assigned to bucket `id mod index_buckets`.
    index_buckets: NonZeroUsize,

    /// The maximum number of pending waitlist entries.
    waitlist_capacity: usize,

    /// The maximum depth of the stack used when checking prerequisites.
    ///
    /// Prerequisite chains that need more simultaneous entries than this fail
    /// with a capacity error, which is also how cycles are cut off.
    prerequisite_stack_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_buckets: default_index_buckets(),
            waitlist_capacity: default_capacity(),
            prerequisite_stack_capacity: default_capacity(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the number of hash index buckets.
    #[must_use]
    pub const fn index_buckets(&self) -> NonZeroUsize {
        self.index_buckets
    }

    /// Returns the waitlist capacity.
    #[must_use]
    pub const fn waitlist_capacity(&self) -> usize {
        self.waitlist_capacity
    }

    /// Returns the prerequisite stack capacity.
    #[must_use]
    pub const fn prerequisite_stack_capacity(&self) -> usize {
        self.prerequisite_stack_capacity
    }

    /// Sets the number of hash index buckets.
    #[must_use]
    pub const fn with_index_buckets(mut self, buckets: NonZeroUsize) -> Self {
        self.index_buckets = buckets;
        self
    }

    /// Sets the waitlist capacity.
    #[must_use]
    pub const fn with_waitlist_capacity(mut self, capacity: usize) -> Self {
        self.waitlist_capacity = capacity;
        self
    }

    /// Sets the prerequisite stack capacity.
    #[must_use]
    pub const fn with_prerequisite_stack_capacity(mut self, capacity: usize) -> Self {
        self.prerequisite_stack_capacity = capacity;
        self
    }
}

const DEFAULT_INDEX_BUCKETS: NonZeroUsize = NonZeroUsize::new(10).unwrap();

const fn default_index_buckets() -> NonZeroUsize {
    DEFAULT_INDEX_BUCKETS
}

const fn default_capacity() -> usize {
    10
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_index_buckets")]
        index_buckets: NonZeroUsize,

        #[serde(default = "default_capacity")]
        waitlist_capacity: usize,

        #[serde(default = "default_capacity")]
        prerequisite_stack_capacity: usize,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                index_buckets,
                waitlist_capacity,
                prerequisite_stack_capacity,
            } => Self {
                index_buckets,
                waitlist_capacity,
                prerequisite_stack_capacity,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            index_buckets: config.index_buckets,
            waitlist_capacity: config.waitlist_capacity,
            prerequisite_stack_capacity: config.prerequisite_stack_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_fixed_sizes() {
        let config = Config::default();
        assert_eq!(config.index_buckets().get(), 10);
        assert_eq!(config.waitlist_capacity(), 10);
        assert_eq!(config.prerequisite_stack_capacity(), 10);
    }

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nindex_buckets = 16\nwaitlist_capacity = 3\nprerequisite_stack_capacity = 32\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.index_buckets().get(), 16);
        assert_eq!(config.waitlist_capacity(), 3);
        assert_eq!(config.prerequisite_stack_capacity(), 32);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn zero_buckets_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nindex_buckets = 0\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("registrar.toml");
        let config = Config::default().with_waitlist_capacity(4);

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn empty_file_returns_default() {
        // Tests that deserialising an empty file returns the default configuration.
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }
}
