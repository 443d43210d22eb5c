use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_INPUT: &str = "My Clippings - Kindle.txt";
pub const DEFAULT_OUTPUT: &str = "Parsed Annotations";
pub const DEFAULT_STAMP_FILE: &str = "LastParseDate.txt";

/// Run settings. Layered: defaults, `clippings.toml`, `CLIPPINGS_*` env vars.
/// CLI flags are applied on top by the caller.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Merge with prior book files instead of replacing them.
    pub merge: bool,
    /// Append a timestamp to `stamp_file` after a successful parse.
    pub date_stamp: bool,
    pub stamp_file: PathBuf,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("clippings").required(false))
                .add_source(Environment::with_prefix("CLIPPINGS")),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder
            .set_default("input", DEFAULT_INPUT)?
            .set_default("output", DEFAULT_OUTPUT)?
            .set_default("merge", true)?
            .set_default("date_stamp", true)?
            .set_default("stamp_file", DEFAULT_STAMP_FILE)?
            .build()?
            .try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            merge: true,
            date_stamp: true,
            stamp_file: PathBuf::from(DEFAULT_STAMP_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn defaults() {
        let settings = Settings::from_builder(Config::builder()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn file_overrides_defaults() {
        let toml = "output = \"notes\"\nmerge = false\n";
        let settings =
            Settings::from_builder(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
                .unwrap();
        assert_eq!(settings.output, PathBuf::from("notes"));
        assert!(!settings.merge);
        assert!(settings.date_stamp);
        assert_eq!(settings.input, PathBuf::from(DEFAULT_INPUT));
    }
}
