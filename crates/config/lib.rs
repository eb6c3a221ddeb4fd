use log::{debug, info};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_FILE: &str = ".bike-dash.yml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to open config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Path of the rentals csv file.
    pub source: String,
    /// Default output format: table, polar, csv or json.
    pub output: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source: "main_data.csv".to_string(),
            output: "table".to_string(),
        }
    }
}

impl Config {
    /// Read `filename`, falling back to defaults when the file does not exist.
    pub fn load<P: AsRef<Path>>(filename: P) -> Result<Config, ConfigError> {
        let path = filename.as_ref();
        if !path.exists() {
            debug!("config {} not found, using defaults", path.display());
            return Ok(Config::default());
        }
        let reader = File::open(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        info!("config loaded from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_config() {
        let content = r##"source: data/day.csv
output: csv
"##;
        let config: Config = serde_yaml::from_str(content).unwrap();
        println!("{:?}", config);
        assert_eq!(config.source, "data/day.csv");
        assert_eq!(config.output, "csv");
    }

    #[test]
    fn test_config_partial() {
        let config: Config = serde_yaml::from_str("output: json\n").unwrap();
        assert_eq!(config.source, "main_data.csv");
        assert_eq!(config.output, "json");
    }

    #[test]
    fn test_config_missing_file() {
        let config = Config::load("no/such/.bike-dash.yml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_malformed() {
        let path = std::env::temp_dir()
            .join(format!("bike-dash-malformed-{}.yml", std::process::id()));
        std::fs::write(&path, "source: [unclosed\n").unwrap();
        let res = Config::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(res, Err(ConfigError::Parse { .. })));
    }
}
