//! Configuration loader - YAML settings + .env secrets

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::tiles::{TileCredential, TokenError};

pub const TOKEN_VAR: &str = "MAPBOX_TOKEN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("No map tile token: set MAPBOX_TOKEN in the environment or .env, or pass --token")]
    MissingToken,
    #[error(transparent)]
    InvalidToken(#[from] TokenError),
}

/// Settings loaded from config.yaml
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub data_path: PathBuf,
    pub image_path: PathBuf,
    /// Check the token with the tile provider at startup.
    pub verify_token: bool,
    pub log_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("Toronto_Crime_MCI_2014_to_2018.csv"),
            image_path: PathBuf::from("Crime_Scene.jpg"),
            verify_token: true,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the file if it exists, defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Secrets loaded from .env
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub mapbox_token: Option<String>,
}

impl Secrets {
    /// Load secrets from .env file and the process environment
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Secrets {
            mapbox_token: std::env::var(TOKEN_VAR).ok().filter(|t| !t.trim().is_empty()),
        }
    }

    /// Build the tile credential; an explicit override wins over the environment.
    pub fn tile_credential(&self, override_token: Option<&str>) -> Result<TileCredential, ConfigError> {
        let token = override_token
            .or(self.mapbox_token.as_deref())
            .ok_or(ConfigError::MissingToken)?;
        Ok(TileCredential::new(token)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = Settings::load_or_default("/no/such/config.yaml").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "data_path: data/mci.csv\nverify_token: false").unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.data_path, PathBuf::from("data/mci.csv"));
        assert!(!settings.verify_token);
        assert_eq!(settings.image_path, PathBuf::from("Crime_Scene.jpg"));
    }

    #[test]
    fn test_bad_yaml_is_reported() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "verify_token: [not, a, bool]").unwrap();
        assert!(matches!(
            Settings::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_token_is_required() {
        let secrets = Secrets { mapbox_token: None };
        assert!(matches!(
            secrets.tile_credential(None),
            Err(ConfigError::MissingToken)
        ));

        let secrets = Secrets {
            mapbox_token: Some("pk.from-env".into()),
        };
        assert!(secrets.tile_credential(None).is_ok());
        assert!(matches!(
            secrets.tile_credential(Some("sk.secret")),
            Err(ConfigError::InvalidToken(TokenError::NotPublic))
        ));
    }
}
