use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use booru_core::{PagerConfig, Rating};
use booru_engine::{ProfileSettings, SessionIdentity, TransportSettings};
use booru_logging::booru_info;
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "./booru.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Signed-in account supplied by the user; authentication itself happens elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    #[serde(default)]
    pub id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub site: String,
    pub page_size: usize,
    pub rating_floor: Rating,
    pub account: Option<Account>,
    pub log_destination: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            site: TransportSettings::default().base_url,
            page_size: PagerConfig::default().page_size,
            rating_floor: Rating::Safe,
            account: None,
            log_destination: LogDestination::default(),
        }
    }
}

impl AppConfig {
    /// Reads `path`; a file that does not exist yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        booru_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            base_url: self.site.clone(),
            ..TransportSettings::default()
        }
    }

    pub fn pager_config(&self) -> PagerConfig {
        PagerConfig {
            page_size: self.page_size,
            rating_floor: self.rating_floor,
            ..PagerConfig::default()
        }
    }

    pub fn profile_settings(&self) -> ProfileSettings {
        ProfileSettings {
            page_size: self.page_size,
        }
    }

    pub fn identity(&self) -> SessionIdentity {
        match &self.account {
            Some(account) => SessionIdentity::signed_in(account.name.clone(), account.id),
            None => SessionIdentity::signed_out(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booru_engine::IdentityProvider;
    use pretty_assertions::assert_eq;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("booru.ron");
        fs::write(&path, content).expect("write config");
        (dir, path)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = AppConfig::load(&dir.path().join("absent.ron")).expect("defaults");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.site, "https://konachan.net");
        assert_eq!(config.rating_floor, Rating::Safe);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let (_dir, path) = write_config(
            r#"(
                page_size: 40,
                account: Some((name: "alice", id: Some(7))),
                log_destination: Both,
            )"#,
        );

        let config = AppConfig::load(&path).expect("config");

        assert_eq!(config.page_size, 40);
        assert_eq!(config.pager_config().page_size, 40);
        assert_eq!(config.pager_config().prefetch_distance, 20);
        assert_eq!(config.profile_settings().page_size, 40);
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.site, "https://konachan.net");

        let identity = config.identity().current();
        assert_eq!(identity.name, "alice");
        assert_eq!(identity.user_id, Some(7));
    }

    #[test]
    fn rating_floor_uses_lowercase_names() {
        let (_dir, path) = write_config("(rating_floor: questionable)");
        assert_eq!(AppConfig::load(&path).expect("config").rating_floor, Rating::Questionable);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let (_dir, path) = write_config("(page_size: \"many\"");
        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("could not parse config"));
    }
}
