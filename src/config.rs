use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::CaptureKind;

/// Default config file, created on first run
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Browsers the config file may name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    Chrome,
    Firefox,
    Edge,
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Edge => "edge",
        };
        f.write_str(name)
    }
}

/// Program configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Browser to drive
    pub browser: BrowserKind,
    /// Debug log file, truncated on start
    pub log_file: PathBuf,
    /// Artifact root directory
    pub out_dir: PathBuf,
    /// Shared metadata CSV
    pub csv_file: PathBuf,
    pub save_pdf: bool,
    pub save_png: bool,
    pub save_txt: bool,
    /// Run Chrome without a window
    pub headless: bool,
    /// Explicit Chrome binary, otherwise auto-detected
    pub chrome_executable: Option<PathBuf>,
    /// Search page of the register
    pub search_url: String,
    /// How long to wait for a required element
    pub element_timeout_secs: u64,
    /// Pause after the site rejected a request
    pub block_cooldown_secs: u64,
    /// Search retries after a rejection page
    pub max_block_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser: BrowserKind::Chrome,
            log_file: PathBuf::from("ekw.log"),
            out_dir: PathBuf::from("output"),
            csv_file: PathBuf::from("output.csv"),
            save_pdf: true,
            save_png: false,
            save_txt: false,
            headless: true,
            chrome_executable: None,
            search_url: "https://przegladarka-ekw.ms.gov.pl/eukw_prz/KsiegiWieczyste/wyszukiwanieKW"
                .to_string(),
            element_timeout_secs: 60,
            block_cooldown_secs: 180,
            max_block_retries: 3,
        }
    }
}

impl Config {
    /// Loads the config file, writing the defaults first if it is missing
    ///
    /// `EKW_*` environment variables override file values, e.g.
    /// `EKW_SAVE_PNG=true`.
    ///
    /// # Returns
    /// The config and whether a default file was created
    pub fn load(path: &Path) -> Result<(Self, bool), ConfigError> {
        let created = if path.exists() {
            false
        } else {
            Self::default().save(path)?;
            true
        };

        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("EKW_"))
            .extract()
            .map_err(|e| ConfigError::Load {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok((config, created))
    }

    /// Parses a TOML string on top of the defaults
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(toml_str))
            .extract()
            .map_err(|e| ConfigError::Load {
                path: PathBuf::from("<string>"),
                message: e.to_string(),
            })
    }

    /// Writes the config as TOML
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |message: String| ConfigError::Write {
            path: path.to_path_buf(),
            message,
        };
        let body = toml::to_string_pretty(self).map_err(|e| write_err(e.to_string()))?;
        std::fs::write(path, body).map_err(|e| write_err(e.to_string()))
    }

    /// Rejects settings the program cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.browser != BrowserKind::Chrome {
            return Err(ConfigError::UnsupportedBrowser(self.browser.to_string()));
        }
        if self.element_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "element_timeout_secs".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.search_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "search_url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    pub fn block_cooldown(&self) -> Duration {
        Duration::from_secs(self.block_cooldown_secs)
    }

    /// Enabled artifact kinds, in write order
    pub fn capture_kinds(&self) -> Vec<CaptureKind> {
        [
            (self.save_pdf, CaptureKind::Pdf),
            (self.save_png, CaptureKind::Png),
            (self.save_txt, CaptureKind::Text),
        ]
        .into_iter()
        .filter_map(|(enabled, kind)| enabled.then_some(kind))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.browser, BrowserKind::Chrome);
        assert_eq!(config.log_file, PathBuf::from("ekw.log"));
        assert_eq!(config.out_dir, PathBuf::from("output"));
        assert_eq!(config.capture_kinds(), vec![CaptureKind::Pdf]);
        assert_eq!(config.block_cooldown(), Duration::from_secs(180));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
save_png = true
save_txt = true
out_dir = "books"
"#,
        )
        .unwrap();
        assert_eq!(config.out_dir, PathBuf::from("books"));
        assert_eq!(
            config.capture_kinds(),
            vec![CaptureKind::Pdf, CaptureKind::Png, CaptureKind::Text]
        );
        assert_eq!(config.max_block_retries, 3);
    }

    #[test]
    fn test_unsupported_browser() {
        let config = Config::from_toml_str(r#"browser = "firefox""#).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedBrowser(ref b) if b == "firefox"));
    }

    #[test]
    fn test_unknown_browser_fails_to_parse() {
        assert!(Config::from_toml_str(r#"browser = "opera""#).is_err());
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let config = Config {
            element_timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let (config, created) = Config::load(&path).unwrap();
        assert!(created);
        assert!(path.exists());
        assert_eq!(config.csv_file, Config::default().csv_file);

        let (_, created_again) = Config::load(&path).unwrap();
        assert!(!created_again);
    }

    #[test]
    fn test_load_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "block_cooldown_secs = 5\nheadless = false\n").unwrap();

        let (config, created) = Config::load(&path).unwrap();
        assert!(!created);
        assert_eq!(config.block_cooldown_secs, 5);
        assert!(!config.headless);
    }
}
