// ABOUTME: Persistent sshmint preferences loaded from a TOML file.
// ABOUTME: Missing file or fields fall back to defaults; CLI flags override them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sshmint_keys::KeyAlgorithm;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Default key algorithm ("ed25519" or "rsa")
    pub key_type: Option<String>,

    /// Directory keys are written to; `~` is expanded
    pub key_directory: Option<PathBuf>,

    /// SSH config file to update; `~` is expanded
    pub ssh_config: Option<PathBuf>,

    /// Register new keys with ssh-agent
    pub add_to_agent: bool,

    /// Save passphrases in the system keyring
    pub store_passphrase: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            key_type: None,
            key_directory: None,
            ssh_config: None,
            add_to_agent: true,
            store_passphrase: true,
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read settings from {}", path.display()))
            }
        };

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;
        Ok(settings)
    }

    /// Default settings path (~/.config/sshmint/config.toml)
    pub fn default_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("."))
            })
            .join("sshmint");
        config_dir.join("config.toml")
    }

    /// The configured key algorithm, if any.
    pub fn key_algorithm(&self) -> Result<Option<KeyAlgorithm>> {
        self.key_type
            .as_deref()
            .map(|name| {
                name.parse::<KeyAlgorithm>()
                    .context("Invalid key_type in settings")
            })
            .transpose()
    }

    pub fn key_directory_expanded(&self) -> Option<PathBuf> {
        self.key_directory.as_deref().map(expand_tilde)
    }

    pub fn ssh_config_expanded(&self) -> Option<PathBuf> {
        self.ssh_config.as_deref().map(expand_tilde)
    }
}

/// Expand a leading `~` the way a shell would.
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(text) => PathBuf::from(shellexpand::tilde(text).into_owned()),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.add_to_agent);
        assert!(settings.store_passphrase);
        assert_eq!(settings.key_algorithm().unwrap(), None);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_settings_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            key_type = "rsa"
            key_directory = "/srv/keys"
            add_to_agent = false
        "#
        )
        .unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.key_algorithm().unwrap(), Some(KeyAlgorithm::Rsa));
        assert_eq!(settings.key_directory, Some(PathBuf::from("/srv/keys")));
        assert!(!settings.add_to_agent);
        assert!(settings.store_passphrase, "unset fields keep their defaults");
    }

    #[test]
    fn test_invalid_key_type() {
        let settings = Settings {
            key_type: Some("dsa".to_string()),
            ..Settings::default()
        };
        let err = settings.key_algorithm().unwrap_err();
        assert!(format!("{err:#}").contains("unsupported key algorithm: dsa"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "key_tpye = \"rsa\"").unwrap();

        let err = Settings::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings"));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let settings = Settings {
            key_type: Some("ed25519".to_string()),
            ssh_config: Some(PathBuf::from("/etc/ssh/ssh_config.d/me.conf")),
            ..Settings::default()
        };
        let text = toml::to_string_pretty(&settings).unwrap();
        assert_eq!(toml::from_str::<Settings>(&text).unwrap(), settings);
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().expect("tests need a home directory");
        assert_eq!(expand_tilde(Path::new("~/.ssh")), home.join(".ssh"));
        assert_eq!(expand_tilde(Path::new("/abs/path")), PathBuf::from("/abs/path"));
    }
}
