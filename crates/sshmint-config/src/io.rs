// ABOUTME: Loading and saving ssh_config files on disk.
// ABOUTME: update_host_in_config composes load, generate_host, add_or_replace and save.

use crate::error::{ConfigError, Result};
use crate::merge::{add_or_replace, generate_host};
use crate::model::Config;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Load the config at `path`. A missing file is an empty document.
pub fn load_config(path: &Path) -> Result<Config> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Config::parse(&contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "ssh config does not exist yet");
            Ok(Config::new())
        }
        Err(e) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Write `config` to `path`, truncating any existing file. New files are
/// created with mode 0600; existing files keep their permissions.
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let contents = config.to_string();
    let mut file = options.open(path).map_err(write_err)?;
    file.write_all(contents.as_bytes()).map_err(write_err)?;
    file.flush().map_err(write_err)?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote ssh config");
    Ok(())
}

/// Record identity `name` in the config at `config_path`, pointing it at
/// `host_name` with `key_path` as its only identity.
pub fn update_host_in_config(
    config_path: &Path,
    name: &str,
    host_name: &str,
    key_path: &Path,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    add_or_replace(&mut config, generate_host(name, host_name, key_path));
    save_config(config_path, &config)?;

    tracing::info!(path = %config_path.display(), host = name, "updated ssh config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let config = load_config(&temp_dir.path().join("config")).expect("should load");
        assert!(config.is_empty());
    }

    #[test]
    fn test_load_directory_is_read_error() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let err = load_config(temp_dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let path = temp_dir.path().join("config");
        let text = "Host a\n\tUser git\r\n# end";

        save_config(&path, &Config::parse(text)).expect("should save");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
        assert_eq!(load_config(&path).unwrap().to_string(), text);
    }

    #[test]
    fn test_save_truncates() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let path = temp_dir.path().join("config");
        std::fs::write(&path, "x".repeat(4096)).unwrap();

        save_config(&path, &Config::parse("Host a\n")).expect("should save");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Host a\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_new_config_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().expect("should create temp dir");
        let path = temp_dir.path().join("config");
        save_config(&path, &Config::new()).expect("should save");

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn test_save_into_missing_directory_reports_path() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let path = temp_dir.path().join("missing").join("config");

        match save_config(&path, &Config::new()).unwrap_err() {
            ConfigError::Write { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected Write, got {other:?}"),
        }
    }

    #[test]
    fn test_update_host_creates_file() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let path = temp_dir.path().join("config");
        let key = temp_dir.path().join("example");

        update_host_in_config(&path, "example", "example.com", &key).expect("should update");

        let config = load_config(&path).unwrap();
        let host = config.find_host("example").expect("host should exist");
        assert_eq!(host.get("HostName"), Some("example.com"));
        assert_eq!(host.get("IdentitiesOnly"), Some("yes"));
        assert_eq!(host.get("IdentityFile"), Some(key.to_str().unwrap()));
    }
}
