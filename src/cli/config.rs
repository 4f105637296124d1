// CLI Configuration - Convert CLI args and config files to a bootstrap config
// Principle: Clear mapping between user input and internal configuration

use crate::cli::{CheckCmd, ListArgs, RunCmd};
use crate::network::BootstrapConfig;
use std::path::Path;
use tracing::{info, warn};

/// Load a bootstrap config from a TOML file
///
/// ```toml
/// interval = 10000
/// list = ["/ip4/1.2.3.4/tcp/30333/p2p/12D3KooW..."]
/// ```
pub fn load_config_file(path: &Path) -> Result<BootstrapConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ConfigReadError(format!("{}: {}", path.display(), e)))?;

    let config: BootstrapConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ConfigParseError(format!("{}: {}", path.display(), e)))?;

    info!("Loaded {} bootnodes from {}", config.list.len(), path.display());
    Ok(config)
}

/// Merge the optional config file with `--bootnode` entries
///
/// Command line bootnodes are appended after the file's list.
fn resolve_list(args: &ListArgs) -> Result<BootstrapConfig, ConfigError> {
    let mut config = match args.config {
        Some(ref path) => load_config_file(path)?,
        None => BootstrapConfig::default(),
    };

    config.list.extend(args.bootnodes.iter().cloned());

    if config.list.is_empty() {
        warn!("⚠️  No bootnodes configured - bootstrap discovery will emit nothing");
    }

    Ok(config)
}

/// Create configuration from CLI run command
pub fn from_run_cmd(cmd: &RunCmd) -> Result<BootstrapConfig, ConfigError> {
    let mut config = resolve_list(&cmd.list)?;

    if let Some(interval) = cmd.interval {
        config.interval = Some(interval);
    }

    Ok(config)
}

/// Create configuration from CLI check command
pub fn from_check_cmd(cmd: &CheckCmd) -> Result<BootstrapConfig, ConfigError> {
    resolve_list(&cmd.list)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    #[error("Failed to read config file: {0}")]
    ConfigReadError(String),

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::DEFAULT_INTERVAL;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;

    const BOOTNODE: &str = "/ip4/104.131.131.82/tcp/4001/p2p/QmaCpDMGvV2BGHeYERUEnRQAwe3N8SzbUtfsmvsqQLuvuJ";

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config_file() {
        let file = write_config(&format!("interval = 2000\nlist = [\"{}\"]\n", BOOTNODE));

        let config = load_config_file(file.path()).unwrap();
        assert_eq!(config.list, vec![BOOTNODE.to_string()]);
        assert_eq!(config.interval(), Duration::from_millis(2000));
    }

    #[test]
    fn test_load_config_file_defaults() {
        let file = write_config("");

        let config = load_config_file(file.path()).unwrap();
        assert!(config.list.is_empty());
        assert_eq!(config.interval(), DEFAULT_INTERVAL);
    }

    #[test]
    fn test_load_config_file_missing() {
        let result = load_config_file(Path::new("/nonexistent/bootstrap.toml"));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_load_config_file_malformed() {
        let file = write_config("list = \"not a list\"\n");

        let result = load_config_file(file.path());
        assert!(matches!(result, Err(ConfigError::ConfigParseError(_))));
    }

    #[test]
    fn test_run_cmd_merges_file_and_flags() {
        let file = write_config(&format!("interval = 2000\nlist = [\"{}\"]\n", BOOTNODE));

        let cmd = RunCmd {
            list: ListArgs {
                config: Some(PathBuf::from(file.path())),
                bootnodes: vec!["/p2p-circuit".to_string()],
            },
            interval: Some(500),
        };

        let config = from_run_cmd(&cmd).unwrap();
        assert_eq!(config.list, vec![BOOTNODE.to_string(), "/p2p-circuit".to_string()]);
        assert_eq!(config.interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_run_cmd_without_file() {
        let cmd = RunCmd {
            list: ListArgs {
                config: None,
                bootnodes: vec![BOOTNODE.to_string()],
            },
            interval: None,
        };

        let config = from_run_cmd(&cmd).unwrap();
        assert_eq!(config.list.len(), 1);
        assert_eq!(config.interval(), DEFAULT_INTERVAL);
    }

    #[test]
    fn test_check_cmd_empty_list_is_allowed() {
        let cmd = CheckCmd {
            list: ListArgs::default(),
        };

        let config = from_check_cmd(&cmd).unwrap();
        assert!(config.list.is_empty());
    }
}
