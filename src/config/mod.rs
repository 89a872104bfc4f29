mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./picstash.toml",
        "~/.config/picstash/config.toml",
        "/etc/picstash/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Overlay media credentials from the environment.
///
/// Environment variables win over file values so deployments never need
/// to write secrets to disk.
fn apply_env_overrides(config: &mut Config) {
    if let Ok(v) = std::env::var("CLOUDINARY_CLOUD_NAME") {
        config.media.cloud_name = v;
    }
    if let Ok(v) = std::env::var("CLOUDINARY_API_KEY") {
        config.media.api_key = v;
    }
    if let Ok(v) = std::env::var("CLOUDINARY_API_SECRET") {
        config.media.api_secret = v;
    }
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if !config.media.has_credentials() {
        tracing::warn!("Media host credentials are not configured; uploads will fail");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.media.base_url, "https://api.cloudinary.com");
        assert!(config.server.cors_allowed_origin.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
            [server]
            host = "127.0.0.1"
            port = 9000
            cors_allowed_origin = "http://localhost:5173"

            [database]
            path = "gallery.db"

            [media]
            cloud_name = "demo"
            api_key = "key"
            api_secret = "secret"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.server.cors_allowed_origin.as_deref(),
            Some("http://localhost:5173")
        );
        assert_eq!(config.database.path.to_str(), Some("gallery.db"));
        assert!(config.media.has_credentials());
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: Config = toml::from_str("[server]\nport = 3000\n").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.path.to_str(), Some("picstash.db"));
        assert!(!config.media.has_credentials());
    }

    #[test]
    fn zero_port_rejected() {
        let config: Config = toml::from_str("[server]\nport = 0\n").unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 8123\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.server.port, 8123);
    }
}
