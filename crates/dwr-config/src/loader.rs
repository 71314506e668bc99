//! Configuration loader.

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::InvalidValue {
            field: "env pattern".to_string(),
            message: e.to_string(),
        })?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.dwr/dwr.toml`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert!(config.client.base_url.is_empty());
        assert_eq!(config.client.timeout_secs, 60);
    }

    #[test]
    fn test_load_client_config() {
        let content = r#"
            [client]
            base_url = "https://dwr.example.com/app"
            connect_timeout_secs = 5
            timeout_secs = 0
            user_agent = "dwr-test/1.0"

            [client.base_params]
            callCount = "1"
            windowName = "foo"
            "c0-id" = "0"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.client.base_url, "https://dwr.example.com/app");
        assert_eq!(config.client.connect_timeout_secs, 5);
        assert!(config.client.timeout().is_none());
        assert_eq!(config.client.user_agent.as_deref(), Some("dwr-test/1.0"));
        assert_eq!(config.client.base_params.len(), 3);
        assert_eq!(config.client.base_params["c0-id"], "0");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[client]").unwrap();
        writeln!(file, "base_url = \"http://localhost:9000\"").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.client.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/dwr.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("DWR_TEST_CONFIG_VAR", "http://env.example.com");
        }
        let content = "[client]\nbase_url = \"${DWR_TEST_CONFIG_VAR}\"";
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.client.base_url, "http://env.example.com");
        unsafe {
            std::env::remove_var("DWR_TEST_CONFIG_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${NONEXISTENT_DWR_TEST_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_expand_env_vars_no_vars() {
        let content = "value = \"no variables here\"";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert_eq!(expanded, content);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = ConfigLoader::expand_path("~/dwr.toml");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/dwr.toml"));
    }
}
