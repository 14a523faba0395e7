//! Configuration management for the relay client.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use viper_core::KeySigner;
use viper_relayer::provider::DEFAULT_RELAY_TIMEOUT_SECS;

/// Configuration for the relay client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Relay transport configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Client key configuration
    #[serde(default)]
    pub signer: SignerConfig,

    /// Relay defaults
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Relay transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Timeout for a relay round trip in seconds
    pub timeout_secs: u64,
}

/// Client key configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignerConfig {
    /// Client private key (hex, 32-byte seed or 64-byte keypair)
    pub private_key: Option<String>,
}

/// Relay defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Chain relayed to when none is given on the command line
    pub blockchain: String,

    /// HTTP method for relayed requests
    pub method: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_RELAY_TIMEOUT_SECS,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            blockchain: "0021".to_string(),
            method: "POST".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file, overridden by `VIPER_` environment variables
    ///
    /// Nested keys use a double underscore, e.g. `VIPER_PROVIDER__TIMEOUT_SECS`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        Self::load(Some(path.as_ref()), environment())
    }

    /// Load configuration from `VIPER_` environment variables over the defaults
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(None, environment())
    }

    fn load(path: Option<&Path>, env: config::Environment) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).format(config::FileFormat::Toml));
        }

        builder.add_source(env).build()?.try_deserialize()
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.provider.timeout_secs == 0 {
            return Err(anyhow::anyhow!("Provider timeout must be greater than 0"));
        }

        if self.relay.blockchain.is_empty() {
            return Err(anyhow::anyhow!("Default blockchain must not be empty"));
        }

        if let Some(private_key) = &self.signer.private_key {
            KeySigner::from_hex(private_key)
                .map_err(|e| anyhow::anyhow!("Invalid signer private key: {}", e))?;
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("VIPER")
        .prefix_separator("_")
        .separator("__")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SEED: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.timeout_secs, 30);
        assert_eq!(config.relay.blockchain, "0021");
        assert!(config.signer.private_key.is_none());
    }

    #[test]
    fn test_from_file() {
        let file = write_config(&format!(
            r#"
[provider]
timeout_secs = 10

[signer]
private_key = "{}"

[relay]
blockchain = "0040"
method = "GET"
"#,
            SEED
        ));

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.signer.private_key.as_deref(), Some(SEED));
        assert_eq!(config.relay.blockchain, "0040");
        assert_eq!(config.relay.method, "GET");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let file = write_config("[provider]\ntimeout_secs = 5\n");

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.provider.timeout_secs, 5);
        assert_eq!(config.relay.blockchain, "0021");
        assert!(config.signer.private_key.is_none());
    }

    #[test]
    fn test_partial_sections_use_field_defaults() {
        let file = write_config("[relay]\nblockchain = \"0040\"\n\n[provider]\n");

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.relay.blockchain, "0040");
        assert_eq!(config.relay.method, "POST");
        assert_eq!(config.provider.timeout_secs, 30);
    }

    fn env_source(vars: &[(&str, &str)]) -> config::Environment {
        let vars = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        environment().source(Some(vars))
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_config("[provider]\ntimeout_secs = 5\n\n[relay]\nblockchain = \"0040\"\n");
        let env = env_source(&[
            ("VIPER_PROVIDER__TIMEOUT_SECS", "77"),
            ("VIPER_RELAY__METHOD", "GET"),
        ]);

        let config = ClientConfig::load(Some(file.path()), env).unwrap();
        assert_eq!(config.provider.timeout_secs, 77);
        assert_eq!(config.relay.method, "GET");
        assert_eq!(config.relay.blockchain, "0040");
    }

    #[test]
    fn test_env_without_file() {
        let env = env_source(&[
            ("VIPER_SIGNER__PRIVATE_KEY", SEED),
            ("VIPER_RELAY__BLOCKCHAIN", "0001"),
            ("OTHER_RELAY__BLOCKCHAIN", "9999"),
        ]);

        let config = ClientConfig::load(None, env).unwrap();
        assert_eq!(config.signer.private_key.as_deref(), Some(SEED));
        assert_eq!(config.relay.blockchain, "0001");
        assert_eq!(config.provider.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_only_defaults() {
        let config = ClientConfig::load(None, env_source(&[])).unwrap();
        assert_eq!(config.provider.timeout_secs, 30);
        assert_eq!(config.relay.blockchain, "0021");
    }

    #[test]
    fn test_save_and_reload() {
        let mut config = ClientConfig::default();
        config.relay.blockchain = "0001".to_string();
        config.signer.private_key = Some(SEED.to_string());

        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        config.save_to_file(file.path()).unwrap();

        let reloaded = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(reloaded.relay.blockchain, "0001");
        assert_eq!(reloaded.signer.private_key.as_deref(), Some(SEED));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ClientConfig::default();
        config.provider.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.relay.blockchain.clear();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.signer.private_key = Some("1234".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid signer private key"));
    }
}
