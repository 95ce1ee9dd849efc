//! Configuration management infrastructure.
//!
//! Loads and saves signer settings as TOML: which adapter to use, where the
//! public certificate and key bundle live, and how to reach remote signers.
//! Passphrases are never written to the file; only the name of the
//! environment variable holding one is.

use crate::domain::crypto::HashAlgorithm;
use crate::infra::error::{SigningError, SigningResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable holding the key bundle passphrase by default.
pub const DEFAULT_PASSPHRASE_ENV: &str = "EXTERNAL_SIGNER_PASSPHRASE";

/// Which signer adapter to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    #[default]
    Local,
    Function,
    Http,
}

impl FromStr for AdapterKind {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(AdapterKind::Local),
            "function" | "lambda" => Ok(AdapterKind::Function),
            "http" => Ok(AdapterKind::Http),
            _ => Err(SigningError::ConfigurationError(format!(
                "Unknown adapter: {s} (expected local, function or http)"
            ))),
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterKind::Local => write!(f, "local"),
            AdapterKind::Function => write!(f, "function"),
            AdapterKind::Http => write!(f, "http"),
        }
    }
}

/// Signer configuration with all adapter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfiguration {
    /// Adapter used when none is given on the command line
    pub adapter: AdapterKind,

    /// Default digest algorithm
    pub digest_algorithm: String,

    /// Public certificate (chain) used for verification and embedding
    pub public_certificate: PathBuf,

    /// Network timeout for remote adapters
    pub network_timeout_seconds: u64,

    /// Whether to verify each signature against the chain leaf before use
    pub verify_signature: bool,

    pub local: LocalSettings,
    pub function: FunctionSettings,
    pub http: HttpSettings,
}

/// Local certificate signer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSettings {
    /// PKCS#12 bundle with the RSA private key
    pub key_bundle: PathBuf,

    /// Environment variable holding the bundle passphrase
    pub passphrase_env: String,

    /// Serve the chain from `public_certificate` rather than the bundle
    pub use_public_certificate: bool,
}

/// Cloud-function signer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionSettings {
    /// Base URL of the function invoke API
    pub endpoint: String,

    /// Function name or ARN
    pub function_name: String,
}

/// HTTP endpoint signer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Signing endpoint URL
    pub url: String,

    /// Verify the endpoint's TLS certificate
    pub verify_tls: bool,
}

impl Default for SignerConfiguration {
    fn default() -> Self {
        Self {
            adapter: AdapterKind::Local,
            digest_algorithm: "sha256".to_string(),
            public_certificate: PathBuf::from("Resources/JohnDoe.crt"),
            network_timeout_seconds: 30,
            verify_signature: true,
            local: LocalSettings::default(),
            function: FunctionSettings::default(),
            http: HttpSettings::default(),
        }
    }
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            key_bundle: PathBuf::from("Resources/JohnDoe.pfx"),
            passphrase_env: DEFAULT_PASSPHRASE_ENV.to_string(),
            use_public_certificate: true,
        }
    }
}

impl Default for FunctionSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9001".to_string(),
            function_name: "ExternalSign".to_string(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:7062/api/ExternalSign".to_string(),
            verify_tls: true,
        }
    }
}

impl SignerConfiguration {
    /// Parsed default digest algorithm.
    ///
    /// # Errors
    /// Returns `ConfigurationError` for an unsupported name.
    pub fn hash_algorithm(&self) -> SigningResult<HashAlgorithm> {
        self.digest_algorithm.parse::<HashAlgorithm>().map_err(|_| {
            SigningError::ConfigurationError(format!(
                "Invalid digest algorithm: {}",
                self.digest_algorithm
            ))
        })
    }

    /// Validate configuration values
    ///
    /// # Errors
    /// Returns `ConfigurationError` describing the first invalid value.
    pub fn validate(&self) -> SigningResult<()> {
        self.hash_algorithm()?;

        if self.network_timeout_seconds == 0 {
            return Err(SigningError::ConfigurationError(
                "Network timeout must be greater than 0".to_string(),
            ));
        }

        validate_url("function.endpoint", &self.function.endpoint)?;
        validate_url("http.url", &self.http.url)?;

        if self.function.function_name.trim().is_empty() {
            return Err(SigningError::ConfigurationError(
                "function.function_name must not be empty".to_string(),
            ));
        }

        if self.local.passphrase_env.trim().is_empty() {
            return Err(SigningError::ConfigurationError(
                "local.passphrase_env must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_url(key: &str, url: &str) -> SigningResult<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(SigningError::ConfigurationError(format!(
            "{key} must start with http:// or https://, got: {url}"
        )));
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> SigningResult<bool> {
    value.parse().map_err(|_| {
        SigningError::ConfigurationError(format!("Invalid boolean value for {key}: {value}"))
    })
}

/// Configuration manager for handling config files
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new configuration manager with default path
    pub fn new() -> SigningResult<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Create a configuration manager with custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> SigningResult<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Ok(config_dir.join("external-signer").join("config.toml"))
        } else {
            // Fallback to current directory
            Ok(PathBuf::from("external-signer-config.toml"))
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub fn load_or_create_default(&self) -> SigningResult<SignerConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            log::info!(
                "Configuration file not found, creating default: {}",
                self.config_path.display()
            );
            let default_config = SignerConfiguration::default();
            self.save(&default_config)?;
            Ok(default_config)
        }
    }

    /// Load configuration from file, falling back to defaults without writing
    pub fn load_or_default(&self) -> SigningResult<SignerConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            log::debug!(
                "No configuration at {}, using defaults",
                self.config_path.display()
            );
            Ok(SignerConfiguration::default())
        }
    }

    /// Load configuration from file
    pub fn load(&self) -> SigningResult<SignerConfiguration> {
        log::debug!("Loading configuration from: {}", self.config_path.display());

        let content = fs::read_to_string(&self.config_path).map_err(|e| {
            SigningError::ConfigurationError(format!(
                "Failed to read config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        let config: SignerConfiguration = toml::from_str(&content).map_err(|e| {
            SigningError::ConfigurationError(format!("Failed to parse config file: {e}"))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &SignerConfiguration) -> SigningResult<()> {
        log::info!("Saving configuration to: {}", self.config_path.display());

        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    SigningError::ConfigurationError(format!(
                        "Failed to create config directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let content = toml::to_string_pretty(config).map_err(|e| {
            SigningError::ConfigurationError(format!("Failed to serialize config: {e}"))
        })?;

        fs::write(&self.config_path, content).map_err(|e| {
            SigningError::ConfigurationError(format!(
                "Failed to write config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Update a specific configuration value
    pub fn update_value(&self, key: &str, value: &str) -> SigningResult<()> {
        let mut config = self.load_or_default()?;

        match key {
            "adapter" => config.adapter = value.parse()?,
            "digest_algorithm" => {
                value.parse::<HashAlgorithm>().map_err(|_| {
                    SigningError::ConfigurationError(format!("Invalid digest algorithm: {value}"))
                })?;
                config.digest_algorithm = value.to_string();
            }
            "public_certificate" => config.public_certificate = PathBuf::from(value),
            "network_timeout_seconds" => {
                config.network_timeout_seconds = value.parse().map_err(|_| {
                    SigningError::ConfigurationError(format!("Invalid timeout: {value}"))
                })?;
            }
            "verify_signature" => config.verify_signature = parse_bool(key, value)?,
            "local.key_bundle" => config.local.key_bundle = PathBuf::from(value),
            "local.passphrase_env" => config.local.passphrase_env = value.to_string(),
            "local.use_public_certificate" => {
                config.local.use_public_certificate = parse_bool(key, value)?;
            }
            "function.endpoint" => config.function.endpoint = value.to_string(),
            "function.function_name" => config.function.function_name = value.to_string(),
            "http.url" => config.http.url = value.to_string(),
            "http.verify_tls" => config.http.verify_tls = parse_bool(key, value)?,
            _ => {
                return Err(SigningError::ConfigurationError(format!(
                    "Unknown configuration key: {key}"
                )));
            }
        }

        config.validate()?;
        self.save(&config)
    }

    /// Get the configuration file path
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Export configuration as a portable format
    pub fn export_config(&self, format: ExportFormat) -> SigningResult<String> {
        let config = self.load_or_default()?;

        match format {
            ExportFormat::Toml => toml::to_string_pretty(&config)
                .map_err(|e| SigningError::ConfigurationError(format!("TOML export failed: {e}"))),
            ExportFormat::Json => serde_json::to_string_pretty(&config)
                .map_err(|e| SigningError::ConfigurationError(format!("JSON export failed: {e}"))),
        }
    }
}

/// Configuration export formats
#[derive(Debug, Clone, Copy)]
pub enum ExportFormat {
    Toml,
    Json,
}
