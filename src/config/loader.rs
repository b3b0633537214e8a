//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::AdapterConfig;
use crate::config::validation::{is_contained, validate_config, ValidationError};
use crate::orchestrator::PrerenderedAssets;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Manifest(serde_json::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Manifest(e) => write!(f, "Prerendered manifest error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from an optional TOML file, apply environment
/// overrides, and validate.
pub fn load_config(path: Option<&Path>) -> Result<AdapterConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => AdapterConfig::default(),
    };

    apply_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides through `lookup`.
///
/// - `DEBUG`: any value other than empty, `0` or `false` enables event dumps
/// - `AWS_LAMBDA_RUNTIME_API`: Runtime API endpoint
pub fn apply_overrides(config: &mut AdapterConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(debug) = lookup("DEBUG") {
        let debug = debug.trim();
        if !debug.is_empty() && debug != "0" && !debug.eq_ignore_ascii_case("false") {
            config.observability.debug_events = true;
        }
    }
    if let Some(api) = lookup("AWS_LAMBDA_RUNTIME_API").filter(|api| !api.is_empty()) {
        config.runtime.api = Some(api);
    }
}

/// Build the prerendered asset set from inline files and the manifest.
pub fn load_prerendered(config: &AdapterConfig) -> Result<PrerenderedAssets, ConfigError> {
    let mut files = config.prerendered.files.clone();

    if let Some(manifest) = &config.prerendered.manifest {
        let content = fs::read_to_string(manifest).map_err(ConfigError::Io)?;
        let listed: Vec<String> = serde_json::from_str(&content).map_err(ConfigError::Manifest)?;
        let unsafe_paths: Vec<ValidationError> = listed
            .iter()
            .filter(|file| !is_contained(file))
            .map(|file| ValidationError::UnsafeAssetPath(file.clone()))
            .collect();
        if !unsafe_paths.is_empty() {
            return Err(ConfigError::Validation(unsafe_paths));
        }
        files.extend(listed);
    }

    tracing::info!(
        root = %config.prerendered.root.display(),
        files = files.len(),
        "Prerendered assets loaded"
    );
    Ok(PrerenderedAssets::new(config.prerendered.root.clone(), files))
}
