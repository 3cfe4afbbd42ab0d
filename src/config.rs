//! # Config — TOML Configuration
//!
//! One optional TOML file supplies the default inputs used when a caller
//! leaves one out, the iteration limits every request is held to, and the
//! HTTP service settings:
//!
//! ```toml
//! [defaults]
//! modulus = 101
//! terms = 300
//! initial_terms = "1,2,3"
//!
//! [limits]
//! max_terms = 100000
//! max_modulus = 100000
//!
//! [server]
//! port = 7001
//! request_timeout_secs = 30
//! body_limit_bytes = 65536
//! ```
//!
//! Every section and key may be omitted. Missing keys take the values above.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::engine::{Limits, MIN_SEED_TERMS};
use crate::parse::parse_initial_terms;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// The `[defaults]` section: inputs used when the caller omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub modulus: i64,
    pub terms: i64,
    pub initial_terms: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        DefaultsConfig {
            modulus: 101,
            terms: 300,
            initial_terms: "1,2,3".to_string(),
        }
    }
}

/// The `[limits]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub max_terms: u64,
    pub max_modulus: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            max_terms: Limits::DEFAULT_MAX_TERMS,
            max_modulus: Limits::DEFAULT_MAX_MODULUS,
        }
    }
}

impl From<&LimitsConfig> for Limits {
    fn from(config: &LimitsConfig) -> Self {
        Limits {
            max_terms: config.max_terms,
            max_modulus: config.max_modulus,
        }
    }
}

/// The `[server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub port: u16,
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 7001,
            request_timeout_secs: 30,
            body_limit_bytes: 64 * 1024,
        }
    }
}

impl AppConfig {
    pub fn limits(&self) -> Limits {
        Limits::from(&self.limits)
    }
}

/// Parse a configuration from a TOML string.
pub fn parse_toml(content: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a configuration from a TOML file path.
pub fn parse_toml_file(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read config {}: {}", path.display(), e))?;
    parse_toml(&content)
}

/// Load the file at `path` if given, otherwise the built-in defaults.
pub fn load(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(p) => parse_toml_file(p),
        None => Ok(AppConfig::default()),
    }
}

/// The defaults must themselves form a request the limits accept.
fn validate_config(config: &AppConfig) -> Result<()> {
    if config.limits.max_terms == 0 {
        anyhow::bail!("limits.max_terms must be positive");
    }
    if config.limits.max_modulus < 2 {
        anyhow::bail!("limits.max_modulus must be at least 2");
    }

    let defaults = &config.defaults;
    if defaults.modulus < 2 {
        anyhow::bail!("defaults.modulus must be at least 2, got {}", defaults.modulus);
    }
    if defaults.modulus as u64 > config.limits.max_modulus {
        anyhow::bail!(
            "defaults.modulus {} exceeds limits.max_modulus {}",
            defaults.modulus,
            config.limits.max_modulus
        );
    }
    if defaults.terms < 0 {
        anyhow::bail!("defaults.terms must be non-negative, got {}", defaults.terms);
    }
    if defaults.terms as u64 > config.limits.max_terms {
        anyhow::bail!(
            "defaults.terms {} exceeds limits.max_terms {}",
            defaults.terms,
            config.limits.max_terms
        );
    }
    let seed = parse_initial_terms(&defaults.initial_terms)
        .map_err(|e| anyhow::anyhow!("defaults.initial_terms: {}", e))?;
    if seed.len() < MIN_SEED_TERMS {
        anyhow::bail!(
            "defaults.initial_terms needs at least {} terms, got {}",
            MIN_SEED_TERMS,
            seed.len()
        );
    }

    if config.server.request_timeout_secs == 0 {
        anyhow::bail!("server.request_timeout_secs must be positive");
    }
    if config.server.body_limit_bytes == 0 {
        anyhow::bail!("server.body_limit_bytes must be positive");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.defaults.modulus, 101);
        assert_eq!(config.defaults.terms, 300);
        assert_eq!(config.defaults.initial_terms, "1,2,3");
        assert_eq!(config.server.port, 7001);
        assert_eq!(config.limits(), Limits::default());
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let config = parse_toml(
            r#"
[defaults]
modulus = 7

[server]
port = 8080
"#,
        )
        .unwrap();
        assert_eq!(config.defaults.modulus, 7);
        assert_eq!(config.defaults.terms, 300);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout_secs, 30);
    }

    #[test]
    fn limits_section_maps_to_engine_limits() {
        let config = parse_toml(
            r#"
[limits]
max_terms = 500
max_modulus = 1000
"#,
        )
        .unwrap();
        assert_eq!(
            config.limits(),
            Limits {
                max_terms: 500,
                max_modulus: 1000
            }
        );
    }

    #[test]
    fn rejects_invalid_default_modulus() {
        let err = parse_toml("[defaults]\nmodulus = 1\n").unwrap_err();
        assert!(err.to_string().contains("defaults.modulus"));
    }

    #[test]
    fn rejects_defaults_beyond_limits() {
        let err = parse_toml("[limits]\nmax_terms = 10\n").unwrap_err();
        assert!(err.to_string().contains("exceeds limits.max_terms"));
    }

    #[test]
    fn rejects_bad_default_seed() {
        let err = parse_toml("[defaults]\ninitial_terms = \"1,2\"\n").unwrap_err();
        assert!(err.to_string().contains("at least 3"));
        let err = parse_toml("[defaults]\ninitial_terms = \"1,q,2\"\n").unwrap_err();
        assert!(err.to_string().contains("defaults.initial_terms"));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(parse_toml("[defaults]\nmodulo = 5\n").is_err());
        assert!(parse_toml("[theme]\ncolor = \"blue\"\n").is_err());
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults]\nterms = 42").unwrap();
        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.defaults.terms, 42);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("cannot read config"));
    }

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(load(None).unwrap(), AppConfig::default());
    }
}
