//! Configuration file support for typ2tex CLI
//!
//! Loads settings from a `_typ2tex.toml` file next to the input document, or
//! from an explicit `--config` path. Command-line flags take precedence over
//! every value here.

use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "_typ2tex.toml";

/// Schema URL for the configuration file
pub const SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/typ2tex/typ2tex/main/crates/typ2tex-cli/schema/typ2tex.schema.json";

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Output document configuration
    #[serde(skip_serializing_if = "OutputConfig::is_empty")]
    pub output: OutputConfig,
    /// Math conversion configuration
    #[serde(skip_serializing_if = "MathConfig::is_empty")]
    pub math: MathConfig,
    /// Bibliography configuration
    #[serde(skip_serializing_if = "BibliographyConfig::is_empty")]
    pub bibliography: BibliographyConfig,
}

/// Output document configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// LaTeX template with %title%, %authors%, %date%, %abstract%, %bibliography%
    /// and %content% placeholders, relative to this file (default: built-in article template)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
    #[doc = r"Value of the \date{} field (default: \today)"]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl OutputConfig {
    fn is_empty(&self) -> bool {
        self.template.is_none() && self.date.is_none()
    }
}

/// Math conversion configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct MathConfig {
    /// Convert $...$ spans with an external command (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Converter command (default: "pandoc")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Arguments placed before the input file (default: ["-f", "typst", "-t", "latex"])
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    /// Seconds a single span may take (default: 10)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl MathConfig {
    fn is_empty(&self) -> bool {
        self.enabled.is_none()
            && self.command.is_none()
            && self.args.is_none()
            && self.timeout_secs.is_none()
    }
}

/// Bibliography configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct BibliographyConfig {
    /// Load citation keys from the bibliography named in the document when
    /// no --bib is given (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_discover: Option<bool>,
}

impl BibliographyConfig {
    fn is_empty(&self) -> bool {
        self.auto_discover.is_none()
    }
}

impl Config {
    /// Load configuration from a specific file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Try to load configuration from a directory (looks for `_typ2tex.toml`)
    ///
    /// Returns `Ok(None)` if the config file doesn't exist.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Generate JSON schema for the configuration
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Generate JSON schema as a string
    pub fn json_schema_string() -> Result<String> {
        let schema = Self::json_schema();
        serde_json::to_string_pretty(&schema).context("Failed to serialize JSON schema")
    }

    /// Serialize configuration to TOML string with schema directive
    pub fn to_toml_with_schema(&self) -> Result<String> {
        let toml_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        Ok(format!("#:schema {}\n\n{}", SCHEMA_URL, toml_content))
    }

    /// Create a sample configuration with common defaults for init command
    pub fn sample() -> Self {
        Config {
            output: OutputConfig {
                template: None, // built-in template
                date: Some(r"\today".to_string()),
            },
            math: MathConfig {
                enabled: Some(true),
                command: Some("pandoc".to_string()),
                args: Some(
                    ["-f", "typst", "-t", "latex"]
                        .map(String::from)
                        .to_vec(),
                ),
                timeout_secs: Some(10),
            },
            bibliography: BibliographyConfig {
                auto_discover: Some(true),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.output.template.is_none());
        assert!(config.math.enabled.is_none());
        assert!(config.bibliography.auto_discover.is_none());
    }

    #[test]
    fn test_parse_output_section() {
        let config: Config = toml::from_str(
            r#"
            [output]
            template = "paper.tex"
            date = "June 2024"
            "#,
        )
        .unwrap();

        assert_eq!(config.output.template, Some(PathBuf::from("paper.tex")));
        assert_eq!(config.output.date, Some("June 2024".to_string()));
    }

    #[test]
    fn test_parse_math_section() {
        let config: Config = toml::from_str(
            r#"
            [math]
            enabled = false
            command = "/opt/pandoc/bin/pandoc"
            args = ["--from=typst", "--to=latex"]
            timeout_secs = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.math.enabled, Some(false));
        assert_eq!(config.math.command.as_deref(), Some("/opt/pandoc/bin/pandoc"));
        assert_eq!(
            config.math.args,
            Some(vec!["--from=typst".to_string(), "--to=latex".to_string()])
        );
        assert_eq!(config.math.timeout_secs, Some(3));
    }

    #[test]
    fn test_parse_bibliography_section() {
        let config: Config = toml::from_str(
            r#"
            [bibliography]
            auto_discover = false
            "#,
        )
        .unwrap();

        assert_eq!(config.bibliography.auto_discover, Some(false));
    }

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [math]
            timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.math.timeout_secs, Some(30));
        assert!(config.math.command.is_none());
        assert!(config.output.date.is_none());
    }

    #[test]
    fn test_unknown_type_is_error() {
        let result: Result<Config, _> = toml::from_str("[math]\ntimeout_secs = \"ten\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[math]\nenabled = false\n").unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.math.enabled, Some(false));
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[math\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_serialize_empty_config() {
        let config = Config::default();
        let toml = config.to_toml_with_schema().unwrap();
        assert!(toml.starts_with("#:schema"));
        assert!(!toml.contains("[output]"));
        assert!(!toml.contains("[math]"));
    }

    #[test]
    fn test_serialize_sample_config() {
        let config = Config::sample();
        let toml = config.to_toml_with_schema().unwrap();
        assert!(toml.starts_with("#:schema"));
        assert!(toml.contains("[math]"));
        assert!(toml.contains("command = \"pandoc\""));
        assert!(toml.contains("[bibliography]"));
    }

    #[test]
    fn test_json_schema_generation() {
        let schema = Config::json_schema_string().unwrap();
        assert!(schema.contains("\"title\""));
        assert!(schema.contains("MathConfig"));
        assert!(schema.contains("timeout_secs"));
    }

    #[test]
    fn test_roundtrip() {
        let config = Config::sample();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.math.args, parsed.math.args);
        assert_eq!(config.output.date, parsed.output.date);
    }
}
