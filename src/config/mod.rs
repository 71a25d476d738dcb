#[cfg(feature = "cli")]
pub mod cli;

use crate::core::PipelineConfig;
use crate::utils::error::{CdsError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const HOST_ENV: &str = "FXOSS_HOST";
pub const TOKEN_ENV: &str = "FXOSS_TOKEN";
pub const DIR_ENV: &str = "FXOSS_DIR";
pub const CONFIG_FILE_NAME: &str = "cdsops.toml";

const DEFAULT_DIR: &str = "/tmp";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            token: String::new(),
            timeout_seconds: default_timeout_seconds(),
            accept_invalid_certs: false,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_output_dir() -> String {
    std::env::var(DIR_ENV)
        .ok()
        .filter(|dir| !dir.is_empty())
        .unwrap_or_else(|| DEFAULT_DIR.to_string())
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CdsError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text after `${VAR}` substitution.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CdsError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Loads the explicit file if given, else `$FXOSS_DIR/cdsops.toml` when it exists,
    /// else defaults. Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_file(path)?
            }
            None => {
                let candidate = Self::default_config_path();
                if candidate.is_file() {
                    tracing::debug!("Loading config from {}", candidate.display());
                    Self::from_file(&candidate)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn default_config_path() -> PathBuf {
        PathBuf::from(default_output_dir()).join(CONFIG_FILE_NAME)
    }

    /// Replaces `${VAR}` references with environment values. Unset ones stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CdsError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// `FXOSS_HOST`, `FXOSS_TOKEN` and `FXOSS_DIR` win over the file when set.
    pub fn apply_env_overrides(&mut self) {
        if let Some(host) = non_empty_env(HOST_ENV) {
            self.api.host = host;
        }
        if let Some(token) = non_empty_env(TOKEN_ENV) {
            self.api.token = token;
        }
        if let Some(dir) = non_empty_env(DIR_ENV) {
            self.report.output_dir = dir;
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.host", &self.api.host)?;
        validation::validate_non_empty_string("api.token", &self.api.token)?;
        validation::validate_positive_number(
            "api.timeout_seconds",
            self.api.timeout_seconds as usize,
            1,
        )?;
        validation::validate_path("report.output_dir", &self.report.output_dir)?;
        self.pipeline.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ClassificationFailurePolicy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[api]
host = "https://oss.example.com"
token = "abc"
timeout_seconds = 15

[pipeline]
enrichment_workers = 2
classification_workers = 3
device_buffer = 4

[pipeline.on_classification_failure]
mode = "skip"

[report]
output_dir = "./reports"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api.host, "https://oss.example.com");
        assert_eq!(config.api.timeout(), Duration::from_secs(15));
        assert_eq!(config.pipeline.enrichment_workers, 2);
        assert_eq!(config.pipeline.classification_workers, 3);
        assert_eq!(config.pipeline.device_buffer, 4);
        assert_eq!(config.pipeline.classified_buffer, 10);
        assert_eq!(
            config.pipeline.on_classification_failure,
            ClassificationFailurePolicy::Skip
        );
        assert_eq!(config.report.output_dir, "./reports");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config.api.timeout_seconds, 60);
        assert_eq!(config.pipeline.enrichment_workers, 5);
        assert_eq!(config.pipeline.classification_workers, 10);
        assert_eq!(config.pipeline.label_buffer, 1);
        assert_eq!(config.pipeline.device_buffer, 20);
        assert_eq!(config.pipeline.classified_buffer, 10);
        assert_eq!(
            config.pipeline.on_classification_failure,
            ClassificationFailurePolicy::Degrade { tier: 0 }
        );
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CDSOPS_TEST_HOST", "https://test.oss.example.com");

        let toml_content = r#"
[api]
host = "${CDSOPS_TEST_HOST}"
token = "t"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api.host, "https://test.oss.example.com");

        std::env::remove_var("CDSOPS_TEST_HOST");
    }

    #[test]
    fn test_validation_rejects_missing_token_and_zero_workers() {
        let mut config = AppConfig::from_toml_str(
            r#"
[api]
host = "https://oss.example.com"
"#,
        )
        .unwrap();
        config.api.token.clear();
        assert!(matches!(
            config.validate(),
            Err(CdsError::MissingConfigError { .. })
        ));

        config.api.token = "abc".to_string();
        config.pipeline.classification_workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[api]\nhost = \"https://file.example.com\"\ntoken = \"x\"\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.api.host, "https://file.example.com");
    }

    #[test]
    fn test_env_overrides_win_over_file_values() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                b"[api]\nhost = \"https://file.example.com\"\ntoken = \"file-token\"\n\n[report]\noutput_dir = \"./reports\"\n",
            )
            .unwrap();
        let mut config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.report.output_dir, "./reports");

        std::env::set_var(HOST_ENV, "https://env.example.com");
        std::env::set_var(TOKEN_ENV, "env-token");
        std::env::set_var(DIR_ENV, "/var/lib/cdsops");
        config.apply_env_overrides();
        std::env::remove_var(HOST_ENV);
        std::env::remove_var(TOKEN_ENV);
        std::env::remove_var(DIR_ENV);

        assert_eq!(config.api.host, "https://env.example.com");
        assert_eq!(config.api.token, "env-token");
        assert_eq!(config.report.output_dir, "/var/lib/cdsops");

        // Unset variables leave the file values alone.
        let mut untouched = AppConfig::from_file(temp_file.path()).unwrap();
        untouched.apply_env_overrides();
        assert_eq!(untouched.api.host, "https://file.example.com");
        assert_eq!(untouched.report.output_dir, "./reports");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = AppConfig::from_toml_str("[api\nhost = ");
        assert!(matches!(result, Err(CdsError::ConfigError { .. })));
    }
}
