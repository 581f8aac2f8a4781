//! Configuration management for mdv.
//!
//! Parses `mdv.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `$VAR` / `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `docs.source_dir`
//! - `report.path`
//! - `render.command`

use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override report output path.
    pub report_path: Option<PathBuf>,
    /// Override renderer command.
    pub render_command: Option<String>,
    /// Override renderer timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Override render enabled flag.
    pub render_enabled: Option<bool>,
    /// Override recursive discovery flag.
    pub recursive: Option<bool>,
    /// Override parallel probing flag.
    pub parallel: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdv.toml";

/// Default report filename, relative to the config directory.
const DEFAULT_REPORT_FILENAME: &str = "mermaid_validation_results.json";

/// Upper bound for `render.timeout_secs`.
const MAX_TIMEOUT_SECS: u64 = 600;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documentation configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Report configuration (paths are relative strings from TOML).
    report: ReportConfigRaw,
    /// External renderer configuration.
    pub render: RenderConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved report configuration (set after loading).
    #[serde(skip)]
    pub report_resolved: ReportConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    extension: Option<String>,
    recursive: Option<bool>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Clone)]
pub struct DocsConfig {
    /// Root directory scanned for documentation files.
    pub source_dir: PathBuf,
    /// File extension of documentation files, without the leading dot.
    pub extension: String,
    /// Whether subdirectories are scanned too.
    pub recursive: bool,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("docs"),
            extension: "md".to_owned(),
            recursive: false,
        }
    }
}

/// Raw report configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ReportConfigRaw {
    path: Option<String>,
}

/// Resolved report configuration.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Where the JSON report is written.
    pub path: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_REPORT_FILENAME),
        }
    }
}

/// External renderer configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Whether diagrams are passed to the external renderer at all.
    pub enabled: bool,
    /// Renderer executable (looked up on `PATH` when not absolute).
    pub command: String,
    /// Per-diagram timeout in seconds.
    pub timeout_secs: u64,
    /// Probe diagrams in parallel.
    pub parallel: bool,
    /// Parent of the per-diagram scratch directories (default: system temp dir).
    pub work_dir: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "mmdc".to_owned(),
            timeout_secs: 10,
            parallel: false,
            work_dir: None,
        }
    }
}

impl RenderConfig {
    /// Per-diagram timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`render.command`").
        field: String,
        /// Error message (e.g., "${`MMDC_BIN`} not set").
        message: String,
    },
}

/// Expand environment variable references in `value`.
fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdv.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(recursive) = settings.recursive {
            self.docs_resolved.recursive = recursive;
        }
        if let Some(report_path) = &settings.report_path {
            self.report_resolved.path.clone_from(report_path);
        }
        if let Some(command) = &settings.render_command {
            self.render.command.clone_from(command);
        }
        if let Some(timeout_secs) = settings.timeout_secs {
            self.render.timeout_secs = timeout_secs;
        }
        if let Some(enabled) = settings.render_enabled {
            self.render.enabled = enabled;
        }
        if let Some(parallel) = settings.parallel {
            self.render.parallel = parallel;
        }
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_docs()?;
        self.validate_render()?;
        Ok(())
    }

    fn validate_docs(&self) -> Result<(), ConfigError> {
        let extension = &self.docs_resolved.extension;
        require_non_empty(extension, "docs.extension")?;
        if extension.starts_with('.') {
            return Err(ConfigError::Validation(
                "docs.extension must not start with '.'".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_render(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.render.command, "render.command")?;

        let timeout = self.render.timeout_secs;
        if timeout == 0 {
            return Err(ConfigError::Validation(
                "render.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if timeout > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Validation(format!(
                "render.timeout_secs cannot exceed {MAX_TIMEOUT_SECS}"
            )));
        }
        Ok(())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            docs: DocsConfigRaw::default(),
            report: ReportConfigRaw::default(),
            render: RenderConfig::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
                ..DocsConfig::default()
            },
            report_resolved: ReportConfig {
                path: base.join(DEFAULT_REPORT_FILENAME),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.docs.source_dir {
            self.docs.source_dir = Some(expand_env(dir, "docs.source_dir")?);
        }
        if let Some(ref path) = self.report.path {
            self.report.path = Some(expand_env(path, "report.path")?);
        }
        self.render.command = expand_env(&self.render.command, "render.command")?;
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.docs_resolved = DocsConfig {
            source_dir: resolve(self.docs.source_dir.as_deref(), "docs"),
            extension: self
                .docs
                .extension
                .clone()
                .unwrap_or_else(|| DocsConfig::default().extension),
            recursive: self.docs.recursive.unwrap_or(false),
        };

        self.report_resolved = ReportConfig {
            path: resolve(self.report.path.as_deref(), DEFAULT_REPORT_FILENAME),
        };

        if let Some(work_dir) = self.render.work_dir.take() {
            self.render.work_dir = Some(config_dir.join(work_dir));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(toml: &str, base: &Path) -> Config {
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(base);
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/test/docs"));
        assert_eq!(config.docs_resolved.extension, "md");
        assert!(!config.docs_resolved.recursive);
        assert_eq!(
            config.report_resolved.path,
            PathBuf::from("/test/mermaid_validation_results.json")
        );
        assert!(config.render.enabled);
        assert_eq!(config.render.command, "mmdc");
        assert_eq!(config.render.timeout(), Duration::from_secs(10));
        assert!(!config.render.parallel);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse("", Path::new("/project"));
        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/project/docs")
        );
        assert_eq!(config.render.command, "mmdc");
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[docs]
source_dir = "documentation"
extension = "markdown"
recursive = true

[report]
path = "out/diagrams.json"
"#;
        let config = parse(toml, Path::new("/project"));
        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/project/documentation")
        );
        assert_eq!(config.docs_resolved.extension, "markdown");
        assert!(config.docs_resolved.recursive);
        assert_eq!(
            config.report_resolved.path,
            PathBuf::from("/project/out/diagrams.json")
        );
    }

    #[test]
    fn test_parse_render_config() {
        let toml = r#"
[render]
enabled = false
command = "npx mmdc"
timeout_secs = 30
parallel = true
"#;
        let config = parse(toml, Path::new("/project"));
        assert!(!config.render.enabled);
        assert_eq!(config.render.command, "npx mmdc");
        assert_eq!(config.render.timeout_secs, 30);
        assert!(config.render.parallel);
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/project"));
        config.apply_cli_settings(&CliSettings {
            source_dir: Some(PathBuf::from("/other/docs")),
            report_path: Some(PathBuf::from("/tmp/report.json")),
            render_command: Some("/usr/bin/mmdc".to_owned()),
            timeout_secs: Some(5),
            render_enabled: Some(false),
            recursive: Some(true),
            parallel: Some(true),
        });

        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/other/docs"));
        assert!(config.docs_resolved.recursive);
        assert_eq!(config.report_resolved.path, PathBuf::from("/tmp/report.json"));
        assert_eq!(config.render.command, "/usr/bin/mmdc");
        assert_eq!(config.render.timeout_secs, 5);
        assert!(!config.render.enabled);
        assert!(config.render.parallel);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/project"));
        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/project/docs")
        );
        assert_eq!(config.render.command, "mmdc");
        assert!(config.render.enabled);
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_extension_empty() {
        let config = parse("[docs]\nextension = \"\"\n", Path::new("/p"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("docs.extension cannot be empty"));
    }

    #[test]
    fn test_validate_extension_leading_dot() {
        let config = parse("[docs]\nextension = \".md\"\n", Path::new("/p"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must not start with '.'"));
    }

    #[test]
    fn test_validate_render_command_empty() {
        let config = parse("[render]\ncommand = \"  \"\n", Path::new("/p"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("render.command cannot be empty"));
    }

    #[test]
    fn test_validate_timeout_zero() {
        let config = parse("[render]\ntimeout_secs = 0\n", Path::new("/p"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("greater than 0"));
    }

    #[test]
    fn test_validate_timeout_too_high() {
        let config = parse("[render]\ntimeout_secs = 601\n", Path::new("/p"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cannot exceed 600"));
    }

    #[test]
    fn test_expand_env_vars_render_command() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MDV_TEST_MMDC", "/opt/bin/mmdc");
        }

        let mut config: Config = toml::from_str("[render]\ncommand = \"${MDV_TEST_MMDC}\"\n").unwrap();
        config.expand_env_vars().unwrap();
        assert_eq!(config.render.command, "/opt/bin/mmdc");

        unsafe {
            std::env::remove_var("MDV_TEST_MMDC");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDV_MISSING_DOCS_DIR");
        }

        let mut config: Config =
            toml::from_str("[docs]\nsource_dir = \"${MDV_MISSING_DOCS_DIR}\"\n").unwrap();
        let err = config.expand_env_vars().unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("docs.source_dir"));
    }

    #[test]
    fn test_render_work_dir_resolved_against_config_dir() {
        let config = parse("[render]\nwork_dir = \".mdv/tmp\"\n", Path::new("/project"));
        assert_eq!(config.render.work_dir, Some(PathBuf::from("/project/.mdv/tmp")));

        let config = parse("[render]\nwork_dir = \"/var/tmp\"\n", Path::new("/project"));
        assert_eq!(config.render.work_dir, Some(PathBuf::from("/var/tmp")));

        let config = parse("", Path::new("/project"));
        assert_eq!(config.render.work_dir, None);
    }

    #[test]
    fn test_expand_env_literal_unchanged() {
        assert_eq!(expand_env("npx mmdc", "render.command").unwrap(), "npx mmdc");
    }

    #[test]
    fn test_expand_env_default_and_embedded() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDV_UNSET_RENDERER");
            std::env::set_var("MDV_TEST_NODE_BIN", "/usr/local/lib/node_modules/.bin");
        }

        assert_eq!(
            expand_env("${MDV_UNSET_RENDERER:-mmdc}", "render.command").unwrap(),
            "mmdc"
        );
        assert_eq!(
            expand_env("${MDV_TEST_NODE_BIN}/mmdc", "render.command").unwrap(),
            "/usr/local/lib/node_modules/.bin/mmdc"
        );
        assert_eq!(
            expand_env("$MDV_TEST_NODE_BIN/mmdc", "render.command").unwrap(),
            "/usr/local/lib/node_modules/.bin/mmdc"
        );

        unsafe {
            std::env::remove_var("MDV_TEST_NODE_BIN");
        }
    }

    #[test]
    fn test_expand_env_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDV_MISSING_REPORT_DIR");
        }

        let err = expand_env("${MDV_MISSING_REPORT_DIR}/report.json", "report.path").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Environment variable error in report.path: ${MDV_MISSING_REPORT_DIR} not set"
        );
    }

    #[test]
    fn test_load_explicit_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("mdv.toml");
        std::fs::write(&path, "[docs]\nsource_dir = \"guides\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.docs_resolved.source_dir, tmp.path().join("guides"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_explicit_path_not_found() {
        let err = Config::load(Some(Path::new("/nonexistent/mdv.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_rejects_invalid_cli_override() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("mdv.toml");
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            timeout_secs: Some(0),
            ..CliSettings::default()
        };
        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_parse_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("mdv.toml");
        std::fs::write(&path, "[render\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
