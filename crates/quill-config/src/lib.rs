//! Configuration management for Quill.
//!
//! Parses `quill.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `render.include_dir`
//! - `output.title`
//!
//! Values without `${` are taken literally, so a bare `$` needs no escaping.

use quill_render::{HtmlMode, Severity};
use serde::Deserialize;
use std::borrow::Cow;
use std::env::VarError;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the HTML generation mode.
    pub mode: Option<HtmlMode>,
    /// Override the minimum severity of reported diagnostics.
    pub min_severity: Option<Severity>,
    /// Override the standalone document flag.
    pub standalone: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quill.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rendering configuration (paths are relative strings from TOML).
    render: RenderConfigRaw,
    /// Diagnostics configuration.
    pub diagnostics: DiagnosticsConfig,
    /// Markup highlighting configuration.
    pub highlight: HighlightConfig,
    /// Output configuration.
    pub output: OutputConfig,

    /// Resolved rendering configuration (set after loading).
    #[serde(skip)]
    pub render_resolved: RenderConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Raw render configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RenderConfigRaw {
    mode: Option<HtmlMode>,
    error_markup: Option<bool>,
    include_dir: Option<String>,
}

/// Resolved render configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Mode of the top-level HTML conversion.
    pub mode: HtmlMode,
    /// Render unresolved directives as `<error->` elements.
    pub error_markup: bool,
    /// Directory `\include-text` paths are resolved against.
    ///
    /// `None` means the directory of the document being rendered.
    pub include_dir: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: HtmlMode::Paragraphs,
            error_markup: true,
            include_dir: None,
        }
    }
}

/// Diagnostics configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Diagnostics below this severity are not reported.
    pub min_severity: Severity,
}

/// Markup highlighting configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Merge adjacent spans of the same kind.
    pub coalesce: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self { coalesce: true }
    }
}

/// Output configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Wrap HTML output in a complete document.
    pub standalone: bool,
    /// Title of standalone documents.
    pub title: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            standalone: false,
            title: "Document".to_owned(),
        }
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
        /// Config field path (e.g., "`output.title`").
        field: String,
        /// Error message (e.g., "${`DOC_TITLE`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Expand `${VAR}` and `${VAR:-default}` references in the value of `field`.
fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }
    shellexpand::env_with_context(value, |var| std::env::var(var).map(Some))
        .map(Cow::into_owned)
        .map_err(|e| {
            let reason = match e.cause {
                VarError::NotPresent => "not set",
                VarError::NotUnicode(_) => "not valid Unicode",
            };
            ConfigError::EnvVar {
                field: field.to_owned(),
                message: format!("${{{}}} {reason}", e.var_name),
            }
        })
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quill.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, or
    /// the resulting configuration is invalid.
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
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(mode) = settings.mode {
            self.render_resolved.mode = mode;
        }
        if let Some(min_severity) = settings.min_severity {
            self.diagnostics.min_severity = min_severity;
        }
        if let Some(standalone) = settings.standalone {
            self.output.standalone = standalone;
        }
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

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a standalone document has no title.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.standalone {
            require_non_empty(&self.output.title, "output.title")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let fields = [
            ("render.include_dir", self.render.include_dir.as_mut()),
            ("output.title", Some(&mut self.output.title)),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                *value = expand_env(value, field)?;
            }
        }
        Ok(())
    }

    /// Resolve raw values, making relative paths absolute against the config directory.
    fn resolve(&mut self, config_dir: &Path) {
        let defaults = RenderConfig::default();
        self.render_resolved = RenderConfig {
            mode: self.render.mode.unwrap_or(defaults.mode),
            error_markup: self.render.error_markup.unwrap_or(defaults.error_markup),
            include_dir: self.render.include_dir.as_deref().map(|d| config_dir.join(d)),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.render_resolved, RenderConfig::default());
        assert_eq!(config.render_resolved.mode, HtmlMode::Paragraphs);
        assert!(config.render_resolved.error_markup);
        assert_eq!(config.diagnostics.min_severity, Severity::Warning);
        assert!(config.highlight.coalesce);
        assert!(!config.output.standalone);
        assert_eq!(config.output.title, "Document");
    }

    #[test]
    fn test_parse_minimal_config() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve(Path::new("/project"));
        assert_eq!(config.render_resolved, RenderConfig::default());
        assert_eq!(config.output.title, "Document");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[render]
mode = "paragraphs_trimmed"
error_markup = false
include_dir = "shared"

[diagnostics]
min_severity = "soft_warning"

[highlight]
coalesce = false

[output]
standalone = true
title = "Notes"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve(Path::new("/project"));

        assert_eq!(
            config.render_resolved,
            RenderConfig {
                mode: HtmlMode::ParagraphsTrimmed,
                error_markup: false,
                include_dir: Some(PathBuf::from("/project/shared")),
            }
        );
        assert_eq!(config.diagnostics.min_severity, Severity::SoftWarning);
        assert!(!config.highlight.coalesce);
        assert!(config.output.standalone);
        assert_eq!(config.output.title, "Notes");
    }

    #[test]
    fn test_parse_unknown_mode_fails() {
        let toml = r#"
[render]
mode = "fancy"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_absolute_include_dir() {
        let toml = r#"
[render]
include_dir = "/srv/snippets"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve(Path::new("/project"));
        assert_eq!(
            config.render_resolved.include_dir,
            Some(PathBuf::from("/srv/snippets"))
        );
    }

    #[test]
    fn test_apply_cli_settings_mode() {
        let mut config = Config::default();

        let overrides = CliSettings {
            mode: Some(HtmlMode::Direct),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.render_resolved.mode, HtmlMode::Direct);
        assert!(config.render_resolved.error_markup); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_multiple() {
        let mut config = Config::default();

        let overrides = CliSettings {
            mode: Some(HtmlMode::Trimmed),
            min_severity: Some(Severity::Error),
            standalone: Some(true),
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.render_resolved.mode, HtmlMode::Trimmed);
        assert_eq!(config.diagnostics.min_severity, Severity::Error);
        assert!(config.output.standalone);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.render_resolved, RenderConfig::default());
        assert!(!config.output.standalone);
    }

    #[test]
    fn test_expand_env_vars_title_and_include_dir() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("QUILL_TEST_TITLE", "Handbook");
            std::env::set_var("QUILL_TEST_SNIPPETS", "/srv/snippets");
        }

        let toml = r#"
[render]
include_dir = "${QUILL_TEST_SNIPPETS}"

[output]
title = "${QUILL_TEST_TITLE}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        config.resolve(Path::new("/project"));

        assert_eq!(config.output.title, "Handbook");
        assert_eq!(
            config.render_resolved.include_dir,
            Some(PathBuf::from("/srv/snippets"))
        );

        unsafe {
            std::env::remove_var("QUILL_TEST_TITLE");
            std::env::remove_var("QUILL_TEST_SNIPPETS");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("QUILL_MISSING_TITLE_TEST");
        }

        let toml = r#"
[output]
title = "${QUILL_MISSING_TITLE_TEST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("QUILL_MISSING_TITLE_TEST"));
        assert!(err.to_string().contains("output.title"));
    }

    #[test]
    fn test_expand_env_default_and_embedded() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("QUILL_TEST_ROOT", "/srv");
            std::env::remove_var("QUILL_TEST_UNSET_SUBDIR");
        }

        let result = expand_env(
            "${QUILL_TEST_ROOT}/${QUILL_TEST_UNSET_SUBDIR:-snippets}",
            "render.include_dir",
        );
        assert_eq!(result.unwrap(), "/srv/snippets");

        unsafe {
            std::env::remove_var("QUILL_TEST_ROOT");
        }
    }

    #[test]
    fn test_expand_env_bare_dollar_is_literal() {
        assert_eq!(
            expand_env("Costs in $USD", "output.title").unwrap(),
            "Costs in $USD"
        );
    }

    #[test]
    fn test_expand_env_vars_absent_include_dir_stays_absent() {
        let mut config: Config = toml::from_str("[output]\ntitle = \"Plain\"\n").unwrap();
        config.expand_env_vars().unwrap();
        assert_eq!(config.render.include_dir, None);
        assert_eq!(config.output.title, "Plain");
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_standalone_requires_title() {
        let mut config = Config::default();
        config.output.standalone = true;
        config.output.title = "  ".to_owned();

        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        assert!(err.to_string().contains("output.title cannot be empty"));
    }

    #[test]
    fn test_validate_empty_title_allowed_when_not_standalone() {
        let mut config = Config::default();
        config.output.title = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_explicit_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[render]
mode = "direct"
include_dir = "snippets"
"#,
        )
        .unwrap();

        let config = Config::load(Some(path.as_path()), None).unwrap();

        assert_eq!(config.render_resolved.mode, HtmlMode::Direct);
        assert_eq!(
            config.render_resolved.include_dir,
            Some(temp_dir.path().join("snippets"))
        );
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_cli_settings_take_precedence() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[render]\nmode = \"direct\"\n").unwrap();

        let settings = CliSettings {
            mode: Some(HtmlMode::Paragraphs),
            ..Default::default()
        };
        let config = Config::load(Some(path.as_path()), Some(&settings)).unwrap();

        assert_eq!(config.render_resolved.mode, HtmlMode::Paragraphs);
    }

    #[test]
    fn test_load_cli_standalone_with_empty_title_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[output]\ntitle = \"\"\n").unwrap();

        let settings = CliSettings {
            standalone: Some(true),
            ..Default::default()
        };
        let result = Config::load(Some(path.as_path()), Some(&settings));

        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("missing.toml");

        let err = Config::load(Some(path.as_path()), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[render\nmode = ").unwrap();

        let err = Config::load(Some(path.as_path()), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
