//! Configuration management for pkgdoc.
//!
//! Parses `.pkgdoc.toml` files with serde and discovers them in the current
//! directory or its parents. Command-line settings override file values via
//! [`CliSettings`].

use crate::format::FORMAT_NAMES;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = ".pkgdoc.toml";

/// Values given on the command line. Only `Some` values override the file.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub format: Option<String>,
    pub output: Option<String>,
    pub include_unexported: Option<bool>,
    pub sort: Option<bool>,
    pub header: Option<String>,
    pub header_file: Option<PathBuf>,
    pub footer: Option<String>,
    pub footer_file: Option<PathBuf>,
    pub repository_url: Option<String>,
    pub repository_default_branch: Option<String>,
    pub repository_path: Option<String>,
}

/// Application configuration.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Markdown dialect name.
    pub format: String,
    /// Output path template; stdout when unset.
    pub output: Option<String>,
    pub include_unexported: bool,
    pub sort: bool,
    pub header: Option<String>,
    pub header_file: Option<PathBuf>,
    pub footer: Option<String>,
    pub footer_file: Option<PathBuf>,
    pub repository: RepositoryConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: "github".to_owned(),
            output: None,
            include_unexported: false,
            sort: false,
            header: None,
            header_file: None,
            footer: None,
            footer_file: None,
            repository: RepositoryConfig::default(),
            config_path: None,
        }
    }
}

/// Overrides for the discovered repository.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RepositoryConfig {
    pub url: Option<String>,
    pub default_branch: Option<String>,
    /// Work directory relative to the repository root.
    pub path: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from `config_path`, or from a discovered
    /// `.pkgdoc.toml`, or defaults; then apply CLI settings and validate.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir().ok().and_then(|d| discover_config(&d)) {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.header_file = config.header_file.map(|p| config_dir.join(p));
        config.footer_file = config.footer_file.map(|p| config_dir.join(p));
        config.config_path = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(format) = &settings.format {
            self.format.clone_from(format);
        }
        if let Some(output) = &settings.output {
            self.output = Some(output.clone());
        }
        if let Some(include) = settings.include_unexported {
            self.include_unexported = include;
        }
        if let Some(sort) = settings.sort {
            self.sort = sort;
        }
        // A header given on the command line replaces both header sources
        if settings.header.is_some() || settings.header_file.is_some() {
            self.header.clone_from(&settings.header);
            self.header_file.clone_from(&settings.header_file);
        }
        if settings.footer.is_some() || settings.footer_file.is_some() {
            self.footer.clone_from(&settings.footer);
            self.footer_file.clone_from(&settings.footer_file);
        }
        if let Some(url) = &settings.repository_url {
            self.repository.url = Some(url.clone());
        }
        if let Some(branch) = &settings.repository_default_branch {
            self.repository.default_branch = Some(branch.clone());
        }
        if let Some(path) = &settings.repository_path {
            self.repository.path = Some(path.clone());
        }
    }

    /// Check that values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !FORMAT_NAMES.contains(&self.format.as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown format `{}`, expected one of: {}",
                self.format,
                FORMAT_NAMES.join(", ")
            )));
        }
        if self.header.is_some() && self.header_file.is_some() {
            return Err(ConfigError::Validation(
                "header and header-file cannot both be set".into(),
            ));
        }
        if self.footer.is_some() && self.footer_file.is_some() {
            return Err(ConfigError::Validation(
                "footer and footer-file cannot both be set".into(),
            ));
        }
        Ok(())
    }

    /// Header text, read from `header-file` when that is set.
    pub fn header_text(&self) -> Result<Option<String>, ConfigError> {
        text_or_file(&self.header, &self.header_file)
    }

    /// Footer text, read from `footer-file` when that is set.
    pub fn footer_text(&self) -> Result<Option<String>, ConfigError> {
        text_or_file(&self.footer, &self.footer_file)
    }
}

fn text_or_file(text: &Option<String>, file: &Option<PathBuf>) -> Result<Option<String>, ConfigError> {
    match (text, file) {
        (Some(text), _) => Ok(Some(text.clone())),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map(Some)
            .map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            }),
        (None, None) => Ok(None),
    }
}

/// Search for the config file in `start` and its parents.
pub fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILENAME);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.format, "github");
        assert!(!config.sort);
        assert!(config.output.is_none());
    }

    #[test]
    fn load_file_values() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            dir.path(),
            r#"
format = "gitlab"
output = "${dir}/README.md"
include-unexported = true
header-file = "header.md"

[repository]
url = "https://gitlab.com/group/project"
default-branch = "trunk"
"#,
        );
        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.format, "gitlab");
        assert_eq!(config.output.as_deref(), Some("${dir}/README.md"));
        assert!(config.include_unexported);
        assert_eq!(config.header_file, Some(dir.path().join("header.md")));
        assert_eq!(config.repository.default_branch.as_deref(), Some("trunk"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn cli_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(dir.path(), "format = \"gitlab\"\nheader = \"from file\"\n");
        let cli = CliSettings {
            format: Some("plain".into()),
            header_file: Some(dir.path().join("h.md")),
            sort: Some(true),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&cli)).unwrap();
        assert_eq!(config.format, "plain");
        assert!(config.sort);
        assert_eq!(config.header, None);
        assert_eq!(config.header_file, Some(dir.path().join("h.md")));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/.pkgdoc.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(dir.path(), "colour = \"blue\"\n");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_format_is_a_validation_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(dir.path(), "format = \"docx\"\n");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(err.to_string().contains("unknown format `docx`"));
    }

    #[test]
    fn header_sources_are_exclusive() {
        let dir = TempDir::new().unwrap();
        let path = write_config(dir.path(), "header = \"a\"\nheader-file = \"b.md\"\n");
        assert!(matches!(
            Config::load(Some(&path), None),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn header_text_reads_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("header.md"), "# Generated\n").unwrap();
        let path = write_config(dir.path(), "header-file = \"header.md\"\n");
        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.header_text().unwrap().as_deref(), Some("# Generated\n"));
        assert_eq!(config.footer_text().unwrap(), None);
    }

    #[test]
    fn discovers_config_in_parent() {
        let dir = TempDir::new().unwrap();
        let path = write_config(dir.path(), "");
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(discover_config(&nested), Some(path));
    }
}
