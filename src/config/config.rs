//! Binder settings loaded from TOML or JSON files.

use crate::binding::error::{BindError, BindResult};
use crate::binding::lexer::LexPolicy;
use crate::binding::options::BinderOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File form of [`BinderOptions`]
///
/// Every key is optional; missing keys take the binder defaults.
///
/// ```toml
/// verbose = true
/// collect_extra = true
/// lex_policy = "strict"
/// cl_args = "--y=1 --k hello"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    /// See [`BinderOptions::verbose`]
    pub verbose: bool,
    /// See [`BinderOptions::collect_extra`]
    pub collect_extra: bool,
    /// See [`BinderOptions::strict`]
    pub strict: bool,
    /// `"lenient"` or `"strict"`
    pub lex_policy: LexPolicy,
    /// See [`BinderOptions::allow_abbrev`]
    pub allow_abbrev: bool,
    /// See [`BinderOptions::dash_aliases`]
    pub dash_aliases: bool,
    /// Program name for usage text
    pub prog: Option<String>,
    /// Help banner
    pub about: Option<String>,
    /// Tokens used instead of the process arguments
    pub cl_args: Option<String>,
}

impl Default for BinderConfig {
    fn default() -> Self {
        BinderOptions::default().into()
    }
}

impl BinderConfig {
    /// Load config from TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> BindResult<Self> {
        let content = read(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| BindError::config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load config from JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> BindResult<Self> {
        let content = read(path.as_ref())?;
        serde_json::from_str(&content)
            .map_err(|e| BindError::config(format!("Failed to parse JSON: {}", e)))
    }

    /// Auto-detect format and load config
    pub fn from_file(path: impl AsRef<Path>) -> BindResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            // Try TOML first as default
            _ => Self::from_toml_file(path).or_else(|_| Self::from_json_file(path)),
        }
    }

    /// Convert into binder options, rejecting contradictory flags
    pub fn into_options(self) -> BindResult<BinderOptions> {
        let options = BinderOptions::from(self);
        options.validate()?;
        Ok(options)
    }
}

fn read(path: &Path) -> BindResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        BindError::config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })
}

impl From<BinderConfig> for BinderOptions {
    fn from(config: BinderConfig) -> Self {
        Self {
            verbose: config.verbose,
            collect_extra: config.collect_extra,
            strict: config.strict,
            lex_policy: config.lex_policy,
            allow_abbrev: config.allow_abbrev,
            dash_aliases: config.dash_aliases,
            prog: config.prog,
            about: config.about,
            cl_args: config.cl_args,
        }
    }
}

impl From<BinderOptions> for BinderConfig {
    fn from(options: BinderOptions) -> Self {
        Self {
            verbose: options.verbose,
            collect_extra: options.collect_extra,
            strict: options.strict,
            lex_policy: options.lex_policy,
            allow_abbrev: options.allow_abbrev,
            dash_aliases: options.dash_aliases,
            prog: options.prog,
            about: options.about,
            cl_args: options.cl_args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: BinderConfig = toml::from_str("verbose = true").unwrap();
        assert!(config.verbose);
        assert!(config.allow_abbrev);
        assert!(config.dash_aliases);
        assert_eq!(config.lex_policy, LexPolicy::Lenient);
    }

    #[test]
    fn test_from_toml_file() {
        let file = temp_file(
            ".toml",
            r#"
                collect_extra = true
                lex_policy = "strict"
                cl_args = "--y=1 --k hello"
            "#,
        );

        let config = BinderConfig::from_file(file.path()).unwrap();
        assert!(config.collect_extra);
        assert_eq!(config.lex_policy, LexPolicy::Strict);

        let options = config.into_options().unwrap();
        assert_eq!(options.tokens(), vec!["--y=1", "--k", "hello"]);
    }

    #[test]
    fn test_from_json_file() {
        let file = temp_file(".json", r#"{"strict": true, "allow_abbrev": false}"#);

        let config = BinderConfig::from_file(file.path()).unwrap();
        assert!(config.strict);
        assert!(!config.allow_abbrev);
    }

    #[test]
    fn test_unknown_extension_falls_back_to_json() {
        let file = temp_file(".conf", r#"{"verbose": true}"#);
        assert!(BinderConfig::from_file(file.path()).unwrap().verbose);
    }

    #[test]
    fn test_missing_file() {
        let result = BinderConfig::from_toml_file("/nonexistent/clify.toml");
        assert!(matches!(result, Err(BindError::Configuration(_))));
    }

    #[test]
    fn test_contradictory_flags_rejected() {
        let config = BinderConfig {
            collect_extra: true,
            strict: true,
            ..BinderConfig::default()
        };
        assert!(matches!(config.into_options(), Err(BindError::Configuration(_))));
    }
}
