use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::syntax::LanguageSpec;
use crate::theme::Theme;

const CONFIG_FILE: &str = "vertex.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Everything injectable at startup: the color theme and the scripting
/// dialect the classifier highlights.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,
    pub language: LanguageConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    pub keywords: Vec<String>,
    pub line_comment: String,
    pub quotes: Vec<char>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        let keywords = [
            "local", "function", "end", "if", "then", "else", "elseif", "while", "do", "for",
            "in", "return", "not", "and", "or", "nil", "true", "false", "print",
        ];
        Self {
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            line_comment: "--".into(),
            quotes: vec!['"', '\''],
        }
    }
}

impl LanguageConfig {
    pub fn to_spec(&self) -> LanguageSpec {
        LanguageSpec::new(
            self.keywords.iter().cloned(),
            self.line_comment.clone(),
            self.quotes.clone(),
        )
    }
}

impl Config {
    /// Load `vertex.toml` from the working directory, falling back to the
    /// user config directory. A missing file is not an error: defaults apply.
    pub fn load() -> Result<Self, ConfigError> {
        for path in candidate_paths() {
            if path.is_file() {
                return Self::from_path(&path);
            }
        }
        Ok(Self::default())
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("vertex").join(CONFIG_FILE));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Lexer, TokenKind};

    #[test]
    fn default_language_is_the_lua_dialect() {
        let config = Config::default();
        let spec = config.language.to_spec();
        assert!(spec.is_keyword("local"));
        assert!(spec.is_keyword("print"));
        assert!(!spec.is_keyword("endpoint"));
        assert_eq!(spec.line_comment(), "--");
    }

    #[test]
    fn toml_overrides_merge_with_defaults() {
        let raw = r#"
            [theme]
            keyword = [255, 0, 0]

            [language]
            keywords = ["fn", "let"]
            line_comment = "//"
            quotes = ["\""]
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.theme.keyword.0, [255, 0, 0]);
        // Untouched keys keep their defaults.
        assert_eq!(config.theme.text.0, [220, 220, 220]);

        let lexer = Lexer::new(config.language.to_spec());
        let tokens = lexer.classify_line("let x = 1 // hi", 0);
        assert!(tokens
            .iter()
            .any(|t| t.kind == TokenKind::Keyword));
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Comment);
    }

    #[test]
    fn empty_config_file_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.language.keywords.len(), 19);
    }
}
