//! Front-end settings, loaded from YAML or JSON.
//!
//! ```yaml
//! tab_width: 2
//! sentinel: throw
//! max_diagnostics: 50
//! extensions: [wckt, wk]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, SentinelMode};
use crate::source::DEFAULT_TAB_WIDTH;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrontendConfig {
    /// Columns a tab expands to in caret excerpts.
    pub tab_width: usize,
    pub sentinel: SentinelMode,
    /// Diagnostics beyond this many per run are counted but not kept.
    pub max_diagnostics: Option<usize>,
    /// File extensions `check` picks up when walking directories.
    pub extensions: Vec<String>,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            sentinel: SentinelMode::Collect,
            max_diagnostics: None,
            extensions: vec![String::from("wckt")],
        }
    }
}

impl FrontendConfig {
    /// Reads a `.yaml`, `.yml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self, Diagnostic> {
        let text = fs::read_to_string(path).map_err(|e| {
            Diagnostic::config(format!("cannot read config '{}': {e}", path.display()))
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml(&text),
            "json" => Self::from_json(&text),
            other => Err(Diagnostic::config(format!(
                "unsupported config format '{other}'"
            ))
            .with_help("use a .yaml, .yml or .json file")),
        }
        .map_err(|d| d.within(format!("while loading {}", path.display())))?;

        log::debug!("loaded config from {}: {config:?}", path.display());
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, Diagnostic> {
        let config: Self = serde_yaml::from_str(text)
            .map_err(|e| Diagnostic::config(format!("invalid config: {e}")))?;
        config.validated()
    }

    pub fn from_json(text: &str) -> Result<Self, Diagnostic> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| Diagnostic::config(format!("invalid config: {e}")))?;
        config.validated()
    }

    fn validated(self) -> Result<Self, Diagnostic> {
        if self.tab_width == 0 {
            return Err(Diagnostic::config("tab_width must be at least 1"));
        }
        Ok(self)
    }

    /// Whether `path` has one of the configured extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = FrontendConfig::from_yaml("tab_width: 2\n").unwrap();
        assert_eq!(config.tab_width, 2);
        assert_eq!(config.sentinel, SentinelMode::Collect);
        assert_eq!(config.extensions, vec![String::from("wckt")]);
    }

    #[test]
    fn json_and_yaml_agree() {
        let yaml = FrontendConfig::from_yaml("sentinel: throw\nmax_diagnostics: 3\n").unwrap();
        let json = FrontendConfig::from_json(r#"{"sentinel": "throw", "max_diagnostics": 3}"#).unwrap();
        assert_eq!(yaml, json);
        assert_eq!(json.sentinel, SentinelMode::Throw);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(FrontendConfig::from_yaml("tab_width: 0\n").is_err());
        let unknown = FrontendConfig::from_json(r#"{"colour": true}"#).unwrap_err();
        assert!(unknown.message().starts_with("invalid config"));
        let missing = FrontendConfig::load(Path::new("no/such/config.yaml")).unwrap_err();
        assert!(missing.message().contains("cannot read config"));
    }

    #[test]
    fn extension_filter() {
        let config = FrontendConfig::default();
        assert!(config.accepts(&PathBuf::from("src/main.wckt")));
        assert!(!config.accepts(&PathBuf::from("README.md")));
        assert!(!config.accepts(&PathBuf::from("wckt")));
    }
}
