use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use super::data::ListStyle;

/// Options recognized by the list block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListConfig {
    /// Style used when the block is created without data.
    pub default_style: ListStyle,
    /// Deepest nesting level an item may be indented to. `None` is unbounded.
    pub max_level: Option<usize>,
    /// Numbering base for new ordered lists.
    pub start: Option<u32>,
}

impl ListConfig {
    pub fn with_default_style(mut self, style: ListStyle) -> Self {
        self.default_style = style;
        self
    }

    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = Some(max_level);
        self
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: ListConfig = toml::from_str(source).context("invalid list configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&source).with_context(|| format!("in {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        if self.max_level == Some(0) {
            bail!("maxLevel must be a positive integer");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ListConfig::from_toml_str("").unwrap();
        assert_eq!(config, ListConfig::default());
        assert_eq!(config.default_style, ListStyle::Unordered);
        assert_eq!(config.max_level, None);
    }

    #[test]
    fn reads_camel_case_options() {
        let config = ListConfig::from_toml_str(
            "defaultStyle = \"checklist\"\nmaxLevel = 3\nstart = 5\n",
        )
        .unwrap();
        assert_eq!(config.default_style, ListStyle::Checklist);
        assert_eq!(config.max_level, Some(3));
        assert_eq!(config.start, Some(5));
    }

    #[test]
    fn rejects_zero_max_level() {
        assert!(ListConfig::from_toml_str("maxLevel = 0").is_err());
    }

    #[test]
    fn rejects_unknown_style() {
        assert!(ListConfig::from_toml_str("defaultStyle = \"fancy\"").is_err());
    }
}
