use std::collections::HashSet;
use std::path::Path;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;

/// Discovery configuration: independent watch sections.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DiscoveryConfig {
    pub sections: Vec<SectionConfig>,
}

/// One independently configured watch context with its own event stream.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SectionConfig {
    /// Section name, part of every sync key the section produces
    pub name: String,
    /// Namespaces to watch; empty means the whole cluster
    #[serde(default)]
    pub namespaces: Vec<String>,
    #[serde(default)]
    pub selectors: Selectors,
}

/// Server-side pod filters.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Selectors {
    /// Label selector, e.g. `app=web,tier!=cache`
    pub label: Option<String>,
    /// Field selector, e.g. `spec.nodeName=node-1`
    pub field: Option<String>,
}

impl DiscoveryConfig {
    /// Load and validate the section file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read section file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("invalid section file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("failed to parse sections")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.sections.is_empty() {
            bail!("at least one discovery section is required");
        }
        let mut names = HashSet::new();
        for section in &self.sections {
            if section.name.is_empty() {
                bail!("discovery section name must not be empty");
            }
            if !names.insert(section.name.as_str()) {
                bail!("duplicate discovery section name: {}", section.name);
            }
        }
        Ok(())
    }
}
