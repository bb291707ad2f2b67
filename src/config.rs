// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::record::{Condition, TextField};

pub const SOURCE_ENV: &str = "POPDASH_SOURCE";
pub const OUTPUT_ENV: &str = "POPDASH_OUTPUT";

/// Run settings. Every field has a default, so an empty YAML file (or none
/// at all) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// URL or path of the registry export.
    pub source: String,
    /// Where the dashboard page is written.
    pub output: PathBuf,
    /// Optional JSON dump of the aggregations.
    pub aggregates_json: Option<PathBuf>,
    pub initial_condition: String,
    pub initial_location: String,
    pub echarts_url: String,
    pub title: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: "pop-situacao-de-rua-cadastros.csv".into(),
            output: PathBuf::from("dashboard.html"),
            aggregates_json: None,
            initial_condition: Condition::Hypertension.key().into(),
            initial_location: TextField::Municipality.key().into(),
            echarts_url: "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js".into(),
            title: "População em situação de rua".into(),
        }
    }
}

impl DashboardConfig {
    /// Read `path` if given, then apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => {
                let text =
                    fs::read_to_string(p).with_context(|| format!("reading config {:?}", p))?;
                Self::from_yaml(&text).with_context(|| format!("parsing config {:?}", p))?
            }
            None => Self::default(),
        };

        if let Ok(source) = env::var(SOURCE_ENV) {
            cfg.source = source;
        }
        if let Ok(output) = env::var(OUTPUT_ENV) {
            cfg.output = PathBuf::from(output);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.condition()?;
        self.location()?;
        anyhow::ensure!(!self.source.trim().is_empty(), "`source` must not be empty");
        Ok(())
    }

    pub fn condition(&self) -> Result<Condition> {
        self.initial_condition
            .parse()
            .context("invalid `initial_condition`")
    }

    pub fn location(&self) -> Result<TextField> {
        self.initial_location
            .parse()
            .context("invalid `initial_location`")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() -> Result<()> {
        let cfg = DashboardConfig::default();
        cfg.validate()?;
        assert_eq!(cfg.condition()?, Condition::Hypertension);
        assert_eq!(cfg.location()?, TextField::Municipality);
        Ok(())
    }

    #[test]
    fn yaml_overrides_only_given_fields() -> Result<()> {
        let cfg = DashboardConfig::from_yaml(
            "source: https://example.org/cadastros.csv\ninitial_location: regiao\naggregates_json: out/aggs.json\n",
        )?;
        assert_eq!(cfg.source, "https://example.org/cadastros.csv");
        assert_eq!(cfg.location()?, TextField::Region);
        assert_eq!(cfg.aggregates_json, Some(PathBuf::from("out/aggs.json")));
        assert_eq!(cfg.output, PathBuf::from("dashboard.html"));
        assert_eq!(cfg.condition()?, Condition::Hypertension);
        Ok(())
    }

    #[test]
    fn empty_yaml_is_default() -> Result<()> {
        assert_eq!(DashboardConfig::from_yaml("  \n")?, DashboardConfig::default());
        Ok(())
    }

    #[test]
    fn invalid_selection_keys_are_rejected() {
        let cfg = DashboardConfig {
            initial_condition: "gripe".into(),
            ..DashboardConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = DashboardConfig {
            initial_location: "bairro".into(),
            ..DashboardConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_reads_file() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, "initial_condition: tuberculose")?;
        writeln!(tmp, "title: Painel")?;
        let cfg = DashboardConfig::load(Some(tmp.path()))?;
        assert_eq!(cfg.condition()?, Condition::Tuberculosis);
        assert_eq!(cfg.title, "Painel");
        Ok(())
    }
}
