//! # Mapper Configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use xml2owl_reasoner::ReasonerConfig;

/// Namespace of rule document elements
pub const RULES_NAMESPACE: &str = "http://www.fri.uni-lj.si/xml2owl";

/// Tag that starts every progress line
pub const LOG_TAG: &str = "[XML2OWL]";

/// Mapper configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Default element namespace for rule document paths
    pub rules_namespace: String,

    /// Which rule document children are executed
    pub selection: RuleSelection,

    /// Prefix of every progress line
    pub log_tag: String,

    /// Remove the partial changes of an aborted run before reporting the error
    pub rollback_on_abort: bool,

    /// Realise and materialise inferences after the rules have run
    pub materialize: bool,

    /// Reasoner settings
    pub reasoner: ReasonerConfig,
}

/// Element names that make a rule document child executable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSelection {
    /// Prefix declaration rule
    pub prefix_node: String,

    /// Every element whose name starts with this marker is a mapping rule
    pub mapping_prefix: String,

    /// Individual collection rule
    pub collect_node: String,
}

impl RuleSelection {
    pub fn matches(&self, name: &str) -> bool {
        name == self.prefix_node || name.starts_with(&self.mapping_prefix) || name == self.collect_node
    }
}

impl Default for RuleSelection {
    fn default() -> Self {
        Self {
            prefix_node: "prefixIRI".to_string(),
            mapping_prefix: "mapTo".to_string(),
            collect_node: "collectOWLIndividuals".to_string(),
        }
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            rules_namespace: RULES_NAMESPACE.to_string(),
            selection: RuleSelection::default(),
            log_tag: LOG_TAG.to_string(),
            rollback_on_abort: false,
            materialize: true,
            reasoner: ReasonerConfig::default(),
        }
    }
}

impl MapperConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}
