//! Reference names declared anywhere in a rule document

use serde::{Deserialize, Serialize};
use xml2owl_xpath::{PathError, PathEvaluator};

/// Every `referenceName` attribute value in document order, duplicates
/// included
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceNameSet(Vec<String>);

impl ReferenceNameSet {
    pub fn collect<E: PathEvaluator + ?Sized>(evaluator: &E, rules: roxmltree::Node<'_, '_>) -> Result<Self, PathError> {
        let names = evaluator
            .find_items(rules, "//@referenceName")?
            .iter()
            .map(|item| item.string_value())
            .collect();
        Ok(Self(names))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for ReferenceNameSet {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}
