//! Mapping parameters read from the rule document root

use serde::{Deserialize, Serialize};
use xml2owl_xpath::{PathError, PathEvaluator};

/// Parameters every rule applier receives
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingParameters {
    pub query_language: String,
    pub expression_language: String,
    pub strict: bool,
}

impl MappingParameters {
    /// Read `@queryLanguage`, `@expressionLanguage` and `@strict` from the
    /// rule root. Missing attributes become empty strings and `false`.
    pub fn extract<E: PathEvaluator + ?Sized>(evaluator: &E, rules: roxmltree::Node<'_, '_>) -> Result<Self, PathError> {
        Ok(Self {
            query_language: evaluator.find_string(rules, "@queryLanguage")?,
            expression_language: evaluator.find_string(rules, "@expressionLanguage")?,
            strict: parse_flag(&evaluator.find_string(rules, "@strict")?),
        })
    }
}

/// Only the exact text `true` is true
pub fn parse_flag(value: &str) -> bool {
    value == "true"
}
