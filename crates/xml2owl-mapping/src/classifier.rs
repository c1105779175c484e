//! Failure classification
//!
//! Every failure raised during a run is sorted into a category with a
//! fixed label and a severity. Fatal failures abort the run; warnings are
//! reported and the run goes on.

use crate::error::MappingFailure;
use serde::Serialize;
use std::fmt;

/// Category label and message of a classified failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: String,
    pub message: String,
}

impl Diagnostic {
    /// `<tag> <category>: <message>`
    pub fn line(&self, tag: &str) -> String {
        format!("{} {}: {}", tag, self.category, self.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "severity", content = "diagnostic", rename_all = "lowercase")]
pub enum Classification {
    Fatal(Diagnostic),
    Warning(Diagnostic),
}

impl Classification {
    pub fn diagnostic(&self) -> &Diagnostic {
        match self {
            Classification::Fatal(diagnostic) | Classification::Warning(diagnostic) => diagnostic,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Classification::Fatal(_))
    }
}

pub const EVALUATION_CATEGORY: &str = "XPath exception";
pub const ONTOLOGY_CATEGORY: &str = "OWL exception";
pub const MAPPING_CATEGORY: &str = "XML2OWL mapping exception";
pub const WARNING_CATEGORY: &str = "XML2OWL mapping warning";

pub fn classify(failure: &MappingFailure) -> Classification {
    let message = failure.to_string();
    match failure {
        MappingFailure::Evaluation(_) => Classification::Fatal(diagnostic(EVALUATION_CATEGORY, message)),
        MappingFailure::Ontology(_) | MappingFailure::Reasoner(_) => {
            Classification::Fatal(diagnostic(ONTOLOGY_CATEGORY, message))
        }
        MappingFailure::Mapping(exception) if exception.lethal => {
            Classification::Fatal(diagnostic(MAPPING_CATEGORY, message))
        }
        MappingFailure::Mapping(_) => Classification::Warning(diagnostic(WARNING_CATEGORY, message)),
        MappingFailure::Unrecognised { type_name, .. } => Classification::Fatal(diagnostic(
            format!("Unrecognised exception of type {} ", type_name),
            message,
        )),
    }
}

fn diagnostic<C: Into<String>>(category: C, message: String) -> Diagnostic {
    Diagnostic {
        category: category.into(),
        message,
    }
}
