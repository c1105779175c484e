//! Mapping failures and the unified mapping error

use thiserror::Error;
use xml2owl_core::OntologyError;
use xml2owl_reasoner::ReasonerError;
use xml2owl_xpath::PathError;

/// Domain-level problem raised while interpreting a rule.
///
/// The raiser decides whether the run can go on: a lethal exception
/// aborts the mapping, a non-lethal one is reported as a warning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct MappingException {
    pub message: String,
    pub lethal: bool,
}

impl MappingException {
    pub fn lethal<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            lethal: true,
        }
    }

    pub fn warning<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            lethal: false,
        }
    }
}

/// Any failure surfaced while a mapping run is in progress
#[derive(Error, Debug)]
pub enum MappingFailure {
    #[error(transparent)]
    Evaluation(#[from] PathError),

    #[error(transparent)]
    Ontology(#[from] OntologyError),

    #[error(transparent)]
    Reasoner(#[from] ReasonerError),

    #[error(transparent)]
    Mapping(#[from] MappingException),

    #[error("{error}")]
    Unrecognised {
        type_name: &'static str,
        error: anyhow::Error,
    },
}

impl MappingFailure {
    /// Wrap an error type the classifier has no category for
    pub fn unrecognised<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        MappingFailure::Unrecognised {
            type_name: std::any::type_name::<E>(),
            error: anyhow::Error::new(error),
        }
    }
}

/// The single error a failed mapping run reports to its caller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct MapError {
    /// Diagnostic line of the failure that aborted the run
    pub message: String,
    /// Tag name of the rule being applied when the run aborted, if any
    pub rule: Option<String>,
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
