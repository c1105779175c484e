//! # xml2owl Core
//!
//! OWL axiom model and the in-memory ontology store used by the xml2owl
//! mapping pipeline. Ontologies are only mutated through an
//! [`OntologyManager`], which reports every effective change to its
//! subscribed listeners.

pub mod model;
pub mod store;

pub use model::*;
pub use store::*;

use thiserror::Error;

/// Ontology store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OntologyError {
    #[error("Ontology {ontology} is read-only")]
    ReadOnly { ontology: String },

    #[error("SWRL rule is not DL-safe: {rule}")]
    UnsafeRule { rule: String },
}
