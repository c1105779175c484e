//! # xml2owl Reasoner
//!
//! Reasoner interface used by the mapping pipeline, a structural
//! reasoner that tracks ontology edits through change notifications, and
//! the generators that turn realised entailments back into axioms.

pub mod generators;
pub mod structural;

pub use generators::*;
pub use structural::StructuralReasoner;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use xml2owl_core::{Class, Individual, ObjectProperty, Ontology, OntologyChange};

/// Reasoning errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReasonerError {
    #[error("Reasoner has not been prepared")]
    NotPrepared,

    #[error("Ontology is inconsistent: {individual} is an instance of disjoint classes {classes}")]
    Inconsistent { individual: String, classes: String },

    #[error("Realisation did not reach a fixpoint within {0} iterations")]
    IterationLimit(usize),
}

/// Reasoner settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonerConfig {
    /// Upper bound on forward-chaining rounds during realisation
    pub max_iterations: usize,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self { max_iterations: 64 }
    }
}

/// A reasoner that follows ontology edits as they happen and can be
/// asked to realise the ontology.
pub trait Reasoner {
    fn name(&self) -> &'static str;

    /// Load the current state of `ontology`
    fn prepare(&mut self, ontology: &Ontology) -> Result<(), ReasonerError>;

    /// Apply one change notification from the ontology manager
    fn on_change(&mut self, change: &OntologyChange);

    /// Compute the class hierarchy, individual types and rule consequences
    fn realize(&mut self) -> Result<(), ReasonerError>;

    /// True when no change arrived since the last successful realisation
    fn is_realized(&self) -> bool;

    fn classes(&self) -> BTreeSet<Class>;

    /// Strict superclasses of `class`, excluding owl:Thing
    fn superclasses(&self, class: &Class) -> BTreeSet<Class>;

    fn individuals(&self) -> BTreeSet<Individual>;

    /// Asserted and inferred types of `individual`, excluding owl:Thing
    fn types(&self, individual: &Individual) -> BTreeSet<Class>;

    fn object_properties(&self) -> BTreeSet<ObjectProperty>;

    fn object_property_values(&self, property: &ObjectProperty, individual: &Individual) -> BTreeSet<Individual>;
}
