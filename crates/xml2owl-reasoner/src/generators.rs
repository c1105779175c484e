//! Inferred axiom generators
//!
//! Each generator reads realised entailments from a [`Reasoner`] and
//! produces the axioms that would make them explicit.

use crate::Reasoner;
use std::collections::BTreeSet;
use tracing::debug;
use xml2owl_core::{Axiom, Ontology, OntologyError, OntologyManager};

/// Produces axioms for one category of entailment
pub trait InferredAxiomGenerator {
    fn label(&self) -> &'static str;

    fn create_axioms(&self, reasoner: &dyn Reasoner) -> BTreeSet<Axiom>;
}

/// `SubClassOf` axioms for every inferred superclass
#[derive(Debug, Clone, Copy, Default)]
pub struct InferredSubClassAxiomGenerator;

impl InferredAxiomGenerator for InferredSubClassAxiomGenerator {
    fn label(&self) -> &'static str {
        "Subclasses"
    }

    fn create_axioms(&self, reasoner: &dyn Reasoner) -> BTreeSet<Axiom> {
        reasoner
            .classes()
            .into_iter()
            .flat_map(|class| {
                reasoner
                    .superclasses(&class)
                    .into_iter()
                    .map(move |sup| Axiom::SubClassOf(class.clone(), sup))
            })
            .collect()
    }
}

/// `ClassAssertion` axioms for every inferred individual type
#[derive(Debug, Clone, Copy, Default)]
pub struct InferredClassAssertionAxiomGenerator;

impl InferredAxiomGenerator for InferredClassAssertionAxiomGenerator {
    fn label(&self) -> &'static str {
        "Class assertions"
    }

    fn create_axioms(&self, reasoner: &dyn Reasoner) -> BTreeSet<Axiom> {
        reasoner
            .individuals()
            .into_iter()
            .flat_map(|individual| {
                reasoner
                    .types(&individual)
                    .into_iter()
                    .map(move |class| Axiom::ClassAssertion(class, individual.clone()))
            })
            .collect()
    }
}

/// `ObjectPropertyAssertion` axioms, including SWRL consequences
#[derive(Debug, Clone, Copy, Default)]
pub struct InferredObjectPropertyAxiomGenerator;

impl InferredAxiomGenerator for InferredObjectPropertyAxiomGenerator {
    fn label(&self) -> &'static str {
        "Object property assertions"
    }

    fn create_axioms(&self, reasoner: &dyn Reasoner) -> BTreeSet<Axiom> {
        let mut axioms = BTreeSet::new();
        for property in reasoner.object_properties() {
            for subject in reasoner.individuals() {
                for object in reasoner.object_property_values(&property, &subject) {
                    axioms.insert(Axiom::ObjectPropertyAssertion(property.clone(), subject.clone(), object));
                }
            }
        }
        axioms
    }
}

/// Runs a list of generators and materialises their output
pub struct InferredOntologyGenerator {
    generators: Vec<Box<dyn InferredAxiomGenerator>>,
}

impl InferredOntologyGenerator {
    pub fn new(generators: Vec<Box<dyn InferredAxiomGenerator>>) -> Self {
        Self { generators }
    }

    pub fn generators(&self) -> &[Box<dyn InferredAxiomGenerator>] {
        &self.generators
    }

    pub fn add_generator(&mut self, generator: Box<dyn InferredAxiomGenerator>) {
        self.generators.push(generator);
    }

    /// Union of every generator's output
    pub fn infer(&self, reasoner: &dyn Reasoner) -> BTreeSet<Axiom> {
        let mut inferred = BTreeSet::new();
        for generator in &self.generators {
            let axioms = generator.create_axioms(reasoner);
            debug!(generator = generator.label(), axioms = axioms.len(), "inferred axioms generated");
            inferred.extend(axioms);
        }
        inferred
    }

    /// Add every inferred axiom to `ontology`, returning those that were new.
    ///
    /// `reasoner` must not be subscribed to `manager` through a handle that
    /// is borrowed here; use [`InferredOntologyGenerator::infer`] first in
    /// that case.
    pub fn fill_ontology(
        &self,
        manager: &mut OntologyManager,
        ontology: &mut Ontology,
        reasoner: &dyn Reasoner,
    ) -> Result<Vec<Axiom>, OntologyError> {
        let inferred = self.infer(reasoner);
        manager.add_axioms(ontology, inferred)
    }
}

impl Default for InferredOntologyGenerator {
    fn default() -> Self {
        Self::new(vec![
            Box::new(InferredSubClassAxiomGenerator),
            Box::new(InferredClassAssertionAxiomGenerator),
            Box::new(InferredObjectPropertyAxiomGenerator),
        ])
    }
}
