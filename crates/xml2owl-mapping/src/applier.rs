//! Rule applier interface and the reasoning session it works against

use crate::context::{EvaluationContext, NamespaceBinding};
use crate::error::MappingFailure;
use crate::parameters::MappingParameters;
use crate::references::ReferenceNameSet;
use roxmltree::Node;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use xml2owl_core::{Axiom, Ontology, OntologyError, OntologyManager, SubscriptionId};
use xml2owl_reasoner::{InferredOntologyGenerator, Reasoner, ReasonerError};

/// Everything the setup phase learned from the rule document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingSetup {
    pub parameters: MappingParameters,
    pub reference_names: ReferenceNameSet,
    pub namespaces: Vec<NamespaceBinding>,
}

/// What a rule applier may touch while applying one rule
pub struct RuleScope<'s, 'a, 'input> {
    pub manager: &'s mut OntologyManager,
    pub ontology: &'s mut Ontology,
    pub reasoner: &'s ReasoningSession,
    pub context: &'s EvaluationContext,
    /// Document node of the data being mapped
    pub data: Node<'a, 'input>,
}

/// Interprets individual mapping rules.
///
/// One applier is created per run and sees the rules in document order.
pub trait RuleApplier {
    fn apply_rule(&mut self, rule: Node<'_, '_>, scope: &mut RuleScope<'_, '_, '_>) -> Result<(), MappingFailure>;

    /// Axioms this applier has added to the ontology so far
    fn changes_added(&self) -> BTreeSet<Axiom>;
}

/// Builds the rule applier for a run
pub trait RuleApplierFactory {
    fn create(&self, setup: &MappingSetup) -> Box<dyn RuleApplier>;
}

impl<F> RuleApplierFactory for F
where
    F: Fn(&MappingSetup) -> Box<dyn RuleApplier>,
{
    fn create(&self, setup: &MappingSetup) -> Box<dyn RuleApplier> {
        self(setup)
    }
}

/// Shared handle to the reasoner of a run.
///
/// The ontology manager holds a clone inside its change listener while the
/// session is attached, so the reasoner sees every edit made during the
/// run. Borrows taken through [`ReasoningSession::with`] must end before
/// the ontology is edited again.
#[derive(Clone)]
pub struct ReasoningSession {
    reasoner: Rc<RefCell<Box<dyn Reasoner>>>,
}

impl ReasoningSession {
    pub fn new(reasoner: Box<dyn Reasoner>) -> Self {
        Self {
            reasoner: Rc::new(RefCell::new(reasoner)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.reasoner.borrow().name()
    }

    pub fn prepare(&self, ontology: &Ontology) -> Result<(), ReasonerError> {
        self.reasoner.borrow_mut().prepare(ontology)
    }

    /// Subscribe the reasoner to `manager`'s change notifications
    pub fn attach(&self, manager: &mut OntologyManager) -> SubscriptionId {
        let reasoner = Rc::clone(&self.reasoner);
        manager.subscribe(move |change| reasoner.borrow_mut().on_change(change))
    }

    pub fn detach(&self, manager: &mut OntologyManager, subscription: SubscriptionId) -> bool {
        manager.unsubscribe(subscription)
    }

    pub fn realize(&self) -> Result<(), ReasonerError> {
        self.reasoner.borrow_mut().realize()
    }

    /// Run `f` against the reasoner
    pub fn with<R>(&self, f: impl FnOnce(&dyn Reasoner) -> R) -> R {
        let reasoner = self.reasoner.borrow();
        f(reasoner.as_ref())
    }

    /// Add the generator's inferences to `ontology`, returning the axioms
    /// that were not already present
    pub fn materialize(
        &self,
        generator: &InferredOntologyGenerator,
        manager: &mut OntologyManager,
        ontology: &mut Ontology,
    ) -> Result<Vec<Axiom>, OntologyError> {
        let inferred = self.with(|reasoner| generator.infer(reasoner));
        manager.add_axioms(ontology, inferred)
    }
}

impl std::fmt::Debug for ReasoningSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReasoningSession")
            .field("reasoner", &self.name())
            .finish()
    }
}
