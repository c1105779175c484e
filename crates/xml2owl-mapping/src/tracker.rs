//! Undoable record of the last run's ontology changes

use std::collections::BTreeSet;
use tracing::info;
use xml2owl_core::{Axiom, Ontology, OntologyError, OntologyManager};

/// Axioms added by the most recent run
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    last_changes: BTreeSet<Axiom>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the record with the changes of a newer run
    pub fn record(&mut self, changes: BTreeSet<Axiom>) {
        self.last_changes = changes;
    }

    pub fn last_changes(&self) -> &BTreeSet<Axiom> {
        &self.last_changes
    }

    pub fn is_empty(&self) -> bool {
        self.last_changes.is_empty()
    }

    /// Remove the recorded axioms from `ontology` and forget them.
    ///
    /// Returns how many axioms were present and removed. With nothing
    /// recorded this does nothing, whatever the state of `ontology`. When
    /// removal fails the record is kept.
    pub fn undo(&mut self, manager: &mut OntologyManager, ontology: &mut Ontology) -> Result<usize, OntologyError> {
        if self.last_changes.is_empty() {
            return Ok(0);
        }
        let removed = manager.remove_axioms(ontology, self.last_changes.iter().cloned())?;
        info!(recorded = self.last_changes.len(), removed = removed.len(), "mapping changes undone");
        self.last_changes.clear();
        Ok(removed.len())
    }
}
