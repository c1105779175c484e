//! In-memory ontology and the manager that mutates it

use crate::model::{Axiom, AxiomKind, OwlIri};
use crate::OntologyError;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// In-memory OWL ontology, indexed by axiom kind
#[derive(Debug, Clone, Default)]
pub struct Ontology {
    /// Ontology IRI
    iri: Option<OwlIri>,
    /// Axioms grouped by kind
    by_kind: BTreeMap<AxiomKind, BTreeSet<Axiom>>,
    /// Total axiom count
    len: usize,
    /// Rejects every change when set
    read_only: bool,
}

impl Ontology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iri<I: Into<OwlIri>>(iri: I) -> Self {
        Self {
            iri: Some(iri.into()),
            ..Self::default()
        }
    }

    pub fn iri(&self) -> Option<&OwlIri> {
        self.iri.as_ref()
    }

    /// Display name used in diagnostics
    pub fn display_name(&self) -> &str {
        self.iri.as_ref().map(|iri| iri.as_str()).unwrap_or("<anonymous>")
    }

    pub fn contains(&self, axiom: &Axiom) -> bool {
        self.by_kind
            .get(&axiom.kind())
            .map(|set| set.contains(axiom))
            .unwrap_or(false)
    }

    /// All axioms, ordered by kind and then by value
    pub fn axioms(&self) -> impl Iterator<Item = &Axiom> + '_ {
        self.by_kind.values().flat_map(|set| set.iter())
    }

    pub fn axioms_of_kind(&self, kind: AxiomKind) -> impl Iterator<Item = &Axiom> + '_ {
        self.by_kind.get(&kind).into_iter().flat_map(|set| set.iter())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Snapshot of every axiom, for comparisons
    pub fn snapshot(&self) -> BTreeSet<Axiom> {
        self.axioms().cloned().collect()
    }

    fn insert(&mut self, axiom: Axiom) -> bool {
        let inserted = self.by_kind.entry(axiom.kind()).or_default().insert(axiom);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    fn remove(&mut self, axiom: &Axiom) -> bool {
        let kind = axiom.kind();
        let removed = match self.by_kind.get_mut(&kind) {
            Some(set) => set.remove(axiom),
            None => false,
        };
        if removed {
            self.len -= 1;
            if self.by_kind.get(&kind).map(|set| set.is_empty()).unwrap_or(false) {
                self.by_kind.remove(&kind);
            }
        }
        removed
    }
}

/// Effective change applied to an ontology
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OntologyChange {
    AxiomAdded(Axiom),
    AxiomRemoved(Axiom),
}

impl OntologyChange {
    pub fn axiom(&self) -> &Axiom {
        match self {
            OntologyChange::AxiomAdded(axiom) | OntologyChange::AxiomRemoved(axiom) => axiom,
        }
    }
}

/// Handle returned by [`OntologyManager::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type ChangeListener = Box<dyn FnMut(&OntologyChange)>;

/// Applies changes to ontologies and notifies subscribed listeners of
/// every change that actually altered an ontology.
#[derive(Default)]
pub struct OntologyManager {
    listeners: Vec<(SubscriptionId, ChangeListener)>,
    next_subscription: u64,
}

impl OntologyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a change listener until [`OntologyManager::unsubscribe`] is called
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&OntologyChange) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        debug!(subscription = id.0, "ontology change listener subscribed");
        id
    }

    /// Remove a listener. Returns false when the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        let removed = self.listeners.len() != before;
        if removed {
            debug!(subscription = id.0, "ontology change listener unsubscribed");
        }
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn add_axiom(&mut self, ontology: &mut Ontology, axiom: Axiom) -> Result<bool, OntologyError> {
        Ok(!self.add_axioms(ontology, std::iter::once(axiom))?.is_empty())
    }

    /// Add axioms, returning those that were not already present.
    ///
    /// The batch is validated before anything is inserted, so a rejected
    /// batch leaves the ontology untouched.
    pub fn add_axioms<I>(&mut self, ontology: &mut Ontology, axioms: I) -> Result<Vec<Axiom>, OntologyError>
    where
        I: IntoIterator<Item = Axiom>,
    {
        Self::check_writable(ontology)?;
        let axioms: Vec<Axiom> = axioms.into_iter().collect();
        for axiom in &axioms {
            if let Axiom::SwrlRule(rule) = axiom {
                if !rule.is_safe() {
                    return Err(OntologyError::UnsafeRule {
                        rule: rule.to_string(),
                    });
                }
            }
        }

        let mut added = Vec::new();
        for axiom in axioms {
            if ontology.insert(axiom.clone()) {
                self.notify(&OntologyChange::AxiomAdded(axiom.clone()));
                added.push(axiom);
            }
        }
        debug!(ontology = ontology.display_name(), added = added.len(), "axioms added");
        Ok(added)
    }

    /// Remove axioms, returning those that were present. Absent axioms are ignored.
    pub fn remove_axioms<I>(&mut self, ontology: &mut Ontology, axioms: I) -> Result<Vec<Axiom>, OntologyError>
    where
        I: IntoIterator<Item = Axiom>,
    {
        Self::check_writable(ontology)?;
        let mut removed = Vec::new();
        for axiom in axioms {
            if ontology.remove(&axiom) {
                self.notify(&OntologyChange::AxiomRemoved(axiom.clone()));
                removed.push(axiom);
            }
        }
        debug!(ontology = ontology.display_name(), removed = removed.len(), "axioms removed");
        Ok(removed)
    }

    fn check_writable(ontology: &Ontology) -> Result<(), OntologyError> {
        if ontology.is_read_only() {
            return Err(OntologyError::ReadOnly {
                ontology: ontology.display_name().to_string(),
            });
        }
        Ok(())
    }

    fn notify(&mut self, change: &OntologyChange) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(change);
        }
    }
}

impl std::fmt::Debug for OntologyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OntologyManager")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
