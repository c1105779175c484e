//! Structural reasoner: hierarchy closure, typing and SWRL forward chaining

use crate::{Reasoner, ReasonerConfig, ReasonerError};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use tracing::{debug, info};
use xml2owl_core::{
    Axiom, Class, Entity, Individual, ObjectProperty, Ontology, OntologyChange, SwrlAtom, SwrlRule, SwrlTerm,
};

type Relation = (ObjectProperty, Individual, Individual);
type Bindings = HashMap<String, Individual>;

/// Derived fact produced during realisation
#[derive(Debug, Clone, PartialEq, Eq)]
enum Fact {
    Type(Individual, Class),
    Relation(Relation),
}

/// Reasoner that mirrors the ontology through change notifications and
/// realises it by closing the told hierarchies and chaining rules to a
/// fixpoint.
#[derive(Debug, Default)]
pub struct StructuralReasoner {
    config: ReasonerConfig,
    prepared: bool,
    realized: bool,
    /// Mirror of the ontology's axioms
    axioms: HashSet<Axiom>,
    /// Class -> all superclasses (reflexive when cyclic)
    class_hierarchy: HashMap<Class, BTreeSet<Class>>,
    classes: BTreeSet<Class>,
    properties: BTreeSet<ObjectProperty>,
    types: BTreeMap<Individual, BTreeSet<Class>>,
    relations: BTreeSet<Relation>,
}

/// Told knowledge extracted from the axiom mirror
#[derive(Default)]
struct Knowledge<'k> {
    classes: BTreeSet<Class>,
    properties: BTreeSet<ObjectProperty>,
    class_edges: HashMap<Class, BTreeSet<Class>>,
    property_edges: HashMap<ObjectProperty, BTreeSet<ObjectProperty>>,
    domains: Vec<(ObjectProperty, Class)>,
    ranges: Vec<(ObjectProperty, Class)>,
    disjoint: Vec<Vec<Class>>,
    rules: Vec<&'k SwrlRule>,
    types: BTreeMap<Individual, BTreeSet<Class>>,
    relations: BTreeSet<Relation>,
}

impl StructuralReasoner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ReasonerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Number of axioms currently mirrored
    pub fn axiom_count(&self) -> usize {
        self.axioms.len()
    }

    fn load_knowledge(&self) -> Knowledge<'_> {
        let mut k = Knowledge::default();
        for axiom in &self.axioms {
            match axiom {
                Axiom::Declaration(Entity::Class(c)) => {
                    k.classes.insert(c.clone());
                }
                Axiom::Declaration(Entity::ObjectProperty(p)) => {
                    k.properties.insert(p.clone());
                }
                Axiom::Declaration(Entity::Individual(i)) => {
                    k.types.entry(i.clone()).or_default();
                }
                Axiom::Declaration(Entity::DataProperty(_)) => {}
                Axiom::SubClassOf(sub, sup) => {
                    k.classes.insert(sub.clone());
                    k.classes.insert(sup.clone());
                    k.class_edges.entry(sub.clone()).or_default().insert(sup.clone());
                }
                Axiom::EquivalentClasses(classes) => {
                    for a in classes {
                        k.classes.insert(a.clone());
                        for b in classes.iter().filter(|b| *b != a) {
                            k.class_edges.entry(a.clone()).or_default().insert(b.clone());
                        }
                    }
                }
                Axiom::DisjointClasses(classes) => {
                    k.classes.extend(classes.iter().cloned());
                    k.disjoint.push(classes.clone());
                }
                Axiom::SubObjectPropertyOf(sub, sup) => {
                    k.properties.insert(sub.clone());
                    k.properties.insert(sup.clone());
                    k.property_edges.entry(sub.clone()).or_default().insert(sup.clone());
                }
                Axiom::ObjectPropertyDomain(p, c) => {
                    k.properties.insert(p.clone());
                    k.classes.insert(c.clone());
                    k.domains.push((p.clone(), c.clone()));
                }
                Axiom::ObjectPropertyRange(p, c) => {
                    k.properties.insert(p.clone());
                    k.classes.insert(c.clone());
                    k.ranges.push((p.clone(), c.clone()));
                }
                Axiom::ClassAssertion(c, i) => {
                    k.classes.insert(c.clone());
                    k.types.entry(i.clone()).or_default().insert(c.clone());
                }
                Axiom::ObjectPropertyAssertion(p, s, o) => {
                    k.properties.insert(p.clone());
                    k.types.entry(s.clone()).or_default();
                    k.types.entry(o.clone()).or_default();
                    k.relations.insert((p.clone(), s.clone(), o.clone()));
                }
                Axiom::DataPropertyAssertion(_, i, _) => {
                    k.types.entry(i.clone()).or_default();
                }
                Axiom::SwrlRule(rule) => k.rules.push(rule),
            }
        }
        k
    }

    fn check_consistency(
        types: &BTreeMap<Individual, BTreeSet<Class>>,
        disjoint: &[Vec<Class>],
    ) -> Result<(), ReasonerError> {
        for (individual, classes) in types {
            if classes.contains(&Class::Nothing) {
                return Err(ReasonerError::Inconsistent {
                    individual: individual.to_string(),
                    classes: Class::Nothing.to_string(),
                });
            }
            for group in disjoint {
                let members: Vec<String> = group
                    .iter()
                    .filter(|c| classes.contains(c))
                    .map(|c| c.to_string())
                    .collect();
                if members.len() > 1 {
                    return Err(ReasonerError::Inconsistent {
                        individual: individual.to_string(),
                        classes: members.join(", "),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Transitive reachability over `edges` for every start node
fn transitive_closure<T: Ord + Clone + std::hash::Hash>(
    nodes: impl IntoIterator<Item = T>,
    edges: &HashMap<T, BTreeSet<T>>,
) -> HashMap<T, BTreeSet<T>> {
    let mut closure = HashMap::new();
    for start in nodes {
        let mut reached = BTreeSet::new();
        let mut queue: VecDeque<T> = edges.get(&start).into_iter().flatten().cloned().collect();
        while let Some(next) = queue.pop_front() {
            if reached.insert(next.clone()) {
                queue.extend(edges.get(&next).into_iter().flatten().cloned());
            }
        }
        closure.insert(start, reached);
    }
    closure
}

fn resolve(term: &SwrlTerm, bindings: &Bindings) -> Option<Individual> {
    match term {
        SwrlTerm::Individual(i) => Some(i.clone()),
        SwrlTerm::Variable(v) => bindings.get(v).cloned(),
    }
}

fn unify(bindings: &Bindings, term: &SwrlTerm, value: &Individual) -> Option<Bindings> {
    match term {
        SwrlTerm::Individual(i) => (i == value).then(|| bindings.clone()),
        SwrlTerm::Variable(v) => match bindings.get(v) {
            Some(bound) => (bound == value).then(|| bindings.clone()),
            None => {
                let mut extended = bindings.clone();
                extended.insert(v.clone(), value.clone());
                Some(extended)
            }
        },
    }
}

/// All variable bindings satisfying every atom of `body`
fn match_body(
    body: &[SwrlAtom],
    types: &BTreeMap<Individual, BTreeSet<Class>>,
    relations: &BTreeSet<Relation>,
) -> Vec<Bindings> {
    let mut results = vec![Bindings::new()];
    for atom in body {
        let mut next = Vec::new();
        for bindings in &results {
            match atom {
                SwrlAtom::Class(class, term) => {
                    for (individual, classes) in types {
                        if *class == Class::Thing || classes.contains(class) {
                            next.extend(unify(bindings, term, individual));
                        }
                    }
                }
                SwrlAtom::ObjectProperty(property, subject, object) => {
                    for (_, s, o) in relations.iter().filter(|(p, _, _)| p == property) {
                        if let Some(b) = unify(bindings, subject, s) {
                            next.extend(unify(&b, object, o));
                        }
                    }
                }
            }
        }
        results = next;
    }
    results
}

fn instantiate(atom: &SwrlAtom, bindings: &Bindings) -> Option<Fact> {
    match atom {
        SwrlAtom::Class(class, term) => Some(Fact::Type(resolve(term, bindings)?, class.clone())),
        SwrlAtom::ObjectProperty(property, subject, object) => Some(Fact::Relation((
            property.clone(),
            resolve(subject, bindings)?,
            resolve(object, bindings)?,
        ))),
    }
}

fn apply_fact(
    fact: Fact,
    types: &mut BTreeMap<Individual, BTreeSet<Class>>,
    relations: &mut BTreeSet<Relation>,
) -> bool {
    match fact {
        Fact::Type(_, Class::Thing) => false,
        Fact::Type(individual, class) => types.entry(individual).or_default().insert(class),
        Fact::Relation(relation) => {
            types.entry(relation.1.clone()).or_default();
            types.entry(relation.2.clone()).or_default();
            relations.insert(relation)
        }
    }
}

impl Reasoner for StructuralReasoner {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn prepare(&mut self, ontology: &Ontology) -> Result<(), ReasonerError> {
        self.axioms = ontology.axioms().cloned().collect();
        self.prepared = true;
        self.realized = false;
        debug!(axioms = self.axioms.len(), "reasoner prepared");
        Ok(())
    }

    fn on_change(&mut self, change: &OntologyChange) {
        match change {
            OntologyChange::AxiomAdded(axiom) => {
                self.axioms.insert(axiom.clone());
            }
            OntologyChange::AxiomRemoved(axiom) => {
                self.axioms.remove(axiom);
            }
        }
        self.realized = false;
    }

    fn realize(&mut self) -> Result<(), ReasonerError> {
        if !self.prepared {
            return Err(ReasonerError::NotPrepared);
        }

        let knowledge = self.load_knowledge();
        let mut types = knowledge.types.clone();
        let mut relations = knowledge.relations.clone();
        let mut classes = knowledge.classes.clone();
        classes.extend(types.values().flatten().cloned());

        let class_hierarchy = transitive_closure(classes.iter().cloned(), &knowledge.class_edges);
        let property_hierarchy = transitive_closure(knowledge.properties.iter().cloned(), &knowledge.property_edges);

        let mut rounds = 0;
        loop {
            rounds += 1;
            if rounds > self.config.max_iterations {
                return Err(ReasonerError::IterationLimit(self.config.max_iterations));
            }

            let mut derived = Vec::new();
            for (p, s, o) in &relations {
                for sup in property_hierarchy.get(p).into_iter().flatten() {
                    derived.push(Fact::Relation((sup.clone(), s.clone(), o.clone())));
                }
                for (_, c) in knowledge.domains.iter().filter(|(dp, _)| dp == p) {
                    derived.push(Fact::Type(s.clone(), c.clone()));
                }
                for (_, c) in knowledge.ranges.iter().filter(|(rp, _)| rp == p) {
                    derived.push(Fact::Type(o.clone(), c.clone()));
                }
            }
            for (individual, asserted) in &types {
                for class in asserted {
                    for sup in class_hierarchy.get(class).into_iter().flatten() {
                        derived.push(Fact::Type(individual.clone(), sup.clone()));
                    }
                }
            }
            for rule in &knowledge.rules {
                for bindings in match_body(&rule.body, &types, &relations) {
                    derived.extend(rule.head.iter().filter_map(|atom| instantiate(atom, &bindings)));
                }
            }

            let mut changed = false;
            for fact in derived {
                changed |= apply_fact(fact, &mut types, &mut relations);
            }
            if !changed {
                break;
            }
        }

        Self::check_consistency(&types, &knowledge.disjoint)?;

        // Classes first seen through inference still need hierarchy entries
        let mut all_classes = classes;
        all_classes.extend(types.values().flatten().cloned());
        let class_hierarchy = transitive_closure(all_classes.iter().cloned(), &knowledge.class_edges);

        let mut properties = knowledge.properties.clone();
        properties.extend(relations.iter().map(|(p, _, _)| p.clone()));

        info!(
            rounds,
            individuals = types.len(),
            relations = relations.len(),
            rules = knowledge.rules.len(),
            "realisation complete"
        );

        self.class_hierarchy = class_hierarchy;
        self.classes = all_classes;
        self.properties = properties;
        self.types = types;
        self.relations = relations;
        self.realized = true;
        Ok(())
    }

    fn is_realized(&self) -> bool {
        self.realized
    }

    fn classes(&self) -> BTreeSet<Class> {
        self.classes.clone()
    }

    fn superclasses(&self, class: &Class) -> BTreeSet<Class> {
        self.class_hierarchy
            .get(class)
            .into_iter()
            .flatten()
            .filter(|c| *c != class && **c != Class::Thing)
            .cloned()
            .collect()
    }

    fn individuals(&self) -> BTreeSet<Individual> {
        self.types.keys().cloned().collect()
    }

    fn types(&self, individual: &Individual) -> BTreeSet<Class> {
        self.types
            .get(individual)
            .into_iter()
            .flatten()
            .filter(|c| **c != Class::Thing)
            .cloned()
            .collect()
    }

    fn object_properties(&self) -> BTreeSet<ObjectProperty> {
        self.properties.clone()
    }

    fn object_property_values(&self, property: &ObjectProperty, individual: &Individual) -> BTreeSet<Individual> {
        self.relations
            .iter()
            .filter(|(p, s, _)| p == property && s == individual)
            .map(|(_, _, o)| o.clone())
            .collect()
    }
}
