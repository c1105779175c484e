//! OWL axiom data model

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// OWL IRI wrapper for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OwlIri(pub String);

impl OwlIri {
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Local part of the IRI: the fragment, or the last path segment.
    pub fn short_name(&self) -> &str {
        let iri = self.0.as_str();
        match iri.rfind(['#', '/']) {
            Some(pos) if pos + 1 < iri.len() => &iri[pos + 1..],
            _ => iri,
        }
    }
}

impl fmt::Display for OwlIri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OwlIri {
    fn from(s: &str) -> Self {
        OwlIri::new(s)
    }
}

impl From<String> for OwlIri {
    fn from(s: String) -> Self {
        OwlIri(s)
    }
}

/// OWL Class
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Class {
    /// Named class
    Named(OwlIri),
    /// owl:Thing (⊤)
    Thing,
    /// owl:Nothing (⊥)
    Nothing,
}

impl Class {
    pub fn named<I: Into<OwlIri>>(iri: I) -> Self {
        Class::Named(iri.into())
    }
}

/// OWL object property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ObjectProperty(pub OwlIri);

impl ObjectProperty {
    pub fn new<I: Into<OwlIri>>(iri: I) -> Self {
        Self(iri.into())
    }
}

/// OWL data property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct DataProperty(pub OwlIri);

impl DataProperty {
    pub fn new<I: Into<OwlIri>>(iri: I) -> Self {
        Self(iri.into())
    }
}

/// OWL named individual
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Individual(pub OwlIri);

impl Individual {
    pub fn new<I: Into<OwlIri>>(iri: I) -> Self {
        Self(iri.into())
    }
}

/// Typed or language-tagged literal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
    pub datatype: Option<OwlIri>,
    pub language: Option<String>,
}

impl Literal {
    pub fn plain<S: Into<String>>(value: S) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed<S: Into<String>, I: Into<OwlIri>>(value: S, datatype: I) -> Self {
        Self {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }
}

/// Declarable entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Entity {
    Class(Class),
    ObjectProperty(ObjectProperty),
    DataProperty(DataProperty),
    Individual(Individual),
}

/// SWRL term: a rule variable or a named individual
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum SwrlTerm {
    Variable(String),
    Individual(Individual),
}

/// SWRL atom
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum SwrlAtom {
    /// C(?x)
    Class(Class, SwrlTerm),
    /// p(?x, ?y)
    ObjectProperty(ObjectProperty, SwrlTerm, SwrlTerm),
}

impl SwrlAtom {
    /// Variables mentioned by this atom, in argument order
    pub fn variables(&self) -> Vec<&str> {
        let terms: Vec<&SwrlTerm> = match self {
            SwrlAtom::Class(_, t) => vec![t],
            SwrlAtom::ObjectProperty(_, s, o) => vec![s, o],
        };
        terms
            .into_iter()
            .filter_map(|t| match t {
                SwrlTerm::Variable(v) => Some(v.as_str()),
                SwrlTerm::Individual(_) => None,
            })
            .collect()
    }
}

/// SWRL rule: body → head
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SwrlRule {
    pub body: Vec<SwrlAtom>,
    pub head: Vec<SwrlAtom>,
}

impl SwrlRule {
    /// A rule is safe when every head variable also occurs in the body
    pub fn is_safe(&self) -> bool {
        let bound: HashSet<&str> = self.body.iter().flat_map(|a| a.variables()).collect();
        self.head
            .iter()
            .flat_map(|a| a.variables())
            .all(|v| bound.contains(v))
    }
}

/// OWL axiom: one unit of ontology change
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Axiom {
    /// Declaration(E)
    Declaration(Entity),

    /// SubClassOf(C1 C2)
    SubClassOf(Class, Class),

    /// EquivalentClasses(C1 ... Cn)
    EquivalentClasses(Vec<Class>),

    /// DisjointClasses(C1 ... Cn)
    DisjointClasses(Vec<Class>),

    /// SubObjectPropertyOf(P1 P2)
    SubObjectPropertyOf(ObjectProperty, ObjectProperty),

    /// ObjectPropertyDomain(P C)
    ObjectPropertyDomain(ObjectProperty, Class),

    /// ObjectPropertyRange(P C)
    ObjectPropertyRange(ObjectProperty, Class),

    /// ClassAssertion(C i)
    ClassAssertion(Class, Individual),

    /// ObjectPropertyAssertion(P i1 i2)
    ObjectPropertyAssertion(ObjectProperty, Individual, Individual),

    /// DataPropertyAssertion(P i v)
    DataPropertyAssertion(DataProperty, Individual, Literal),

    /// DLSafeRule(body → head)
    SwrlRule(SwrlRule),
}

/// Identifier of one tracked ontology change. Axioms are values, so the
/// axiom itself is the reference.
pub type AxiomRef = Axiom;

/// Axiom kind, used for indexed lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum AxiomKind {
    Declaration,
    SubClassOf,
    EquivalentClasses,
    DisjointClasses,
    SubObjectPropertyOf,
    ObjectPropertyDomain,
    ObjectPropertyRange,
    ClassAssertion,
    ObjectPropertyAssertion,
    DataPropertyAssertion,
    SwrlRule,
}

impl Axiom {
    pub fn kind(&self) -> AxiomKind {
        match self {
            Axiom::Declaration(_) => AxiomKind::Declaration,
            Axiom::SubClassOf(..) => AxiomKind::SubClassOf,
            Axiom::EquivalentClasses(_) => AxiomKind::EquivalentClasses,
            Axiom::DisjointClasses(_) => AxiomKind::DisjointClasses,
            Axiom::SubObjectPropertyOf(..) => AxiomKind::SubObjectPropertyOf,
            Axiom::ObjectPropertyDomain(..) => AxiomKind::ObjectPropertyDomain,
            Axiom::ObjectPropertyRange(..) => AxiomKind::ObjectPropertyRange,
            Axiom::ClassAssertion(..) => AxiomKind::ClassAssertion,
            Axiom::ObjectPropertyAssertion(..) => AxiomKind::ObjectPropertyAssertion,
            Axiom::DataPropertyAssertion(..) => AxiomKind::DataPropertyAssertion,
            Axiom::SwrlRule(_) => AxiomKind::SwrlRule,
        }
    }

    /// Logical axioms take part in reasoning; declarations do not
    pub fn is_logical(&self) -> bool {
        !matches!(self, Axiom::Declaration(_))
    }
}

// DL-style rendering, used for progress output

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Class::Named(iri) => write!(f, "{}", iri.short_name()),
            Class::Thing => write!(f, "⊤"),
            Class::Nothing => write!(f, "⊥"),
        }
    }
}

impl fmt::Display for ObjectProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.short_name())
    }
}

impl fmt::Display for DataProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.short_name())
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.short_name())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.value)?;
        if let Some(lang) = &self.language {
            write!(f, "@{}", lang)?;
        } else if let Some(datatype) = &self.datatype {
            write!(f, "^^{}", datatype.short_name())?;
        }
        Ok(())
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Class(c) => write!(f, "Class({})", c),
            Entity::ObjectProperty(p) => write!(f, "ObjectProperty({})", p),
            Entity::DataProperty(p) => write!(f, "DataProperty({})", p),
            Entity::Individual(i) => write!(f, "NamedIndividual({})", i),
        }
    }
}

impl fmt::Display for SwrlTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwrlTerm::Variable(v) => write!(f, "?{}", v),
            SwrlTerm::Individual(i) => write!(f, "{}", i),
        }
    }
}

impl fmt::Display for SwrlAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwrlAtom::Class(c, t) => write!(f, "{}({})", c, t),
            SwrlAtom::ObjectProperty(p, s, o) => write!(f, "{}({}, {})", p, s, o),
        }
    }
}

fn join<T: fmt::Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

impl fmt::Display for SwrlRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", join(&self.body, " ∧ "), join(&self.head, " ∧ "))
    }
}

impl fmt::Display for Axiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axiom::Declaration(e) => write!(f, "{}", e),
            Axiom::SubClassOf(sub, sup) => write!(f, "{} ⊑ {}", sub, sup),
            Axiom::EquivalentClasses(classes) => write!(f, "{}", join(classes, " ≡ ")),
            Axiom::DisjointClasses(classes) => match classes.as_slice() {
                [a, b] => write!(f, "{} ⊑ ¬{}", a, b),
                _ => write!(f, "Disjoint({})", join(classes, ", ")),
            },
            Axiom::SubObjectPropertyOf(sub, sup) => write!(f, "{} ⊑ {}", sub, sup),
            Axiom::ObjectPropertyDomain(p, c) => write!(f, "∃{}.⊤ ⊑ {}", p, c),
            Axiom::ObjectPropertyRange(p, c) => write!(f, "⊤ ⊑ ∀{}.{}", p, c),
            Axiom::ClassAssertion(c, i) => write!(f, "{}({})", c, i),
            Axiom::ObjectPropertyAssertion(p, s, o) => write!(f, "{}({}, {})", p, s, o),
            Axiom::DataPropertyAssertion(p, s, v) => write!(f, "{}({}, {})", p, s, v),
            Axiom::SwrlRule(rule) => write!(f, "{}", rule),
        }
    }
}
