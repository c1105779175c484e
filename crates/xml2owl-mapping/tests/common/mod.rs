//! Scripted rule applier shared by the mapping tests

#![allow(dead_code)]

use roxmltree::{Document, Node};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use xml2owl_core::{Axiom, Class, Individual, Ontology, OntologyError, OntologyManager, SwrlAtom, SwrlRule, SwrlTerm};
use xml2owl_mapping::{
    MapError, MapperManager, MappingException, MappingFailure, MappingReport, MappingSetup, RuleApplier,
    RuleApplierFactory, RuleScope,
};
use xml2owl_xpath::PathEvaluator;

pub const EX: &str = "http://example.org/people#";

pub const DATA: &str = r#"<d:people xmlns:d="urn:people">
    <d:person name="ann" role="student"/>
    <d:person name="bob" role="staff"/>
</d:people>"#;

/// Wrap rule elements in a rule document that binds `p` to the data
/// namespace. The prefix is declared twice; only the last binding is right.
pub fn rules(body: &str) -> String {
    rules_with_root_attributes(r#"queryLanguage="XPath" expressionLanguage="XPath" strict="true""#, body)
}

pub fn rules_with_root_attributes(attributes: &str, body: &str) -> String {
    format!(
        r#"<rules xmlns="http://www.fri.uni-lj.si/xml2owl" {attributes}>
    <namespaces>
        <namespace prefix="p" name="urn:wrong"/>
        <namespace prefix="p" name="urn:people"/>
    </namespaces>
    {body}
</rules>"#
    )
}

pub const PEOPLE: &str = r#"<mapToOWLClass id="people" referenceName="person" class="Person" select="/p:people/p:person/@name"/>"#;
pub const STUDENTS: &str = r#"<mapToOWLClass id="students" class="Student" select="/p:people/p:person[@role='student']/@name"/>"#;
pub const HIERARCHY: &str = r#"<mapToSubClass id="hierarchy" sub="Student" sup="Member"/>"#;

pub fn iri(name: &str) -> String {
    format!("{}{}", EX, name)
}

pub fn class_assertion(class: &str, individual: &str) -> Axiom {
    Axiom::ClassAssertion(Class::named(iri(class)), Individual::new(iri(individual)))
}

/// What the scripted applier saw
#[derive(Debug, Clone, Default)]
pub struct Journal {
    pub applied: Rc<RefCell<Vec<String>>>,
    pub setups: Rc<RefCell<Vec<MappingSetup>>>,
}

impl Journal {
    pub fn applied(&self) -> Vec<String> {
        self.applied.borrow().clone()
    }

    pub fn last_setup(&self) -> Option<MappingSetup> {
        self.setups.borrow().last().cloned()
    }

    pub fn factory(&self) -> Box<dyn RuleApplierFactory> {
        let journal = self.clone();
        Box::new(move |setup: &MappingSetup| -> Box<dyn RuleApplier> {
            journal.setups.borrow_mut().push(setup.clone());
            Box::new(ScriptedApplier {
                journal: journal.clone(),
                base: EX.to_string(),
                added: BTreeSet::new(),
            })
        })
    }
}

/// Interprets a handful of rule elements:
///
/// - `prefixIRI IRI=".."` sets the base IRI
/// - `mapToOWLClass class=".." select=".."` asserts the class for every
///   selected value
/// - `mapToSubClass sub=".." sup=".."`
/// - `mapToSWRLRule if=".." then=".."` adds `if(?x) → then(?x)`
///
/// Any rule with a `fail` attribute fails instead.
pub struct ScriptedApplier {
    journal: Journal,
    base: String,
    added: BTreeSet<Axiom>,
}

impl ScriptedApplier {
    fn class(&self, rule: Node<'_, '_>, attribute: &str) -> Result<Class, MappingFailure> {
        rule.attribute(attribute)
            .map(|name| Class::named(format!("{}{}", self.base, name)))
            .ok_or_else(|| MappingException::lethal(format!("missing @{}", attribute)).into())
    }

    fn add(&mut self, scope: &mut RuleScope<'_, '_, '_>, axioms: Vec<Axiom>) -> Result<(), MappingFailure> {
        let added = scope.manager.add_axioms(scope.ontology, axioms)?;
        self.added.extend(added);
        Ok(())
    }
}

impl RuleApplier for ScriptedApplier {
    fn apply_rule(&mut self, rule: Node<'_, '_>, scope: &mut RuleScope<'_, '_, '_>) -> Result<(), MappingFailure> {
        let label = rule.attribute("id").unwrap_or(rule.tag_name().name()).to_string();
        self.journal.applied.borrow_mut().push(label.clone());

        match rule.attribute("fail") {
            Some("lethal") => return Err(MappingException::lethal(format!("rule {} failed", label)).into()),
            Some("warning") => return Err(MappingException::warning(format!("rule {} skipped", label)).into()),
            Some("owl") => {
                return Err(OntologyError::ReadOnly {
                    ontology: "urn:locked".to_string(),
                }
                .into())
            }
            Some("unknown") => {
                return Err(MappingFailure::unrecognised(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk on fire",
                )))
            }
            _ => {}
        }

        match rule.tag_name().name() {
            "prefixIRI" => {
                if let Some(base) = rule.attribute("IRI") {
                    self.base = base.to_string();
                }
                Ok(())
            }
            "mapToOWLClass" => {
                let class = self.class(rule, "class")?;
                let select = rule.attribute("select").unwrap_or(".");
                let items = scope.context.data().find_items(scope.data, select)?;
                let axioms = items
                    .iter()
                    .map(|item| {
                        Axiom::ClassAssertion(class.clone(), Individual::new(format!("{}{}", self.base, item.string_value())))
                    })
                    .collect();
                self.add(scope, axioms)
            }
            "mapToSubClass" => {
                let axiom = Axiom::SubClassOf(self.class(rule, "sub")?, self.class(rule, "sup")?);
                self.add(scope, vec![axiom])
            }
            "mapToSWRLRule" => {
                let x = || SwrlTerm::Variable("x".to_string());
                let swrl = SwrlRule {
                    body: vec![SwrlAtom::Class(self.class(rule, "if")?, x())],
                    head: vec![SwrlAtom::Class(self.class(rule, "then")?, x())],
                };
                self.add(scope, vec![Axiom::SwrlRule(swrl)])
            }
            _ => Ok(()),
        }
    }

    fn changes_added(&self) -> BTreeSet<Axiom> {
        self.added.clone()
    }
}

pub fn run(
    mapper: &mut MapperManager,
    manager: &mut OntologyManager,
    ontology: &mut Ontology,
    rules_xml: &str,
) -> Result<MappingReport, MapError> {
    let rules = Document::parse(rules_xml).unwrap();
    let data = Document::parse(DATA).unwrap();
    mapper.map(manager, &rules, ontology, &data)
}
