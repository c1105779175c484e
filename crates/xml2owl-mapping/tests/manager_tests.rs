//! Tests for mapping runs driven by MapperManager

mod common;

use common::*;
use proptest::prelude::*;
use std::collections::BTreeSet;
use xml2owl_core::{Axiom, Class, Ontology, OntologyManager};
use xml2owl_mapping::{MapperConfig, MapperManager, RecordingObserver};

fn mapper(journal: &Journal, observer: &RecordingObserver) -> MapperManager {
    MapperManager::new(journal.factory()).with_observer(Box::new(observer.clone()))
}

#[test]
fn test_rules_run_in_document_order() {
    let journal = Journal::default();
    let observer = RecordingObserver::new();
    let mut mapper = mapper(&journal, &observer);
    let mut manager = OntologyManager::new();
    let mut ontology = Ontology::new();

    let xml = rules(&format!(
        r#"<prefixIRI id="prefix" IRI="{EX}"/>
        <comment id="ignored"/>
        {PEOPLE}
        {STUDENTS}
        <annotation id="also-ignored"/>
        {HIERARCHY}
        <collectOWLIndividuals id="collect" referenceName="person"/>"#
    ));
    let report = run(&mut mapper, &mut manager, &mut ontology, &xml).unwrap();

    assert_eq!(journal.applied(), ["prefix", "people", "students", "hierarchy", "collect"]);
    assert_eq!(report.rules_applied, 5);
    assert_eq!(report.direct_axioms, 4);
    assert_eq!(report.inferred_axioms, 1);
    assert!(report.warnings.is_empty());

    assert!(ontology.contains(&class_assertion("Person", "ann")));
    assert!(ontology.contains(&class_assertion("Person", "bob")));
    assert!(ontology.contains(&class_assertion("Student", "ann")));
    assert!(ontology.contains(&class_assertion("Member", "ann")));
    assert!(!ontology.contains(&class_assertion("Member", "bob")));

    let lines = observer.lines();
    assert_eq!(lines.first().map(String::as_str), Some("[XML2OWL] Beginning ruleset mapping ..."));
    assert_eq!(lines.last().map(String::as_str), Some("[XML2OWL] Ruleset mapping successfully completed."));
}

#[test]
fn test_no_selected_rules() {
    let journal = Journal::default();
    let observer = RecordingObserver::new();
    let mut mapper = mapper(&journal, &observer);
    let mut manager = OntologyManager::new();
    let mut ontology = Ontology::new();

    let report = run(&mut mapper, &mut manager, &mut ontology, &rules("<comment/>")).unwrap();

    assert!(journal.applied().is_empty());
    assert_eq!(report.rules_applied, 0);
    assert!(ontology.is_empty());
    assert!(mapper.last_changes().is_empty());
    assert_eq!(
        observer.lines(),
        [
            "[XML2OWL] Beginning ruleset mapping ...",
            "[XML2OWL] Ruleset mapping successfully completed."
        ]
    );
}

#[test]
fn test_setup_reads_namespaces_parameters_and_reference_names() {
    let journal = Journal::default();
    let observer = RecordingObserver::new();
    let mut mapper = mapper(&journal, &observer);
    let mut manager = OntologyManager::new();
    let mut ontology = Ontology::new();

    let xml = rules(&format!(
        r#"{PEOPLE}
        <mapToObjectProperty id="nested"><source referenceName="inner"/></mapToObjectProperty>
        <collectOWLIndividuals referenceName="person"/>"#
    ));
    run(&mut mapper, &mut manager, &mut ontology, &xml).unwrap();

    let setup = journal.last_setup().unwrap();
    assert_eq!(setup.parameters.query_language, "XPath");
    assert_eq!(setup.parameters.expression_language, "XPath");
    assert!(setup.parameters.strict);
    assert_eq!(setup.reference_names.as_slice(), ["person", "inner", "person"]);
    assert_eq!(setup.namespaces.len(), 2);
    assert_eq!(setup.namespaces[1].uri, "urn:people");

    // The last `p` declaration is the one data paths see
    assert!(ontology.contains(&class_assertion("Person", "bob")));
}

#[test]
fn test_lethal_failure_aborts_remaining_rules() {
    let journal = Journal::default();
    let observer = RecordingObserver::new();
    let mut mapper = mapper(&journal, &observer);
    let mut manager = OntologyManager::new();
    let mut ontology = Ontology::new();

    let xml = rules(&format!(
        r#"{PEOPLE}
        <mapToOWLClass id="broken" fail="lethal"/>
        {STUDENTS}"#
    ));
    let error = run(&mut mapper, &mut manager, &mut ontology, &xml).unwrap_err();

    assert_eq!(journal.applied(), ["people", "broken"]);
    assert_eq!(error.message, "[XML2OWL] XML2OWL mapping exception: rule broken failed");
    assert_eq!(error.rule.as_deref(), Some("mapToOWLClass"));

    // Effects of the first rule stay and are what undo would remove
    let expected: BTreeSet<Axiom> = [class_assertion("Person", "ann"), class_assertion("Person", "bob")].into();
    assert_eq!(ontology.snapshot(), expected);
    assert_eq!(mapper.last_changes(), &expected);

    assert_eq!(
        observer.lines(),
        [
            "[XML2OWL] Beginning ruleset mapping ...",
            "[XML2OWL] XML2OWL mapping exception: rule broken failed"
        ]
    );
}

#[test]
fn test_warning_does_not_stop_the_run() {
    let journal = Journal::default();
    let observer = RecordingObserver::new();
    let mut mapper = mapper(&journal, &observer);
    let mut manager = OntologyManager::new();
    let mut ontology = Ontology::new();

    let xml = rules(&format!(
        r#"{PEOPLE}
        <mapToOWLClass id="optional" fail="warning"/>
        {STUDENTS}"#
    ));
    let report = run(&mut mapper, &mut manager, &mut ontology, &xml).unwrap();

    assert_eq!(journal.applied(), ["people", "optional", "students"]);
    assert_eq!(report.rules_applied, 2);
    assert_eq!(report.warnings, ["[XML2OWL] XML2OWL mapping warning: rule optional skipped"]);
    assert!(observer
        .lines()
        .contains(&"[XML2OWL] XML2OWL mapping warning: rule optional skipped".to_string()));
    assert!(ontology.contains(&class_assertion("Student", "ann")));
}

#[test]
fn test_failure_categories() {
    let cases = [
        (r#"<mapToOWLClass id="x" class="X" select="/q:people"/>"#, "[XML2OWL] XPath exception: "),
        (r#"<mapToOWLClass id="x" fail="owl"/>"#, "[XML2OWL] OWL exception: "),
        (r#"<mapToOWLClass id="x" fail="unknown"/>"#, "[XML2OWL] Unrecognised exception of type "),
    ];

    for (rule, prefix) in cases {
        let journal = Journal::default();
        let observer = RecordingObserver::new();
        let mut mapper = mapper(&journal, &observer);
        let mut manager = OntologyManager::new();
        let mut ontology = Ontology::new();

        let xml = rules(&format!("{rule}{PEOPLE}"));
        let error = run(&mut mapper, &mut manager, &mut ontology, &xml).unwrap_err();

        assert!(error.message.starts_with(prefix), "{} does not start with {}", error.message, prefix);
        assert_eq!(journal.applied(), ["x"]);
        assert!(ontology.is_empty());
    }
}

#[test]
fn test_unrecognised_failure_names_its_type() {
    let journal = Journal::default();
    let mut mapper = mapper(&journal, &RecordingObserver::new());
    let mut manager = OntologyManager::new();
    let mut ontology = Ontology::new();

    let xml = rules(r#"<mapToOWLClass fail="unknown"/>"#);
    let error = run(&mut mapper, &mut manager, &mut ontology, &xml).unwrap_err();
    assert!(error.message.contains("std::io::error::Error : disk on fire"), "{}", error.message);
}

#[test]
fn test_read_only_ontology_is_fatal() {
    let journal = Journal::default();
    let mut mapper = mapper(&journal, &RecordingObserver::new());
    let mut manager = OntologyManager::new();
    let mut ontology = Ontology::with_iri("http://example.org/frozen");
    ontology.set_read_only(true);

    let error = run(&mut mapper, &mut manager, &mut ontology, &rules(PEOPLE)).unwrap_err();
    assert!(error.message.starts_with("[XML2OWL] OWL exception: "));
    assert!(ontology.is_empty());
}

#[test]
fn test_abort_does_not_leak_into_next_run() {
    let journal = Journal::default();
    let mut mapper = mapper(&journal, &RecordingObserver::new());
    let mut manager = OntologyManager::new();
    let mut ontology = Ontology::new();

    let failing = rules(r#"<mapToOWLClass id="broken" fail="lethal"/>"#);
    assert!(run(&mut mapper, &mut manager, &mut ontology, &failing).is_err());

    let report = run(&mut mapper, &mut manager, &mut ontology, &rules(PEOPLE)).unwrap();
    assert_eq!(report.rules_applied, 1);
    assert_eq!(journal.applied(), ["broken", "people"]);
}

#[test]
fn test_reference_names_collected_when_first_rule_aborts() {
    let journal = Journal::default();
    let mut mapper = mapper(&journal, &RecordingObserver::new());
    let mut manager = OntologyManager::new();
    let mut ontology = Ontology::new();

    let xml = rules(&format!(r#"<mapToOWLClass id="broken" fail="lethal"/>{PEOPLE}"#));
    assert!(run(&mut mapper, &mut manager, &mut ontology, &xml).is_err());

    let setup = journal.last_setup().unwrap();
    assert_eq!(setup.reference_names.as_slice(), ["person"]);
    assert_eq!(journal.applied(), ["broken"]);
    assert!(ontology.is_empty());
}

#[test]
fn test_listener_removed_after_every_run() {
    let journal = Journal::default();
    let mut mapper = mapper(&journal, &RecordingObserver::new());
    let mut manager = OntologyManager::new();
    let mut ontology = Ontology::new();

    run(&mut mapper, &mut manager, &mut ontology, &rules(PEOPLE)).unwrap();
    assert_eq!(manager.listener_count(), 0);

    let failing = rules(r#"<mapToOWLClass fail="lethal"/>"#);
    assert!(run(&mut mapper, &mut manager, &mut ontology, &failing).is_err());
    assert_eq!(manager.listener_count(), 0);
}

#[test]
fn test_unmap_restores_the_ontology() {
    let journal = Journal::default();
    let mut mapper = mapper(&journal, &RecordingObserver::new());
    let mut manager = OntologyManager::new();
    let mut ontology = Ontology::new();
    manager
        .add_axiom(&mut ontology, class_assertion("Person", "ann"))
        .unwrap();
    let before = ontology.snapshot();

    let xml = rules(&format!("{PEOPLE}{STUDENTS}{HIERARCHY}"));
    run(&mut mapper, &mut manager, &mut ontology, &xml).unwrap();

    // Person(ann) was already there, so the run did not record it
    assert!(!mapper.last_changes().contains(&class_assertion("Person", "ann")));
    assert!(mapper.last_changes().contains(&class_assertion("Member", "ann")));

    assert_eq!(mapper.unmap(&mut manager, &mut ontology).unwrap(), 4);
    assert_eq!(ontology.snapshot(), before);
    assert_eq!(mapper.unmap(&mut manager, &mut ontology).unwrap(), 0);
    assert_eq!(ontology.snapshot(), before);
}

#[test]
fn test_unmap_before_any_run() {
    let mut mapper = mapper(&Journal::default(), &RecordingObserver::new());
    let mut manager = OntologyManager::new();
    let mut ontology = Ontology::new();
    ontology.set_read_only(true);
    assert_eq!(mapper.unmap(&mut manager, &mut ontology).unwrap(), 0);
}

#[test]
fn test_last_changes_replaced_by_each_run() {
    let journal = Journal::default();
    let mut mapper = mapper(&journal, &RecordingObserver::new());
    let mut manager = OntologyManager::new();
    let mut ontology = Ontology::new();

    run(&mut mapper, &mut manager, &mut ontology, &rules(PEOPLE)).unwrap();
    run(&mut mapper, &mut manager, &mut ontology, &rules(HIERARCHY)).unwrap();

    let expected: BTreeSet<Axiom> = [Axiom::SubClassOf(
        Class::named(iri("Student")),
        Class::named(iri("Member")),
    )]
    .into();
    assert_eq!(mapper.last_changes(), &expected);

    mapper.unmap(&mut manager, &mut ontology).unwrap();
    assert!(ontology.contains(&class_assertion("Person", "ann")));
}

#[test]
fn test_swrl_rules_are_reported_and_applied() {
    let journal = Journal::default();
    let observer = RecordingObserver::new();
    let mut mapper = mapper(&journal, &observer);
    let mut manager = OntologyManager::new();
    let mut ontology = Ontology::new();

    let xml = rules(&format!(r#"{STUDENTS}<mapToSWRLRule id="enrol" if="Student" then="Enrolled"/>"#));
    let report = run(&mut mapper, &mut manager, &mut ontology, &xml).unwrap();

    assert_eq!(report.swrl_rules, 1);
    assert!(ontology.contains(&class_assertion("Enrolled", "ann")));
    assert!(observer
        .lines()
        .contains(&"[XML2OWL] Processing SWRL rule: Student(?x) → Enrolled(?x) ...".to_string()));
}

#[test]
fn test_materialization_can_be_disabled() {
    let journal = Journal::default();
    let config = MapperConfig {
        materialize: false,
        ..MapperConfig::default()
    };
    let mut mapper = MapperManager::with_config(journal.factory(), config);
    let mut manager = OntologyManager::new();
    let mut ontology = Ontology::new();

    let report = run(&mut mapper, &mut manager, &mut ontology, &rules(&format!("{STUDENTS}{HIERARCHY}"))).unwrap();
    assert_eq!(report.inferred_axioms, 0);
    assert!(!ontology.contains(&class_assertion("Member", "ann")));
}

#[test]
fn test_rollback_on_abort() {
    let journal = Journal::default();
    let config = MapperConfig {
        rollback_on_abort: true,
        ..MapperConfig::default()
    };
    let mut mapper = MapperManager::with_config(journal.factory(), config);
    let mut manager = OntologyManager::new();
    let mut ontology = Ontology::new();

    let xml = rules(&format!(r#"{PEOPLE}<mapToOWLClass fail="lethal"/>"#));
    assert!(run(&mut mapper, &mut manager, &mut ontology, &xml).is_err());

    assert!(ontology.is_empty());
    assert!(mapper.last_changes().is_empty());
}

#[test]
fn test_custom_log_tag() {
    let observer = RecordingObserver::new();
    let config = MapperConfig {
        log_tag: "[MAP]".to_string(),
        ..MapperConfig::default()
    };
    let mut mapper = MapperManager::with_config(Journal::default().factory(), config).with_observer(Box::new(observer.clone()));
    let mut manager = OntologyManager::new();
    let mut ontology = Ontology::new();

    let error = run(&mut mapper, &mut manager, &mut ontology, &rules(r#"<mapToX fail="lethal"/>"#)).unwrap_err();
    assert_eq!(error.message, "[MAP] XML2OWL mapping exception: rule mapToX failed");
    assert_eq!(observer.lines()[0], "[MAP] Beginning ruleset mapping ...");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_strict_only_for_exact_true(value in prop_oneof![Just("true".to_string()), "[A-Za-z0-9 ]{0,6}"]) {
        let journal = Journal::default();
        let mut mapper = mapper(&journal, &RecordingObserver::new());
        let mut manager = OntologyManager::new();
        let mut ontology = Ontology::new();

        let xml = rules_with_root_attributes(&format!(r#"strict="{value}""#), "");
        run(&mut mapper, &mut manager, &mut ontology, &xml).unwrap();

        let setup = journal.last_setup().unwrap();
        prop_assert_eq!(setup.parameters.strict, value == "true");
    }

    #[test]
    fn prop_unmap_round_trip(picks in proptest::collection::vec(0usize..4, 0..6)) {
        let pool = [PEOPLE, STUDENTS, HIERARCHY, r#"<mapToOWLClass fail="warning"/>"#];
        let body: String = picks.iter().map(|i| pool[*i]).collect();

        let mut mapper = mapper(&Journal::default(), &RecordingObserver::new());
        let mut manager = OntologyManager::new();
        let mut ontology = Ontology::new();
        manager.add_axiom(&mut ontology, class_assertion("Person", "bob")).unwrap();
        let before = ontology.snapshot();

        run(&mut mapper, &mut manager, &mut ontology, &rules(&body)).unwrap();
        mapper.unmap(&mut manager, &mut ontology).unwrap();
        prop_assert_eq!(ontology.snapshot(), before);
    }
}
