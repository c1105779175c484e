//! Mapping orchestration
//!
//! A run goes through four phases: setup (namespaces, parameters,
//! reference names), reasoner preparation, the rule loop, and
//! materialisation of inferences. Failures in any phase are classified;
//! the first fatal one aborts the run and is reported as a [`MapError`].

use crate::applier::{MappingSetup, ReasoningSession, RuleApplier, RuleApplierFactory, RuleScope};
use crate::classifier::{classify, Classification};
use crate::config::MapperConfig;
use crate::context::{EvaluationContext, NamespaceBinding};
use crate::error::{MapError, MappingFailure};
use crate::observer::{MappingEvent, MappingObserver, TracingObserver};
use crate::parameters::MappingParameters;
use crate::references::ReferenceNameSet;
use crate::sequencer::RuleSequencer;
use crate::tracker::ChangeTracker;
use chrono::{DateTime, Utc};
use roxmltree::{Document, Node};
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;
use xml2owl_core::{Axiom, AxiomKind, Ontology, OntologyManager};
use xml2owl_reasoner::{InferredOntologyGenerator, Reasoner, ReasonerConfig, StructuralReasoner};

type ReasonerFactory = Box<dyn Fn(&ReasonerConfig) -> Box<dyn Reasoner>>;

/// Summary of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct MappingReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Rules that completed without a failure
    pub rules_applied: usize,
    pub warnings: Vec<String>,
    /// Axioms added by the rule applier
    pub direct_axioms: usize,
    /// Inferred axioms that were not already in the ontology
    pub inferred_axioms: usize,
    pub swrl_rules: usize,
    pub execution_time_ms: u64,
}

/// Static description of a rule document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSetSummary {
    pub parameters: MappingParameters,
    pub namespaces: Vec<NamespaceBinding>,
    pub reference_names: ReferenceNameSet,
    pub rules: Vec<RuleSummary>,
}

/// One executable rule, in execution order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSummary {
    pub position: usize,
    pub name: String,
    pub reference_name: Option<String>,
}

/// State of one run. Dropped when the run ends, so nothing carries over
/// into the next run.
struct RunState<'a, 'input> {
    run_id: Uuid,
    aborted: bool,
    remaining: Option<RuleSequencer<'a, 'input>>,
    current_rule: Option<String>,
    rules_applied: usize,
    warnings: Vec<String>,
    direct: BTreeSet<Axiom>,
    inferred: BTreeSet<Axiom>,
    swrl_rules: usize,
}

impl RunState<'_, '_> {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            aborted: false,
            remaining: None,
            current_rule: None,
            rules_applied: 0,
            warnings: Vec::new(),
            direct: BTreeSet::new(),
            inferred: BTreeSet::new(),
            swrl_rules: 0,
        }
    }

    fn changes(&self) -> BTreeSet<Axiom> {
        self.direct.union(&self.inferred).cloned().collect()
    }
}

/// Runs rule documents against ontologies and remembers the last run's
/// changes so they can be undone.
///
/// Runs take `&mut self`, so one manager never executes two runs at once.
pub struct MapperManager {
    config: MapperConfig,
    applier_factory: Box<dyn RuleApplierFactory>,
    reasoner_factory: ReasonerFactory,
    generator: InferredOntologyGenerator,
    observer: Box<dyn MappingObserver>,
    tracker: ChangeTracker,
}

impl MapperManager {
    pub fn new(applier_factory: Box<dyn RuleApplierFactory>) -> Self {
        Self::with_config(applier_factory, MapperConfig::default())
    }

    pub fn with_config(applier_factory: Box<dyn RuleApplierFactory>, config: MapperConfig) -> Self {
        Self {
            config,
            applier_factory,
            reasoner_factory: Box::new(|config: &ReasonerConfig| -> Box<dyn Reasoner> {
                Box::new(StructuralReasoner::with_config(config.clone()))
            }),
            generator: InferredOntologyGenerator::default(),
            observer: Box::new(TracingObserver),
            tracker: ChangeTracker::new(),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn MappingObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Use another reasoner implementation for subsequent runs
    pub fn with_reasoner<F>(mut self, factory: F) -> Self
    where
        F: Fn(&ReasonerConfig) -> Box<dyn Reasoner> + 'static,
    {
        self.reasoner_factory = Box::new(factory);
        self
    }

    pub fn with_generator(mut self, generator: InferredOntologyGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Axioms recorded by the last completed run
    pub fn last_changes(&self) -> &BTreeSet<Axiom> {
        self.tracker.last_changes()
    }

    /// Apply every selected rule of `rules` to `data`, adding the results
    /// and their inferences to `ontology`.
    pub fn map(
        &mut self,
        manager: &mut OntologyManager,
        rules: &Document<'_>,
        ontology: &mut Ontology,
        data: &Document<'_>,
    ) -> Result<MappingReport, MapError> {
        let started_at = Utc::now();
        let timer = Instant::now();
        self.emit(MappingEvent::RunStarted);

        let mut run = RunState::new();
        info!(run_id = %run.run_id, ontology = %ontology.display_name(), "mapping run started");

        if let Err(error) = self.execute(&mut run, manager, rules.root_element(), ontology, data.root()) {
            self.finish_aborted(&run, manager, ontology);
            return Err(error);
        }

        self.tracker.record(run.changes());
        self.emit(MappingEvent::RunCompleted);

        let report = MappingReport {
            run_id: run.run_id,
            started_at,
            rules_applied: run.rules_applied,
            warnings: run.warnings,
            direct_axioms: run.direct.len(),
            inferred_axioms: run.inferred.len(),
            swrl_rules: run.swrl_rules,
            execution_time_ms: timer.elapsed().as_millis() as u64,
        };
        info!(
            run_id = %report.run_id,
            rules = report.rules_applied,
            direct = report.direct_axioms,
            inferred = report.inferred_axioms,
            "mapping run completed"
        );
        Ok(report)
    }

    /// Remove the axioms recorded by the last run. Returns how many were
    /// removed; with nothing recorded this is a no-op.
    pub fn unmap(&mut self, manager: &mut OntologyManager, ontology: &mut Ontology) -> Result<usize, MapError> {
        self.tracker.undo(manager, ontology).map_err(|error| {
            let failure = MappingFailure::from(error);
            MapError {
                message: classify(&failure).diagnostic().line(&self.config.log_tag),
                rule: None,
            }
        })
    }

    /// Describe `rules` without running it
    pub fn inspect(&self, rules: &Document<'_>) -> Result<RuleSetSummary, MapError> {
        inspect(&self.config, rules)
    }

    fn execute<'a, 'input>(
        &self,
        run: &mut RunState<'a, 'input>,
        manager: &mut OntologyManager,
        rules: Node<'a, 'input>,
        ontology: &mut Ontology,
        data: Node<'_, '_>,
    ) -> Result<(), MapError> {
        let mut context = EvaluationContext::new(&self.config.rules_namespace);
        let setup = self.guard(run, setup(&mut context, rules))?;
        debug!(
            parameters = ?setup.parameters,
            reference_names = setup.reference_names.len(),
            namespaces = setup.namespaces.len(),
            "rule document set up"
        );

        let session = ReasoningSession::new((self.reasoner_factory)(&self.config.reasoner));
        self.guard(run, session.prepare(ontology))?;
        let subscription = session.attach(manager);
        debug!(reasoner = session.name(), "reasoner attached");

        let mut applier = self.applier_factory.create(&setup);
        run.remaining = Some(RuleSequencer::new(rules, &self.config.selection));

        let outcome = self
            .apply_rules(run, applier.as_mut(), manager, ontology, &session, &context, data)
            .and_then(|()| self.materialize(run, manager, ontology, &session));
        run.direct = applier.changes_added();

        session.detach(manager, subscription);
        outcome
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_rules(
        &self,
        run: &mut RunState<'_, '_>,
        applier: &mut dyn RuleApplier,
        manager: &mut OntologyManager,
        ontology: &mut Ontology,
        session: &ReasoningSession,
        context: &EvaluationContext,
        data: Node<'_, '_>,
    ) -> Result<(), MapError> {
        while !run.aborted {
            let Some(rule) = run.remaining.as_mut().and_then(Iterator::next) else {
                break;
            };
            run.current_rule = Some(rule.tag_name().name().to_string());
            debug!(rule = rule.tag_name().name(), "applying rule");

            let mut scope = RuleScope {
                manager: &mut *manager,
                ontology: &mut *ontology,
                reasoner: session,
                context,
                data,
            };
            match applier.apply_rule(rule, &mut scope) {
                Ok(()) => run.rules_applied += 1,
                Err(failure) => self.handle(run, failure)?,
            }
        }
        run.current_rule = None;
        Ok(())
    }

    fn materialize(
        &self,
        run: &mut RunState<'_, '_>,
        manager: &mut OntologyManager,
        ontology: &mut Ontology,
        session: &ReasoningSession,
    ) -> Result<(), MapError> {
        if self.config.materialize {
            self.guard(run, session.realize())?;
            let added = self.guard(run, session.materialize(&self.generator, manager, ontology))?;
            run.inferred = added.into_iter().collect();
        }

        let rules: Vec<String> = ontology
            .axioms_of_kind(AxiomKind::SwrlRule)
            .map(|axiom| axiom.to_string())
            .collect();
        run.swrl_rules = rules.len();
        for rendered in rules {
            self.emit(MappingEvent::SwrlRule { rendered });
        }
        Ok(())
    }

    /// Report `failure`; fatal failures abort the run
    fn handle(&self, run: &mut RunState<'_, '_>, failure: MappingFailure) -> Result<(), MapError> {
        let classification = classify(&failure);
        let line = classification.diagnostic().line(&self.config.log_tag);
        self.emit(MappingEvent::Failure {
            line: line.clone(),
            fatal: classification.is_fatal(),
        });

        match classification {
            Classification::Warning(_) => {
                run.warnings.push(line);
                Ok(())
            }
            Classification::Fatal(_) => {
                run.aborted = true;
                Err(MapError {
                    message: line,
                    rule: run.current_rule.clone(),
                })
            }
        }
    }

    /// Unwrap a step that has no way to continue after a failure
    fn guard<T, E>(&self, run: &mut RunState<'_, '_>, result: Result<T, E>) -> Result<T, MapError>
    where
        E: Into<MappingFailure>,
    {
        result.map_err(|error| match self.handle(run, error.into()) {
            Err(error) => error,
            Ok(()) => {
                run.aborted = true;
                MapError {
                    message: run.warnings.last().cloned().unwrap_or_default(),
                    rule: run.current_rule.clone(),
                }
            }
        })
    }

    fn finish_aborted(&mut self, run: &RunState<'_, '_>, manager: &mut OntologyManager, ontology: &mut Ontology) {
        self.tracker.record(run.changes());
        if !self.config.rollback_on_abort {
            return;
        }
        match self.tracker.undo(manager, ontology) {
            Ok(removed) => info!(run_id = %run.run_id, removed, "aborted run rolled back"),
            Err(error) => self.emit(MappingEvent::Failure {
                line: format!("{} Rollback failed: {}", self.config.log_tag, error),
                fatal: true,
            }),
        }
    }

    fn emit(&self, event: MappingEvent) {
        let line = event.render(&self.config.log_tag);
        self.observer.notify(&event, &line);
    }
}

impl std::fmt::Debug for MapperManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperManager")
            .field("config", &self.config)
            .field("last_changes", &self.tracker.last_changes().len())
            .finish()
    }
}

fn setup(context: &mut EvaluationContext, rules: Node<'_, '_>) -> Result<MappingSetup, MappingFailure> {
    let namespaces = context.import_namespaces(rules)?;
    let parameters = MappingParameters::extract(context.rules(), rules)?;
    let reference_names = ReferenceNameSet::collect(context.rules(), rules)?;
    Ok(MappingSetup {
        parameters,
        reference_names,
        namespaces,
    })
}

/// Describe the parameters, namespaces, reference names and executable
/// rules of a rule document
pub fn inspect(config: &MapperConfig, rules: &Document<'_>) -> Result<RuleSetSummary, MapError> {
    let root = rules.root_element();
    let mut context = EvaluationContext::new(&config.rules_namespace);
    let setup = setup(&mut context, root).map_err(|failure| MapError {
        message: classify(&failure).diagnostic().line(&config.log_tag),
        rule: None,
    })?;

    let rules = RuleSequencer::new(root, &config.selection)
        .enumerate()
        .map(|(position, node)| RuleSummary {
            position,
            name: node.tag_name().name().to_string(),
            reference_name: node.attribute("referenceName").map(str::to_string),
        })
        .collect();

    Ok(RuleSetSummary {
        parameters: setup.parameters,
        namespaces: setup.namespaces,
        reference_names: setup.reference_names,
        rules,
    })
}
