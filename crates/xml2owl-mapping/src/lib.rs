//! # xml2owl Mapping
//!
//! Orchestrates the application of an XML2OWL rule document to XML data:
//! reads the document's namespaces, parameters and reference names, runs
//! the selected rules in order through a pluggable [`RuleApplier`],
//! classifies failures, materialises inferences and remembers the changes
//! so the run can be undone.
//!
//! ```no_run
//! use xml2owl_core::{Ontology, OntologyManager};
//! use xml2owl_mapping::{MapperManager, MappingSetup, RuleApplier};
//!
//! # fn applier(_: &MappingSetup) -> Box<dyn RuleApplier> { unimplemented!() }
//! let rules = roxmltree::Document::parse("<rules/>").unwrap();
//! let data = roxmltree::Document::parse("<data/>").unwrap();
//! let mut manager = OntologyManager::new();
//! let mut ontology = Ontology::new();
//!
//! let mut mapper = MapperManager::new(Box::new(applier));
//! let report = mapper.map(&mut manager, &rules, &mut ontology, &data).unwrap();
//! println!("{} rules applied", report.rules_applied);
//! mapper.unmap(&mut manager, &mut ontology).unwrap();
//! ```

pub mod applier;
pub mod classifier;
pub mod config;
pub mod context;
pub mod error;
pub mod manager;
pub mod observer;
pub mod parameters;
pub mod references;
pub mod sequencer;
pub mod tracker;

pub use applier::{MappingSetup, ReasoningSession, RuleApplier, RuleApplierFactory, RuleScope};
pub use classifier::{classify, Classification, Diagnostic};
pub use config::{MapperConfig, RuleSelection};
pub use context::{EvaluationContext, NamespaceBinding};
pub use error::{ConfigError, MapError, MappingException, MappingFailure};
pub use manager::{inspect, MapperManager, MappingReport, RuleSetSummary, RuleSummary};
pub use observer::{MappingEvent, MappingObserver, RecordingObserver, TracingObserver};
pub use parameters::MappingParameters;
pub use references::ReferenceNameSet;
pub use sequencer::RuleSequencer;
pub use tracker::ChangeTracker;
