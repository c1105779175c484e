//! Rule and data path evaluators of one mapping run

use serde::{Deserialize, Serialize};
use tracing::debug;
use xml2owl_xpath::{PathError, PathEvaluator, XPathEvaluator};

/// A namespace prefix declared by the rule document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceBinding {
    pub prefix: String,
    pub uri: String,
}

/// The two evaluators a run works with.
///
/// The rules evaluator resolves unprefixed names in the rule document
/// namespace. The data evaluator starts without any default namespace and
/// learns the prefixes the rule document declares.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    rules: XPathEvaluator,
    data: XPathEvaluator,
}

impl EvaluationContext {
    pub fn new(rules_namespace: &str) -> Self {
        Self {
            rules: XPathEvaluator::new(rules_namespace),
            data: XPathEvaluator::new(""),
        }
    }

    pub fn rules(&self) -> &XPathEvaluator {
        &self.rules
    }

    pub fn data(&self) -> &XPathEvaluator {
        &self.data
    }

    /// Register every `namespaces/namespace` declaration of the rule root on
    /// the data evaluator. Declarations are applied in document order, so a
    /// prefix declared twice ends up bound to its last URI.
    pub fn import_namespaces(&mut self, rules: roxmltree::Node<'_, '_>) -> Result<Vec<NamespaceBinding>, PathError> {
        let mut bindings = Vec::new();
        for declaration in self.rules.find_nodes(rules, "namespaces/namespace")? {
            let prefix = self.rules.find_string(declaration, "@prefix")?;
            let uri = self.rules.find_string(declaration, "@name")?;
            debug!(prefix = %prefix, uri = %uri, "namespace declared");
            self.data.add_namespace(&prefix, &uri);
            bindings.push(NamespaceBinding { prefix, uri });
        }
        Ok(bindings)
    }

    /// Prefixes currently bound on the data evaluator
    pub fn data_namespaces(&self) -> Vec<NamespaceBinding> {
        self.data
            .namespaces()
            .map(|(prefix, uri)| NamespaceBinding {
                prefix: prefix.to_string(),
                uri: uri.to_string(),
            })
            .collect()
    }
}
