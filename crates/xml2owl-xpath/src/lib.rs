//! # xml2owl XPath
//!
//! Location path evaluation over [`roxmltree`] documents.
//!
//! Supported expressions are absolute or relative location paths made of
//! `/` and `//` separated steps: `.`, `..`, `*`, `name`, `prefix:name`,
//! `@name`, `@*` and `text()`, each optionally followed by `[n]`, `[@a]`
//! or `[@a='v']` predicates.

pub mod evaluator;
pub mod lexer;
pub mod parser;

pub use evaluator::XPathEvaluator;

use roxmltree::Node;
use thiserror::Error;

/// Path evaluation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Invalid path expression '{expression}': {message}")]
    Syntax { expression: String, message: String },

    #[error("Namespace prefix '{prefix}' is not bound in '{expression}'")]
    UnboundPrefix { prefix: String, expression: String },
}

/// One item of an evaluation result
#[derive(Debug, Clone)]
pub enum XdmItem<'a, 'input> {
    Node(Node<'a, 'input>),
    Attribute {
        owner: Node<'a, 'input>,
        /// Position among the owner's attributes
        index: usize,
        name: String,
        value: String,
    },
}

impl<'a, 'input> XdmItem<'a, 'input> {
    /// XPath string value: attribute value, text content, or the
    /// concatenated descendant text of an element.
    pub fn string_value(&self) -> String {
        match self {
            XdmItem::Attribute { value, .. } => value.clone(),
            XdmItem::Node(node) if node.is_text() => node.text().unwrap_or_default().to_string(),
            XdmItem::Node(node) => node
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect(),
        }
    }

    pub fn as_node(&self) -> Option<Node<'a, 'input>> {
        match self {
            XdmItem::Node(node) => Some(*node),
            XdmItem::Attribute { .. } => None,
        }
    }

    /// Document-order key; an element's attributes sort after the element
    /// and before its children.
    pub(crate) fn position(&self) -> (usize, usize) {
        match self {
            XdmItem::Node(node) => (node.id().get_usize(), 0),
            XdmItem::Attribute { owner, index, .. } => (owner.id().get_usize(), index + 1),
        }
    }
}

/// Evaluates path expressions against XML trees
pub trait PathEvaluator {
    /// Evaluate `expression` with `context` as the context node
    fn find_items<'a, 'input>(
        &self,
        context: Node<'a, 'input>,
        expression: &str,
    ) -> Result<Vec<XdmItem<'a, 'input>>, PathError>;

    /// Bind `prefix` to `uri`, replacing any earlier binding
    fn add_namespace(&mut self, prefix: &str, uri: &str);

    /// URI currently bound to `prefix`
    fn namespace(&self, prefix: &str) -> Option<&str>;

    /// String value of the first result, or `""` for an empty result
    fn find_string(&self, context: Node<'_, '_>, expression: &str) -> Result<String, PathError> {
        Ok(self
            .find_items(context, expression)?
            .first()
            .map(|item| item.string_value())
            .unwrap_or_default())
    }

    /// Node results only, in document order
    fn find_nodes<'a, 'input>(
        &self,
        context: Node<'a, 'input>,
        expression: &str,
    ) -> Result<Vec<Node<'a, 'input>>, PathError> {
        Ok(self
            .find_items(context, expression)?
            .iter()
            .filter_map(|item| item.as_node())
            .collect())
    }
}
