//! roxmltree-backed path evaluator

use crate::parser::{self, LocationPath, NameTest, Predicate, StepKind};
use crate::{PathError, PathEvaluator, XdmItem};
use roxmltree::Node;
use std::collections::{BTreeMap, HashSet};
use tracing::trace;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Path evaluator with a default element namespace and a table of
/// prefix bindings.
#[derive(Debug, Clone, Default)]
pub struct XPathEvaluator {
    /// Namespace of unprefixed element names; `None` for no namespace
    default_namespace: Option<String>,
    namespaces: BTreeMap<String, String>,
}

impl XPathEvaluator {
    /// An empty `default_namespace` means unprefixed names match
    /// elements in no namespace.
    pub fn new(default_namespace: &str) -> Self {
        Self {
            default_namespace: if default_namespace.is_empty() {
                None
            } else {
                Some(default_namespace.to_string())
            },
            namespaces: BTreeMap::new(),
        }
    }

    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Current prefix bindings, ordered by prefix
    pub fn namespaces(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.namespaces.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    fn resolve_prefix<'s>(&'s self, prefix: &str, expression: &str) -> Result<&'s str, PathError> {
        if prefix == "xml" {
            return Ok(XML_NAMESPACE);
        }
        self.namespaces
            .get(prefix)
            .map(|uri| uri.as_str())
            .ok_or_else(|| PathError::UnboundPrefix {
                prefix: prefix.to_string(),
                expression: expression.to_string(),
            })
    }

    fn element_matches(&self, node: Node<'_, '_>, test: &NameTest, expression: &str) -> Result<bool, PathError> {
        if !node.is_element() {
            return Ok(false);
        }
        match test {
            NameTest::Any => Ok(true),
            NameTest::Name { prefix, local } => {
                let expected = match prefix {
                    Some(prefix) => Some(self.resolve_prefix(prefix, expression)?),
                    None => self.default_namespace.as_deref(),
                };
                let tag = node.tag_name();
                Ok(tag.name() == local && tag.namespace() == expected)
            }
        }
    }

    fn attribute_matches(
        &self,
        name: &str,
        namespace: Option<&str>,
        test: &NameTest,
        expression: &str,
    ) -> Result<bool, PathError> {
        match test {
            NameTest::Any => Ok(true),
            NameTest::Name { prefix, local } => {
                // Unprefixed attribute names are never in a namespace
                let expected = match prefix {
                    Some(prefix) => Some(self.resolve_prefix(prefix, expression)?),
                    None => None,
                };
                Ok(name == local && namespace == expected)
            }
        }
    }

    fn evaluate_path<'a, 'input>(
        &self,
        context: Node<'a, 'input>,
        path: &LocationPath,
        expression: &str,
    ) -> Result<Vec<XdmItem<'a, 'input>>, PathError> {
        let start = if path.absolute { context.document().root() } else { context };
        let mut current = vec![XdmItem::Node(start)];

        for step in &path.steps {
            let mut next = Vec::new();
            for item in &current {
                // Attributes have no children, so only nodes can be step contexts
                let XdmItem::Node(node) = item else { continue };
                // `//step` is `descendant-or-self::node()/step`: predicates
                // count positions per context node
                let contexts: Vec<Node<'a, 'input>> =
                    if step.recursive { node.descendants().collect() } else { vec![*node] };
                for context in contexts {
                    let mut selected = self.apply_step(context, &step.kind, expression)?;
                    self.apply_predicates(&mut selected, &step.predicates, expression)?;
                    next.extend(selected);
                }
            }
            current = into_document_order(next);
        }

        Ok(current)
    }

    fn apply_step<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        kind: &StepKind,
        expression: &str,
    ) -> Result<Vec<XdmItem<'a, 'input>>, PathError> {
        let mut selected = Vec::new();
        match kind {
            StepKind::Child(test) => {
                for candidate in node.children() {
                    if self.element_matches(candidate, test, expression)? {
                        selected.push(XdmItem::Node(candidate));
                    }
                }
            }
            StepKind::Text => selected.extend(node.children().filter(|n| n.is_text()).map(XdmItem::Node)),
            StepKind::Attribute(test) => {
                if node.is_element() {
                    for (index, attribute) in node.attributes().enumerate() {
                        if self.attribute_matches(attribute.name(), attribute.namespace(), test, expression)? {
                            selected.push(XdmItem::Attribute {
                                owner: node,
                                index,
                                name: attribute.name().to_string(),
                                value: attribute.value().to_string(),
                            });
                        }
                    }
                }
            }
            StepKind::SelfNode => selected.push(XdmItem::Node(node)),
            StepKind::Parent => selected.extend(node.parent().map(XdmItem::Node)),
        }
        Ok(selected)
    }

    fn apply_predicates<'a, 'input>(
        &self,
        items: &mut Vec<XdmItem<'a, 'input>>,
        predicates: &[Predicate],
        expression: &str,
    ) -> Result<(), PathError> {
        for predicate in predicates {
            match predicate {
                Predicate::Position(position) => {
                    let kept = items.get(position - 1).cloned();
                    items.clear();
                    items.extend(kept);
                }
                Predicate::HasAttribute(test) | Predicate::AttributeEquals(test, _) => {
                    let wanted = match predicate {
                        Predicate::AttributeEquals(_, value) => Some(value.as_str()),
                        _ => None,
                    };
                    let mut kept = Vec::with_capacity(items.len());
                    for item in items.drain(..) {
                        let node = match &item {
                            XdmItem::Node(node) => *node,
                            XdmItem::Attribute { .. } => continue,
                        };
                        let mut matched = false;
                        for attribute in node.attributes() {
                            if self.attribute_matches(attribute.name(), attribute.namespace(), test, expression)?
                                && wanted.map_or(true, |v| attribute.value() == v)
                            {
                                matched = true;
                                break;
                            }
                        }
                        if matched {
                            kept.push(item);
                        }
                    }
                    *items = kept;
                }
            }
        }
        Ok(())
    }
}

/// Sort by document position and drop duplicates
fn into_document_order<'a, 'input>(mut items: Vec<XdmItem<'a, 'input>>) -> Vec<XdmItem<'a, 'input>> {
    items.sort_by_key(|item| item.position());
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(item.position()));
    items
}

impl PathEvaluator for XPathEvaluator {
    fn find_items<'a, 'input>(
        &self,
        context: Node<'a, 'input>,
        expression: &str,
    ) -> Result<Vec<XdmItem<'a, 'input>>, PathError> {
        let path = parser::parse(expression)?;
        let items = self.evaluate_path(context, &path, expression)?;
        trace!(expression, results = items.len(), "path evaluated");
        Ok(items)
    }

    fn add_namespace(&mut self, prefix: &str, uri: &str) {
        if let Some(previous) = self.namespaces.insert(prefix.to_string(), uri.to_string()) {
            trace!(prefix, previous = %previous, uri, "namespace prefix rebound");
        }
    }

    fn namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(|uri| uri.as_str())
    }
}
