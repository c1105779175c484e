//! Lazy selection of executable rules

use crate::config::RuleSelection;
use roxmltree::{Children, Node};

/// Immediate element children of the rule root whose local name is
/// selected, in document order. Children are inspected only as the
/// sequence is advanced.
pub struct RuleSequencer<'a, 'input> {
    children: Children<'a, 'input>,
    selection: RuleSelection,
}

impl<'a, 'input> RuleSequencer<'a, 'input> {
    pub fn new(rules: Node<'a, 'input>, selection: &RuleSelection) -> Self {
        Self {
            children: rules.children(),
            selection: selection.clone(),
        }
    }
}

impl<'a, 'input> Iterator for RuleSequencer<'a, 'input> {
    type Item = Node<'a, 'input>;

    fn next(&mut self) -> Option<Self::Item> {
        let selection = &self.selection;
        self.children
            .by_ref()
            .find(|node| node.is_element() && selection.matches(node.tag_name().name()))
    }
}
