use super::types::NodeId;
use smol_str::SmolStr;
use std::fmt;

/// Internal node of the containment tree.
///
/// `name` identifies what the compound is (`CH3`, `Alkylsilane`, ...) and is what ancestry
/// queries report. Children are kept in insertion order, which fixes the flatten order. The
/// label table maps sibling-unique labels to owned children and to hoisted aliases of deeper
/// descendants.
#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    pub name: SmolStr,
    children: Vec<NodeId>,
    labels: Vec<(SmolStr, NodeId)>,
}

impl Compound {
    pub fn new(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            children: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Owned children in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// All labels, owned and hoisted, in the order they were registered.
    pub fn labels(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.labels.iter().map(|(label, id)| (label.as_str(), *id))
    }

    pub fn child(&self, label: &str) -> Option<NodeId> {
        self.labels
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, id)| *id)
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|(existing, _)| existing == label)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// First free label of the form `base[n]`.
    pub(crate) fn next_label(&self, base: &str) -> SmolStr {
        let mut n = self
            .labels
            .iter()
            .filter(|(label, _)| label.starts_with(base) && label[base.len()..].starts_with('['))
            .count();
        loop {
            let candidate = SmolStr::new(format!("{base}[{n}]"));
            if !self.has_label(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    pub(crate) fn push_child(&mut self, id: NodeId, label: SmolStr) {
        self.children.push(id);
        self.labels.push((label, id));
    }

    pub(crate) fn push_alias(&mut self, id: NodeId, label: SmolStr) {
        self.labels.push((label, id));
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(NodeId) -> bool) {
        self.children.retain(|id| keep(*id));
        self.labels.retain(|(_, id)| keep(*id));
    }

    pub(crate) fn remap(&mut self, mut map: impl FnMut(NodeId) -> Option<NodeId>) {
        self.children = self.children.iter().filter_map(|id| map(*id)).collect();
        self.labels = self
            .labels
            .iter()
            .filter_map(|(label, id)| map(*id).map(|new| (label.clone(), new)))
            .collect();
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Compound {{ name: \"{}\", children: {}, labels: {} }}",
            self.name,
            self.children.len(),
            self.labels.len()
        )
    }
}
