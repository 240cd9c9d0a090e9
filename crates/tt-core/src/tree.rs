use tracing::warn;

use crate::category::Category;
use crate::element::{Element, ElementDef, ElementId, Utterance};
use crate::trigger::Trigger;

/// Arena holding every element of a scenario.
///
/// Parent/child links are ids into the arena, so each child has exactly one
/// parent and the structure cannot contain cycles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementTree {
    nodes: Vec<Element>,
    roots: Vec<ElementId>,
}

impl ElementTree {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the arena from nested definitions.
    ///
    /// Malformed triples and unknown trigger names do not fail the build;
    /// they are described in `warnings` and the element is kept.
    pub fn from_defs(defs: Vec<ElementDef>, warnings: &mut Vec<String>) -> Self {
        let mut tree = Self::new();
        for def in defs {
            let id = tree.insert(def, None, warnings);
            tree.roots.push(id);
        }
        tree
    }

    fn insert(
        &mut self,
        def: ElementDef,
        parent: Option<ElementId>,
        warnings: &mut Vec<String>,
    ) -> ElementId {
        let id = ElementId(self.nodes.len());
        let category = Category::parse(&def.category);

        let learner_response = triple(def.learner_response, id, "LearnerResponse", warnings);
        let answer = triple(def.answer, id, "Answer", warnings);

        let triggers: Vec<Trigger> = def
            .function
            .unwrap_or_default()
            .iter()
            .filter(|name| !name.trim().is_empty())
            .map(|name| Trigger::parse(name))
            .collect();
        for trigger in triggers.iter().filter(|t| !t.is_known()) {
            let msg = format!("element {id}: unknown trigger \"{trigger}\"");
            warn!(element = %id, trigger = %trigger, "unknown trigger in scenario content");
            warnings.push(msg);
        }

        self.nodes.push(Element {
            id,
            parent,
            category,
            learner_response,
            matches: def.matches.unwrap_or_default(),
            answer,
            score: def.score,
            triggers,
            children: Vec::new(),
        });

        // Pre-order: the parent's id is taken before any child is inserted.
        let children: Vec<ElementId> = def
            .child
            .unwrap_or_default()
            .into_iter()
            .map(|child| self.insert(child, Some(id), warnings))
            .collect();
        self.nodes[id.0].children = children;
        id
    }

    /// Append a root element built in code. Returns its id.
    pub fn add_root(&mut self, element: Element) -> ElementId {
        let id = self.push(element, None);
        self.roots.push(id);
        id
    }

    /// Append a child under `parent`. Returns `None` if the parent does not exist.
    pub fn add_child(&mut self, parent: ElementId, element: Element) -> Option<ElementId> {
        if !self.contains(parent) {
            return None;
        }
        let id = self.push(element, Some(parent));
        self.nodes[parent.0].children.push(id);
        Some(id)
    }

    fn push(&mut self, mut element: Element, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.nodes.len());
        element.id = id;
        element.parent = parent;
        element.children.clear();
        self.nodes.push(element);
        id
    }

    /// Look up an element.
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.nodes.get(id.0)
    }

    /// Whether `id` belongs to this tree.
    pub fn contains(&self, id: ElementId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Top-level elements, visible from the start of an attempt.
    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    /// Children of `id`; empty for leaves and unknown ids.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no elements.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All elements in arena order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter()
    }

    /// Depth-first pre-order walk from the roots: parent before children,
    /// children in declaration order.
    pub fn flatten(&self) -> Vec<ElementId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<ElementId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Depth of an element (roots are 0).
    pub fn depth(&self, id: ElementId) -> usize {
        let mut depth = 0;
        let mut cursor = self.get(id).and_then(|e| e.parent);
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.get(parent).and_then(|e| e.parent);
        }
        depth
    }
}

fn triple(
    parts: Option<Vec<String>>,
    id: ElementId,
    field: &str,
    warnings: &mut Vec<String>,
) -> Option<Utterance> {
    let parts = parts?;
    if parts.is_empty() {
        return None;
    }
    let utterance = Utterance::from_parts(&parts);
    if utterance.is_none() {
        warn!(element = %id, field, len = parts.len(), "malformed triple, element will not match");
        warnings.push(format!(
            "element {id}: {field} has {} parts, expected 3",
            parts.len()
        ));
    }
    utterance
}

/// Convenience constructor for elements built in code (tests, tools).
pub fn element(
    category: Category,
    learner: Option<Utterance>,
    answer: Option<Utterance>,
) -> Element {
    Element {
        id: ElementId(0),
        parent: None,
        category,
        learner_response: learner,
        matches: Vec::new(),
        answer,
        score: 0,
        triggers: Vec::new(),
        children: Vec::new(),
    }
}
