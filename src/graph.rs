use crate::model::Step;

/// Color category of a node, derived from its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Wing,
    Fuselage,
    Tail,
    Gear,
    General,
}

/// One keyword → category rule. Rules are applied in order against the
/// lowercased title; the first match wins.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub keyword: &'static str,
    pub category: Category,
}

pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule { keyword: "wing", category: Category::Wing },
    CategoryRule { keyword: "fuselage", category: Category::Fuselage },
    CategoryRule { keyword: "tail", category: Category::Tail },
    CategoryRule { keyword: "gear", category: Category::Gear },
];

pub fn categorize(title: &str) -> Category {
    let title = title.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|rule| title.contains(rule.keyword))
        .map(|rule| rule.category)
        .unwrap_or(Category::General)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub category: Category,
    /// The originating record, kept whole for the inspector.
    pub step: Step,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn between(source: &str, target: &str) -> Self {
        Self {
            id: format!("e-{source}-{target}"),
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphModel {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphModel {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

/// Builds the diagram model from a batch of steps.
///
/// One node per step in input order, one edge per listed dependency in
/// listing order (dependency → dependent). Dependencies are not resolved
/// against the node set here; unknown ids surface later as placeholder
/// layout entries. A dependency listed twice yields two edges sharing the
/// same generated id.
pub fn build_graph(steps: &[Step]) -> GraphModel {
    let mut nodes = Vec::with_capacity(steps.len());
    let mut edges = Vec::new();

    for step in steps {
        nodes.push(Node {
            id: step.id.clone(),
            label: step.display_label().to_string(),
            category: categorize(step.display_label()),
            step: step.clone(),
        });
        for dep in step.dependency_ids() {
            edges.push(Edge::between(dep, &step.id));
        }
    }

    GraphModel { nodes, edges }
}
