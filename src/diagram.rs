use crate::config::LayoutConfig;
use crate::fetch::FetchError;
use crate::graph::{Edge, GraphModel, Node, build_graph};
use crate::inspector::NodeDetails;
use crate::layout::{Direction, Layout, compute_layout};
use crate::model::Step;

/// Discrete user interaction events. Handlers never overlap: the component
/// is driven from a single thread of control.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    NodeClicked(String),
    BackgroundClicked,
    /// Drag-to-connect released over a target node.
    Connect { source: String, target: String },
    PanelClosed,
}

/// Viewport transform produced by fit-view: screen = world * zoom + (x, y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f32,
    pub x: f32,
    pub y: f32,
}

/// Seam between the diagram component and whatever draws it. Keeps the
/// model and layout logic testable without a real rendering surface.
pub trait Canvas {
    fn set_nodes(&mut self, nodes: &[Node], layout: &Layout);
    fn set_edges(&mut self, edges: &[Edge]);
    fn fit_view(&mut self, viewport: Viewport);
}

#[derive(Debug)]
pub enum DiagramState {
    Loading,
    Ready(ReadyState),
    /// Terminal for this fetch attempt; the message is shown verbatim.
    Failed(String),
}

#[derive(Debug)]
pub struct ReadyState {
    pub graph: GraphModel,
    pub layout: Layout,
    pub selection: Option<String>,
}

/// The diagram component. Owns its state for one fetch lifecycle:
/// `Loading` until the fetch outcome arrives, then `Ready` (interactive
/// indefinitely) or `Failed` (terminal, no retry).
pub struct Diagram {
    direction: Direction,
    config: LayoutConfig,
    state: DiagramState,
}

impl Diagram {
    pub fn new(direction: Direction, config: LayoutConfig) -> Self {
        Self {
            direction,
            config,
            state: DiagramState::Loading,
        }
    }

    pub fn state(&self) -> &DiagramState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, DiagramState::Ready(_))
    }

    /// The single point where a fetch outcome becomes UI state. Every
    /// failure lands in `Failed` with its message; there is no partial
    /// success.
    pub fn resolve(&mut self, outcome: Result<Vec<Step>, FetchError>) {
        match outcome {
            Ok(steps) => {
                let graph = build_graph(&steps);
                let layout = compute_layout(&graph, self.direction, &self.config);
                tracing::debug!(
                    nodes = graph.nodes.len(),
                    edges = graph.edges.len(),
                    "workflow diagram ready"
                );
                self.state = DiagramState::Ready(ReadyState {
                    graph,
                    layout,
                    selection: None,
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "workflow load failed");
                self.state = DiagramState::Failed(err.to_string());
            }
        }
    }

    /// Applies one interaction event. Ignored unless the diagram is ready.
    pub fn handle(&mut self, event: Interaction) {
        let DiagramState::Ready(ready) = &mut self.state else {
            return;
        };
        match event {
            Interaction::NodeClicked(id) => {
                ready.selection = Some(id);
            }
            Interaction::BackgroundClicked | Interaction::PanelClosed => {
                ready.selection = None;
            }
            Interaction::Connect { source, target } => {
                ready.graph.edges.push(Edge::between(&source, &target));
                // The edge set changed, so positions are recomputed.
                ready.layout = compute_layout(&ready.graph, self.direction, &self.config);
            }
        }
    }

    pub fn selection(&self) -> Option<&str> {
        match &self.state {
            DiagramState::Ready(ready) => ready.selection.as_deref(),
            _ => None,
        }
    }

    /// Resolves the current selection to its metadata: the full step
    /// record when the node has one, otherwise the `{id, label}` stand-in.
    pub fn selected_details(&self) -> Option<NodeDetails> {
        let DiagramState::Ready(ready) = &self.state else {
            return None;
        };
        let id = ready.selection.as_deref()?;
        match ready.graph.node(id) {
            Some(node) => Some(NodeDetails::from_step(&node.step)),
            None => Some(NodeDetails::placeholder(id, id)),
        }
    }

    /// Viewport transform that fits the whole graph into `viewport_w` ×
    /// `viewport_h` with the configured padding fraction on each axis.
    pub fn fit_view(&self, viewport_w: f32, viewport_h: f32) -> Option<Viewport> {
        let DiagramState::Ready(ready) = &self.state else {
            return None;
        };
        let bounds_w = ready.layout.width.max(1.0);
        let bounds_h = ready.layout.height.max(1.0);
        let pad = self.config.fit_padding;
        let zoom_x = viewport_w / (bounds_w * (1.0 + 2.0 * pad));
        let zoom_y = viewport_h / (bounds_h * (1.0 + 2.0 * pad));
        let zoom = zoom_x.min(zoom_y);
        Some(Viewport {
            zoom,
            x: (viewport_w - bounds_w * zoom) / 2.0,
            y: (viewport_h - bounds_h * zoom) / 2.0,
        })
    }

    /// Pushes the current state onto a rendering surface.
    pub fn sync(&self, canvas: &mut dyn Canvas, viewport_w: f32, viewport_h: f32) {
        let DiagramState::Ready(ready) = &self.state else {
            return;
        };
        canvas.set_nodes(&ready.graph.nodes, &ready.layout);
        canvas.set_edges(&ready.graph.edges);
        if let Some(viewport) = self.fit_view(viewport_w, viewport_h) {
            canvas.fit_view(viewport);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Step;

    fn step(id: &str, title: &str, deps: &[&str]) -> Step {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "dependencies": deps,
        }))
        .expect("step decode failed")
    }

    fn ready_diagram() -> Diagram {
        let mut diagram = Diagram::new(Direction::LeftRight, LayoutConfig::default());
        diagram.resolve(Ok(vec![
            step("A", "Wing Spar", &[]),
            step("B", "Fuselage Frame", &["A"]),
        ]));
        diagram
    }

    #[derive(Default)]
    struct RecordingCanvas {
        node_ids: Vec<String>,
        edge_ids: Vec<String>,
        viewport: Option<Viewport>,
    }

    impl Canvas for RecordingCanvas {
        fn set_nodes(&mut self, nodes: &[Node], _layout: &Layout) {
            self.node_ids = nodes.iter().map(|node| node.id.clone()).collect();
        }

        fn set_edges(&mut self, edges: &[Edge]) {
            self.edge_ids = edges.iter().map(|edge| edge.id.clone()).collect();
        }

        fn fit_view(&mut self, viewport: Viewport) {
            self.viewport = Some(viewport);
        }
    }

    #[test]
    fn starts_loading_and_resolves_to_ready() {
        let mut diagram = Diagram::new(Direction::LeftRight, LayoutConfig::default());
        assert!(matches!(diagram.state(), DiagramState::Loading));
        diagram.resolve(Ok(vec![step("A", "Wing Spar", &[])]));
        assert!(diagram.is_ready());
    }

    #[test]
    fn timeout_resolves_to_failed_with_timeout_message() {
        let mut diagram = Diagram::new(Direction::LeftRight, LayoutConfig::default());
        diagram.resolve(Err(FetchError::Timeout));
        match diagram.state() {
            DiagramState::Failed(message) => assert!(message.contains("timed out")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn malformed_input_resolves_to_failed() {
        let mut diagram = Diagram::new(Direction::LeftRight, LayoutConfig::default());
        diagram.resolve(Err(FetchError::Malformed("`tree` is not an array".to_string())));
        assert!(matches!(diagram.state(), DiagramState::Failed(_)));
    }

    #[test]
    fn selection_round_trip() {
        let mut diagram = ready_diagram();
        diagram.handle(Interaction::NodeClicked("A".to_string()));
        assert_eq!(diagram.selection(), Some("A"));

        diagram.handle(Interaction::BackgroundClicked);
        assert_eq!(diagram.selection(), None);

        diagram.handle(Interaction::NodeClicked("A".to_string()));
        diagram.handle(Interaction::NodeClicked("B".to_string()));
        assert_eq!(diagram.selection(), Some("B"));

        diagram.handle(Interaction::PanelClosed);
        assert_eq!(diagram.selection(), None);
    }

    #[test]
    fn selected_details_use_the_full_record() {
        let mut diagram = ready_diagram();
        diagram.handle(Interaction::NodeClicked("B".to_string()));
        let details = diagram.selected_details().expect("details missing");
        assert_eq!(details.title, "Fuselage Frame");
        assert_eq!(details.dependencies.as_deref(), Some(&["A".to_string()][..]));
    }

    #[test]
    fn clicking_an_unknown_node_yields_a_stand_in() {
        let mut diagram = ready_diagram();
        diagram.handle(Interaction::NodeClicked("GHOST".to_string()));
        let details = diagram.selected_details().expect("details missing");
        assert_eq!(details.id, "GHOST");
        assert_eq!(details.title, "Node GHOST");
    }

    #[test]
    fn connect_appends_a_styled_edge_and_relayouts() {
        let mut diagram = ready_diagram();
        diagram.handle(Interaction::Connect {
            source: "B".to_string(),
            target: "A".to_string(),
        });
        let DiagramState::Ready(ready) = diagram.state() else {
            panic!("expected Ready");
        };
        assert_eq!(ready.graph.edges.len(), 2);
        assert_eq!(ready.graph.edges[1].id, "e-B-A");
        // Layout covers the new edge set.
        assert_eq!(ready.layout.nodes.len(), 2);
    }

    #[test]
    fn interactions_before_ready_are_ignored() {
        let mut diagram = Diagram::new(Direction::LeftRight, LayoutConfig::default());
        diagram.handle(Interaction::NodeClicked("A".to_string()));
        assert_eq!(diagram.selection(), None);
    }

    #[test]
    fn fit_view_keeps_bounds_inside_the_viewport() {
        let diagram = ready_diagram();
        let viewport = diagram.fit_view(1200.0, 800.0).expect("viewport missing");
        let DiagramState::Ready(ready) = diagram.state() else {
            panic!("expected Ready");
        };
        let shown_w = ready.layout.width * viewport.zoom;
        let shown_h = ready.layout.height * viewport.zoom;
        assert!(shown_w <= 1200.0);
        assert!(shown_h <= 800.0);
        // 20% padding on each side of the limiting axis.
        let slack_w = 1200.0 - shown_w;
        let slack_h = 800.0 - shown_h;
        assert!(slack_w >= 2.0 * 0.2 * shown_w - 1.0 || slack_h >= 2.0 * 0.2 * shown_h - 1.0);
    }

    #[test]
    fn sync_pushes_state_to_the_canvas() {
        let diagram = ready_diagram();
        let mut canvas = RecordingCanvas::default();
        diagram.sync(&mut canvas, 1200.0, 800.0);
        assert_eq!(canvas.node_ids, ["A", "B"]);
        assert_eq!(canvas.edge_ids, ["e-A-B"]);
        assert!(canvas.viewport.is_some());
    }
}
