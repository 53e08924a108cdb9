#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod diagram;
pub mod fetch;
pub mod graph;
pub mod inspector;
pub mod layout;
pub mod model;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, FetchConfig, LayoutConfig, RenderConfig, load_config};
pub use diagram::{Canvas, Diagram, DiagramState, Interaction, Viewport};
pub use fetch::{FetchError, WorkflowClient, decode_workflow, decode_workflow_str};
pub use graph::{Category, Edge, GraphModel, Node, build_graph, categorize};
pub use inspector::NodeDetails;
pub use layout::{Direction, Layout, NodeLayout, Side, compute_layout};
pub use model::Step;
pub use render::{SvgSurface, write_output_svg};
pub use theme::Theme;
