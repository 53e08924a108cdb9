use std::path::Path;

use anyhow::Result;

use crate::config::RenderConfig;
use crate::diagram::{Canvas, Viewport};
use crate::graph::{Category, Edge, Node};
use crate::layout::{Layout, NodeLayout, Side};
use crate::theme::Theme;

const EDGE_CORNER_RADIUS: f32 = 8.0;
const MINIMAP_WIDTH: f32 = 180.0;
const MINIMAP_MARGIN: f32 = 12.0;

/// The built-in rendering surface: collects what the diagram pushes
/// through the [`Canvas`] seam and turns it into an SVG snapshot.
#[derive(Debug, Default)]
pub struct SvgSurface {
    nodes: Vec<SurfaceNode>,
    edges: Vec<Edge>,
    layout: Option<Layout>,
    viewport: Option<Viewport>,
}

#[derive(Debug, Clone)]
struct SurfaceNode {
    label: String,
    category: Category,
    layout: NodeLayout,
}

impl Canvas for SvgSurface {
    fn set_nodes(&mut self, nodes: &[Node], layout: &Layout) {
        self.nodes = nodes
            .iter()
            .filter_map(|node| {
                layout.node(&node.id).map(|entry| SurfaceNode {
                    label: node.label.clone(),
                    category: node.category,
                    layout: entry.clone(),
                })
            })
            .collect();
        self.layout = Some(layout.clone());
    }

    fn set_edges(&mut self, edges: &[Edge]) {
        self.edges = edges.to_vec();
    }

    fn fit_view(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }
}

impl SvgSurface {
    pub fn render(&self, theme: &Theme, config: &RenderConfig) -> String {
        let width = config.width;
        let height = config.height;
        let mut svg = String::new();

        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
        ));

        svg.push_str("<defs>");
        svg.push_str(&format!(
            "<pattern id=\"grid\" width=\"{gap}\" height=\"{gap}\" patternUnits=\"userSpaceOnUse\"><circle cx=\"1\" cy=\"1\" r=\"1\" fill=\"{color}\"/></pattern>",
            gap = config.grid_gap,
            color = theme.grid_color
        ));
        svg.push_str(
            "<filter id=\"node-shadow\" x=\"-20%\" y=\"-20%\" width=\"140%\" height=\"140%\"><feDropShadow dx=\"0\" dy=\"2\" stdDeviation=\"2\" flood-opacity=\"0.08\"/></filter>",
        );
        svg.push_str(&format!(
            "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"9\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
            theme.line_color
        ));
        svg.push_str("</defs>");

        svg.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            theme.background
        ));
        svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"url(#grid)\"/>");

        match self.viewport {
            Some(viewport) => svg.push_str(&format!(
                "<g transform=\"translate({:.2} {:.2}) scale({:.4})\">",
                viewport.x, viewport.y, viewport.zoom
            )),
            None => svg.push_str("<g>"),
        }

        if let Some(layout) = &self.layout {
            for edge in &self.edges {
                let Some(source) = layout.node(&edge.source) else {
                    continue;
                };
                let Some(target) = layout.node(&edge.target) else {
                    continue;
                };
                // Connectors into placeholder entries are dropped, not
                // mis-rendered; the layout pass already logged the orphan.
                if source.placeholder || target.placeholder {
                    continue;
                }
                let d = connector_path(
                    anchor_point(source, source.source_side),
                    anchor_point(target, target.target_side),
                );
                svg.push_str(&format!(
                    "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.6\" stroke-dasharray=\"5 5\" marker-end=\"url(#arrow)\">",
                    d, theme.line_color
                ));
                // Marching-dash motion cue; purely cosmetic.
                svg.push_str(
                    "<animate attributeName=\"stroke-dashoffset\" from=\"10\" to=\"0\" dur=\"0.6s\" repeatCount=\"indefinite\"/>",
                );
                svg.push_str("</path>");
            }
        }

        for node in &self.nodes {
            let entry = &node.layout;
            svg.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\" filter=\"url(#node-shadow)\"/>",
                entry.x,
                entry.y,
                entry.width,
                entry.height,
                theme.category_fill(node.category),
                theme.node_border_color
            ));
            let center_x = entry.x + entry.width / 2.0;
            let center_y = entry.y + entry.height / 2.0;
            svg.push_str(&format!(
                "<text x=\"{center_x:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">{}</text>",
                center_y - 2.0,
                theme.font_family,
                theme.font_size,
                theme.node_text_color,
                escape_xml(&node.label)
            ));
            svg.push_str(&format!(
                "<text x=\"{center_x:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"11\" fill=\"{}\">({})</text>",
                center_y + 14.0,
                theme.font_family,
                theme.node_subtext_color,
                escape_xml(&entry.id)
            ));
        }

        svg.push_str("</g>");

        if config.minimap {
            self.push_minimap(&mut svg, theme, config);
        }

        svg.push_str("</svg>");
        svg
    }

    fn push_minimap(&self, svg: &mut String, theme: &Theme, config: &RenderConfig) {
        let Some(layout) = &self.layout else {
            return;
        };
        if layout.width <= 0.0 || layout.height <= 0.0 {
            return;
        }
        let scale = (MINIMAP_WIDTH / layout.width).min(MINIMAP_WIDTH / layout.height);
        let map_w = layout.width * scale;
        let map_h = layout.height * scale;
        let origin_x = config.width - map_w - MINIMAP_MARGIN;
        let origin_y = config.height - map_h - MINIMAP_MARGIN;

        svg.push_str(&format!(
            "<g class=\"minimap\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" fill-opacity=\"0.9\" stroke=\"{}\"/>",
            origin_x - 4.0,
            origin_y - 4.0,
            map_w + 8.0,
            map_h + 8.0,
            theme.background,
            theme.minimap_stroke
        ));
        for node in &self.nodes {
            let entry = &node.layout;
            svg.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"0.5\"/>",
                origin_x + entry.x * scale,
                origin_y + entry.y * scale,
                entry.width * scale,
                entry.height * scale,
                theme.category_fill(node.category),
                theme.minimap_stroke
            ));
        }
        svg.push_str("</g>");
    }
}

fn anchor_point(node: &NodeLayout, side: Side) -> (f32, f32) {
    match side {
        Side::Left => (node.x, node.y + node.height / 2.0),
        Side::Right => (node.x + node.width, node.y + node.height / 2.0),
        Side::Top => (node.x + node.width / 2.0, node.y),
        Side::Bottom => (node.x + node.width / 2.0, node.y + node.height),
    }
}

/// Smooth stepped connector: an orthogonal route split at the midpoint of
/// the main axis, with rounded corners.
fn connector_path(from: (f32, f32), to: (f32, f32)) -> String {
    let horizontal = (to.0 - from.0).abs() >= (to.1 - from.1).abs();
    let points = if horizontal {
        let mid = (from.0 + to.0) / 2.0;
        vec![from, (mid, from.1), (mid, to.1), to]
    } else {
        let mid = (from.1 + to.1) / 2.0;
        vec![from, (from.0, mid), (to.0, mid), to]
    };
    rounded_path(&points, EDGE_CORNER_RADIUS)
}

fn rounded_path(points: &[(f32, f32)], radius: f32) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = format!("M {:.2} {:.2}", points[0].0, points[0].1);
    for idx in 1..points.len().saturating_sub(1) {
        let prev = points[idx - 1];
        let corner = points[idx];
        let next = points[idx + 1];
        let len_in = ((corner.0 - prev.0).powi(2) + (corner.1 - prev.1).powi(2)).sqrt();
        let len_out = ((next.0 - corner.0).powi(2) + (next.1 - corner.1).powi(2)).sqrt();
        let r = radius.min(len_in / 2.0).min(len_out / 2.0);
        if r < 0.5 || len_in == 0.0 || len_out == 0.0 {
            d.push_str(&format!(" L {:.2} {:.2}", corner.0, corner.1));
            continue;
        }
        let entry = (
            corner.0 - (corner.0 - prev.0) / len_in * r,
            corner.1 - (corner.1 - prev.1) / len_in * r,
        );
        let exit = (
            corner.0 + (next.0 - corner.0) / len_out * r,
            corner.1 + (next.1 - corner.1) / len_out * r,
        );
        d.push_str(&format!(
            " L {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}",
            entry.0, entry.1, corner.0, corner.1, exit.0, exit.1
        ));
    }
    if points.len() > 1 {
        let last = points[points.len() - 1];
        d.push_str(&format!(" L {:.2} {:.2}", last.0, last.1));
    }
    d
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, config: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.default_size = usvg::Size::from_wh(config.width, config.height)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}
