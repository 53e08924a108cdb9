use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry knobs for the layered layout.
///
/// The node footprint is uniform: every node is laid out as a
/// `node_width` × `node_height` rectangle regardless of its label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    /// Gap between consecutive ranks along the primary axis.
    pub rank_gap: f32,
    /// Gap between neighboring nodes within a rank.
    pub node_gap: f32,
    /// Median-ordering sweep count for crossing reduction.
    pub order_passes: usize,
    /// Fit-view margin as a fraction of the viewport on each axis.
    pub fit_padding: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 220.0,
            node_height: 70.0,
            rank_gap: 80.0,
            node_gap: 40.0,
            order_passes: 2,
            fit_padding: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/file/return-json/".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Viewport the snapshot is fitted into.
    pub width: f32,
    pub height: f32,
    pub grid_gap: f32,
    pub minimap: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            grid_gap: 24.0,
            minimap: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub fetch: FetchConfig,
    pub render: RenderConfig,
}

/// On-disk config shape: everything optional, merged over defaults.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutFile>,
    fetch: Option<FetchFile>,
    render: Option<RenderFile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    node_border_color: Option<String>,
    node_text_color: Option<String>,
    line_color: Option<String>,
    default_fill: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LayoutFile {
    node_width: Option<f32>,
    node_height: Option<f32>,
    rank_gap: Option<f32>,
    node_gap: Option<f32>,
    order_passes: Option<usize>,
    fit_padding: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct FetchFile {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RenderFile {
    width: Option<f32>,
    height: Option<f32>,
    grid_gap: Option<f32>,
    minimap: Option<bool>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "slate" || theme_name == "dark" {
            config.theme = Theme::slate();
        } else if theme_name == "light" || theme_name == "default" {
            config.theme = Theme::light();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.node_border_color {
            config.theme.node_border_color = v;
        }
        if let Some(v) = vars.node_text_color {
            config.theme.node_text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.default_fill {
            config.theme.default_fill = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.node_width {
            config.layout.node_width = v;
        }
        if let Some(v) = layout.node_height {
            config.layout.node_height = v;
        }
        if let Some(v) = layout.rank_gap {
            config.layout.rank_gap = v;
        }
        if let Some(v) = layout.node_gap {
            config.layout.node_gap = v;
        }
        if let Some(v) = layout.order_passes {
            config.layout.order_passes = v;
        }
        if let Some(v) = layout.fit_padding {
            config.layout.fit_padding = v;
        }
    }

    if let Some(fetch) = parsed.fetch {
        if let Some(v) = fetch.base_url {
            config.fetch.base_url = v;
        }
        if let Some(v) = fetch.timeout_secs {
            config.fetch.timeout_secs = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.grid_gap {
            config.render.grid_gap = v;
        }
        if let Some(v) = render.minimap {
            config.render.minimap = v;
        }
    }

    Ok(config)
}
