use serde::{Deserialize, Serialize};

use crate::graph::Category;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub grid_color: String,
    pub node_border_color: String,
    pub node_text_color: String,
    pub node_subtext_color: String,
    pub line_color: String,
    pub wing_fill: String,
    pub fuselage_fill: String,
    pub tail_fill: String,
    pub gear_fill: String,
    pub default_fill: String,
    pub minimap_stroke: String,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#FFFFFF".to_string(),
            grid_color: "#E2E8F0".to_string(),
            node_border_color: "#B0BEC5".to_string(),
            node_text_color: "#1C2430".to_string(),
            node_subtext_color: "#5F6B7A".to_string(),
            line_color: "#7A8AA6".to_string(),
            wing_fill: "#E3F2FD".to_string(),
            fuselage_fill: "#E8F5E9".to_string(),
            tail_fill: "#FFF3E0".to_string(),
            gear_fill: "#F3E5F5".to_string(),
            default_fill: "#F5F5F5".to_string(),
            minimap_stroke: "#90A4AE".to_string(),
        }
    }

    pub fn slate() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#0F172A".to_string(),
            grid_color: "#1E293B".to_string(),
            node_border_color: "#475569".to_string(),
            node_text_color: "#E2E8F0".to_string(),
            node_subtext_color: "#94A3B8".to_string(),
            line_color: "#64748B".to_string(),
            wing_fill: "#1E3A5F".to_string(),
            fuselage_fill: "#1E4032".to_string(),
            tail_fill: "#4A3524".to_string(),
            gear_fill: "#3B2A4A".to_string(),
            default_fill: "#273449".to_string(),
            minimap_stroke: "#64748B".to_string(),
        }
    }

    pub fn category_fill(&self, category: Category) -> &str {
        match category {
            Category::Wing => &self.wing_fill,
            Category::Fuselage => &self.fuselage_fill,
            Category::Tail => &self.tail_fill,
            Category::Gear => &self.gear_fill,
            Category::General => &self.default_fill,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
