//! Presentation adapters.
//!
//! Each adapter turns the same [`RenderableTree`](crate::output::RenderableTree)
//! into one drawing technology. None of them lays anything out; positions come
//! from the tree as-is.

use serde::{Deserialize, Serialize};

use crate::family::Band;
use crate::layout::{EdgeKind, LineStyle};

pub mod canvas;
pub mod graph;
pub mod svg;

pub use canvas::{draw_list, DrawCommand};
pub use graph::{graph_elements, GraphElements};
pub use svg::render_svg;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub background: String,
    pub node_stroke: String,
    pub text_color: String,
    pub font_family: String,
    pub font_size: u32,
    pub corner_radius: u32,
    /// Fill per band, indexed grandparent, parent, child, grandchild.
    pub band_fills: [String; 4],
    pub edge_color: String,
    pub spouse_color: String,
    pub edge_width: f64,
    /// Append "(age)" to node labels when known.
    pub show_ages: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            node_stroke: "#4a5568".to_string(),
            text_color: "#1a202c".to_string(),
            font_family: "Inter, sans-serif".to_string(),
            font_size: 14,
            corner_radius: 8,
            band_fills: [
                "#e9d8fd".to_string(),
                "#bee3f8".to_string(),
                "#c6f6d5".to_string(),
                "#fefcbf".to_string(),
            ],
            edge_color: "#718096".to_string(),
            spouse_color: "#d53f8c".to_string(),
            edge_width: 2.0,
            show_ages: true,
        }
    }
}

impl RenderConfig {
    pub fn fill_for(&self, band: Band) -> &str {
        let i = match band {
            Band::Grandparent => 0,
            Band::Parent => 1,
            Band::Child => 2,
            Band::Grandchild => 3,
        };
        &self.band_fills[i]
    }

    pub fn stroke_for(&self, kind: EdgeKind) -> &str {
        match kind {
            EdgeKind::Spouse => &self.spouse_color,
            _ => &self.edge_color,
        }
    }
}

/// Dash pattern for a line style, empty for solid lines.
pub fn dash_pattern(style: LineStyle) -> &'static [f64] {
    match style {
        LineStyle::Solid => &[],
        LineStyle::Dashed => &[6.0, 4.0],
        LineStyle::Dotted => &[2.0, 4.0],
    }
}

/// Text shown inside a node.
pub(crate) fn node_label(name: &str, age: Option<u32>, cfg: &RenderConfig) -> String {
    match age {
        Some(age) if cfg.show_ages => format!("{name} ({age})"),
        _ => name.to_string(),
    }
}
