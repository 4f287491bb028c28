//! Node-graph widget adapter.
//!
//! Produces the `nodes`/`edges` element lists node-graph UI libraries expect,
//! with positions pinned to the computed layout so the widget does no layout
//! of its own.

use serde::Serialize;

use crate::layout::{EdgeKind, EdgeShape};
use crate::output::RenderableTree;
use super::{dash_pattern, node_label, RenderConfig};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub position: Position,
    pub data: NodeData,
    pub style: NodeStyle,
    pub draggable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeData {
    pub label: String,
    pub band: String,
    pub level: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStyle {
    pub width: i32,
    pub height: i32,
    pub background: String,
    pub border: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Widget edge renderer, "straight" or "smoothstep".
    #[serde(rename = "type")]
    pub edge_type: &'static str,
    pub data: EdgeData,
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeData {
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphElements {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

pub fn graph_elements(tree: &RenderableTree, cfg: &RenderConfig) -> GraphElements {
    let nodes = tree
        .nodes
        .iter()
        .map(|n| GraphNode {
            id: n.id.to_string(),
            position: Position { x: n.bounds.x, y: n.bounds.y },
            data: NodeData {
                label: node_label(&n.name, n.age, cfg),
                band: n.band.label().to_string(),
                level: n.level,
            },
            style: NodeStyle {
                width: n.bounds.w,
                height: n.bounds.h,
                background: cfg.fill_for(n.band).to_string(),
                border: format!("1px solid {}", cfg.node_stroke),
            },
            draggable: false,
        })
        .collect();

    let edges = tree
        .edges
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let dash = dash_pattern(e.style);
            GraphEdge {
                // Index keeps ids unique when the same pair is linked twice.
                id: format!("e{}-{}-{i}", e.from, e.to),
                source: e.from.to_string(),
                target: e.to.to_string(),
                edge_type: match (tree.edge_shape, e.kind) {
                    (_, EdgeKind::Spouse) | (EdgeShape::Straight, _) => "straight",
                    (EdgeShape::Curved, _) => "smoothstep",
                },
                data: EdgeData { kind: e.kind },
                style: EdgeStyle {
                    stroke: cfg.stroke_for(e.kind).to_string(),
                    stroke_width: cfg.edge_width,
                    stroke_dasharray: (!dash.is_empty()).then(|| {
                        dash.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(" ")
                    }),
                },
            }
        })
        .collect();

    GraphElements { nodes, edges }
}
