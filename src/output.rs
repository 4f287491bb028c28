//! Output types for front-end consumption.
//!
//! `RenderableTree` is the one scene description every presentation adapter
//! (SVG, node-graph widget, canvas) draws from. It is serialized to JSON and
//! handed to the hosting page.

use std::collections::HashMap;

use serde::Serialize;

use crate::family::{Band, Person, PersonId, RelationshipId};
use crate::inference::{FamilyStructure, InferencePath};
use crate::layout::spatial_grid::SpatialGrid;
use crate::layout::{Edge, EdgeShape, PointI, RectI, RowLayout, SizeI, TreeLayout};

/// A positioned person ready to display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeOutput {
    pub id: PersonId,
    pub name: String,
    pub band: Band,
    pub level: usize,
    pub bounds: RectI,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

/// Error information shown by the host instead of a tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub message: String,
    /// Machine-readable category, e.g. "service" or "config".
    pub kind: String,
}

/// The combined output sent to the front-end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderableTree {
    pub path: InferencePath,
    pub canvas: SizeI,
    pub edge_shape: EdgeShape,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<Edge>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<RowLayout>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_relationships: Vec<RelationshipId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    #[serde(skip)]
    hits: SpatialGrid,
}

impl RenderableTree {
    /// Join people, their inferred structure and the computed layout.
    ///
    /// Nodes follow row order (top to bottom, left to right), so adapters
    /// that draw in list order paint generations in sequence.
    pub fn assemble(
        people: &[Person],
        structure: &FamilyStructure,
        layout: TreeLayout,
        edge_shape: EdgeShape,
        reference_age: impl Fn(&Person) -> Option<u32>,
    ) -> Self {
        let by_id: HashMap<PersonId, &Person> = people.iter().rev().map(|p| (p.id, p)).collect();

        let nodes = layout
            .rows
            .iter()
            .flat_map(|row| row.members.iter().map(move |id| (row, *id)))
            .filter_map(|(row, id)| {
                let person = by_id.get(&id)?;
                let bounds = layout.nodes.get(&id)?;
                Some(NodeOutput {
                    id,
                    name: person.display_name().to_string(),
                    band: row.band,
                    level: row.level,
                    bounds: *bounds,
                    age: reference_age(person),
                    gender: person.gender.as_ref().map(|g| g.as_str().to_string()),
                })
            })
            .collect();

        Self {
            path: structure.path,
            canvas: layout.canvas,
            edge_shape,
            nodes,
            ignored_relationships: structure.adjacency.ignored.clone(),
            error: None,
            edges: layout.edges,
            rows: layout.rows,
            hits: layout.hits,
        }
    }

    /// An empty tree carrying an error for the host to display.
    pub fn empty_with_error(canvas: SizeI, message: impl Into<String>, kind: &str) -> Self {
        Self {
            path: InferencePath::Empty,
            canvas,
            edge_shape: EdgeShape::Straight,
            nodes: Vec::new(),
            edges: Vec::new(),
            rows: Vec::new(),
            ignored_relationships: Vec::new(),
            error: Some(ErrorInfo {
                message: message.into(),
                kind: kind.to_string(),
            }),
            hits: SpatialGrid::new(1),
        }
    }

    /// Person whose final (jittered) node contains `p`.
    pub fn node_at(&self, p: PointI) -> Option<PersonId> {
        self.hits.hit(p)
    }

    pub fn node(&self, id: PersonId) -> Option<&NodeOutput> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
