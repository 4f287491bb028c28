// Hierarchical layout for inferred family structures.
//
// Goals:
// - Deterministic given a jitter source: seeded in tests, entropy in the browser
// - Generations stack top to bottom; each row is centered on one vertical axis
// - Overcrowded generations wrap into a square-ish grid of sub-rows
// - Canvas grows to fit content, never clips
// - Never panics on empty or odd input
//
// Submodules:
// - bands: row planning, centering and vertical stacking
// - edges: parent/child, spouse and fallback connectors
// - jitter: seedable cosmetic offsets for wrapped sub-rows
// - spatial_grid: hit-testing over final node rectangles
// - fit: fit-to-view transform for the host's viewport
//
// Output:
// - TreeLayout with node rectangles, edges and canvas size.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::family::{Band, PersonId};
use crate::inference::FamilyStructure;

pub mod bands;
pub mod edges;
pub mod fit;
pub mod jitter;
pub mod spatial_grid;

pub use edges::{Edge, EdgeKind, EdgeShape, LineStyle};
pub use fit::{fit_to_view, ViewTransform};
pub use jitter::{JitterSource, NoJitter, SeededJitter};
use spatial_grid::SpatialGrid;

/// Smallest node a layout will use when configured sizes are unusable.
pub const MIN_NODE_SIZE: SizeI = SizeI { w: 40, h: 24 };
/// Minimum vertical clearance between a row and the next generation.
pub const MIN_LEVEL_GAP: i32 = 40;
/// Minimum vertical clearance between wrapped sub-rows.
pub const MIN_SUB_ROW_GAP: i32 = 10;
/// Upper bound for node width/height.
pub const MAX_NODE_EXTENT: i32 = 4096;
/// Upper bound for spacings, margin and jitter.
pub const MAX_SPACING: i32 = 4096;
/// Upper bound for the viewport and minimum canvas on either axis.
pub const MAX_CANVAS_EXTENT: i32 = 1 << 20;

fn round_up_even(v: i32) -> i32 {
    v + (v & 1)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointI {
    pub x: i32,
    pub y: i32,
}

impl PointI {
    pub fn midpoint(&self, other: &PointI) -> PointI {
        PointI {
            x: (self.x + other.x) / 2,
            y: (self.y + other.y) / 2,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SizeI {
    pub w: i32,
    pub h: i32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RectI {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl RectI {
    pub fn right(&self) -> i32 { self.x + self.w }
    pub fn bottom(&self) -> i32 { self.y + self.h }

    pub fn center(&self) -> PointI {
        PointI { x: self.x + self.w / 2, y: self.y + self.h / 2 }
    }
    pub fn top_center(&self) -> PointI {
        PointI { x: self.x + self.w / 2, y: self.y }
    }
    pub fn bottom_center(&self) -> PointI {
        PointI { x: self.x + self.w / 2, y: self.bottom() }
    }
    pub fn left_center(&self) -> PointI {
        PointI { x: self.x, y: self.y + self.h / 2 }
    }
    pub fn right_center(&self) -> PointI {
        PointI { x: self.right(), y: self.y + self.h / 2 }
    }

    pub fn contains(&self, p: PointI) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn overlaps(&self, other: &RectI) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn union(&self, other: &RectI) -> RectI {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        RectI { x: x0, y: y0, w: x1 - x0, h: y1 - y0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Fixed size of every person node.
    pub node_size: SizeI,
    /// Horizontal spacing between nodes in a row.
    pub h_spacing: i32,
    /// Vertical distance between generation rows (leaves room for connectors).
    pub level_spacing: i32,
    /// Vertical distance between wrapped sub-rows of one generation.
    pub sub_row_spacing: i32,
    /// Margin on every side of the canvas.
    pub margin: i32,
    /// Canvas never shrinks below this, so one or two people stay readable.
    pub min_canvas: SizeI,
    /// A generation with more members than this wraps into sub-rows.
    pub wrap_threshold: usize,
    /// Bound of the horizontal jitter applied to wrapped sub-rows.
    pub jitter: i32,
    pub edge_shape: EdgeShape,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_size: SizeI { w: 160, h: 70 },
            h_spacing: 40,
            level_spacing: 160,
            sub_row_spacing: 100,
            margin: 40,
            min_canvas: SizeI { w: 400, h: 300 },
            wrap_threshold: 8,
            jitter: 30,
            edge_shape: EdgeShape::Straight,
        }
    }
}

impl LayoutConfig {
    /// Copy with unusable values replaced by safe bounds.
    ///
    /// Node width and horizontal spacing are rounded up to even so a row's
    /// width halves exactly and rows mirror around the canvas center.
    pub fn sanitized(&self) -> LayoutConfig {
        let extent = |v: i32, fallback: i32| if v > 0 { v.min(MAX_NODE_EXTENT) } else { fallback };
        let node_size = SizeI {
            w: round_up_even(extent(self.node_size.w, MIN_NODE_SIZE.w)),
            h: extent(self.node_size.h, MIN_NODE_SIZE.h),
        };
        let spacing = |v: i32| v.clamp(0, MAX_SPACING);
        LayoutConfig {
            node_size,
            h_spacing: round_up_even(spacing(self.h_spacing)),
            level_spacing: spacing(self.level_spacing).max(node_size.h + MIN_LEVEL_GAP),
            sub_row_spacing: spacing(self.sub_row_spacing).max(node_size.h + MIN_SUB_ROW_GAP),
            margin: spacing(self.margin),
            min_canvas: SizeI {
                w: self.min_canvas.w.clamp(0, MAX_CANVAS_EXTENT),
                h: self.min_canvas.h.clamp(0, MAX_CANVAS_EXTENT),
            },
            wrap_threshold: self.wrap_threshold.max(1),
            jitter: spacing(self.jitter),
            edge_shape: self.edge_shape,
        }
    }
}

/// One physical row of nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowLayout {
    pub level: usize,
    pub band: Band,
    /// 0 for the primary row of a generation, 1.. for wrapped rows.
    pub sub_row: usize,
    pub y: i32,
    pub members: Vec<PersonId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeLayout {
    /// Final (jittered) node rectangles.
    pub nodes: BTreeMap<PersonId, RectI>,
    pub edges: Vec<Edge>,
    pub canvas: SizeI,
    pub rows: Vec<RowLayout>,
    #[serde(skip)]
    pub(crate) hits: SpatialGrid,
}

impl TreeLayout {
    pub fn empty(canvas: SizeI) -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: Vec::new(),
            canvas,
            rows: Vec::new(),
            hits: SpatialGrid::new(1),
        }
    }

    /// Person whose node contains `p`, using final positions.
    pub fn node_at(&self, p: PointI) -> Option<PersonId> {
        self.hits.hit(p)
    }

    /// Bounding box of all nodes, or `None` when there are none.
    pub fn content_bounds(&self) -> Option<RectI> {
        self.nodes.values().copied().reduce(|a, b| a.union(&b))
    }
}

/// Lay out `structure` inside a container of `viewport` size.
///
/// The canvas is at least `viewport` (and `cfg.min_canvas`) and grows to fit
/// every row plus margins. Sub-rows after the first of a wrapped generation
/// are shifted by `jitter`.
pub fn layout_tree(
    structure: &FamilyStructure,
    viewport: SizeI,
    cfg: &LayoutConfig,
    jitter: &mut dyn JitterSource,
) -> TreeLayout {
    let cfg = cfg.sanitized();
    let viewport = SizeI {
        w: viewport.w.clamp(0, MAX_CANVAS_EXTENT),
        h: viewport.h.clamp(0, MAX_CANVAS_EXTENT),
    };

    let plan = bands::plan_generations(structure, viewport, &cfg);
    let canvas = bands::canvas_size(&plan, viewport, &cfg);
    if plan.rows.is_empty() {
        return TreeLayout::empty(canvas);
    }

    let center_x = canvas.w / 2;
    let mut nodes: BTreeMap<PersonId, RectI> = BTreeMap::new();
    for row in &plan.rows {
        let shift = if row.sub_row > 0 { jitter.offset(cfg.jitter) } else { 0 };
        let xs = bands::centered_xs(row.members.len(), center_x, &cfg);
        for (&id, x) in row.members.iter().zip(xs) {
            nodes.insert(
                id,
                RectI {
                    x: x + shift,
                    y: row.y,
                    w: cfg.node_size.w,
                    h: cfg.node_size.h,
                },
            );
        }
    }

    let edges = edges::build_edges(structure, &nodes);

    let cell = cfg.node_size.w.max(cfg.node_size.h);
    let mut hits = SpatialGrid::new(cell);
    for (&id, rect) in &nodes {
        hits.insert(id, *rect);
    }

    TreeLayout {
        nodes,
        edges,
        canvas,
        rows: plan.rows,
        hits,
    }
}
