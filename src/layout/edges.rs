// Edge routing for laid-out family trees.
//
// Order of construction (and of the output list):
// 1. Spouse connectors, one per unordered pair on the same level.
// 2. Parent -> child edges. A child with exactly two parents on one level
//    gets a spouse connector between them (if not already drawn) and both
//    edges run through a shared junction below the pair, so they converge.
// 3. If nothing was drawn, inferred edges from every member of a generation
//    to every member of the next.
// 4. If still nothing, sibling-order edges between neighbours in a row.
//
// Edges only ever reference ids present in the node map.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::family::PersonId;
use crate::inference::FamilyStructure;
use super::{PointI, RectI};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    ParentChild,
    Spouse,
    /// Synthesized between consecutive generations when no links exist.
    Inferred,
    /// Last-resort chain between neighbours of a single generation.
    SiblingOrder,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

/// How adapters draw the segments of an edge.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeShape {
    Straight,
    Curved,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub from: PersonId,
    pub to: PersonId,
    pub kind: EdgeKind,
    pub style: LineStyle,
    /// Polyline from the origin anchor to the terminus, at least two points.
    pub points: Vec<PointI>,
    /// Shared point two converging parent edges pass through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub junction: Option<PointI>,
}

impl Edge {
    fn straight(from: PersonId, to: PersonId, kind: EdgeKind, style: LineStyle, a: PointI, b: PointI) -> Self {
        Self {
            from,
            to,
            kind,
            style,
            points: vec![a, b],
            junction: None,
        }
    }

    pub fn start(&self) -> PointI {
        self.points[0]
    }

    pub fn end(&self) -> PointI {
        self.points[self.points.len() - 1]
    }
}

impl EdgeKind {
    pub fn default_style(&self) -> LineStyle {
        match self {
            EdgeKind::ParentChild => LineStyle::Solid,
            EdgeKind::Spouse => LineStyle::Dashed,
            EdgeKind::Inferred | EdgeKind::SiblingOrder => LineStyle::Dotted,
        }
    }
}

/// Control points for a cubic segment from `a` to `b` with vertical tangents,
/// so curves leave and enter nodes straight down.
pub fn curve_controls(a: PointI, b: PointI) -> (PointI, PointI) {
    let mid_y = (a.y + b.y) / 2;
    (PointI { x: a.x, y: mid_y }, PointI { x: b.x, y: mid_y })
}

pub fn build_edges(structure: &FamilyStructure, nodes: &BTreeMap<PersonId, RectI>) -> Vec<Edge> {
    let mut edges = Vec::new();
    let mut drawn_pairs: BTreeSet<(PersonId, PersonId)> = BTreeSet::new();

    for (&a, partners) in &structure.adjacency.spouses {
        for &b in partners {
            if b <= a {
                continue;
            }
            if let Some(edge) = spouse_edge(structure, nodes, a, b) {
                drawn_pairs.insert((a, b));
                edges.push(edge);
            }
        }
    }

    for generation in &structure.generations {
        for &child in &generation.members {
            let Some(child_rect) = nodes.get(&child) else { continue };
            let parents: Vec<(PersonId, RectI)> = structure
                .adjacency
                .parents_of(child)
                .iter()
                .filter_map(|p| nodes.get(p).map(|r| (*p, *r)))
                .collect();

            let couple = match parents.as_slice() {
                [(pa, ra), (pb, rb)] if structure.level_of(*pa) == structure.level_of(*pb) => {
                    Some(((*pa, *ra), (*pb, *rb)))
                }
                _ => None,
            };

            match couple {
                Some(((pa, ra), (pb, rb))) => {
                    let key = (pa.min(pb), pa.max(pb));
                    if drawn_pairs.insert(key) {
                        if let Some(edge) = spouse_edge(structure, nodes, key.0, key.1) {
                            edges.push(edge);
                        }
                    }
                    let junction = junction_point(&ra, &rb, child_rect);
                    for (pid, rect) in [(pa, ra), (pb, rb)] {
                        edges.push(Edge {
                            from: pid,
                            to: child,
                            kind: EdgeKind::ParentChild,
                            style: EdgeKind::ParentChild.default_style(),
                            points: vec![rect.bottom_center(), junction, child_rect.top_center()],
                            junction: Some(junction),
                        });
                    }
                }
                None => {
                    for (pid, rect) in parents {
                        edges.push(Edge::straight(
                            pid,
                            child,
                            EdgeKind::ParentChild,
                            EdgeKind::ParentChild.default_style(),
                            rect.bottom_center(),
                            child_rect.top_center(),
                        ));
                    }
                }
            }
        }
    }

    if edges.is_empty() {
        edges = inferred_edges(structure, nodes);
    }
    if edges.is_empty() {
        edges = sibling_order_edges(structure, nodes);
    }
    edges
}

/// Connector between two people on the same level, left node to right node.
fn spouse_edge(
    structure: &FamilyStructure,
    nodes: &BTreeMap<PersonId, RectI>,
    a: PersonId,
    b: PersonId,
) -> Option<Edge> {
    let (ra, rb) = (nodes.get(&a)?, nodes.get(&b)?);
    if structure.level_of(a)? != structure.level_of(b)? {
        return None;
    }
    let (left, right) = if ra.x <= rb.x { (ra, rb) } else { (rb, ra) };
    Some(Edge::straight(
        a,
        b,
        EdgeKind::Spouse,
        EdgeKind::Spouse.default_style(),
        left.right_center(),
        right.left_center(),
    ))
}

/// Midway between the two parents horizontally, halfway down the gap between
/// the lower parent and the child.
fn junction_point(ra: &RectI, rb: &RectI, child: &RectI) -> PointI {
    let x = ra.bottom_center().midpoint(&rb.bottom_center()).x;
    let parent_bottom = ra.bottom().max(rb.bottom());
    let y = if child.y > parent_bottom {
        parent_bottom + (child.y - parent_bottom) / 2
    } else {
        parent_bottom
    };
    PointI { x, y }
}

fn inferred_edges(structure: &FamilyStructure, nodes: &BTreeMap<PersonId, RectI>) -> Vec<Edge> {
    let mut edges = Vec::new();
    for pair in structure.generations.windows(2) {
        let (upper, lower) = (&pair[0], &pair[1]);
        for &p in &upper.members {
            let Some(rp) = nodes.get(&p) else { continue };
            for &c in &lower.members {
                let Some(rc) = nodes.get(&c) else { continue };
                edges.push(Edge::straight(
                    p,
                    c,
                    EdgeKind::Inferred,
                    EdgeKind::Inferred.default_style(),
                    rp.bottom_center(),
                    rc.top_center(),
                ));
            }
        }
    }
    edges
}

fn sibling_order_edges(structure: &FamilyStructure, nodes: &BTreeMap<PersonId, RectI>) -> Vec<Edge> {
    let mut edges = Vec::new();
    for generation in &structure.generations {
        let placed: Vec<(PersonId, &RectI)> = generation
            .members
            .iter()
            .filter_map(|id| nodes.get(id).map(|r| (*id, r)))
            .collect();
        for pair in placed.windows(2) {
            let ((a, ra), (b, rb)) = (pair[0], pair[1]);
            // Wrapped rows: a follows b on the next sub-row, connect centers.
            let (start, end) = if ra.y == rb.y {
                (ra.right_center(), rb.left_center())
            } else {
                (ra.bottom_center(), rb.top_center())
            };
            edges.push(Edge::straight(
                a,
                b,
                EdgeKind::SiblingOrder,
                EdgeKind::SiblingOrder.default_style(),
                start,
                end,
            ));
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::{Person, RelationType, Relationship};
    use crate::inference::{infer, InferenceConfig};
    use crate::layout::{layout_tree, LayoutConfig, NoJitter, SizeI};

    fn edges_for(people: &[Person], rels: &[Relationship]) -> (Vec<Edge>, BTreeMap<PersonId, RectI>) {
        let s = infer(people, rels, &InferenceConfig::default());
        let layout = layout_tree(&s, SizeI { w: 1200, h: 800 }, &LayoutConfig::default(), &mut NoJitter);
        (layout.edges, layout.nodes)
    }

    fn named(id: i64) -> Person {
        Person::new(id, format!("P{id}"))
    }

    fn of_kind(edges: &[Edge], kind: EdgeKind) -> Vec<&Edge> {
        edges.iter().filter(|e| e.kind == kind).collect()
    }

    #[test]
    fn test_single_parent_edges_anchor_on_nodes() {
        let people = vec![named(1), named(2), named(3)];
        let rels = vec![
            Relationship::new("a", 1, 2, RelationType::Parent),
            Relationship::new("b", 1, 3, RelationType::Parent),
        ];
        let (edges, nodes) = edges_for(&people, &rels);

        assert_eq!(edges.len(), 2);
        for e in &edges {
            assert_eq!(e.kind, EdgeKind::ParentChild);
            assert_eq!(e.start(), nodes[&e.from].bottom_center());
            assert_eq!(e.end(), nodes[&e.to].top_center());
            assert!(e.junction.is_none());
        }
    }

    #[test]
    fn test_two_parents_converge_through_junction() {
        let people = vec![named(1), named(2), named(3), named(4)];
        let rels = vec![
            Relationship::new("a", 1, 3, RelationType::Parent),
            Relationship::new("b", 2, 3, RelationType::Parent),
            Relationship::new("c", 1, 4, RelationType::Parent),
            Relationship::new("d", 4, 2, RelationType::Child),
        ];
        let (edges, nodes) = edges_for(&people, &rels);

        // One connector between the parents, drawn before the child edges.
        let spouses = of_kind(&edges, EdgeKind::Spouse);
        assert_eq!(spouses.len(), 1);
        assert_eq!(edges[0].kind, EdgeKind::Spouse);
        assert_eq!(spouses[0].style, LineStyle::Dashed);

        let to_three: Vec<&Edge> = edges.iter().filter(|e| e.to == PersonId(3)).collect();
        assert_eq!(to_three.len(), 2);
        let j = to_three[0].junction.unwrap();
        assert_eq!(to_three[1].junction, Some(j));
        let (r1, r2) = (nodes[&PersonId(1)], nodes[&PersonId(2)]);
        assert_eq!(j.x, (r1.bottom_center().x + r2.bottom_center().x) / 2);
        assert!(j.y > r1.bottom() && j.y < nodes[&PersonId(3)].y);
    }

    #[test]
    fn test_explicit_spouse_drawn_once() {
        let people = vec![named(1), named(2), named(3)];
        let rels = vec![
            Relationship::new("s1", 1, 2, RelationType::Spouse),
            Relationship::new("s2", 2, 1, RelationType::Spouse),
            Relationship::new("a", 1, 3, RelationType::Parent),
            Relationship::new("b", 2, 3, RelationType::Parent),
        ];
        let (edges, _) = edges_for(&people, &rels);
        assert_eq!(of_kind(&edges, EdgeKind::Spouse).len(), 1);
        assert_eq!(of_kind(&edges, EdgeKind::ParentChild).len(), 2);
    }

    #[test]
    fn test_cross_level_spouse_is_not_drawn() {
        let people = vec![named(1), named(2), named(3)];
        let rels = vec![
            Relationship::new("a", 1, 2, RelationType::Parent),
            Relationship::new("s", 1, 3, RelationType::Spouse),
        ];
        let (edges, _) = edges_for(&people, &rels);
        // 3 is unlinked and defaults to the child band.
        assert!(of_kind(&edges, EdgeKind::Spouse).is_empty());
    }

    #[test]
    fn test_age_gap_family_gets_junction_edges() {
        let people = vec![
            named(1).with_age(45).with_gender("M"),
            named(2).with_age(42).with_gender("F"),
            named(3).with_age(15),
            named(4).with_age(12),
        ];
        let (edges, _) = edges_for(&people, &[]);
        assert_eq!(of_kind(&edges, EdgeKind::Spouse).len(), 1);
        assert_eq!(of_kind(&edges, EdgeKind::ParentChild).len(), 4);
    }

    #[test]
    fn test_sibling_order_edges_for_a_single_band() {
        let people = vec![named(1).with_age(50), named(2), named(3)];
        let mut s = infer(&people, &[], &InferenceConfig::default());
        s.adjacency.clear_parent_links();
        let layout = layout_tree(&s, SizeI { w: 800, h: 600 }, &LayoutConfig::default(), &mut NoJitter);

        // 1 is the only aged person, so everyone shares one band.
        assert_eq!(s.generations.len(), 1);
        let kinds: Vec<EdgeKind> = layout.edges.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EdgeKind::SiblingOrder, EdgeKind::SiblingOrder]);
    }

    #[test]
    fn test_cartesian_fallback_between_generations() {
        let people = vec![named(1).with_age(60), named(2).with_age(20), named(3).with_age(18)];
        let mut s = infer(&people, &[], &InferenceConfig::default());
        s.adjacency.clear_parent_links();
        let layout = layout_tree(&s, SizeI { w: 800, h: 600 }, &LayoutConfig::default(), &mut NoJitter);

        let inferred = of_kind(&layout.edges, EdgeKind::Inferred);
        assert_eq!(inferred.len(), 2);
        assert!(inferred.iter().all(|e| e.from == PersonId(1) && e.style == LineStyle::Dotted));
    }

    #[test]
    fn test_single_person_has_no_edges() {
        let (edges, _) = edges_for(&[named(1)], &[]);
        assert!(edges.is_empty());
    }

    #[test]
    fn test_curve_controls_are_vertical() {
        let (c1, c2) = curve_controls(PointI { x: 0, y: 0 }, PointI { x: 100, y: 200 });
        assert_eq!(c1, PointI { x: 0, y: 100 });
        assert_eq!(c2, PointI { x: 100, y: 100 });
    }
}
