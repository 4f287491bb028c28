// Hand-drawn SVG adapter.
//
// Paint order: background, edges, nodes. Edges go under nodes so connectors
// never cover labels.

use std::fmt::Write;

use crate::layout::edges::curve_controls;
use crate::layout::{Edge, EdgeKind, EdgeShape};
use crate::output::RenderableTree;
use super::{dash_pattern, node_label, RenderConfig};

pub fn render_svg(tree: &RenderableTree, cfg: &RenderConfig) -> String {
    let (w, h) = (tree.canvas.w, tree.canvas.h);
    let mut out = String::new();

    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    let _ = writeln!(
        out,
        r#"<rect x="0" y="0" width="{w}" height="{h}" fill="{}"/>"#,
        escape_xml(&cfg.background)
    );

    out.push_str("<g class=\"edges\">\n");
    for edge in &tree.edges {
        let dash = dash_pattern(edge.style);
        let dash_attr = if dash.is_empty() {
            String::new()
        } else {
            let parts: Vec<String> = dash.iter().map(|d| d.to_string()).collect();
            format!(r#" stroke-dasharray="{}""#, parts.join(" "))
        };
        let _ = writeln!(
            out,
            r#"<path class="edge {}" d="{}" fill="none" stroke="{}" stroke-width="{}"{dash_attr}/>"#,
            kind_class(edge.kind),
            path_data(edge, tree.edge_shape),
            escape_xml(cfg.stroke_for(edge.kind)),
            cfg.edge_width,
        );
    }
    out.push_str("</g>\n");

    out.push_str("<g class=\"nodes\">\n");
    for node in &tree.nodes {
        let b = node.bounds;
        let center = b.center();
        let _ = writeln!(
            out,
            r#"<g class="node {}" data-id="{}">"#,
            node.band.label(),
            node.id
        );
        let _ = writeln!(
            out,
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{r}" ry="{r}" fill="{}" stroke="{}"/>"#,
            b.x,
            b.y,
            b.w,
            b.h,
            escape_xml(cfg.fill_for(node.band)),
            escape_xml(&cfg.node_stroke),
            r = cfg.corner_radius,
        );
        let _ = writeln!(
            out,
            r#"<text x="{}" y="{}" text-anchor="middle" dominant-baseline="middle" font-family="{}" font-size="{}" fill="{}">{}</text>"#,
            center.x,
            center.y,
            escape_xml(&cfg.font_family),
            cfg.font_size,
            escape_xml(&cfg.text_color),
            escape_xml(&node_label(&node.name, node.age, cfg)),
        );
        out.push_str("</g>\n");
    }
    out.push_str("</g>\n");
    out.push_str("</svg>\n");
    out
}

fn kind_class(kind: EdgeKind) -> &'static str {
    match kind {
        EdgeKind::ParentChild => "parent-child",
        EdgeKind::Spouse => "spouse",
        EdgeKind::Inferred => "inferred",
        EdgeKind::SiblingOrder => "sibling-order",
    }
}

/// `d` attribute for an edge. Spouse connectors stay straight in either shape.
fn path_data(edge: &Edge, shape: EdgeShape) -> String {
    let mut d = String::new();
    let Some(first) = edge.points.first() else {
        return d;
    };
    let _ = write!(d, "M {} {}", first.x, first.y);
    let curved = shape == EdgeShape::Curved && edge.kind != EdgeKind::Spouse;
    for pair in edge.points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if curved {
            let (c1, c2) = curve_controls(a, b);
            let _ = write!(d, " C {} {} {} {} {} {}", c1.x, c1.y, c2.x, c2.y, b.x, b.y);
        } else {
            let _ = write!(d, " L {} {}", b.x, b.y);
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::{Person, RelationType, Relationship};
    use crate::inference::{infer, InferenceConfig};
    use crate::layout::{layout_tree, LayoutConfig, NoJitter, PointI, SizeI};

    fn tree(people: &[Person], rels: &[Relationship], shape: EdgeShape) -> RenderableTree {
        let s = infer(people, rels, &InferenceConfig::default());
        let layout = layout_tree(&s, SizeI { w: 800, h: 600 }, &LayoutConfig::default(), &mut NoJitter);
        RenderableTree::assemble(people, &s, layout, shape, |p| p.age)
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"<Tom & "Jerry">"#), "&lt;Tom &amp; &quot;Jerry&quot;&gt;");
    }

    #[test]
    fn test_svg_contains_nodes_and_dashed_spouse() {
        let people = vec![
            Person::new(1, "Ann <Sr>").with_age(45).with_gender("F"),
            Person::new(2, "Bob").with_age(44).with_gender("M"),
            Person::new(3, "Cid").with_age(12),
        ];
        let svg = render_svg(&tree(&people, &[], EdgeShape::Straight), &RenderConfig::default());

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Ann &lt;Sr&gt; (45)"));
        assert_eq!(svg.matches("<g class=\"node ").count(), 3);
        assert_eq!(svg.matches("class=\"edge spouse\"").count(), 1);
        assert!(svg.contains("stroke-dasharray=\"6 4\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_curved_paths_use_cubic_segments() {
        let people = vec![Person::new(1, "A"), Person::new(2, "B")];
        let rels = vec![Relationship::new("r", 1, 2, RelationType::Parent)];
        let svg = render_svg(&tree(&people, &rels, EdgeShape::Curved), &RenderConfig::default());
        assert!(svg.contains(" C "));
    }

    #[test]
    fn test_path_data_straight() {
        let edge = Edge {
            from: crate::family::PersonId(1),
            to: crate::family::PersonId(2),
            kind: EdgeKind::ParentChild,
            style: crate::layout::LineStyle::Solid,
            points: vec![PointI { x: 0, y: 0 }, PointI { x: 5, y: 10 }, PointI { x: 5, y: 20 }],
            junction: Some(PointI { x: 5, y: 10 }),
        };
        assert_eq!(path_data(&edge, EdgeShape::Straight), "M 0 0 L 5 10 L 5 20");
    }
}
