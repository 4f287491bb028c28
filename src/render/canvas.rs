//! Canvas 2D adapter.
//!
//! [`draw_list`] flattens a tree into plain draw commands (serializable, so the
//! host can replay them itself), and [`paint`] replays them on a
//! `CanvasRenderingContext2d`.

use js_sys::Array;
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::layout::edges::curve_controls;
use crate::layout::{EdgeKind, EdgeShape, PointI};
use crate::output::RenderableTree;
use super::{dash_pattern, node_label, RenderConfig};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        width: i32,
        height: i32,
        color: String,
    },
    Rect {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        fill: String,
        stroke: String,
    },
    Polyline {
        points: Vec<PointI>,
        color: String,
        width: f64,
        dash: Vec<f64>,
    },
    Curve {
        from: PointI,
        c1: PointI,
        c2: PointI,
        to: PointI,
        color: String,
        width: f64,
        dash: Vec<f64>,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        font: String,
        color: String,
    },
}

pub fn draw_list(tree: &RenderableTree, cfg: &RenderConfig) -> Vec<DrawCommand> {
    let mut cmds = vec![DrawCommand::Clear {
        width: tree.canvas.w,
        height: tree.canvas.h,
        color: cfg.background.clone(),
    }];

    for edge in &tree.edges {
        let color = cfg.stroke_for(edge.kind).to_string();
        let dash = dash_pattern(edge.style).to_vec();
        if tree.edge_shape == EdgeShape::Curved && edge.kind != EdgeKind::Spouse {
            for pair in edge.points.windows(2) {
                let (c1, c2) = curve_controls(pair[0], pair[1]);
                cmds.push(DrawCommand::Curve {
                    from: pair[0],
                    c1,
                    c2,
                    to: pair[1],
                    color: color.clone(),
                    width: cfg.edge_width,
                    dash: dash.clone(),
                });
            }
        } else {
            cmds.push(DrawCommand::Polyline {
                points: edge.points.clone(),
                color,
                width: cfg.edge_width,
                dash,
            });
        }
    }

    let font = format!("{}px {}", cfg.font_size, cfg.font_family);
    for node in &tree.nodes {
        let b = node.bounds;
        cmds.push(DrawCommand::Rect {
            x: b.x,
            y: b.y,
            w: b.w,
            h: b.h,
            fill: cfg.fill_for(node.band).to_string(),
            stroke: cfg.node_stroke.clone(),
        });
        let c = b.center();
        cmds.push(DrawCommand::Text {
            x: c.x,
            y: c.y,
            text: node_label(&node.name, node.age, cfg),
            font: font.clone(),
            color: cfg.text_color.clone(),
        });
    }
    cmds
}

/// Look up a `<canvas>` by element id and get its 2D context, resized to `w`×`h`.
pub fn context_for(canvas_id: &str, w: i32, h: i32) -> Result<CanvasRenderingContext2d, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id '{canvas_id}'")))?
        .dyn_into::<HtmlCanvasElement>()?;
    canvas.set_width(w.max(0) as u32);
    canvas.set_height(h.max(0) as u32);
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("missing 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    Ok(ctx)
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: &[f64]) -> Result<(), JsValue> {
    let arr = Array::new();
    for v in dash {
        arr.push(&JsValue::from_f64(*v));
    }
    ctx.set_line_dash(&arr)
}

pub fn paint(ctx: &CanvasRenderingContext2d, cmds: &[DrawCommand]) -> Result<(), JsValue> {
    for cmd in cmds {
        match cmd {
            DrawCommand::Clear { width, height, color } => {
                ctx.set_fill_style_str(color);
                ctx.fill_rect(0.0, 0.0, f64::from(*width), f64::from(*height));
            }
            DrawCommand::Rect { x, y, w, h, fill, stroke } => {
                let (x, y, w, h) = (f64::from(*x), f64::from(*y), f64::from(*w), f64::from(*h));
                set_dash(ctx, &[])?;
                ctx.set_line_width(1.0);
                ctx.set_fill_style_str(fill);
                ctx.fill_rect(x, y, w, h);
                ctx.set_stroke_style_str(stroke);
                ctx.stroke_rect(x, y, w, h);
            }
            DrawCommand::Polyline { points, color, width, dash } => {
                let Some(first) = points.first() else { continue };
                set_dash(ctx, dash)?;
                ctx.set_stroke_style_str(color);
                ctx.set_line_width(*width);
                ctx.begin_path();
                ctx.move_to(f64::from(first.x), f64::from(first.y));
                for p in &points[1..] {
                    ctx.line_to(f64::from(p.x), f64::from(p.y));
                }
                ctx.stroke();
            }
            DrawCommand::Curve { from, c1, c2, to, color, width, dash } => {
                set_dash(ctx, dash)?;
                ctx.set_stroke_style_str(color);
                ctx.set_line_width(*width);
                ctx.begin_path();
                ctx.move_to(f64::from(from.x), f64::from(from.y));
                ctx.bezier_curve_to(
                    f64::from(c1.x),
                    f64::from(c1.y),
                    f64::from(c2.x),
                    f64::from(c2.y),
                    f64::from(to.x),
                    f64::from(to.y),
                );
                ctx.stroke();
            }
            DrawCommand::Text { x, y, text, font, color } => {
                ctx.set_font(font);
                ctx.set_fill_style_str(color);
                ctx.set_text_align("center");
                ctx.set_text_baseline("middle");
                ctx.fill_text(text, f64::from(*x), f64::from(*y))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::{Person, RelationType, Relationship};
    use crate::inference::{infer, InferenceConfig};
    use crate::layout::{layout_tree, LayoutConfig, NoJitter, SizeI};

    fn tree(shape: EdgeShape) -> RenderableTree {
        let people = vec![Person::new(1, "A"), Person::new(2, "B"), Person::new(3, "C")];
        let rels = vec![
            Relationship::new("p1", 1, 3, RelationType::Parent),
            Relationship::new("p2", 2, 3, RelationType::Parent),
        ];
        let s = infer(&people, &rels, &InferenceConfig::default());
        let layout = layout_tree(&s, SizeI { w: 800, h: 600 }, &LayoutConfig::default(), &mut NoJitter);
        RenderableTree::assemble(&people, &s, layout, shape, |p| p.age)
    }

    #[test]
    fn test_draw_list_order() {
        let cmds = draw_list(&tree(EdgeShape::Straight), &RenderConfig::default());
        assert!(matches!(cmds[0], DrawCommand::Clear { .. }));

        // Spouse connector plus two junction edges, then a rect and text per node.
        let lines = cmds.iter().filter(|c| matches!(c, DrawCommand::Polyline { .. })).count();
        assert_eq!(lines, 3);
        let first_rect = cmds.iter().position(|c| matches!(c, DrawCommand::Rect { .. })).unwrap();
        assert_eq!(first_rect, 4);
        assert_eq!(cmds.len(), 1 + 3 + 2 * 3);
    }

    #[test]
    fn test_curved_edges_split_per_segment() {
        let cmds = draw_list(&tree(EdgeShape::Curved), &RenderConfig::default());
        // Junction edges have two segments each; the spouse line stays straight.
        let curves = cmds.iter().filter(|c| matches!(c, DrawCommand::Curve { .. })).count();
        assert_eq!(curves, 4);
        let json = serde_json::to_value(&cmds[1]).unwrap();
        assert_eq!(json["op"], "polyline");
        assert_eq!(json["dash"][0], 6.0);
    }

    #[test]
    fn test_context_for_yields_a_2d_context() {
        // Needs a browser to run; natively only the signature is checked.
        let lookup: fn(&str, i32, i32) -> Result<CanvasRenderingContext2d, JsValue> = context_for;
        let _ = lookup;
    }
}
