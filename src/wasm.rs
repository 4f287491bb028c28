//! WASM bindings for the famtree-core library.
//!
//! All functions exposed to JavaScript via wasm-bindgen are defined here.
//! Every export returns a string and never throws: failures come back as
//! `{"error": {"message", "kind"}}` and are logged to the console.

use serde::Serialize;
use serde_json::{json, Value};
use wasm_bindgen::prelude::*;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::family::{propose_relationship_named, snapshot_from_payload, FamilySnapshot, PersonId, Relationship};
use crate::layout::{fit_to_view as fit, PointI, SizeI};
use crate::output::RenderableTree;
use crate::render::{self, canvas};
use crate::service::{self, parse_family_response};
use crate::{infer_and_layout as run, ViewportHints};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    pub fn console_log(s: &str);

    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn console_error(s: &str);
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| error_value(&e.to_string(), "serialize").to_string())
}

fn error_value(message: &str, kind: &str) -> Value {
    json!({ "error": { "message": message, "kind": kind } })
}

fn error_json(err: &EngineError) -> String {
    error_value(&err.to_string(), err.kind()).to_string()
}

fn report(context: &str, err: &EngineError) -> String {
    console_error(&format!("{context}: {err}"));
    error_json(err)
}

fn tree_error(context: &str, err: &EngineError, hints: &ViewportHints) -> String {
    console_error(&format!("{context}: {err}"));
    to_json(&RenderableTree::empty_with_error(hints.size(), err.to_string(), err.kind()))
}

fn parse_hints(raw: &str) -> Result<ViewportHints, EngineError> {
    if raw.trim().is_empty() {
        return Ok(ViewportHints::default());
    }
    serde_json::from_str(raw).map_err(EngineError::Input)
}

/// Config with "today" as the age reference unless the host pinned one.
fn parse_config(raw: &str) -> Result<EngineConfig, EngineError> {
    let mut cfg = EngineConfig::from_json(raw)?;
    if cfg.inference.reference_date.is_none() {
        cfg.inference.reference_date = Some(chrono::Local::now().date_naive());
    }
    Ok(cfg)
}

fn parse_snapshot(raw: &str) -> Result<FamilySnapshot, EngineError> {
    if raw.trim().is_empty() {
        return Ok(FamilySnapshot::default());
    }
    let value: Value = serde_json::from_str(raw).map_err(EngineError::Input)?;
    Ok(snapshot_from_payload(&value))
}

/// Shared front half of the tree-producing exports.
fn build_tree(payload: &str, viewport: &str, config: &str) -> Result<(RenderableTree, EngineConfig), (EngineError, ViewportHints)> {
    let hints = parse_hints(viewport).map_err(|e| (e, ViewportHints::default()))?;
    let cfg = parse_config(config).map_err(|e| (e, hints))?;
    let snapshot = parse_snapshot(payload).map_err(|e| (e, hints))?;
    let tree = run(&snapshot.people, &snapshot.relationships, &hints, &cfg);
    Ok((tree, cfg))
}

/// Lay out a family payload (`{"members": [...], "relationships": [...]}` or
/// any shape the service emits). Returns the `RenderableTree` as JSON.
#[wasm_bindgen]
pub fn infer_and_layout(payload: &str, viewport: &str, config: &str) -> String {
    match build_tree(payload, viewport, config) {
        Ok((tree, _)) => to_json(&tree),
        Err((e, hints)) => tree_error("Error laying out family", &e, &hints),
    }
}

/// Lay out straight from a family service reply. A 404 renders an empty tree.
#[wasm_bindgen]
pub fn layout_from_service(status: u16, body: &str, viewport: &str, config: &str) -> String {
    let hints = match parse_hints(viewport) {
        Ok(h) => h,
        Err(e) => return tree_error("Error reading viewport", &e, &ViewportHints::default()),
    };
    let cfg = match parse_config(config) {
        Ok(c) => c,
        Err(e) => return tree_error("Error reading config", &e, &hints),
    };
    match parse_family_response(status, body) {
        Ok(lookup) => {
            let snapshot = lookup.into_snapshot();
            to_json(&run(&snapshot.people, &snapshot.relationships, &hints, &cfg))
        }
        Err(e) => tree_error("Error loading family", &EngineError::from(e), &hints),
    }
}

fn person_id(raw: f64) -> Option<PersonId> {
    (raw.is_finite() && raw.fract() == 0.0).then_some(PersonId(raw as i64))
}

/// Draft relationship JSON for an edit flow. The host appends it to its
/// snapshot, persists it and re-runs the layout.
#[wasm_bindgen]
pub fn propose_relationship(from: f64, to: f64, kind: &str) -> String {
    let (Some(from), Some(to)) = (person_id(from), person_id(to)) else {
        console_error("propose_relationship: person ids must be integers");
        return error_value("person ids must be integers", "input").to_string();
    };
    match propose_relationship_named(from, to, kind) {
        Ok(draft) => to_json(&draft),
        Err(e) => report("Error proposing relationship", &EngineError::from(e)),
    }
}

/// POST body for persisting a draft relationship.
#[wasm_bindgen]
pub fn relationship_request_body(draft: &str) -> String {
    match serde_json::from_str::<Relationship>(draft) {
        Ok(rel) => service::create_relationship_body(&rel).to_string(),
        Err(e) => report("Error reading draft", &EngineError::Input(e)),
    }
}

/// Classify the reply to a relationship write: `{"ok": true, "relationship"}`
/// or an error object with the service's message.
#[wasm_bindgen]
pub fn parse_write_response(status: u16, body: &str) -> String {
    match service::parse_write_response(status, body) {
        Ok(stored) => json!({ "ok": true, "relationship": stored }).to_string(),
        Err(e) => report("Error saving relationship", &EngineError::from(e)),
    }
}

fn svg_document(payload: &str, viewport: &str, config: &str) -> Result<String, EngineError> {
    let (tree, cfg) = build_tree(payload, viewport, config).map_err(|(e, _)| e)?;
    Ok(render::render_svg(&tree, &cfg.render))
}

/// Standalone SVG document for download/export, or an error object.
#[wasm_bindgen]
pub fn render_tree_svg(payload: &str, viewport: &str, config: &str) -> String {
    match svg_document(payload, viewport, config) {
        Ok(svg) => svg,
        Err(e) => report("Error rendering SVG", &e),
    }
}

/// Node and edge elements for a node-graph widget.
#[wasm_bindgen]
pub fn graph_elements(payload: &str, viewport: &str, config: &str) -> String {
    match build_tree(payload, viewport, config) {
        Ok((tree, cfg)) => to_json(&render::graph_elements(&tree, &cfg.render)),
        Err((e, _)) => report("Error building graph elements", &e),
    }
}

/// Paint onto the `<canvas>` with id `canvas_id`, resizing it to the tree's
/// canvas. Returns the tree JSON so the host can hit-test clicks.
#[wasm_bindgen]
pub fn draw_tree(canvas_id: &str, payload: &str, viewport: &str, config: &str) -> String {
    let (tree, cfg) = match build_tree(payload, viewport, config) {
        Ok(built) => built,
        Err((e, hints)) => return tree_error("Error drawing tree", &e, &hints),
    };
    let painted = canvas::context_for(canvas_id, tree.canvas.w, tree.canvas.h)
        .and_then(|ctx| canvas::paint(&ctx, &canvas::draw_list(&tree, &cfg.render)));
    if let Err(e) = painted {
        console_error(&format!("Error painting canvas: {e:?}"));
    }
    to_json(&tree)
}

/// Canvas draw commands, for hosts that paint themselves.
#[wasm_bindgen]
pub fn draw_commands(payload: &str, viewport: &str, config: &str) -> String {
    match build_tree(payload, viewport, config) {
        Ok((tree, cfg)) => to_json(&canvas::draw_list(&tree, &cfg.render)),
        Err((e, _)) => report("Error building draw commands", &e),
    }
}

/// Id of the person under `(x, y)` in canvas coordinates, or `null`.
/// Pass the same seeded viewport used for drawing so jitter matches.
#[wasm_bindgen]
pub fn node_at(payload: &str, viewport: &str, config: &str, x: i32, y: i32) -> String {
    match build_tree(payload, viewport, config) {
        Ok((tree, _)) => to_json(&tree.node_at(PointI { x, y })),
        Err((e, _)) => report("Error hit-testing", &e),
    }
}

/// Scale and translation fitting content into a container, never upscaling.
#[wasm_bindgen]
pub fn fit_to_view(content_w: i32, content_h: i32, container_w: i32, container_h: i32) -> String {
    let t = fit(
        SizeI { w: content_w, h: content_h },
        SizeI { w: container_w, h: container_h },
    );
    to_json(&t)
}
