//! Family tree role inference and hierarchical layout.
//!
//! [`infer_and_layout`] is the single entry point: people plus relationships
//! in, a positioned [`RenderableTree`] out. Presentation adapters in
//! [`render`] draw that tree; [`service`] interprets the external family
//! service's replies; [`wasm`] exposes everything to the hosting page.

pub mod config;
pub mod error;
pub mod family;
pub mod inference;
pub mod layout;
pub mod output;
pub mod render;
pub mod service;
pub mod wasm;

use serde::{Deserialize, Serialize};

pub use config::EngineConfig;
pub use error::{EngineError, ServiceError};
pub use family::{propose_relationship, FamilySnapshot, Person, PersonId, RelationType, Relationship};
pub use inference::{infer, FamilyStructure, InferenceConfig};
pub use layout::{layout_tree, LayoutConfig, SizeI};
pub use output::RenderableTree;

use layout::{JitterSource, SeededJitter};

/// Container the tree is laid out for.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportHints {
    pub width: i32,
    pub height: i32,
    /// Jitter seed. `None` draws from entropy, so wrapped rows differ per call.
    pub seed: Option<u64>,
}

impl ViewportHints {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height, seed: None }
    }

    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn size(&self) -> SizeI {
        SizeI { w: self.width, h: self.height }
    }
}

/// Infer bands, lay them out and join the result with the people's details.
pub fn infer_and_layout(
    people: &[Person],
    relationships: &[Relationship],
    hints: &ViewportHints,
    cfg: &EngineConfig,
) -> RenderableTree {
    let mut jitter = match hints.seed {
        Some(seed) => SeededJitter::new(seed),
        None => SeededJitter::from_entropy(),
    };
    infer_and_layout_with(people, relationships, hints.size(), cfg, &mut jitter)
}

/// [`infer_and_layout`] with an explicit jitter source.
pub fn infer_and_layout_with(
    people: &[Person],
    relationships: &[Relationship],
    viewport: SizeI,
    cfg: &EngineConfig,
    jitter: &mut dyn JitterSource,
) -> RenderableTree {
    let structure = infer(people, relationships, &cfg.inference);
    let layout = layout_tree(&structure, viewport, &cfg.layout, jitter);
    let reference = cfg.inference.reference_date;
    RenderableTree::assemble(people, &structure, layout, cfg.layout.edge_shape, |p| {
        p.resolved_age(reference)
    })
}
