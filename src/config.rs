//! Engine-wide settings, overridable from JSON.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::inference::InferenceConfig;
use crate::layout::LayoutConfig;
use crate::render::RenderConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub inference: InferenceConfig,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl EngineConfig {
    /// Parse partial overrides; missing fields keep their defaults. Blank input
    /// yields the defaults.
    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw).map_err(EngineError::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::STRICT_GAP_YEARS;
    use crate::layout::EdgeShape;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::from_json("  ").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.inference.gap_years, 10);
        assert_eq!(cfg.layout.wrap_threshold, 8);
    }

    #[test]
    fn test_partial_overrides() {
        let cfg = EngineConfig::from_json(
            r#"{"inference": {"gap_years": 12, "reference_date": "2024-06-01"},
                "layout": {"edge_shape": "curved", "node_size": {"w": 120, "h": 50}}}"#,
        )
        .unwrap();
        assert_eq!(cfg.inference.gap_years, STRICT_GAP_YEARS);
        assert_eq!(cfg.inference.max_children, Some(12));
        assert!(cfg.inference.reference_date.is_some());
        assert_eq!(cfg.layout.edge_shape, EdgeShape::Curved);
        assert_eq!(cfg.layout.node_size.w, 120);
        assert_eq!(cfg.layout.h_spacing, 40);
    }

    #[test]
    fn test_bad_json_is_a_config_error() {
        let err = EngineConfig::from_json(r#"{"layout": {"margin": "wide"}}"#).unwrap_err();
        assert_eq!(err.kind(), "config");
    }
}
