//! Fit-to-view: scale and center a laid-out tree inside an on-screen viewport.

use serde::Serialize;

use super::SizeI;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ViewTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };
}

/// `scale = min(container.w / content.w, container.h / content.h, 1)`, plus the
/// translation that centers the scaled content. Never upscales past 100%.
pub fn fit_to_view(content: SizeI, container: SizeI) -> ViewTransform {
    if container.w <= 0 || container.h <= 0 {
        return ViewTransform::IDENTITY;
    }
    let (cw, ch) = (f64::from(container.w), f64::from(container.h));
    if content.w <= 0 || content.h <= 0 {
        return ViewTransform {
            scale: 1.0,
            translate_x: cw / 2.0,
            translate_y: ch / 2.0,
        };
    }
    let (w, h) = (f64::from(content.w), f64::from(content.h));
    let scale = (cw / w).min(ch / h).min(1.0);
    ViewTransform {
        scale,
        translate_x: (cw - w * scale) / 2.0,
        translate_y: (ch - h * scale) / 2.0,
    }
}
