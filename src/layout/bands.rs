// Row planning for generational bands.
//
// Each generation becomes one row, or a square-ish grid of sub-rows when it
// is too wide for the container or has more members than the wrap threshold.
// Rows are stacked top to bottom: generation k starts `level_spacing` below
// the last sub-row of generation k - 1.

use crate::family::PersonId;
use crate::inference::FamilyStructure;
use super::{LayoutConfig, RowLayout, SizeI};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowPlan {
    pub rows: Vec<RowLayout>,
    /// Width of the widest row, without margins.
    pub widest: i32,
    /// Whether any generation was wrapped (and may be jittered).
    pub wrapped: bool,
}

/// Total width of a row of `n` nodes.
pub fn row_width(n: usize, cfg: &LayoutConfig) -> i32 {
    if n == 0 {
        return 0;
    }
    let n = i64::try_from(n).unwrap_or(i64::MAX);
    let w = n
        .saturating_mul(i64::from(cfg.node_size.w))
        .saturating_add((n - 1).saturating_mul(i64::from(cfg.h_spacing)));
    i32::try_from(w).unwrap_or(i32::MAX)
}

/// Left x of each node in a row of `n` nodes centered on `center_x`.
pub fn centered_xs(n: usize, center_x: i32, cfg: &LayoutConfig) -> Vec<i32> {
    let left = center_x - row_width(n, cfg) / 2;
    let step = cfg.node_size.w + cfg.h_spacing;
    (0..n as i32).map(|i| left + i * step).collect()
}

/// Smallest `k` with `k * k >= n`.
pub fn ceil_sqrt(n: usize) -> usize {
    let mut k = 0;
    while k * k < n {
        k += 1;
    }
    k
}

/// Split a generation into rows. Wrapping kicks in when the single row would
/// not fit `available_width` or the generation exceeds the wrap threshold.
pub fn split_rows(members: &[PersonId], available_width: i32, cfg: &LayoutConfig) -> Vec<Vec<PersonId>> {
    let n = members.len();
    if n == 0 {
        return Vec::new();
    }
    let too_wide = row_width(n, cfg) > available_width;
    if !too_wide && n <= cfg.wrap_threshold {
        return vec![members.to_vec()];
    }
    let per_row = ceil_sqrt(n).max(1);
    members.chunks(per_row).map(|c| c.to_vec()).collect()
}

/// Plan rows (with their y) for every generation of `structure`.
pub fn plan_generations(structure: &FamilyStructure, viewport: SizeI, cfg: &LayoutConfig) -> RowPlan {
    let container_w = viewport.w.max(cfg.min_canvas.w);
    let available = container_w - 2 * cfg.margin;

    let mut plan = RowPlan::default();
    let mut y = cfg.margin;

    for generation in &structure.generations {
        let rows = split_rows(&generation.members, available, cfg);
        if rows.is_empty() {
            continue;
        }
        plan.wrapped |= rows.len() > 1;

        let row_count = rows.len() as i32;
        for (sub_row, members) in rows.into_iter().enumerate() {
            plan.widest = plan.widest.max(row_width(members.len(), cfg));
            plan.rows.push(RowLayout {
                level: generation.level,
                band: generation.band,
                sub_row,
                y: y + sub_row as i32 * cfg.sub_row_spacing,
                members,
            });
        }
        y = y
            .saturating_add(cfg.level_spacing)
            .saturating_add((row_count - 1).saturating_mul(cfg.sub_row_spacing));
    }

    plan
}

/// Canvas size: the largest of the minimum canvas, the viewport, the widest
/// row plus margins (and jitter room), and the stacked rows plus margins.
/// Width is rounded up to even so rows center exactly.
pub fn canvas_size(plan: &RowPlan, viewport: SizeI, cfg: &LayoutConfig) -> SizeI {
    let jitter_room = if plan.wrapped { 2 * cfg.jitter } else { 0 };
    let content_w = plan.widest.saturating_add(2 * cfg.margin + jitter_room);
    let content_h = plan
        .rows
        .last()
        .map(|r| r.y.saturating_add(cfg.node_size.h + cfg.margin))
        .unwrap_or(0);

    let w = cfg.min_canvas.w.max(viewport.w).max(content_w);
    let w = w.saturating_add(w & 1);
    let h = cfg.min_canvas.h.max(viewport.h).max(content_h);
    SizeI { w, h }
}
