//! Tree layouts.
//!
//! A single depth-first pass places every visible node relative to its parent. The root always
//! sits at the origin; collapsed nodes are placed but their subtrees are not.

use crate::config::LayoutSettings;
use crate::geom::{Point, point};
use crate::model::MindMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    #[default]
    MindMap,
    OrgChart,
    Fishbone,
    Timeline,
    Logic,
}

impl LayoutMode {
    pub const ALL: [LayoutMode; 5] = [
        LayoutMode::MindMap,
        LayoutMode::OrgChart,
        LayoutMode::Fishbone,
        LayoutMode::Timeline,
        LayoutMode::Logic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutMode::MindMap => "mind-map",
            LayoutMode::OrgChart => "org-chart",
            LayoutMode::Fishbone => "fishbone",
            LayoutMode::Timeline => "timeline",
            LayoutMode::Logic => "logic",
        }
    }

    /// Name shown to users when the layout changes.
    pub fn display_name(self) -> &'static str {
        match self {
            LayoutMode::MindMap => "思维导图",
            LayoutMode::OrgChart => "组织结构图",
            LayoutMode::Fishbone => "鱼骨图",
            LayoutMode::Timeline => "时间线",
            LayoutMode::Logic => "逻辑图",
        }
    }
}

impl std::fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown layout mode: {0}")]
pub struct UnknownLayoutMode(pub String);

impl FromStr for LayoutMode {
    type Err = UnknownLayoutMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayoutMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| UnknownLayoutMode(s.to_string()))
    }
}

/// Layout-space position per visible node, in placement (pre-order) order.
pub type Positions = IndexMap<String, Point>;

#[derive(Debug, Clone, Copy)]
struct Slot {
    level: usize,
    index: usize,
    siblings: usize,
    parent: Point,
}

fn place(mode: LayoutMode, slot: Slot, gaps: &LayoutSettings) -> Point {
    if slot.level == 0 {
        return point(0.0, 0.0);
    }
    let h = gaps.horizontal_gap;
    let v = gaps.vertical_gap;
    let index = slot.index as f64;
    let n = slot.siblings as f64;
    let level = slot.level as f64;
    let alternate = if slot.index % 2 == 0 { -1.0 } else { 1.0 };

    match mode {
        LayoutMode::MindMap => {
            let spread = (n - 1.0) * v / 2.0;
            point(slot.parent.x + h, slot.parent.y - spread + index * v)
        }
        LayoutMode::OrgChart => point(
            slot.parent.x + (index - (n - 1.0) / 2.0) * h,
            slot.parent.y + v,
        ),
        LayoutMode::Fishbone => {
            if slot.level == 1 {
                point(h * (1.0 + (slot.index / 2) as f64), alternate * v)
            } else {
                let direction = if slot.parent.y < 0.0 { -1.0 } else { 1.0 };
                point(
                    slot.parent.x + h / 2.0,
                    slot.parent.y + direction * v * (0.5 + index * 0.3),
                )
            }
        }
        LayoutMode::Timeline => point(level * h, alternate * v),
        LayoutMode::Logic => {
            let radius = level * h / 2.0;
            let angle = (index / n) * 2.0 * PI;
            point(radius * angle.cos(), radius * angle.sin())
        }
    }
}

fn place_subtree(
    map: &MindMap,
    id: &str,
    slot: Slot,
    mode: LayoutMode,
    gaps: &LayoutSettings,
    out: &mut Positions,
) {
    let Some(node) = map.get(id) else {
        return;
    };
    // Guards against re-entering a node if the tree were ever malformed.
    if out.contains_key(id) {
        return;
    }

    let at = place(mode, slot, gaps);
    out.insert(node.id.clone(), at);

    if node.collapsed {
        return;
    }
    let visible: Vec<&str> = map.children_of(id).map(|c| c.id.as_str()).collect();
    let siblings = visible.len();
    for (index, child) in visible.into_iter().enumerate() {
        place_subtree(
            map,
            child,
            Slot {
                level: slot.level + 1,
                index,
                siblings,
                parent: at,
            },
            mode,
            gaps,
            out,
        );
    }
}

/// Computes positions for every visible node. Pure: identical inputs give identical output.
pub fn compute_positions(map: &MindMap, mode: LayoutMode, gaps: &LayoutSettings) -> Positions {
    let mut out = Positions::with_capacity(map.len());
    place_subtree(
        map,
        map.root_id(),
        Slot {
            level: 0,
            index: 0,
            siblings: 1,
            parent: point(0.0, 0.0),
        },
        mode,
        gaps,
        &mut out,
    );
    tracing::debug!(mode = %mode, placed = out.len(), "computed mind map layout");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::demo_strategy_map;

    fn layout(mode: LayoutMode) -> Positions {
        compute_positions(&demo_strategy_map(), mode, &LayoutSettings::default())
    }

    fn at(p: &Positions, id: &str) -> (f64, f64) {
        let pt = p[id];
        (pt.x, pt.y)
    }

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn every_mode_places_root_at_origin_and_all_nodes() {
        for mode in LayoutMode::ALL {
            let p = layout(mode);
            assert_eq!(p.len(), 13, "{mode}");
            assert_eq!(at(&p, "root"), (0.0, 0.0));
        }
    }

    #[test]
    fn mind_map_spreads_siblings_symmetrically() {
        let p = layout(LayoutMode::MindMap);
        assert_eq!(at(&p, "func"), (200.0, -200.0));
        assert_eq!(at(&p, "security"), (200.0, 0.0));
        assert_eq!(at(&p, "compat"), (200.0, 200.0));
        assert_eq!(at(&p, "login"), (400.0, -300.0));
        assert_eq!(at(&p, "export"), (400.0, -100.0));
    }

    #[test]
    fn org_chart_centers_children_under_parent() {
        let p = layout(LayoutMode::OrgChart);
        assert_eq!(at(&p, "func"), (-400.0, 100.0));
        assert_eq!(at(&p, "security"), (0.0, 100.0));
        assert_eq!(at(&p, "response"), (-300.0, 200.0));
        assert_eq!(at(&p, "concurrency"), (-100.0, 200.0));
    }

    #[test]
    fn fishbone_alternates_sides_and_keeps_them() {
        let p = layout(LayoutMode::Fishbone);
        assert_eq!(at(&p, "func"), (200.0, -100.0));
        assert_eq!(at(&p, "perf"), (200.0, 100.0));
        assert_eq!(at(&p, "security"), (400.0, -100.0));
        assert_eq!(at(&p, "compat"), (600.0, -100.0));
        assert!(close(at(&p, "login"), (300.0, -150.0)));
        assert!(close(at(&p, "upload"), (300.0, -180.0)));
        assert!(close(at(&p, "concurrency"), (300.0, 180.0)));
    }

    #[test]
    fn timeline_uses_level_for_x() {
        let p = layout(LayoutMode::Timeline);
        assert_eq!(at(&p, "func"), (200.0, -100.0));
        assert_eq!(at(&p, "perf"), (200.0, 100.0));
        assert_eq!(at(&p, "upload"), (400.0, 100.0));
    }

    #[test]
    fn logic_is_radial() {
        let p = layout(LayoutMode::Logic);
        assert!(close(at(&p, "func"), (100.0, 0.0)));
        let (x, y) = at(&p, "perf");
        assert!(((x * x + y * y).sqrt() - 100.0).abs() < 1e-9);
        let (x, y) = at(&p, "login");
        assert!(((x * x + y * y).sqrt() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn collapsed_subtree_is_not_placed() {
        let map = demo_strategy_map().toggle_collapsed("func").unwrap();
        for mode in LayoutMode::ALL {
            let p = compute_positions(&map, mode, &LayoutSettings::default());
            assert!(p.contains_key("func"));
            for hidden in ["login", "upload", "export"] {
                assert!(!p.contains_key(hidden), "{mode} placed {hidden}");
            }
        }
    }

    #[test]
    fn layout_is_deterministic() {
        for mode in LayoutMode::ALL {
            assert_eq!(layout(mode), layout(mode));
        }
    }

    #[test]
    fn layout_mode_parses_from_its_id() {
        for mode in LayoutMode::ALL {
            assert_eq!(mode.as_str().parse::<LayoutMode>().unwrap(), mode);
        }
        assert!("radial".parse::<LayoutMode>().is_err());
    }
}
