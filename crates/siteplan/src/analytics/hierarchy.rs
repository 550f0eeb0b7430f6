//! Road hierarchy check.
//!
//! Vehicular tiers have levels (residential 0, local 1, secondary 2,
//! primary 3). Two segments meeting at a node whose levels differ by more
//! than one are a violation: a residential street feeding straight into a
//! primary road, for instance.

use serde::Serialize;

use crate::roads::{RoadSegment, RoadTier};

use super::network_stats::RoadNode;

/// One offending pair of segments at a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyViolation {
    pub node: [f64; 2],
    pub low_segment_id: u32,
    pub high_segment_id: u32,
    pub low_tier: RoadTier,
    pub high_tier: RoadTier,
    /// Level difference minus one.
    pub levels_skipped: u8,
}

pub(crate) fn find_violations(segments: &[&RoadSegment], nodes: &[RoadNode]) -> Vec<HierarchyViolation> {
    let mut violations = Vec::new();
    for node in nodes {
        for (a_pos, &(a, _)) in node.incident.iter().enumerate() {
            for &(b, _) in &node.incident[a_pos + 1..] {
                let (sa, sb) = (segments[a], segments[b]);
                let (Some(level_a), Some(level_b)) = (sa.tier.hierarchy_level(), sb.tier.hierarchy_level())
                else {
                    continue;
                };
                let diff = level_a.abs_diff(level_b);
                if diff <= 1 {
                    continue;
                }
                let (low, high) = if level_a < level_b { (sa, sb) } else { (sb, sa) };
                violations.push(HierarchyViolation {
                    node: [node.position.x, node.position.y],
                    low_segment_id: low.id.0,
                    high_segment_id: high.id.0,
                    low_tier: low.tier,
                    high_tier: high.tier,
                    levels_skipped: diff - 1,
                });
            }
        }
    }
    violations
}
