//! Summary statistics derived from catalog collections.
//!
//! Everything here is pure: no I/O, no clock reads (callers pass `now`), and
//! the result does not depend on the order of the input.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::{Eip, EipCategory, EipStatus, EipType, Project, ProjectStatus};

/// Window used for `recently_updated`.
pub const RECENT_WINDOW_DAYS: i64 = 30;

/// Grouped counts over a proposal collection.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedStats {
    pub total: usize,
    pub by_status: BTreeMap<EipStatus, usize>,
    pub by_category: BTreeMap<EipCategory, usize>,
    pub by_type: BTreeMap<EipType, usize>,
    pub recently_updated: usize,
}

/// Compute [`AggregatedStats`] for `eips` as seen at `now`.
///
/// A proposal counts as recently updated when its last update (or creation
/// date) is strictly after `now - 30 days`.
pub fn compute_stats(eips: &[Eip], now: DateTime<Utc>) -> AggregatedStats {
    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);

    let mut stats = AggregatedStats {
        total: eips.len(),
        by_status: BTreeMap::new(),
        by_category: BTreeMap::new(),
        by_type: BTreeMap::new(),
        recently_updated: 0,
    };

    for eip in eips {
        *stats.by_status.entry(eip.status).or_default() += 1;
        *stats.by_type.entry(eip.eip_type).or_default() += 1;
        if let Some(category) = eip.category {
            *stats.by_category.entry(category).or_default() += 1;
        }
        if eip.last_updated() > cutoff {
            stats.recently_updated += 1;
        }
    }

    stats
}

/// Grouped counts over a project collection.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total: usize,
    pub by_status: BTreeMap<ProjectStatus, usize>,
    /// Number of projects implementing each proposal.
    pub by_eip: BTreeMap<u32, usize>,
}

pub fn compute_project_stats(projects: &[Project]) -> ProjectStats {
    let mut stats = ProjectStats {
        total: projects.len(),
        by_status: BTreeMap::new(),
        by_eip: BTreeMap::new(),
    };

    for project in projects {
        *stats.by_status.entry(project.status).or_default() += 1;
        let mut seen = Vec::with_capacity(project.eip_numbers.len());
        for number in &project.eip_numbers {
            if !seen.contains(number) {
                seen.push(*number);
                *stats.by_eip.entry(*number).or_default() += 1;
            }
        }
    }

    stats
}
