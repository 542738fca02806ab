//! Filter/aggregate functions feeding the two charts.
//!
//! Both functions are total over their inputs and side-effect free: an unknown
//! site or an empty payload window yields an empty result, never an error.

use serde::Serialize;
use std::collections::BTreeMap;

use super::state::{PayloadBounds, SiteFilter};
use crate::data::{LaunchRecord, Outcome};

/// Input of the proportion chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OutcomeSummary {
    /// Success count per site, ordered by site name. Failures are not
    /// reported in this mode.
    BySite { buckets: Vec<(String, usize)> },
    /// Success and failure counts for one site, in that order.
    SingleSite {
        site: String,
        buckets: [(Outcome, usize); 2],
    },
}

impl OutcomeSummary {
    pub fn total(&self) -> usize {
        match self {
            OutcomeSummary::BySite { buckets } => buckets.iter().map(|(_, n)| n).sum(),
            OutcomeSummary::SingleSite { buckets, .. } => buckets.iter().map(|(_, n)| n).sum(),
        }
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

pub fn compute_outcome_summary(records: &[LaunchRecord], site: &SiteFilter) -> OutcomeSummary {
    match site {
        SiteFilter::All => {
            let mut by_site: BTreeMap<&str, usize> = BTreeMap::new();
            for r in records {
                let count = by_site.entry(r.site.as_str()).or_insert(0);
                if r.outcome == Outcome::Success {
                    *count += 1;
                }
            }
            OutcomeSummary::BySite {
                buckets: by_site
                    .into_iter()
                    .map(|(s, n)| (s.to_string(), n))
                    .collect(),
            }
        }
        SiteFilter::Site(name) => {
            let (mut success, mut failure) = (0, 0);
            for r in records.iter().filter(|r| &r.site == name) {
                match r.outcome {
                    Outcome::Success => success += 1,
                    Outcome::Failure => failure += 1,
                }
            }
            OutcomeSummary::SingleSite {
                site: name.clone(),
                buckets: [(Outcome::Success, success), (Outcome::Failure, failure)],
            }
        }
    }
}

/// One launch on the payload/outcome scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub payload_mass_kg: f64,
    pub outcome: Outcome,
    pub booster_version: String,
    /// Hover detail, present only when every site is selected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSelection {
    pub points: Vec<ScatterPoint>,
}

impl ScatterSelection {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points partitioned by booster version, groups in first-appearance order.
    pub fn groups(&self) -> Vec<(&str, Vec<&ScatterPoint>)> {
        let mut out: Vec<(&str, Vec<&ScatterPoint>)> = Vec::new();
        for p in &self.points {
            match out.iter().position(|(b, _)| *b == p.booster_version) {
                Some(i) => out[i].1.push(p),
                None => out.push((p.booster_version.as_str(), vec![p])),
            }
        }
        out
    }
}

/// Records inside `bounds` (inclusive) at the selected site, in input order.
/// `bounds.low <= bounds.high` is the caller's precondition.
pub fn compute_scatter_selection(
    records: &[LaunchRecord],
    site: &SiteFilter,
    bounds: PayloadBounds,
) -> ScatterSelection {
    let annotate_site = site.is_all();
    let points = records
        .iter()
        .filter(|r| bounds.contains(r.payload_mass_kg))
        .filter(|r| site.matches(&r.site))
        .map(|r| ScatterPoint {
            payload_mass_kg: r.payload_mass_kg,
            outcome: r.outcome,
            booster_version: r.booster_version.clone(),
            site: annotate_site.then(|| r.site.clone()),
        })
        .collect();
    ScatterSelection { points }
}
