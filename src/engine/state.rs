//! Control values the filter engine is driven by.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::PayloadRange;

/// Dropdown value meaning "every launch site".
pub const ALL_SITES: &str = "ALL";

/// Site selection: either every site or one site identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SiteFilter {
    All,
    Site(String),
}

impl SiteFilter {
    pub fn parse(raw: &str) -> Self {
        if raw == ALL_SITES {
            SiteFilter::All
        } else {
            SiteFilter::Site(raw.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, SiteFilter::All)
    }

    pub fn matches(&self, site: &str) -> bool {
        match self {
            SiteFilter::All => true,
            SiteFilter::Site(s) => s == site,
        }
    }

    /// Human label: the site name, or "All Sites".
    pub fn display_name(&self) -> &str {
        match self {
            SiteFilter::All => "All Sites",
            SiteFilter::Site(s) => s,
        }
    }
}

impl fmt::Display for SiteFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteFilter::All => f.write_str(ALL_SITES),
            SiteFilter::Site(s) => f.write_str(s),
        }
    }
}

impl From<String> for SiteFilter {
    fn from(raw: String) -> Self {
        SiteFilter::parse(&raw)
    }
}

impl From<SiteFilter> for String {
    fn from(f: SiteFilter) -> Self {
        f.to_string()
    }
}

/// Inclusive payload window. Callers guarantee `low <= high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayloadBounds {
    pub low: f64,
    pub high: f64,
}

impl PayloadBounds {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, payload_mass_kg: f64) -> bool {
        self.low <= payload_mass_kg && payload_mass_kg <= self.high
    }
}

impl From<PayloadRange> for PayloadBounds {
    fn from(r: PayloadRange) -> Self {
        Self {
            low: r.min,
            high: r.max,
        }
    }
}

/// Current value of both dashboard controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    pub site: SiteFilter,
    pub payload: PayloadBounds,
}

impl SelectionState {
    /// Initial selection: every site, the full observed payload range.
    pub fn initial(range: Option<PayloadRange>) -> Self {
        Self {
            site: SiteFilter::All,
            payload: range
                .map(PayloadBounds::from)
                .unwrap_or(PayloadBounds::new(0.0, 0.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_parses_to_all() {
        assert_eq!(SiteFilter::parse("ALL"), SiteFilter::All);
        assert_eq!(
            SiteFilter::parse("KSC LC-39A"),
            SiteFilter::Site("KSC LC-39A".to_string())
        );
        // case sensitive: only the exact sentinel selects every site
        assert!(!SiteFilter::parse("all").is_all());
    }

    #[test]
    fn serde_uses_plain_string() {
        let json = serde_json::to_string(&SiteFilter::All).unwrap();
        assert_eq!(json, "\"ALL\"");
        let back: SiteFilter = serde_json::from_str("\"VAFB SLC-4E\"").unwrap();
        assert_eq!(back, SiteFilter::Site("VAFB SLC-4E".to_string()));
    }

    #[test]
    fn bounds_are_inclusive() {
        let b = PayloadBounds::new(1000.0, 2000.0);
        assert!(b.contains(1000.0));
        assert!(b.contains(2000.0));
        assert!(!b.contains(2000.5));
    }

    #[test]
    fn initial_selection_spans_range() {
        let s = SelectionState::initial(Some(PayloadRange {
            min: 10.0,
            max: 20.0,
        }));
        assert!(s.site.is_all());
        assert_eq!(s.payload, PayloadBounds::new(10.0, 20.0));
    }
}
