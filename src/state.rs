use std::path::PathBuf;

use crate::data::PayloadRange;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// CSV with launch records; the built-in sample table is used when unset.
    pub dataset_path: Option<PathBuf>,
    pub slider_min: f64,
    pub slider_max: f64,
    pub slider_step: f64,
    /// Deadline for reading one request from a connection.
    pub read_timeout_ms: u64,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8050,
            dataset_path: None,
            slider_min: 0.0,
            slider_max: 10_000.0,
            slider_step: 500.0,
            read_timeout_ms: 5_000,
            debug: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparseable values keep their defaults.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        Self {
            host: var("DASH_HOST").unwrap_or(d.host),
            port: var("DASH_PORT").and_then(|v| v.parse().ok()).unwrap_or(d.port),
            dataset_path: var("DATASET_PATH").filter(|v| !v.is_empty()).map(PathBuf::from),
            slider_min: var("SLIDER_MIN").and_then(|v| v.parse().ok()).unwrap_or(d.slider_min),
            slider_max: var("SLIDER_MAX").and_then(|v| v.parse().ok()).unwrap_or(d.slider_max),
            slider_step: var("SLIDER_STEP").and_then(|v| v.parse().ok()).filter(|v: &f64| *v > 0.0).unwrap_or(d.slider_step),
            read_timeout_ms: var("READ_TIMEOUT_MS").and_then(|v| v.parse().ok()).unwrap_or(d.read_timeout_ms),
            debug: var("DEBUG").map(|v| v == "1" || v == "true").unwrap_or(d.debug),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Extent of the payload range selector. Widened so the observed
    /// payload range always fits inside it, with `max` on the step grid
    /// anchored at `min` (a range input can only rest on `min + k * step`).
    pub fn slider_extent(&self, observed: Option<PayloadRange>) -> PayloadRange {
        let (mut min, mut max) = (self.slider_min, self.slider_max.max(self.slider_min));
        if let Some(r) = observed {
            min = min.min(r.min);
            max = max.max(r.max);
        }
        if self.slider_step > 0.0 {
            max = min + ((max - min) / self.slider_step).ceil() * self.slider_step;
        }
        PayloadRange { min, max }
    }

    /// Handle positions for an observed range: low floored and high ceiled to
    /// the step grid, so the handles enclose every observed payload.
    pub fn slider_handles(&self, observed: PayloadRange) -> PayloadRange {
        let extent = self.slider_extent(Some(observed));
        if self.slider_step <= 0.0 {
            return observed;
        }
        let step = self.slider_step;
        let low = extent.min + ((observed.min - extent.min) / step).floor() * step;
        let high = extent.min + ((observed.max - extent.min) / step).ceil() * step;
        PayloadRange {
            min: low.max(extent.min),
            max: high.min(extent.max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_dashboard() {
        let cfg = Config::default();
        assert_eq!(cfg.bind_addr(), "127.0.0.1:8050");
        assert_eq!(cfg.slider_step, 500.0);
        assert!(cfg.dataset_path.is_none());
    }

    #[test]
    fn slider_extent_covers_observed_range() {
        let cfg = Config::default();
        let ext = cfg.slider_extent(Some(PayloadRange {
            min: 350.0,
            max: 15_600.0,
        }));
        assert_eq!(ext.min, 0.0);
        assert_eq!(ext.max, 16_000.0);

        let ext = cfg.slider_extent(None);
        assert_eq!(ext.max, 10_000.0);
    }

    #[test]
    fn handles_enclose_off_grid_range() {
        let cfg = Config::default();
        let h = cfg.slider_handles(PayloadRange {
            min: 350.0,
            max: 9_600.0,
        });
        assert_eq!((h.min, h.max), (0.0, 10_000.0));

        let h = cfg.slider_handles(PayloadRange {
            min: 2_500.0,
            max: 9_000.0,
        });
        assert_eq!((h.min, h.max), (2_500.0, 9_000.0));
    }

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn env_values_override_defaults() {
        let cfg = Config::from_lookup(lookup(&[
            ("DASH_HOST", "0.0.0.0"),
            ("DASH_PORT", "9000"),
            ("DATASET_PATH", "data/launches.csv"),
            ("SLIDER_STEP", "250"),
            ("READ_TIMEOUT_MS", "750"),
            ("DEBUG", "true"),
        ]));
        assert_eq!(cfg.bind_addr(), "0.0.0.0:9000");
        assert_eq!(cfg.dataset_path, Some(PathBuf::from("data/launches.csv")));
        assert_eq!(cfg.slider_step, 250.0);
        assert_eq!(cfg.read_timeout_ms, 750);
        assert!(cfg.debug);
    }

    #[test]
    fn unparseable_env_values_fall_back() {
        let cfg = Config::from_lookup(lookup(&[
            ("DASH_PORT", "eighty"),
            ("SLIDER_MAX", "lots"),
            ("SLIDER_STEP", "0"),
            ("DATASET_PATH", ""),
            ("DEBUG", "yes please"),
        ]));
        assert_eq!(cfg.port, 8050);
        assert_eq!(cfg.slider_max, 10_000.0);
        assert_eq!(cfg.slider_step, 500.0);
        assert!(cfg.dataset_path.is_none());
        assert!(!cfg.debug);

        let cfg = Config::from_lookup(lookup(&[("DEBUG", "1")]));
        assert!(cfg.debug);
    }
}
