//! Chart figures for the dashboard, in Plotly figure shape.
//!
//! The browser hands these straight to `Plotly.react`, so field names follow
//! Plotly's JSON schema rather than Rust naming.

use serde_json::{json, Value};

use crate::engine::aggregate::{OutcomeSummary, ScatterSelection};
use crate::engine::state::SiteFilter;

/// Qualitative palette for per-site slices (ColorBrewer Set3).
pub const SET3: [&str; 12] = [
    "rgb(141,211,199)",
    "rgb(255,255,179)",
    "rgb(190,186,218)",
    "rgb(251,128,114)",
    "rgb(128,177,211)",
    "rgb(253,180,98)",
    "rgb(179,222,105)",
    "rgb(252,205,229)",
    "rgb(217,217,217)",
    "rgb(188,128,189)",
    "rgb(204,235,197)",
    "rgb(255,237,111)",
];

/// Qualitative palette for booster groups (ColorBrewer Set2).
pub const SET2: [&str; 8] = [
    "rgb(102,194,165)",
    "rgb(252,141,98)",
    "rgb(141,160,203)",
    "rgb(231,138,195)",
    "rgb(166,216,84)",
    "rgb(255,217,47)",
    "rgb(229,196,148)",
    "rgb(179,179,179)",
];

pub const MARKER_SIZE: u32 = 8;
pub const TITLE_FONT_SIZE: u32 = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartTheme {
    pub bg: &'static str,
    pub surface: &'static str,
    pub primary: &'static str,
    pub success: &'static str,
    pub error: &'static str,
    pub text: &'static str,
    pub text_muted: &'static str,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            bg: "#0f1419",
            surface: "#1a1f2e",
            primary: "#00d4ff",
            success: "#00ff88",
            error: "#ff6b6b",
            text: "#ffffff",
            text_muted: "#8b949e",
        }
    }
}

impl ChartTheme {
    fn base_layout(&self, title: &str) -> Value {
        json!({
            "title": { "text": title, "font": { "size": TITLE_FONT_SIZE } },
            "plot_bgcolor": "rgba(0,0,0,0)",
            "paper_bgcolor": "rgba(0,0,0,0)",
            "font": { "color": self.text },
        })
    }
}

pub fn pie_title(site: &SiteFilter) -> String {
    match site {
        SiteFilter::All => "Total Successful Launches by Site".to_string(),
        SiteFilter::Site(s) => format!("Success Rate: {}", s),
    }
}

pub fn scatter_title(site: &SiteFilter) -> String {
    format!("Payload vs Success Rate - {}", site.display_name())
}

/// Proportion chart. An all-zero summary produces a figure with no traces.
pub fn pie_figure(summary: &OutcomeSummary, site: &SiteFilter, theme: &ChartTheme) -> Value {
    let layout = theme.base_layout(&pie_title(site));
    if summary.is_empty() {
        return json!({ "data": [], "layout": layout });
    }

    let (labels, values, colors): (Vec<&str>, Vec<usize>, Vec<&str>) = match summary {
        OutcomeSummary::BySite { buckets } => {
            let mut labels = Vec::with_capacity(buckets.len());
            let mut values = Vec::with_capacity(buckets.len());
            let mut colors = Vec::with_capacity(buckets.len());
            for (i, (s, n)) in buckets.iter().enumerate() {
                labels.push(s.as_str());
                values.push(*n);
                colors.push(SET3[i % SET3.len()]);
            }
            (labels, values, colors)
        }
        OutcomeSummary::SingleSite { buckets, .. } => buckets
            .iter()
            .fold((Vec::new(), Vec::new(), Vec::new()), |mut acc, (outcome, n)| {
                acc.0.push(outcome.label());
                acc.1.push(*n);
                acc.2.push(match outcome {
                    crate::data::Outcome::Success => theme.success,
                    crate::data::Outcome::Failure => theme.error,
                });
                acc
            }),
    };

    json!({
        "data": [{
            "type": "pie",
            "labels": labels,
            "values": values,
            "marker": { "colors": colors },
        }],
        "layout": layout,
    })
}

/// Payload vs outcome scatter, one trace per booster version.
pub fn scatter_figure(selection: &ScatterSelection, site: &SiteFilter, theme: &ChartTheme) -> Value {
    let show_site = site.is_all();
    let traces: Vec<Value> = selection
        .groups()
        .iter()
        .enumerate()
        .map(|(i, (booster, points))| {
            let x: Vec<f64> = points.iter().map(|p| p.payload_mass_kg).collect();
            let y: Vec<u8> = points.iter().map(|p| p.outcome.class_value()).collect();
            let mut trace = json!({
                "type": "scatter",
                "mode": "markers",
                "name": booster,
                "legendgroup": booster,
                "x": x,
                "y": y,
                "marker": { "size": MARKER_SIZE, "color": SET2[i % SET2.len()] },
            });
            if show_site {
                let sites: Vec<&str> = points
                    .iter()
                    .map(|p| p.site.as_deref().unwrap_or_default())
                    .collect();
                trace["customdata"] = json!(sites);
                trace["hovertemplate"] = json!(
                    "Booster Version=%{fullData.name}<br>Payload Mass (kg)=%{x}<br>class=%{y}<br>Launch Site=%{customdata}<extra></extra>"
                );
            }
            trace
        })
        .collect();

    let mut layout = theme.base_layout(&scatter_title(site));
    layout["xaxis"] = json!({ "title": { "text": "Payload Mass (kg)" } });
    layout["yaxis"] = json!({
        "title": { "text": "class" },
        "tickvals": [0, 1],
        "ticktext": ["Failure", "Success"],
    });
    layout["legend"] = json!({ "title": { "text": "Booster Version" } });

    json!({ "data": traces, "layout": layout })
}
