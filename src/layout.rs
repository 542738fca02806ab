//! Page rendering: header, controls, chart placeholders and stat cards.
//!
//! The page is a self-contained HTML document. Charts are drawn client-side by
//! Plotly from the figures returned by `/_dash-update`.

use crate::charts::ChartTheme;
use crate::data::{Dataset, DatasetStats, PayloadRange};
use crate::engine::events::ChartId;
use crate::engine::state::{SelectionState, ALL_SITES};
use crate::state::Config;

pub const TITLE: &str = "SpaceX Launch Analytics";
pub const SUBTITLE: &str = "Interactive Dashboard for Mission Analysis";

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Compact tick label: 2500 -> "2.5k", 10000 -> "10k", 750 -> "750".
pub fn mark_label(v: f64) -> String {
    if v.abs() >= 1000.0 {
        let k = v / 1000.0;
        if (k - k.round()).abs() < 1e-9 {
            format!("{}k", k.round() as i64)
        } else {
            format!("{}k", (k * 10.0).round() / 10.0)
        }
    } else {
        format!("{}", v.round() as i64)
    }
}

/// Five evenly spaced marks across the selector extent.
pub fn slider_marks(extent: PayloadRange) -> Vec<(f64, String)> {
    let span = extent.max - extent.min;
    (0..5)
        .map(|i| {
            let v = extent.min + span * i as f64 / 4.0;
            (v, mark_label(v))
        })
        .collect()
}

fn site_options(dataset: &Dataset) -> String {
    let mut out = format!(
        "<option value=\"{}\" selected>All Sites</option>",
        ALL_SITES
    );
    for site in dataset.sites() {
        let s = escape_html(site);
        out.push_str(&format!("<option value=\"{s}\">{s}</option>"));
    }
    out
}

fn stat_card(value: &str, label: &str, color: &str, theme: &ChartTheme) -> String {
    format!(
        "<div class=\"card\" style=\"background:{surface};\">\
         <h3 style=\"color:{color};\">{value}</h3>\
         <p style=\"color:{muted};\">{label}</p></div>",
        surface = theme.surface,
        muted = theme.text_muted,
    )
}

fn stat_cards(stats: &DatasetStats, theme: &ChartTheme) -> String {
    [
        stat_card(&stats.total.to_string(), "Total Launches", theme.primary, theme),
        stat_card(&stats.successes.to_string(), "Successful", theme.success, theme),
        stat_card(&stats.failures.to_string(), "Failed", theme.error, theme),
        stat_card(
            &format!("{:.1}%", stats.success_rate_pct),
            "Success Rate",
            theme.primary,
            theme,
        ),
    ]
    .concat()
}

pub fn render_page(dataset: &Dataset, cfg: &Config, theme: &ChartTheme) -> String {
    let extent = cfg.slider_extent(dataset.payload_range());
    let initial = SelectionState::initial(dataset.payload_range());
    let handles = cfg.slider_handles(PayloadRange {
        min: initial.payload.low,
        max: initial.payload.high,
    });
    let marks = slider_marks(extent)
        .into_iter()
        .map(|(_, label)| format!("<span>{}</span>", escape_html(&label)))
        .collect::<String>();

    TEMPLATE
        .replace("__TITLE__", TITLE)
        .replace("__SUBTITLE__", SUBTITLE)
        .replace("__BG__", theme.bg)
        .replace("__SURFACE__", theme.surface)
        .replace("__TEXT_MUTED__", theme.text_muted)
        .replace("__TEXT__", theme.text)
        .replace("__SITE_OPTIONS__", &site_options(dataset))
        .replace("__SLIDER_MIN__", &extent.min.to_string())
        .replace("__SLIDER_MAX__", &extent.max.to_string())
        .replace("__SLIDER_STEP__", &cfg.slider_step.to_string())
        .replace("__HANDLE_LOW__", &handles.min.to_string())
        .replace("__HANDLE_HIGH__", &handles.max.to_string())
        .replace("__LOW__", &initial.payload.low.to_string())
        .replace("__HIGH__", &initial.payload.high.to_string())
        .replace("__MARKS__", &marks)
        .replace("__PIE_ID__", ChartId::OutcomePie.element_id())
        .replace("__SCATTER_ID__", ChartId::PayloadScatter.element_id())
        .replace("__STAT_CARDS__", &stat_cards(&dataset.stats(), theme))
}

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>__TITLE__</title>
  <script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
  <style>
    body { margin: 0; background: __BG__; font-family: Arial, sans-serif; }
    .page { background: __BG__; padding: 20px; min-height: 100vh; box-sizing: border-box; }
    .header { background: __SURFACE__; padding: 30px; margin-bottom: 20px; border-radius: 10px; }
    .header h1 { color: __TEXT__; text-align: center; margin: 0; }
    .header p { color: __TEXT_MUTED__; text-align: center; margin: 10px 0 0 0; }
    .row { display: flex; justify-content: space-between; gap: 20px; margin-bottom: 30px; }
    .half { width: 48%; }
    label { color: __TEXT__; margin-bottom: 10px; display: block; }
    select { width: 100%; padding: 8px; background: __SURFACE__; color: __TEXT__; border: 1px solid __TEXT_MUTED__; border-radius: 4px; }
    input[type=range] { width: 100%; }
    .marks { display: flex; justify-content: space-between; color: __TEXT_MUTED__; font-size: 0.85em; }
    .tooltip { color: __TEXT__; text-align: center; margin-top: 6px; }
    .cards { display: flex; justify-content: space-between; gap: 15px; }
    .card { padding: 20px; border-radius: 10px; text-align: center; width: 22%; }
    .card h3 { margin: 0; font-size: 2.5em; }
    .card p { margin: 5px 0 0 0; }
  </style>
</head>
<body>
<div class="page">
  <div class="header">
    <h1>&#128640; __TITLE__</h1>
    <p>__SUBTITLE__</p>
  </div>

  <div class="row">
    <div class="half">
      <label for="site-dropdown">Launch Site:</label>
      <select id="site-dropdown">__SITE_OPTIONS__</select>
    </div>
    <div class="half">
      <label>Payload Range (kg):</label>
      <input id="payload-low" type="range" min="__SLIDER_MIN__" max="__SLIDER_MAX__" step="__SLIDER_STEP__" value="__HANDLE_LOW__">
      <input id="payload-high" type="range" min="__SLIDER_MIN__" max="__SLIDER_MAX__" step="__SLIDER_STEP__" value="__HANDLE_HIGH__">
      <div class="marks">__MARKS__</div>
      <div class="tooltip"><span id="payload-low-value">__LOW__</span> &ndash; <span id="payload-high-value">__HIGH__</span></div>
    </div>
  </div>

  <div class="row">
    <div class="half"><div id="__PIE_ID__"></div></div>
    <div class="half"><div id="__SCATTER_ID__"></div></div>
  </div>

  <div class="cards">__STAT_CARDS__</div>
</div>
<script>
  const site = document.getElementById('site-dropdown');
  const low = document.getElementById('payload-low');
  const high = document.getElementById('payload-high');
  // observed payload range; handles rest on the step grid, so send these
  // until the user moves a handle
  const initial = [__LOW__, __HIGH__];
  let moved = false;

  function bounds() {
    let [a, b] = moved ? [Number(low.value), Number(high.value)] : initial;
    if (a > b) { [a, b] = [b, a]; }
    document.getElementById('payload-low-value').textContent = a;
    document.getElementById('payload-high-value').textContent = b;
    return [a, b];
  }

  async function update(trigger) {
    const [a, b] = bounds();
    const q = new URLSearchParams({ trigger, site: site.value, low: a, high: b });
    const res = await fetch('/_dash-update?' + q.toString());
    if (!res.ok) { console.error('update failed', res.status, await res.text()); return; }
    const figures = await res.json();
    for (const [id, fig] of Object.entries(figures)) {
      Plotly.react(id, fig.data, fig.layout, { responsive: true });
    }
  }

  site.addEventListener('change', () => update('site'));
  const onMove = () => { moved = true; bounds(); };
  low.addEventListener('input', onMove);
  high.addEventListener('input', onMove);
  low.addEventListener('change', () => update('payload'));
  high.addEventListener('change', () => update('payload'));
  update('init');
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{LaunchRecord, Outcome};

    #[test]
    fn marks_match_default_extent() {
        let labels: Vec<String> = slider_marks(PayloadRange {
            min: 0.0,
            max: 10_000.0,
        })
        .into_iter()
        .map(|(_, l)| l)
        .collect();
        assert_eq!(labels, vec!["0", "2.5k", "5k", "7.5k", "10k"]);
    }

    #[test]
    fn page_lists_sites_and_stats() {
        let html = render_page(&Dataset::sample(), &Config::default(), &ChartTheme::default());
        assert!(html.contains("<option value=\"ALL\" selected>All Sites</option>"));
        assert!(html.contains("<option value=\"KSC LC-39A\">KSC LC-39A</option>"));
        assert!(html.contains(">100</h3>"));
        assert!(html.contains(">63.0%</h3>"));
        assert!(html.contains("id=\"success-pie-chart\""));
        assert!(html.contains("id=\"success-payload-scatter-chart\""));
        assert!(html.contains("value=\"2500\""));
        assert!(html.contains("value=\"9000\""));
        assert!(!html.contains("__"));
    }

    #[test]
    fn off_grid_range_keeps_heaviest_launch() {
        let ds = Dataset::new(vec![
            LaunchRecord::new("CCAFS LC-40", 0.0, Outcome::Failure, "F9 v1.0"),
            LaunchRecord::new("VAFB SLC-4E", 9600.0, Outcome::Success, "F9 FT"),
        ]);
        let html = render_page(&ds, &Config::default(), &ChartTheme::default());
        assert!(html.contains(
            "<input id=\"payload-high\" type=\"range\" min=\"0\" max=\"10000\" step=\"500\" value=\"10000\">"
        ));
        assert!(html.contains(
            "<input id=\"payload-low\" type=\"range\" min=\"0\" max=\"10000\" step=\"500\" value=\"0\">"
        ));
        assert!(html.contains("const initial = [0, 9600];"));
        assert!(html.contains("<span id=\"payload-high-value\">9600</span>"));
    }

    #[test]
    fn site_names_are_escaped() {
        let ds = Dataset::new(vec![LaunchRecord::new(
            "<b>pad</b>",
            1.0,
            Outcome::Success,
            "v1",
        )]);
        let html = render_page(&ds, &Config::default(), &ChartTheme::default());
        assert!(html.contains("&lt;b&gt;pad&lt;/b&gt;"));
        assert!(!html.contains("<b>pad</b>"));
    }
}
