//! Pure reducer: (SelectionState, ControlEvent) -> Vec<ChartUpdate>
//!
//! Dispatch mirrors the control wiring of the page:
//!
//! | Event            | Outputs                    |
//! |------------------|----------------------------|
//! | `Init`           | outcome pie, scatter       |
//! | `SiteSelected`   | outcome pie, scatter       |
//! | `PayloadChanged` | scatter                    |
//!
//! Nothing is cached between calls; every update is recomputed from the dataset.

use super::aggregate::{compute_outcome_summary, compute_scatter_selection};
use super::events::{ChartId, ChartUpdate, ControlEvent};
use super::state::SelectionState;
use crate::charts::{pie_figure, scatter_figure, ChartTheme};
use crate::data::Dataset;

pub fn reduce(
    state: &mut SelectionState,
    event: ControlEvent,
    dataset: &Dataset,
    theme: &ChartTheme,
) -> Vec<ChartUpdate> {
    let charts: &[ChartId] = match event {
        ControlEvent::Init => &[ChartId::OutcomePie, ChartId::PayloadScatter],
        ControlEvent::SiteSelected(site) => {
            state.site = site;
            &[ChartId::OutcomePie, ChartId::PayloadScatter]
        }
        ControlEvent::PayloadChanged(bounds) => {
            state.payload = bounds;
            &[ChartId::PayloadScatter]
        }
    };

    charts
        .iter()
        .map(|chart| ChartUpdate {
            chart: *chart,
            figure: render_chart(*chart, state, dataset, theme),
        })
        .collect()
}

/// Figure for one chart under the given selection.
pub fn render_chart(
    chart: ChartId,
    state: &SelectionState,
    dataset: &Dataset,
    theme: &ChartTheme,
) -> serde_json::Value {
    match chart {
        ChartId::OutcomePie => {
            let summary = compute_outcome_summary(dataset.records(), &state.site);
            pie_figure(&summary, &state.site, theme)
        }
        ChartId::PayloadScatter => {
            let selection = compute_scatter_selection(dataset.records(), &state.site, state.payload);
            scatter_figure(&selection, &state.site, theme)
        }
    }
}
