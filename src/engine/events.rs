//! Typed control events, one per dashboard control.

use serde::{Deserialize, Serialize};

use super::state::{PayloadBounds, SiteFilter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ControlEvent {
    /// First render of the page; every chart is produced.
    Init,
    /// The site dropdown changed.
    SiteSelected(SiteFilter),
    /// The payload range selector changed.
    PayloadChanged(PayloadBounds),
}

impl ControlEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ControlEvent::Init => "init",
            ControlEvent::SiteSelected(_) => "site",
            ControlEvent::PayloadChanged(_) => "payload",
        }
    }
}

/// Dashboard outputs a control can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartId {
    OutcomePie,
    PayloadScatter,
}

impl ChartId {
    /// Element id of the chart placeholder on the page.
    pub fn element_id(&self) -> &'static str {
        match self {
            ChartId::OutcomePie => "success-pie-chart",
            ChartId::PayloadScatter => "success-payload-scatter-chart",
        }
    }
}

/// A freshly computed figure for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartUpdate {
    pub chart: ChartId,
    pub figure: serde_json::Value,
}
