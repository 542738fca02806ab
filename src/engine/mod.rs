//! Filter/aggregate engine driven by typed control events.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Controls   │────►│ ControlEvent │────►│   Reducer    │
//! │ (site/range) │     │   (typed)    │     │  (pure fn)   │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                                                  │
//!                                                  ▼
//!                      ┌──────────────┐     ┌──────────────┐
//!                      │ Chart figures│◄────│  Aggregates  │
//!                      │  (Plotly)    │     │ (summary/pts)│
//!                      └──────────────┘     └──────────────┘
//! ```
//!
//! The dataset is read-only and passed in by reference; the engine never
//! mutates it and keeps no state between calls.

pub mod aggregate;
pub mod events;
pub mod reducer;
pub mod state;
