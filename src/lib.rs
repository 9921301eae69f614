//! Dashboard pipeline for a roofing-services business.
//!
//! Four CSV exports (roof inspections, work orders, projects, accounts
//! receivable) go in; a typed summary of ~12 dashboard metrics and two
//! declarative chart specifications come out. Chart rendering and the
//! HTML/PDF surface are external collaborators reached through the
//! `ChartRenderer` seam in [`charts`].

pub mod charts;
pub mod dashboard;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod types;
pub mod util;
