//! End-to-end report assembly: four CSV streams in, one dashboard out.

use chrono::NaiveDate;
use serde_json::{json, Value};
use std::io::Read;

use crate::charts::{self, ChartRenderer};
use crate::error::ReportError;
use crate::loader;
use crate::metrics;
use crate::types::{DashboardSummary, ProjectRecord, ReceivableRecord, RoofRecord, WorkOrder};

/// The four normalized tables for one report request. Built fresh per
/// request and discarded afterwards; nothing here is shared or cached.
#[derive(Debug, Clone)]
pub struct InputTables {
    pub roofs: Vec<RoofRecord>,
    pub work_orders: Vec<WorkOrder>,
    pub projects: Vec<ProjectRecord>,
    pub receivables: Vec<ReceivableRecord>,
}

pub fn load_tables<R: Read>(
    roofs: R,
    work_orders: R,
    projects: R,
    receivables: R,
) -> Result<InputTables, ReportError> {
    Ok(InputTables {
        roofs: loader::load_roofs(roofs)?,
        work_orders: loader::load_work_orders(work_orders)?,
        projects: loader::load_projects(projects)?,
        receivables: loader::load_receivables(receivables)?,
    })
}

/// One generated dashboard: the named summary plus the two chart
/// references handed back by the renderer.
#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub summary: DashboardSummary,
    pub pie_chart: String,
    pub panel_chart: String,
}

impl DashboardReport {
    /// The twelve dashboard slots in the order the HTML/PDF templates
    /// index into them. Slot types follow the legacy sequence exactly:
    /// the billed-call and completed-project counts are strings, the
    /// repair count is a number.
    pub fn legacy_values(&self) -> Vec<Value> {
        let s = &self.summary;
        vec![
            json!(self.pie_chart),
            json!(s.warranty_text()),
            json!(s.calls.billed_calls.to_string()),
            json!(s.avg_call_price_text()),
            json!(s.repairs.count),
            json!(s.avg_repair_price_text()),
            json!(s.avg_project_cost_text()),
            json!(s.avg_spread_text()),
            json!(s.completed.count.to_string()),
            json!(s.savings_text()),
            json!(self.panel_chart),
            json!(s.avg_inspection_cost_text()),
        ]
    }
}

/// Compute the summary and render both charts for already-loaded tables.
pub fn report_from_tables(
    tables: &InputTables,
    start_date: NaiveDate,
    renderer: &dyn ChartRenderer,
) -> Result<DashboardReport, ReportError> {
    let summary = metrics::compute_summary(
        &tables.roofs,
        &tables.work_orders,
        &tables.projects,
        &tables.receivables,
        start_date,
    );

    let pie = charts::condition_pie(&summary.conditions);
    let panel = charts::project_panel(&summary);
    let pie_chart = renderer.render("roof_conditions", &serde_json::to_value(&pie)?)?;
    let panel_chart = renderer.render("project_snapshot", &serde_json::to_value(&panel)?)?;

    Ok(DashboardReport {
        summary,
        pie_chart,
        panel_chart,
    })
}

/// Full pipeline from raw CSV streams, the entry point an embedding web
/// layer calls once per report request.
pub fn build_dashboard<R: Read>(
    roofs: R,
    work_orders: R,
    projects: R,
    receivables: R,
    start_date: NaiveDate,
    renderer: &dyn ChartRenderer,
) -> Result<DashboardReport, ReportError> {
    let tables = load_tables(roofs, work_orders, projects, receivables)?;
    report_from_tables(&tables, start_date, renderer)
}
