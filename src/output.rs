use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

use crate::dashboard::DashboardReport;
use crate::error::ReportError;

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<(), ReportError> {
    let body = serde_json::to_string_pretty(value)?;
    std::fs::write(path, body)?;
    Ok(())
}

#[derive(Debug, Clone, Tabled)]
pub struct MetricRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

fn metric(name: &str, value: String) -> MetricRow {
    MetricRow {
        metric: name.to_string(),
        value,
    }
}

/// The console view of a generated dashboard, one row per metric.
pub fn metric_rows(report: &DashboardReport) -> Vec<MetricRow> {
    let s = &report.summary;
    vec![
        metric("Inspections completed", s.conditions.total().to_string()),
        metric("Warranty calls", s.warranty_text()),
        metric("Billed calls", s.calls.billed_calls.to_string()),
        metric("Average price per call", s.avg_call_price_text()),
        metric("Repairs", s.repairs.count.to_string()),
        metric("Average price per repair", s.avg_repair_price_text()),
        metric("Average project cost", s.avg_project_cost_text()),
        metric("Average spread", s.avg_spread_text()),
        metric("Projects completed", s.completed.count.to_string()),
        metric("Potential savings", s.savings_text()),
        metric("Projects bought", s.status.total_bought.to_string()),
        metric(
            "Average inspection cost",
            s.avg_inspection_cost_text(),
        ),
    ]
}

pub fn preview_table(rows: &[MetricRow]) {
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table = Table::new(rows.to_vec()).with(Style::markdown()).to_string();
    println!("{}\n", table);
}
