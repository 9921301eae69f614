use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::util::{format_currency, format_number};

/// Roof condition labels in dashboard display order.
pub const CONDITION_LABELS: [&str; 5] = ["Excellent", "Good", "Fair", "Poor", "Bad"];

// Project lifecycle labels mirror the CRM export verbatim, including the
// "(1)PREPARING SPECFICIATION" spelling. Anything else is treated as an
// unknown status and silently excluded from the counts.
pub const STATUS_PREPARING: &str = "(1)PREPARING SPECFICIATION";
pub const STATUS_BIDDING: &str = "(2) BIDDING";
pub const STATUS_PROPOSAL_PENDING: &str = "(3) PROPOSAL PENDING";
pub const STATUS_APPROVED: &str = "(4) APPROVED";
pub const STATUS_REJECTED: &str = "(5) PROPOSAL REJECTED";
pub const STATUS_IN_PROGRESS: &str = "(6) IN-PROGRESS";
pub const STATUS_COMPLETED_PENDING_WDI: &str = "(7) COMPLETED PENDING W.D.I.";
pub const STATUS_COMPLETED: &str = "(8) COMPLETED";
pub const STATUS_ON_HOLD: &str = "(9) ON-HOLD";

/// Display buckets for the status snapshot, in chart order. `<br>` line
/// breaks are part of the chart labels.
pub const STATUS_BUCKET_LABELS: [&str; 8] = [
    "PREPARING",
    "BIDDING",
    "PROPOSALS<br>PENDING",
    "APPROVED",
    "PROPOSALS<br>REJECTED",
    "IN-PROGRESS",
    "ON-HOLD",
    "COMPLETED",
];

// Work-order and receivable subtypes. The trailing spaces on "Leak Call "
// and "Repairs " are present in the exports and significant.
pub const LEAK_CALL: &str = "Leak Call ";
pub const LEAK_CALL_EMERGENCY: &str = "Leak Call - Emergency";
pub const WARRANTY_LEAK_CALL: &str = "Warranty - Leak Call";
pub const REPAIRS_SUBTYPE: &str = "Repairs ";
pub const INSPECTION_TYPE: &str = "Inspection";
pub const WORK_ORDER_COMPLETED: &str = "COMPLETED";
pub const INTERNAL_CHARGE: &str = "INTERNAL CHARGE";

pub const TYPE_OVERLAY: &str = "Reroof (Overlay)";
pub const TYPE_TEAR_OFF: &str = "Reroof (Tear-off)";

/// Square-footage bands for the per-type cost breakdown.
pub const SQFT_BAND_LABELS: [&str; 4] =
    ["0-10,000", "10,000-25,000", "25,000-50,000", "50,000 and up"];

#[derive(Debug, Deserialize)]
pub struct RawRoofRow {
    #[serde(rename = "Roof Condition")]
    pub condition: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawWorkOrderRow {
    #[serde(rename = "SUBTYPE")]
    pub subtype: Option<String>,
    #[serde(rename = "STATUS")]
    pub status: Option<String>,
    #[serde(rename = "FINANCIAL_RESPONSIBILITY")]
    pub financial_responsibility: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawProjectRow {
    #[serde(rename = "STATUS")]
    pub status: Option<String>,
    #[serde(rename = "STATUSDATE")]
    pub status_date: Option<String>,
    #[serde(rename = "BID AMOUNT")]
    pub bid_amount: Option<String>,
    #[serde(rename = "REVISEDCONTRACTAMOUNT")]
    pub revised_contract_amount: Option<String>,
    #[serde(rename = "CONTRACT TERMS NOTES")]
    pub contract_terms_notes: Option<String>,
    #[serde(rename = "TYPE")]
    pub project_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawReceivableRow {
    #[serde(rename = "WORKORDER SUBTYPE")]
    pub workorder_subtype: Option<String>,
    #[serde(rename = "WORKORDER TYPE")]
    pub workorder_type: Option<String>,
    #[serde(rename = "INVOICE AMOUNT")]
    pub invoice_amount: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RoofRecord {
    pub condition: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WorkOrder {
    pub subtype: Option<String>,
    pub status: Option<String>,
    pub financial_responsibility: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProjectRecord {
    pub status: Option<String>,
    pub status_date: Option<NaiveDate>,
    /// Calendar year of `status_date`, derived during normalization.
    pub year: Option<i32>,
    pub bid_amount: Option<f64>,
    pub revised_contract_amount: Option<f64>,
    pub contract_terms_notes: Option<String>,
    pub project_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReceivableRecord {
    pub workorder_subtype: Option<String>,
    pub workorder_type: Option<String>,
    pub invoice_amount: f64,
}

/// Per-condition inspection counts, in `CONDITION_LABELS` order.
#[derive(Debug, Clone, Serialize)]
pub struct ConditionCounts {
    pub labels: Vec<&'static str>,
    pub counts: Vec<usize>,
}

impl ConditionCounts {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Leak-call volume and pricing.
#[derive(Debug, Clone, Serialize)]
pub struct CallStats {
    pub warranty_calls: usize,
    /// `None` when there were no billed or warranty calls at all.
    pub warranty_pct: Option<f64>,
    pub billed_calls: usize,
    pub avg_call_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RepairStats {
    pub count: usize,
    pub avg_price: Option<f64>,
}

/// Completed-project economics for the report window.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedProjectStats {
    pub count: usize,
    pub avg_bid: Option<f64>,
    pub avg_spread: Option<f64>,
}

impl CompletedProjectStats {
    /// Projected savings if every completed project had kept the average
    /// spread.
    pub fn potential_savings(&self) -> Option<f64> {
        self.avg_spread.map(|s| s * self.count as f64)
    }
}

/// The eight-bucket status snapshot behind the panel chart.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub labels: Vec<&'static str>,
    pub counts: Vec<usize>,
    /// completed + in-progress + approved.
    pub total_bought: usize,
    pub total_projects: usize,
}

/// Cost-per-square-foot breakdown by project type and size band.
///
/// `overlay_values` / `tear_off_values` always hold one entry per band;
/// `None` marks a band the data never touched, while an absent project
/// type yields four explicit zeros.
#[derive(Debug, Clone, Serialize)]
pub struct SqftBreakdown {
    pub type_labels: Vec<String>,
    pub type_values: Vec<f64>,
    pub band_labels: Vec<&'static str>,
    pub overlay_values: Vec<Option<f64>>,
    pub tear_off_values: Vec<Option<f64>>,
}

/// Everything the metrics engine computes for one report, by name.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub conditions: ConditionCounts,
    pub calls: CallStats,
    pub repairs: RepairStats,
    pub completed: CompletedProjectStats,
    pub status: StatusSnapshot,
    pub sqft: SqftBreakdown,
    pub avg_inspection_cost: Option<f64>,
}

fn currency_or_na(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format_currency(v, decimals),
        None => "n/a".to_string(),
    }
}

impl DashboardSummary {
    /// `"7 (35%)"`, or `"0 (n/a)"` when no calls were made at all.
    pub fn warranty_text(&self) -> String {
        match self.calls.warranty_pct {
            Some(pct) => format!(
                "{} ({}%)",
                self.calls.warranty_calls,
                format_number(pct, 0)
            ),
            None => format!("{} (n/a)", self.calls.warranty_calls),
        }
    }

    pub fn avg_call_price_text(&self) -> String {
        currency_or_na(self.calls.avg_call_price, 2)
    }

    pub fn avg_repair_price_text(&self) -> String {
        currency_or_na(self.repairs.avg_price, 2)
    }

    // Project cost and spread render with whole dollars; the per-call and
    // per-repair prices keep cents. The asymmetry is part of the dashboard
    // contract.
    pub fn avg_project_cost_text(&self) -> String {
        currency_or_na(self.completed.avg_bid, 0)
    }

    pub fn avg_spread_text(&self) -> String {
        currency_or_na(self.completed.avg_spread, 0)
    }

    /// `"$50 = $150 potential savings"`.
    pub fn savings_text(&self) -> String {
        match (self.completed.avg_spread, self.completed.potential_savings()) {
            (Some(spread), Some(total)) => format!(
                "{} = {} potential savings",
                format_currency(spread, 0),
                format_currency(total, 0)
            ),
            _ => "n/a".to_string(),
        }
    }

    pub fn avg_inspection_cost_text(&self) -> String {
        format!(
            "Average cost for each inspection: {}",
            currency_or_na(self.avg_inspection_cost, 2)
        )
    }
}
