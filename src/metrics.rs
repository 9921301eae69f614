//! The metrics engine: pure aggregation over the four normalized tables.
//!
//! Every sub-computation is a standalone function over immutable slices so
//! it can be tested on its own, and [`compute_summary`] just assembles
//! them. Nothing here does I/O or holds state between calls.

use crate::types::{
    CallStats, CompletedProjectStats, ConditionCounts, DashboardSummary, ProjectRecord,
    ReceivableRecord, RepairStats, RoofRecord, SqftBreakdown, StatusSnapshot, WorkOrder,
    CONDITION_LABELS, INSPECTION_TYPE, INTERNAL_CHARGE, LEAK_CALL, LEAK_CALL_EMERGENCY,
    REPAIRS_SUBTYPE, SQFT_BAND_LABELS, STATUS_APPROVED, STATUS_BIDDING, STATUS_BUCKET_LABELS,
    STATUS_COMPLETED, STATUS_COMPLETED_PENDING_WDI, STATUS_IN_PROGRESS, STATUS_ON_HOLD,
    STATUS_PREPARING, STATUS_PROPOSAL_PENDING, STATUS_REJECTED, TYPE_OVERLAY, TYPE_TEAR_OFF,
    WARRANTY_LEAK_CALL, WORK_ORDER_COMPLETED,
};
use crate::util::{extract_sqft, mean, round2};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Compute every dashboard metric from the four tables and a report start
/// date. Deterministic: identical inputs produce identical summaries.
pub fn compute_summary(
    roofs: &[RoofRecord],
    work_orders: &[WorkOrder],
    projects: &[ProjectRecord],
    receivables: &[ReceivableRecord],
    start_date: NaiveDate,
) -> DashboardSummary {
    DashboardSummary {
        conditions: count_conditions(roofs),
        calls: call_stats(work_orders, receivables),
        repairs: repair_stats(receivables),
        completed: completed_project_stats(projects, start_date),
        status: status_snapshot(projects, start_date),
        sqft: sqft_breakdown(projects, start_date),
        avg_inspection_cost: avg_inspection_cost(receivables),
    }
}

/// Count inspected roofs per condition label, skipping rows with no
/// recorded condition. Label order is fixed Excellent through Bad.
pub fn count_conditions(roofs: &[RoofRecord]) -> ConditionCounts {
    let counts = CONDITION_LABELS
        .iter()
        .map(|label| {
            roofs
                .iter()
                .filter(|r| r.condition.as_deref() == Some(*label))
                .count()
        })
        .collect();
    ConditionCounts {
        labels: CONDITION_LABELS.to_vec(),
        counts,
    }
}

fn is_leak_call(subtype: Option<&str>) -> bool {
    subtype == Some(LEAK_CALL) || subtype == Some(LEAK_CALL_EMERGENCY)
}

/// Warranty and billed leak-call statistics.
///
/// Work orders count only when completed and carrying a subtype. A
/// warranty call is a leak call charged internally, or a work order whose
/// subtype is the dedicated warranty label. Billed calls come from the
/// receivables side, matched on the same leak-call subtypes.
pub fn call_stats(work_orders: &[WorkOrder], receivables: &[ReceivableRecord]) -> CallStats {
    let completed: Vec<&WorkOrder> = work_orders
        .iter()
        .filter(|w| w.subtype.is_some() && w.status.as_deref() == Some(WORK_ORDER_COMPLETED))
        .collect();

    let internal_leaks = completed
        .iter()
        .filter(|w| {
            is_leak_call(w.subtype.as_deref())
                && w.financial_responsibility.as_deref() == Some(INTERNAL_CHARGE)
        })
        .count();
    let labelled_warranty = completed
        .iter()
        .filter(|w| w.subtype.as_deref() == Some(WARRANTY_LEAK_CALL))
        .count();
    let warranty_calls = internal_leaks + labelled_warranty;

    let billed: Vec<f64> = receivables
        .iter()
        .filter(|r| is_leak_call(r.workorder_subtype.as_deref()))
        .map(|r| r.invoice_amount)
        .collect();
    let billed_calls = billed.len();

    let denominator = billed_calls + warranty_calls;
    let warranty_pct =
        (denominator > 0).then(|| warranty_calls as f64 * 100.0 / denominator as f64);

    CallStats {
        warranty_calls,
        warranty_pct,
        billed_calls,
        avg_call_price: mean(&billed),
    }
}

pub fn repair_stats(receivables: &[ReceivableRecord]) -> RepairStats {
    let invoices: Vec<f64> = receivables
        .iter()
        .filter(|r| r.workorder_subtype.as_deref() == Some(REPAIRS_SUBTYPE))
        .map(|r| r.invoice_amount)
        .collect();
    RepairStats {
        count: invoices.len(),
        avg_price: mean(&invoices),
    }
}

/// Completed projects strictly after the start date, excluding placeholder
/// rows with a bid of 1 or less.
///
/// The spread is bid minus revised contract amount; a project with no
/// revised amount recorded is still counted but contributes no spread.
pub fn completed_project_stats(
    projects: &[ProjectRecord],
    start_date: NaiveDate,
) -> CompletedProjectStats {
    let completed: Vec<&ProjectRecord> = projects
        .iter()
        .filter(|p| {
            let status = p.status.as_deref();
            (status == Some(STATUS_COMPLETED) || status == Some(STATUS_COMPLETED_PENDING_WDI))
                && p.status_date.map_or(false, |d| d > start_date)
                && p.bid_amount.map_or(false, |b| b > 1.0)
        })
        .collect();

    let bids: Vec<f64> = completed.iter().filter_map(|p| p.bid_amount).collect();
    let spreads: Vec<f64> = completed
        .iter()
        .filter_map(|p| match (p.bid_amount, p.revised_contract_amount) {
            (Some(bid), Some(revised)) => Some(bid - revised),
            _ => None,
        })
        .collect();

    CompletedProjectStats {
        count: completed.len(),
        avg_bid: mean(&bids),
        avg_spread: mean(&spreads),
    }
}

/// The eight-bucket status snapshot.
///
/// Current-period buckets (preparing, proposals pending, rejected,
/// completed) count rows dated on or after the start date; pipeline
/// buckets (bidding, approved, on-hold, in-progress) span the whole table
/// regardless of date. The two completed statuses merge into one bucket.
pub fn status_snapshot(projects: &[ProjectRecord], start_date: NaiveDate) -> StatusSnapshot {
    let count_windowed = |status: &str| {
        projects
            .iter()
            .filter(|p| p.status_date.map_or(false, |d| d >= start_date))
            .filter(|p| p.status.as_deref() == Some(status))
            .count()
    };
    let count_all = |status: &str| {
        projects
            .iter()
            .filter(|p| p.status.as_deref() == Some(status))
            .count()
    };

    let preparing = count_windowed(STATUS_PREPARING);
    let bidding = count_all(STATUS_BIDDING);
    let proposals_pending = count_windowed(STATUS_PROPOSAL_PENDING);
    let approved = count_all(STATUS_APPROVED);
    let rejected = count_windowed(STATUS_REJECTED);
    let in_progress = count_all(STATUS_IN_PROGRESS);
    let on_hold = count_all(STATUS_ON_HOLD);
    let completed =
        count_windowed(STATUS_COMPLETED) + count_windowed(STATUS_COMPLETED_PENDING_WDI);

    let counts = vec![
        preparing,
        bidding,
        proposals_pending,
        approved,
        rejected,
        in_progress,
        on_hold,
        completed,
    ];
    StatusSnapshot {
        labels: STATUS_BUCKET_LABELS.to_vec(),
        total_projects: counts.iter().sum(),
        total_bought: completed + in_progress + approved,
        counts,
    }
}

// Right-closed size bands: (0, 10k], (10k, 25k], (25k, 50k], (50k, 9m].
// Footage above nine million falls outside every band and is left out of
// the banded grouping, though it still counts toward the per-type totals.
fn sqft_band(sqft: f64) -> Option<usize> {
    if sqft <= 10_000.0 {
        Some(0)
    } else if sqft <= 25_000.0 {
        Some(1)
    } else if sqft <= 50_000.0 {
        Some(2)
    } else if sqft <= 9_000_000.0 {
        Some(3)
    } else {
        None
    }
}

// Band ratios for one project type. A type absent from the data still gets
// a full set of bars, as explicit zeros; a present type leaves untouched
// bands as `None`.
fn band_ratios<'a>(
    by_type: &HashMap<&'a str, (f64, f64)>,
    by_band: &HashMap<(&'a str, usize), (f64, f64)>,
    ptype: &'a str,
) -> Vec<Option<f64>> {
    if !by_type.contains_key(ptype) {
        return vec![Some(0.0); SQFT_BAND_LABELS.len()];
    }
    (0..SQFT_BAND_LABELS.len())
        .map(|band| {
            by_band
                .get(&(ptype, band))
                .map(|(revised, sqft)| round2(revised / sqft))
        })
        .collect()
}

/// Average revised-contract cost per square foot, grouped by project type
/// and by size band for the two reroof types.
///
/// Considers projects dated on or after the start date whose status is not
/// proposal-pending, whose notes yield a footage above 100, and whose type
/// is recorded. The ratio is the group's summed contract amount over its
/// summed footage.
pub fn sqft_breakdown(projects: &[ProjectRecord], start_date: NaiveDate) -> SqftBreakdown {
    let mut sized: Vec<(&str, f64, f64)> = Vec::new();
    for p in projects {
        if !p.status_date.map_or(false, |d| d >= start_date)
            || p.status.as_deref() == Some(STATUS_PROPOSAL_PENDING)
        {
            continue;
        }
        let Some(sqft) = p.contract_terms_notes.as_deref().and_then(extract_sqft) else {
            continue;
        };
        if sqft <= 100.0 {
            continue;
        }
        let Some(ptype) = p.project_type.as_deref() else {
            continue;
        };
        sized.push((ptype, sqft, p.revised_contract_amount.unwrap_or(0.0)));
    }

    // (revised sum, sqft sum) per type and per (type, band).
    let mut by_type: HashMap<&str, (f64, f64)> = HashMap::new();
    let mut by_band: HashMap<(&str, usize), (f64, f64)> = HashMap::new();
    for &(ptype, sqft, revised) in &sized {
        let e = by_type.entry(ptype).or_insert((0.0, 0.0));
        e.0 += revised;
        e.1 += sqft;
        if let Some(band) = sqft_band(sqft) {
            let e = by_band.entry((ptype, band)).or_insert((0.0, 0.0));
            e.0 += revised;
            e.1 += sqft;
        }
    }

    let mut type_rows: Vec<(&str, f64)> = by_type
        .iter()
        .map(|(ptype, (revised, sqft))| (*ptype, round2(revised / sqft)))
        .collect();
    type_rows.sort_by(|a, b| a.0.cmp(b.0));

    SqftBreakdown {
        type_labels: type_rows.iter().map(|(t, _)| t.to_string()).collect(),
        type_values: type_rows.iter().map(|(_, v)| *v).collect(),
        band_labels: SQFT_BAND_LABELS.to_vec(),
        overlay_values: band_ratios(&by_type, &by_band, TYPE_OVERLAY),
        tear_off_values: band_ratios(&by_type, &by_band, TYPE_TEAR_OFF),
    }
}

pub fn avg_inspection_cost(receivables: &[ReceivableRecord]) -> Option<f64> {
    let invoices: Vec<f64> = receivables
        .iter()
        .filter(|r| r.workorder_type.as_deref() == Some(INSPECTION_TYPE))
        .map(|r| r.invoice_amount)
        .collect();
    mean(&invoices)
}
