use chrono::NaiveDate;
use roof_report::charts::{JsonFileRenderer, RendererConfig};
use roof_report::dashboard::{build_dashboard, DashboardReport};
use roof_report::error::ReportError;
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

// The four exports for the baseline scenario: one inspected roof, one
// warranty leak call, one billed leak call, one completed project.
const ROOFS_CSV: &str = "Roof Condition\nGood\n";
const WORK_ORDERS_CSV: &str =
    "SUBTYPE,STATUS,FINANCIAL_RESPONSIBILITY\nLeak Call ,COMPLETED,INTERNAL CHARGE\n";
const PROJECTS_CSV: &str = "STATUS,STATUSDATE,BID AMOUNT,REVISEDCONTRACTAMOUNT,CONTRACT TERMS NOTES,TYPE\n\
(8) COMPLETED,06/15/2016,$500,450,\"2,000 sq ft\",Reroof (Tear-off)\n";
const RECEIVABLES_CSV: &str =
    "WORKORDER SUBTYPE,WORKORDER TYPE,INVOICE AMOUNT\nLeak Call ,Inspection,100.00\n";

const EMPTY_ROOFS_CSV: &str = "Roof Condition\n";
const EMPTY_WORK_ORDERS_CSV: &str = "SUBTYPE,STATUS,FINANCIAL_RESPONSIBILITY\n";
const EMPTY_PROJECTS_CSV: &str =
    "STATUS,STATUSDATE,BID AMOUNT,REVISEDCONTRACTAMOUNT,CONTRACT TERMS NOTES,TYPE\n";
const EMPTY_RECEIVABLES_CSV: &str = "WORKORDER SUBTYPE,WORKORDER TYPE,INVOICE AMOUNT\n";

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 1, 1).unwrap()
}

fn renderer_in(dir: &TempDir) -> JsonFileRenderer {
    JsonFileRenderer::new(RendererConfig {
        out_dir: dir.path().to_path_buf(),
    })
}

fn build(
    roofs: &str,
    work_orders: &str,
    projects: &str,
    receivables: &str,
    dir: &TempDir,
) -> Result<DashboardReport, ReportError> {
    build_dashboard(
        roofs.as_bytes(),
        work_orders.as_bytes(),
        projects.as_bytes(),
        receivables.as_bytes(),
        start(),
        &renderer_in(dir),
    )
}

#[test]
fn end_to_end_dashboard_fills_all_twelve_slots() {
    let dir = TempDir::new().unwrap();
    let report = build(
        ROOFS_CSV,
        WORK_ORDERS_CSV,
        PROJECTS_CSV,
        RECEIVABLES_CSV,
        &dir,
    )
    .unwrap();

    assert_eq!(report.summary.calls.warranty_calls, 1);
    assert_eq!(report.summary.calls.billed_calls, 1);
    assert_eq!(report.summary.completed.count, 1);

    let values = report.legacy_values();
    assert_eq!(values.len(), 12);
    assert!(values[0].as_str().unwrap().ends_with("roof_conditions.json"));
    assert_eq!(values[1], json!("1 (50%)"));
    assert_eq!(values[2], json!("1"));
    assert_eq!(values[3], json!("$100.00"));
    assert_eq!(values[4], json!(0));
    assert_eq!(values[5], json!("n/a"));
    assert_eq!(values[6], json!("$500"));
    assert_eq!(values[7], json!("$50"));
    assert_eq!(values[8], json!("1"));
    assert_eq!(values[9], json!("$50 = $50 potential savings"));
    assert!(values[10].as_str().unwrap().ends_with("project_snapshot.json"));
    assert_eq!(values[11], json!("Average cost for each inspection: $100.00"));
}

#[test]
fn chart_specs_land_on_disk_with_correct_titles() {
    let dir = TempDir::new().unwrap();
    let report = build(
        ROOFS_CSV,
        WORK_ORDERS_CSV,
        PROJECTS_CSV,
        RECEIVABLES_CSV,
        &dir,
    )
    .unwrap();

    let pie: Value = serde_json::from_str(&fs::read_to_string(&report.pie_chart).unwrap()).unwrap();
    assert_eq!(
        pie["layout"]["title"],
        json!("<b>Inspections</b><br><i>Total Completed 1</i>")
    );
    assert_eq!(
        pie["data"][0]["labels"],
        json!(["Excellent", "Good", "Fair", "Poor", "Bad"])
    );
    assert_eq!(pie["data"][0]["values"], json!([0, 1, 0, 0, 0]));
    assert_eq!(pie["data"][0]["sort"], json!(false));

    let panel: Value =
        serde_json::from_str(&fs::read_to_string(&report.panel_chart).unwrap()).unwrap();
    assert_eq!(
        panel["layout"]["title"],
        json!("<b>TOTAL NUMBER OF PROJECTS DONE - 1 BOUGHT</b>")
    );
    assert_eq!(
        panel["subplot_titles"][0],
        json!("<b>SNAPSHOT OF PROJECT STATUS<br>TOTAL 1</b>")
    );
    // Four traces: status snapshot, cost per sqft by type, tear-off and
    // overlay bands.
    assert_eq!(panel["data"].as_array().unwrap().len(), 4);
}

#[test]
fn empty_exports_yield_zeros_and_sentinels() {
    let dir = TempDir::new().unwrap();
    let report = build(
        EMPTY_ROOFS_CSV,
        EMPTY_WORK_ORDERS_CSV,
        EMPTY_PROJECTS_CSV,
        EMPTY_RECEIVABLES_CSV,
        &dir,
    )
    .unwrap();

    assert_eq!(report.summary.conditions.total(), 0);
    assert_eq!(report.summary.status.total_projects, 0);
    let values = report.legacy_values();
    assert_eq!(values[1], json!("0 (n/a)"));
    assert_eq!(values[2], json!("0"));
    assert_eq!(values[3], json!("n/a"));
    assert_eq!(values[4], json!(0));
    assert_eq!(values[9], json!("n/a"));
    assert_eq!(values[11], json!("Average cost for each inspection: n/a"));
}

#[test]
fn missing_required_column_names_the_table_and_column() {
    let dir = TempDir::new().unwrap();
    let err = build(
        "Shingle Color\nGreen\n",
        WORK_ORDERS_CSV,
        PROJECTS_CSV,
        RECEIVABLES_CSV,
        &dir,
    )
    .unwrap_err();
    match err {
        ReportError::MissingColumn { table, column } => {
            assert_eq!(table, "roofs");
            assert_eq!(column, "Roof Condition");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn malformed_invoice_amount_is_a_currency_error() {
    let dir = TempDir::new().unwrap();
    let err = build(
        ROOFS_CSV,
        WORK_ORDERS_CSV,
        PROJECTS_CSV,
        "WORKORDER SUBTYPE,WORKORDER TYPE,INVOICE AMOUNT\nLeak Call ,Inspection,twelve\n",
        &dir,
    )
    .unwrap_err();
    match err {
        ReportError::InvalidCurrency { table, field, value } => {
            assert_eq!(table, "receivables");
            assert_eq!(field, "INVOICE AMOUNT");
            assert_eq!(value, "twelve");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn renderer_failure_is_distinct_from_data_errors() {
    let dir = TempDir::new().unwrap();
    // Point the renderer at a directory that does not exist.
    let renderer = JsonFileRenderer::new(RendererConfig {
        out_dir: dir.path().join("missing"),
    });
    let err = build_dashboard(
        ROOFS_CSV.as_bytes(),
        WORK_ORDERS_CSV.as_bytes(),
        PROJECTS_CSV.as_bytes(),
        RECEIVABLES_CSV.as_bytes(),
        start(),
        &renderer,
    )
    .unwrap_err();
    assert!(matches!(err, ReportError::Render(_)));
}

#[test]
fn identical_inputs_produce_identical_value_sequences() {
    let dir = TempDir::new().unwrap();
    let first = build(
        ROOFS_CSV,
        WORK_ORDERS_CSV,
        PROJECTS_CSV,
        RECEIVABLES_CSV,
        &dir,
    )
    .unwrap();
    let second = build(
        ROOFS_CSV,
        WORK_ORDERS_CSV,
        PROJECTS_CSV,
        RECEIVABLES_CSV,
        &dir,
    )
    .unwrap();
    assert_eq!(first.legacy_values(), second.legacy_values());
    assert_eq!(
        serde_json::to_value(&first.summary).unwrap(),
        serde_json::to_value(&second.summary).unwrap()
    );
}
