use crate::error::ReportError;
use crate::types::{
    ProjectRecord, RawProjectRow, RawReceivableRow, RawRoofRow, RawWorkOrderRow, ReceivableRecord,
    RoofRecord, WorkOrder,
};
use crate::util::{parse_currency, parse_date};
use chrono::Datelike;
use csv::ReaderBuilder;
use std::io::Read;

const ROOFS_TABLE: &str = "roofs";
const WORK_ORDERS_TABLE: &str = "work orders";
const PROJECTS_TABLE: &str = "projects";
const RECEIVABLES_TABLE: &str = "receivables";

// Required header names, exactly as the exports spell them. Extra columns
// in an export are ignored.
const ROOF_COLUMNS: [&str; 1] = ["Roof Condition"];
const WORK_ORDER_COLUMNS: [&str; 3] = ["SUBTYPE", "STATUS", "FINANCIAL_RESPONSIBILITY"];
const PROJECT_COLUMNS: [&str; 6] = [
    "STATUS",
    "STATUSDATE",
    "BID AMOUNT",
    "REVISEDCONTRACTAMOUNT",
    "CONTRACT TERMS NOTES",
    "TYPE",
];
const RECEIVABLE_COLUMNS: [&str; 3] = ["WORKORDER SUBTYPE", "WORKORDER TYPE", "INVOICE AMOUNT"];

fn check_headers<R: Read>(
    rdr: &mut csv::Reader<R>,
    table: &str,
    required: &[&str],
) -> Result<(), ReportError> {
    let headers = rdr
        .headers()
        .map_err(|e| ReportError::Csv {
            table: table.to_string(),
            source: e,
        })?
        .clone();
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(ReportError::MissingColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

fn csv_error(table: &str) -> impl Fn(csv::Error) -> ReportError + '_ {
    move |e| ReportError::Csv {
        table: table.to_string(),
        source: e,
    }
}

/// Load the roof-inspection export. Rows with no recorded condition are
/// kept; the metrics pass filters them.
pub fn load_roofs<R: Read>(input: R) -> Result<Vec<RoofRecord>, ReportError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(input);
    check_headers(&mut rdr, ROOFS_TABLE, &ROOF_COLUMNS)?;
    let mut rows = Vec::new();
    for result in rdr.deserialize::<RawRoofRow>() {
        let row = result.map_err(csv_error(ROOFS_TABLE))?;
        rows.push(RoofRecord {
            condition: row.condition,
        });
    }
    Ok(rows)
}

pub fn load_work_orders<R: Read>(input: R) -> Result<Vec<WorkOrder>, ReportError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(input);
    check_headers(&mut rdr, WORK_ORDERS_TABLE, &WORK_ORDER_COLUMNS)?;
    let mut rows = Vec::new();
    for result in rdr.deserialize::<RawWorkOrderRow>() {
        let row = result.map_err(csv_error(WORK_ORDERS_TABLE))?;
        rows.push(WorkOrder {
            subtype: row.subtype,
            status: row.status,
            financial_responsibility: row.financial_responsibility,
        });
    }
    Ok(rows)
}

/// Load and normalize the project export.
///
/// Currency and date cells are coerced here so everything downstream works
/// on typed values: a present-but-unparseable cell aborts the load, while
/// an empty cell stays `None` and falls out of the date/bid filters later.
pub fn load_projects<R: Read>(input: R) -> Result<Vec<ProjectRecord>, ReportError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(input);
    check_headers(&mut rdr, PROJECTS_TABLE, &PROJECT_COLUMNS)?;
    let mut rows = Vec::new();
    for result in rdr.deserialize::<RawProjectRow>() {
        let row = result.map_err(csv_error(PROJECTS_TABLE))?;
        let status_date = match row.status_date.as_deref() {
            Some(raw) => Some(parse_date(PROJECTS_TABLE, "STATUSDATE", raw)?),
            None => None,
        };
        let bid_amount = match row.bid_amount.as_deref() {
            Some(raw) => Some(parse_currency(PROJECTS_TABLE, "BID AMOUNT", raw)?),
            None => None,
        };
        let revised_contract_amount = match row.revised_contract_amount.as_deref() {
            Some(raw) => Some(parse_currency(PROJECTS_TABLE, "REVISEDCONTRACTAMOUNT", raw)?),
            None => None,
        };
        rows.push(ProjectRecord {
            status: row.status,
            year: status_date.map(|d| d.year()),
            status_date,
            bid_amount,
            revised_contract_amount,
            contract_terms_notes: row.contract_terms_notes,
            project_type: row.project_type,
        });
    }
    Ok(rows)
}

/// Load the receivables export. An invoice amount is required on every
/// row; a missing or malformed one fails the load.
pub fn load_receivables<R: Read>(input: R) -> Result<Vec<ReceivableRecord>, ReportError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(input);
    check_headers(&mut rdr, RECEIVABLES_TABLE, &RECEIVABLE_COLUMNS)?;
    let mut rows = Vec::new();
    for result in rdr.deserialize::<RawReceivableRow>() {
        let row = result.map_err(csv_error(RECEIVABLES_TABLE))?;
        let raw_amount = row.invoice_amount.unwrap_or_default();
        let invoice_amount = parse_currency(RECEIVABLES_TABLE, "INVOICE AMOUNT", &raw_amount)?;
        rows.push(ReceivableRecord {
            workorder_subtype: row.workorder_subtype,
            workorder_type: row.workorder_type,
            invoice_amount,
        });
    }
    Ok(rows)
}
