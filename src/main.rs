// Entry point and high-level CLI flow.
//
// - Option [1] loads the four CSV exports and prints load diagnostics.
// - Option [2] asks for a report start date, computes the dashboard,
//   prints a metrics preview and writes the chart specs and JSON
//   summaries to files.
// - After generating a dashboard, the user can choose to go back to the
//   menu or exit.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use roof_report::charts::{JsonFileRenderer, RendererConfig};
use roof_report::dashboard::{self, InputTables};
use roof_report::error::ReportError;
use roof_report::output;
use roof_report::util;

// File names match the upload slots on the dashboard form.
const ROOFS_FILE: &str = "Roof_Condition_Export.csv";
const WORK_ORDERS_FILE: &str = "Work_Order_Export.csv";
const PROJECTS_FILE: &str = "Custom_Project_Export.csv";
const RECEIVABLES_FILE: &str = "Custom_Accounts_Receivable_Export.csv";

const DEFAULT_START: &str = "01/01/2016";

// Simple in-memory app state so the exports are loaded once but
// dashboards can be generated for several start dates in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { tables: None }));

struct AppState {
    tables: Option<InputTables>,
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
///
/// The prompt is reused for both the main menu and simple numeric inputs.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the main menu after generating a
/// dashboard.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Main Menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Prompt for the client name shown on the dashboard header. May be
/// left empty.
fn prompt_client_name() -> String {
    print!("Client name: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Prompt for the report start date in the form's mm/dd/YYYY format.
/// An empty line takes the default.
fn prompt_start_date() -> NaiveDate {
    loop {
        print!("Report start date (mm/dd/YYYY) [{}]: ", DEFAULT_START);
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let raw = buf.trim();
        let raw = if raw.is_empty() { DEFAULT_START } else { raw };
        match util::parse_date("form", "start date", raw) {
            Ok(date) => return date,
            Err(_) => println!("Invalid date. Please use mm/dd/YYYY."),
        }
    }
}

fn load_exports() -> Result<InputTables, ReportError> {
    let roofs = File::open(ROOFS_FILE)?;
    let work_orders = File::open(WORK_ORDERS_FILE)?;
    let projects = File::open(PROJECTS_FILE)?;
    let receivables = File::open(RECEIVABLES_FILE)?;
    dashboard::load_tables(roofs, work_orders, projects, receivables)
}

/// Handle option [1]: load and normalize the four exports.
///
/// On success, we store the tables in `APP_STATE` and print a short
/// textual summary of what was loaded.
fn handle_load() {
    match load_exports() {
        Ok(tables) => {
            println!(
                "Processing exports... ({} roofs, {} work orders, {} projects, {} receivables)",
                util::format_int(tables.roofs.len()),
                util::format_int(tables.work_orders.len()),
                util::format_int(tables.projects.len()),
                util::format_int(tables.receivables.len())
            );
            let years: Vec<i32> = tables.projects.iter().filter_map(|p| p.year).collect();
            if let (Some(first), Some(last)) = (years.iter().min(), years.iter().max()) {
                println!("Info: project status dates span {}-{}.", first, last);
            }
            println!("");
            let mut state = APP_STATE.lock().unwrap();
            state.tables = Some(tables);
        }
        Err(e) => {
            eprintln!("Failed to load exports: {}\n", e);
        }
    }
}

/// Handle option [2]: compute the dashboard for a start date.
///
/// This function is intentionally side-effectful:
/// - writes both chart specs as JSON files,
/// - writes the named summary and the legacy 12-slot value list,
/// - and prints a Markdown preview of the metrics to the console.
fn handle_generate_dashboard() {
    let tables = {
        let state = APP_STATE.lock().unwrap();
        state.tables.clone()
    };
    let Some(tables) = tables else {
        println!("Error: No data loaded. Please load the exports first (option 1).\n");
        return;
    };

    let client_name = prompt_client_name();
    let start_date = prompt_start_date();
    println!("");
    println!("Generating dashboard...");
    println!("Outputs saved to individual files...\n");

    let renderer = JsonFileRenderer::new(RendererConfig {
        out_dir: PathBuf::from("."),
    });
    match dashboard::report_from_tables(&tables, start_date, &renderer) {
        Ok(report) => {
            if client_name.is_empty() {
                println!("Dashboard Metrics");
            } else {
                println!("Dashboard Metrics - {}", client_name);
            }
            println!("(Report window starting {})\n", start_date.format("%m/%d/%Y"));
            output::preview_table(&output::metric_rows(&report));

            if let Err(e) = output::write_json("summary.json", &report.summary) {
                eprintln!("Write error: {}", e);
            }
            if let Err(e) = output::write_json("dashboard_values.json", &report.legacy_values()) {
                eprintln!("Write error: {}", e);
            }
            println!("Pie chart spec: {}", report.pie_chart);
            println!("Panel chart spec: {}", report.panel_chart);
            println!("(Metrics exported to summary.json and dashboard_values.json)\n");
        }
        Err(e) => {
            eprintln!("Failed to generate dashboard: {}\n", e);
        }
    }
}

fn main() {
    loop {
        println!("Select Option:");
        println!("[1] Load the exports");
        println!("[2] Generate Dashboard\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!("");
                handle_generate_dashboard();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
