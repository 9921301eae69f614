//! Declarative chart specifications and the rendering seam.
//!
//! The builders turn computed metrics into pure data (traces, layout,
//! annotations). Turning a spec into pixels or a hosted URL is the job of
//! a [`ChartRenderer`], configured once at startup.

use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use crate::error::ReportError;
use crate::types::{ConditionCounts, DashboardSummary};
use crate::util::format_currency;

pub const BACKGROUND_COLOR: &str = "rgb(248, 248, 255)";
const ANNOTATION_COLOR: &str = "rgb(50, 171, 96)";
const ANNOTATION_FONT: &str = "Arial";

#[derive(Debug, Clone, Serialize)]
pub struct PieSpec {
    pub data: Vec<PieTrace>,
    pub layout: PieLayout,
}

#[derive(Debug, Clone, Serialize)]
pub struct PieTrace {
    pub labels: Vec<String>,
    pub values: Vec<usize>,
    pub textinfo: String,
    pub textposition: String,
    pub pull: f64,
    pub rotation: i32,
    pub showlegend: bool,
    pub sort: bool,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PieLayout {
    pub title: String,
    pub paper_bgcolor: String,
    pub plot_bgcolor: String,
}

/// The roof-condition pie. Slices stay in label order (sorting disabled)
/// so the legend-free labels read Excellent through Bad.
pub fn condition_pie(conditions: &ConditionCounts) -> PieSpec {
    PieSpec {
        data: vec![PieTrace {
            labels: conditions.labels.iter().map(|s| s.to_string()).collect(),
            values: conditions.counts.clone(),
            textinfo: "label+value+percent".to_string(),
            textposition: "inside+outside".to_string(),
            pull: 0.1,
            rotation: 70,
            showlegend: false,
            sort: false,
            kind: "pie".to_string(),
        }],
        layout: PieLayout {
            title: format!(
                "<b>Inspections</b><br><i>Total Completed {}</i>",
                conditions.total()
            ),
            paper_bgcolor: BACKGROUND_COLOR.to_string(),
            plot_bgcolor: BACKGROUND_COLOR.to_string(),
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelSpec {
    pub grid: GridSpec,
    pub subplot_titles: Vec<String>,
    pub data: Vec<BarTrace>,
    pub annotations: Vec<Annotation>,
    pub layout: PanelLayout,
}

/// Subplot geometry for the panel: a 2x9 grid with four placed panes.
#[derive(Debug, Clone, Serialize)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
    pub panes: Vec<PaneSpec>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaneSpec {
    pub axis: &'static str,
    pub row: usize,
    pub col: usize,
    pub rowspan: usize,
    pub colspan: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BarTrace {
    pub name: String,
    pub orientation: &'static str,
    pub x: Vec<Value>,
    pub y: Vec<Value>,
    pub xaxis: String,
    pub yaxis: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub xref: String,
    pub yref: String,
    pub x: Value,
    pub y: Value,
    pub text: String,
    pub font: AnnotationFont,
    pub showarrow: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnotationFont {
    pub family: &'static str,
    pub size: u32,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelLayout {
    pub title: String,
    pub showlegend: bool,
    pub paper_bgcolor: String,
    pub plot_bgcolor: String,
    pub height: u32,
    pub width: u32,
}

fn bar_trace(
    name: &str,
    orientation: &'static str,
    axis: usize,
    x: Vec<Value>,
    y: Vec<Value>,
) -> BarTrace {
    BarTrace {
        name: name.to_string(),
        orientation,
        x,
        y,
        xaxis: format!("x{axis}"),
        yaxis: format!("y{axis}"),
        kind: "bar".to_string(),
    }
}

fn annotation(axis: usize, x: Value, y: Value, text: String) -> Annotation {
    Annotation {
        xref: format!("x{axis}"),
        yref: format!("y{axis}"),
        x,
        y,
        text,
        font: AnnotationFont {
            family: ANNOTATION_FONT,
            size: 12,
            color: ANNOTATION_COLOR,
        },
        showarrow: false,
    }
}

/// The composite project panel: status snapshot, average cost per square
/// foot by type, and the tear-off/overlay band breakdowns, with per-bar
/// value labels as annotations. Bands with no data get no annotation.
pub fn project_panel(summary: &DashboardSummary) -> PanelSpec {
    let status = &summary.status;
    let sqft = &summary.sqft;

    let data = vec![
        bar_trace(
            "Project",
            "h",
            1,
            status.counts.iter().map(|c| json!(c)).collect(),
            status.labels.iter().map(|l| json!(l)).collect(),
        ),
        bar_trace(
            "Avg Cost Sqft",
            "v",
            2,
            sqft.type_labels.iter().map(|l| json!(l)).collect(),
            sqft.type_values.iter().map(|v| json!(v)).collect(),
        ),
        bar_trace(
            "Tear-off",
            "h",
            3,
            sqft.tear_off_values.iter().map(|v| json!(v)).collect(),
            sqft.band_labels.iter().map(|l| json!(l)).collect(),
        ),
        bar_trace(
            "Overlay",
            "h",
            4,
            sqft.overlay_values.iter().map(|v| json!(v)).collect(),
            sqft.band_labels.iter().map(|l| json!(l)).collect(),
        ),
    ];

    let mut annotations = Vec::new();
    for (label, count) in status.labels.iter().zip(&status.counts) {
        annotations.push(annotation(
            1,
            json!(count + 3),
            json!(label),
            count.to_string(),
        ));
    }
    for (label, value) in sqft.type_labels.iter().zip(&sqft.type_values) {
        annotations.push(annotation(
            2,
            json!(label),
            json!(value + 0.3),
            format_currency(*value, 2),
        ));
    }
    for (label, value) in sqft.band_labels.iter().zip(&sqft.tear_off_values) {
        if let Some(v) = value {
            annotations.push(annotation(3, json!(v + 2.0), json!(label), format_currency(*v, 2)));
        }
    }
    for (label, value) in sqft.band_labels.iter().zip(&sqft.overlay_values) {
        if let Some(v) = value {
            annotations.push(annotation(4, json!(v + 2.0), json!(label), format_currency(*v, 2)));
        }
    }

    PanelSpec {
        grid: GridSpec {
            rows: 2,
            cols: 9,
            panes: vec![
                PaneSpec { axis: "x1", row: 1, col: 1, rowspan: 2, colspan: 3 },
                PaneSpec { axis: "x2", row: 1, col: 4, rowspan: 2, colspan: 3 },
                PaneSpec { axis: "x3", row: 1, col: 8, rowspan: 1, colspan: 2 },
                PaneSpec { axis: "x4", row: 2, col: 8, rowspan: 1, colspan: 2 },
            ],
        },
        subplot_titles: vec![
            format!(
                "<b>SNAPSHOT OF PROJECT STATUS<br>TOTAL {}</b>",
                status.total_projects
            ),
            "<b>AVERAGE COST PER SQUARE FOOT</b>".to_string(),
            "<b>TEAR OFF</b>".to_string(),
            "<b>OVERLAY</b>".to_string(),
        ],
        data,
        annotations,
        layout: PanelLayout {
            title: format!(
                "<b>TOTAL NUMBER OF PROJECTS DONE - {} BOUGHT</b>",
                status.total_bought
            ),
            showlegend: false,
            paper_bgcolor: BACKGROUND_COLOR.to_string(),
            plot_bgcolor: BACKGROUND_COLOR.to_string(),
            height: 500,
            width: 1000,
        },
    }
}

/// Where rendered charts come from.
///
/// The dashboard only needs an embeddable reference per chart; the real
/// renderer (a hosted plotting service) lives behind this trait. A failure
/// here is an external-service failure, distinct from data errors.
pub trait ChartRenderer {
    fn render(&self, name: &str, spec: &Value) -> Result<String, ReportError>;
}

/// Renderer configuration, built once at startup and read-only after.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub out_dir: PathBuf,
}

/// Writes each chart spec to `<out_dir>/<name>.json` and hands the path
/// back as the chart reference. Stands in for the hosted renderer in the
/// CLI and in tests.
pub struct JsonFileRenderer {
    config: RendererConfig,
}

impl JsonFileRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }
}

impl ChartRenderer for JsonFileRenderer {
    fn render(&self, name: &str, spec: &Value) -> Result<String, ReportError> {
        let path = self.config.out_dir.join(format!("{name}.json"));
        let body =
            serde_json::to_string_pretty(spec).map_err(|e| ReportError::Render(e.to_string()))?;
        std::fs::write(&path, body).map_err(|e| ReportError::Render(e.to_string()))?;
        Ok(path.to_string_lossy().into_owned())
    }
}
