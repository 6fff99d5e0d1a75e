use crate::Result;
use crate::estimate::ProjectType;
use crate::facts::{BatchReport, BatchSummary, Ecosystem, Package, PackageStatus};
use crate::metrics::{ComplexityLevel, MaintainabilityLevel};
use core::fmt::Write;
use csv::{Writer, WriterBuilder};
use ohno::IntoAppError;
use serde::Serialize;

const PACKAGE_COLUMNS: [&str; 18] = [
    "name",
    "ecosystem",
    "version",
    "repository",
    "status",
    "project_type",
    "code_lines",
    "complexity",
    "maintainability",
    "maintainability_level",
    "contributors",
    "bus_factor",
    "cost_usd",
    "cost_usd_low",
    "cost_usd_high",
    "effort_person_months",
    "confidence",
    "failures",
];

#[derive(Serialize)]
struct PackageRow<'a> {
    name: &'a str,
    ecosystem: Ecosystem,
    version: Option<&'a str>,
    repository: Option<String>,
    status: PackageStatus,
    project_type: ProjectType,
    code_lines: Option<u64>,
    complexity: Option<ComplexityLevel>,
    maintainability: Option<f64>,
    maintainability_level: Option<MaintainabilityLevel>,
    contributors: Option<u64>,
    bus_factor: Option<u64>,
    cost_usd: Option<f64>,
    cost_usd_low: Option<f64>,
    cost_usd_high: Option<f64>,
    effort_person_months: Option<f64>,
    confidence: Option<f64>,
    failures: String,
}

impl<'a> PackageRow<'a> {
    fn new(package: &'a Package) -> Self {
        let metrics = &package.metrics;
        let estimate = package.estimate.as_ref();

        Self {
            name: package.spec.name(),
            ecosystem: package.spec.ecosystem(),
            version: package.spec.version(),
            repository: package.repo.as_ref().map(ToString::to_string),
            status: package.status,
            project_type: package.project_type,
            code_lines: metrics.lines.as_ref().map(|l| l.code_lines),
            complexity: metrics.structural.as_ref().map(|s| s.level),
            maintainability: metrics.maintainability.as_ref().map(|m| round_to(m.value, 1)),
            maintainability_level: metrics.maintainability.as_ref().map(|m| m.level),
            contributors: metrics.history.as_ref().map(|h| h.contributor_count),
            bus_factor: metrics.history.as_ref().map(|h| h.bus_factor),
            cost_usd: estimate.map(|e| round_to(e.cost_usd, 2)),
            cost_usd_low: estimate.map(|e| round_to(e.cost_usd_low, 2)),
            cost_usd_high: estimate.map(|e| round_to(e.cost_usd_high, 2)),
            effort_person_months: estimate.map(|e| round_to(e.effort_person_months, 2)),
            confidence: estimate.map(|e| round_to(e.confidence, 2)),
            failures: package.failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "),
        }
    }
}

/// Round to a fixed number of decimal places so spreadsheets see stable values.
fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Write one row per package, preceded by a header row even when the batch is empty.
pub fn generate_packages<W: Write>(report: &BatchReport, writer: &mut W) -> Result<()> {
    let mut table = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    table.write_record(PACKAGE_COLUMNS)?;
    for package in &report.packages {
        table.serialize(PackageRow::new(package))?;
    }

    drain(table, writer)
}

/// Write the batch totals as a header row and a single data row.
pub fn generate_summary<W: Write>(summary: &BatchSummary, writer: &mut W) -> Result<()> {
    let mut table = Writer::from_writer(Vec::new());
    table.serialize(summary)?;

    drain(table, writer)
}

fn drain<W: Write>(table: Writer<Vec<u8>>, writer: &mut W) -> Result<()> {
    let bytes = table.into_inner().map_err(csv::IntoInnerError::into_error)?;
    let text = String::from_utf8(bytes).into_app_err("CSV output is not valid UTF-8")?;
    write!(writer, "{text}")?;
    Ok(())
}
