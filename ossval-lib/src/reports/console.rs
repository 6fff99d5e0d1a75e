use super::common::{format_status, format_usd, group_thousands, truncate};
use crate::Result;
use crate::estimate::CostEstimate;
use crate::facts::{BatchReport, Package, PackageStatus};
use core::fmt::Write;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

const SEPARATOR: &str = "═══════════════════════════════════════";

/// Widths of every column except the package name.
const FIXED_COLUMNS_WIDTH: usize = 9 + 12 + 16 + 11 + 6 + 10;

const MIN_NAME_WIDTH: usize = 12;

/// Print a per-package table followed by the batch summary.
pub fn generate<W: Write>(report: &BatchReport, use_colors: bool, writer: &mut W) -> Result<()> {
    let longest_name = report.packages.iter().map(|p| p.spec.to_string().chars().count()).max().unwrap_or(0);
    let name_width = longest_name
        .min(get_terminal_width().saturating_sub(FIXED_COLUMNS_WIDTH))
        .max(MIN_NAME_WIDTH);

    if !report.packages.is_empty() {
        let header = format!(
            "{:<name_width$}  {:<9}{:>12}{:>16}{:>11}{:>6}",
            "Package", "Status", "Code lines", "Cost (USD)", "Effort PM", "Conf"
        );
        if use_colors {
            writeln!(writer, "{}", header.bold())?;
        } else {
            writeln!(writer, "{header}")?;
        }

        for package in &report.packages {
            write_package_row(package, name_width, use_colors, writer)?;
        }

        writeln!(writer)?;
        writeln!(writer, "{SEPARATOR}")?;
        writeln!(writer)?;
    }

    let summary = &report.summary;
    if use_colors {
        writeln!(writer, "{}", "Summary".bold())?;
    } else {
        writeln!(writer, "Summary")?;
    }

    writeln!(
        writer,
        "  Packages : {} ({} analyzed, {} partial, {} failed)",
        summary.total_packages, summary.analyzed_packages, summary.partial_packages, summary.failed_packages
    )?;
    writeln!(writer, "  Region   : {}", summary.region.label())?;
    writeln!(
        writer,
        "  Cost     : {} (range {} to {})",
        format_usd(summary.total_cost_usd),
        format_usd(summary.total_cost_usd_low),
        format_usd(summary.total_cost_usd_high)
    )?;
    writeln!(
        writer,
        "  Effort   : {:.1} person-months ({:.1} person-years)",
        summary.total_effort_person_months,
        summary.total_effort_person_months / 12.0
    )?;

    Ok(())
}

fn write_package_row<W: Write>(package: &Package, name_width: usize, use_colors: bool, writer: &mut W) -> Result<()> {
    let name = truncate(&package.spec.to_string(), name_width);
    let status = format_status(package.status);
    let status = if use_colors {
        match package.status {
            PackageStatus::Ok => format!("{:<9}", status.green()),
            PackageStatus::Partial => format!("{:<9}", status.yellow()),
            PackageStatus::Failed => format!("{:<9}", status.red()),
        }
    } else {
        format!("{status:<9}")
    };

    let lines = package.metrics.lines.as_ref().map_or_else(|| "-".to_string(), |l| group_thousands(l.code_lines));
    let (cost, effort, confidence) = package.estimate.as_ref().map_or_else(
        || ("-".to_string(), "-".to_string(), "-".to_string()),
        |e| (format_usd(e.cost_usd), format!("{:.1}", e.effort_person_months), format!("{:.1}", e.confidence)),
    );

    writeln!(writer, "{name:<name_width$}  {status}{lines:>12}{cost:>16}{effort:>11}{confidence:>6}")?;

    for failure in &package.failures {
        writeln!(writer, "    {failure}")?;
    }

    Ok(())
}

/// Print a single estimate, as produced by `ossval estimate`.
pub fn generate_estimate<W: Write>(code_lines: u64, estimate: &CostEstimate, use_colors: bool, writer: &mut W) -> Result<()> {
    let cost = format_usd(estimate.cost_usd);
    let cost = if use_colors { cost.bold().to_string() } else { cost };

    writeln!(writer, "Code lines   : {}", group_thousands(code_lines))?;
    writeln!(writer, "Methodology  : {}", estimate.methodology.label())?;
    writeln!(writer, "Region       : {}", estimate.region.label())?;
    writeln!(writer, "Cost         : {cost}")?;
    writeln!(
        writer,
        "Range        : {} to {}",
        format_usd(estimate.cost_usd_low),
        format_usd(estimate.cost_usd_high)
    )?;
    writeln!(
        writer,
        "Effort       : {:.1} person-months ({:.1} person-years)",
        estimate.effort_person_months,
        estimate.effort_person_years()
    )?;
    writeln!(writer, "Multipliers  : type {:.2} (effort {:.2}), complexity {:.2}", estimate.project_type_multiplier, estimate.project_type_effort_multiplier, estimate.complexity_multiplier)?;

    Ok(())
}

/// Get the terminal width, defaulting to 100 if not detectable
fn get_terminal_width() -> usize {
    terminal_size().map_or(100, |(Width(w), _)| w as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::{CostEstimator, ProjectType, Region};
    use crate::facts::{BatchSummary, Ecosystem, Failure, PackageSpec};
    use crate::metrics::LineMetrics;

    fn sample_report() -> BatchReport {
        let estimator = CostEstimator::default();

        let mut ok = Package::new(PackageSpec::new("serde", Ecosystem::Cargo).with_version("1.0.228"));
        ok.metrics.lines = Some(LineMetrics {
            code_lines: 10_000,
            ..LineMetrics::default()
        });
        ok.estimate = Some(estimator.estimate(&ok.metrics, ProjectType::Library, Region::UsSf));
        ok.update_status();

        let failed = Package::failed(PackageSpec::new("left-pad", Ecosystem::Npm), Failure::Resolution);

        let packages = vec![ok, failed];
        let summary = BatchSummary::from_packages(&packages, Region::UsSf);
        BatchReport { packages, summary }
    }

    #[test]
    fn test_table_and_summary() {
        let mut output = String::new();
        generate(&sample_report(), false, &mut output).unwrap();

        assert!(output.contains("cargo:serde@1.0.228"));
        assert!(output.contains("10,000"));
        assert!(output.contains("FAILED"));
        assert!(output.contains("no repository found"));
        assert!(output.contains("Packages : 2 (1 analyzed, 0 partial, 1 failed)"));
        assert!(output.contains("person-months"));
        assert!(!output.contains("\x1b["));
    }

    #[test]
    fn test_colors() {
        let mut output = String::new();
        generate(&sample_report(), true, &mut output).unwrap();
        assert!(output.contains("\x1b["));
    }

    #[test]
    fn test_empty_report() {
        let report = BatchReport {
            packages: vec![],
            summary: BatchSummary::from_packages(&[], Region::GlobalAverage),
        };
        let mut output = String::new();
        generate(&report, false, &mut output).unwrap();

        assert!(!output.contains(SEPARATOR));
        assert!(output.starts_with("Summary"));
        assert!(output.contains("Cost     : $0 (range $0 to $0)"));
    }

    #[test]
    fn test_single_estimate() {
        let estimate = CostEstimator::default().estimate_lines(10_000, None, ProjectType::Library, Region::UsSf);
        let mut output = String::new();
        generate_estimate(10_000, &estimate, false, &mut output).unwrap();

        assert!(output.contains("Code lines   : 10,000"));
        assert!(output.contains("COCOMO II"));
        assert!(output.contains("person-years"));
    }
}
