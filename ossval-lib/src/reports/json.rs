use crate::Result;
use crate::facts::BatchReport;
use core::fmt::Write;

/// Write the report as pretty-printed JSON with `packages` and `summary` members.
pub fn generate<W: Write>(report: &BatchReport, writer: &mut W) -> Result<()> {
    write!(writer, "{}", serde_json::to_string_pretty(report)?)?;
    Ok(())
}
