//! Render validation results for people and for CI

use crate::core::error::GuardResult;
use crate::validate::{RecordReport, Severity};
use serde::Serialize;
use std::io::Write;

/// Totals across every record in a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
  pub records: usize,
  pub failed: usize,
  pub errors: usize,
  pub warnings: usize,
}

impl Summary {
  pub fn from_reports(reports: &[RecordReport]) -> Self {
    let mut summary = Summary {
      records: reports.len(),
      ..Default::default()
    };
    for entry in reports {
      let errors = entry.report.errors().len();
      summary.errors += errors;
      summary.warnings += entry.report.warnings().len();
      if errors > 0 {
        summary.failed += 1;
      }
    }
    summary
  }

  pub fn passed(&self) -> bool {
    self.errors == 0
  }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
  summary: Summary,
  records: &'a [RecordReport],
}

/// Write the run as one pretty-printed JSON document
pub fn write_json(out: &mut impl Write, reports: &[RecordReport]) -> GuardResult<()> {
  let output = JsonOutput {
    summary: Summary::from_reports(reports),
    records: reports,
  };
  serde_json::to_writer_pretty(&mut *out, &output)?;
  writeln!(out)?;
  Ok(())
}

/// Write findings grouped by record, then the totals
pub fn write_text(out: &mut impl Write, reports: &[RecordReport]) -> GuardResult<()> {
  for entry in reports {
    let report = &entry.report;
    let icon = if report.has_errors() { "❌" } else { "✅" };
    writeln!(out, "{} {}", icon, entry.path.display())?;

    for finding in report.findings() {
      let marker = match finding.severity {
        Severity::Error => "ERROR",
        Severity::Warning => "WARN ",
        Severity::Info => "NOTE ",
      };
      writeln!(out, "   {} {}", marker, finding.message)?;
    }
  }

  let summary = Summary::from_reports(reports);
  writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
  writeln!(
    out,
    "Summary: {} records, {} failed, {} errors, {} warnings",
    summary.records, summary.failed, summary.errors, summary.warnings
  )?;

  if summary.passed() {
    writeln!(out, "\n✨ All records are consistent with repository history.")?;
  } else {
    writeln!(out, "\n⚠️  Fix the errors above before merging.")?;
  }
  Ok(())
}
