//! Markdown renderer for jobage reports.
//!
//! Produces one document with the center summary, pending-duration tables,
//! status tables, any requested drill-downs, and the records left out of the
//! duration views.

use anyhow::Result;
use itertools::Itertools;
use jobage_ports::ReportRenderer;
use jobage_report::{CenterShare, CenterSummary, DrillDown, Exclusions, Report};
use jobage_schema::{DisplayRow, FrequencyTable};

const REFERENCE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renderer producing GitHub-flavored Markdown tables.
pub struct MarkdownRenderer;

impl ReportRenderer for MarkdownRenderer {
    fn render(&self, report: &Report) -> Result<String> {
        Ok(render_report(report))
    }
}

pub fn render_report(report: &Report) -> String {
    let mut out = String::new();

    out.push_str("# Job Aging Report\n\n");
    out.push_str(&format!(
        "- **Reference:** {}\n",
        report.reference.format(REFERENCE_FORMAT)
    ));
    out.push_str(&format!("- **Filters:** {}\n", report.filters));
    out.push_str(&format!(
        "- **Records:** {} loaded, {} after filters\n",
        report.total_records, report.filtered_records
    ));
    if !report.exclusions.is_empty() {
        out.push_str(&format!(
            "- **Excluded from duration tables:** {}\n",
            report.exclusions.total()
        ));
    }
    out.push('\n');

    if !report.warnings.is_empty() {
        out.push_str("## Warnings\n\n");
        for w in &report.warnings {
            out.push_str(&format!("- ⚠️ {w}\n"));
        }
        out.push('\n');
    }

    push_center_summary(&mut out, &report.center_summary);

    out.push_str("## Pending Duration\n\n");
    push_section(&mut out, "Overall", "Pending Days", &report.overall_duration);
    for scoped in &report.center_durations {
        push_section(&mut out, scoped.scope.label(), "Pending Days", &scoped.table);
    }
    push_section(&mut out, "Other Centers", "Pending Days", &report.other_centers_duration);

    out.push_str("## Service Order Status\n\n");
    push_section(&mut out, "Overall", "Status", &report.overall_status);
    for scoped in &report.status_by_center {
        push_section(&mut out, scoped.scope.label(), "Status", &scoped.table);
    }

    if !report.drill_downs.is_empty() {
        out.push_str("## Drill-downs\n\n");
        for drill in &report.drill_downs {
            push_drill_down(&mut out, drill);
        }
    }

    push_exclusions(&mut out, &report.exclusions);

    out
}

/// Markdown table cell text; pipes and line breaks would split the row.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn table_row<I, S>(cells: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    format!("| {} |\n", cells.into_iter().map(|c| cell(c.as_ref())).join(" | "))
}

/// A frequency table as a Markdown table headed by `label`.
pub fn frequency_table(label: &str, table: &FrequencyTable) -> String {
    if table.rows.is_empty() {
        return "_No records._\n".to_string();
    }
    let mut out = table_row([label, "Jobs", "Share"]);
    out.push_str("|---|---:|---:|\n");
    for row in &table.rows {
        out.push_str(&table_row([
            row.category.clone(),
            row.count.to_string(),
            row.percentage_label(),
        ]));
    }
    out
}

fn push_section(out: &mut String, heading: &str, label: &str, table: &FrequencyTable) {
    out.push_str(&format!("### {heading}\n\n"));
    out.push_str(&frequency_table(label, table));
    out.push('\n');
}

fn share_row(share: &CenterShare) -> String {
    table_row([
        share.center.clone(),
        share.jobs.to_string(),
        share.percentage_label(),
    ])
}

fn push_center_summary(out: &mut String, summary: &CenterSummary) {
    out.push_str("## Service Centers\n\n");
    out.push_str(&format!("**Total jobs:** {}\n\n", summary.total_jobs));

    out.push_str("| Center | Jobs | Share |\n|---|---:|---:|\n");
    for share in &summary.main_centers {
        out.push_str(&share_row(share));
    }
    out.push_str(&share_row(&summary.other_centers));
    out.push('\n');

    out.push_str("### All Centers\n\n");
    if summary.centers.is_empty() {
        out.push_str("_No records._\n\n");
        return;
    }
    out.push_str("| Center | Jobs | Share | Type |\n|---|---:|---:|---|\n");
    for share in &summary.centers {
        out.push_str(&table_row([
            share.center.clone(),
            share.jobs.to_string(),
            share.percentage_label(),
            share.kind.to_string(),
        ]));
    }
    out.push('\n');
}

fn drill_columns(row: &DisplayRow, with_center: bool, with_comments: bool) -> Vec<&str> {
    let mut cells = vec![row.order_id.0.as_str(), row.creation_time.as_str()];
    if with_center {
        cells.push(&row.service_center);
    }
    cells.extend([
        row.status.as_str(),
        row.engineer.as_str(),
        row.warranty_status.as_str(),
        row.parts_picking_status.as_str(),
        row.service_type.as_str(),
    ]);
    if with_comments {
        cells.push(&row.comments);
    }
    cells
}

fn push_drill_down(out: &mut String, drill: &DrillDown) {
    let selection = &drill.selection;
    out.push_str(&format!(
        "### {}: {} ({} records)\n\n",
        selection.scope,
        selection.band,
        drill.rows.len()
    ));
    if drill.rows.is_empty() {
        out.push_str("_No records._\n\n");
        return;
    }

    let with_center = selection.scope.spans_centers();
    let with_comments = drill.rows.iter().any(|r| !r.comments.is_empty());

    let mut header = vec!["Service Order Number", "Creation Time"];
    if with_center {
        header.push("服务网点");
    }
    header.extend([
        "Service Order Status",
        "Engineer",
        "保内/保外",
        "Picking Parts Status",
        "Service Type",
    ]);
    if with_comments {
        header.push("Comments");
    }

    out.push_str(&table_row(&header));
    out.push_str(&format!("|{}\n", "---|".repeat(header.len())));
    for row in &drill.rows {
        out.push_str(&table_row(drill_columns(row, with_center, with_comments)));
    }
    out.push('\n');
}

fn push_exclusions(out: &mut String, exclusions: &Exclusions) {
    if exclusions.records.is_empty() {
        return;
    }
    out.push_str("## Excluded Records\n\n");
    out.push_str(&format!(
        "{} invalid creation time(s), {} creation time(s) after the reference.\n\n",
        exclusions.invalid_timestamps, exclusions.negative_durations
    ));
    out.push_str("| Service Order Number | Reason |\n|---|---|\n");
    for excluded in &exclusions.records {
        out.push_str(&table_row([excluded.order_id.0.as_str(), excluded.reason.as_str()]));
    }
    out.push('\n');
}
