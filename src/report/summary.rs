//! Console rendering of the audit report

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::audit::decision::{DIR_THRESHOLD, DPD_THRESHOLD, EOD_THRESHOLD};
use crate::report::audit_report::{AttributeAudit, AuditReport, NextStep};

/// Print the full audit report to the terminal.
pub fn display_report(report: &AuditReport) {
    display_health(report);
    display_metrics_table(report);
    display_group_rates(report);
    display_warnings(report);
    display_verdict(report);
}

fn display_health(report: &AuditReport) {
    println!();
    println!(
        "    {} {}",
        style("🩺").cyan(),
        style("DATASET HEALTH").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());

    let health = &report.dataset_health;
    println!("      Rows: {}", health.rows);
    println!("      Columns: {}", health.columns);
    println!("      Duplicate rows: {}", health.duplicate_rows);
    println!("      Missing values: {}", health.missing_values);
    println!(
        "      Target encoding: {} ({} classes, {} rows dropped)",
        report.target_encoding.mode,
        report.target_encoding.unique_classes,
        report.target_encoding.dropped_rows
    );
}

fn display_metrics_table(report: &AuditReport) {
    println!();
    println!(
        "    {} {}",
        style("⚖️").cyan(),
        style("FAIRNESS METRICS").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Attribute").add_attribute(Attribute::Bold),
        Cell::new("DPD").add_attribute(Attribute::Bold),
        Cell::new("EOD").add_attribute(Attribute::Bold),
        Cell::new("DIR").add_attribute(Attribute::Bold),
        Cell::new("Severity").add_attribute(Attribute::Bold),
        Cell::new("Biased").add_attribute(Attribute::Bold),
    ]);

    for (attribute, audit) in &report.sensitive_audit {
        table.add_row(vec![
            Cell::new(attribute),
            metric_cell(audit.dpd, audit.dpd.abs() > DPD_THRESHOLD),
            metric_cell(audit.eod, audit.eod.abs() > EOD_THRESHOLD),
            metric_cell(audit.dir, audit.dir < DIR_THRESHOLD),
            severity_cell(audit.severity_score),
            Cell::new(if audit.bias_present { "yes" } else { "no" }).fg(if audit.bias_present {
                Color::Red
            } else {
                Color::Green
            }),
        ]);
    }

    // Indent the table
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn metric_cell(value: f64, violated: bool) -> Cell {
    let cell = Cell::new(format!("{:.4}", value));
    if violated {
        cell.fg(Color::Red).add_attribute(Attribute::Bold)
    } else {
        cell.fg(Color::Green)
    }
}

fn severity_cell(severity: f64) -> Cell {
    let color = if severity >= 6.6 {
        Color::Red
    } else if severity > 0.0 {
        Color::Yellow
    } else {
        Color::Green
    };
    Cell::new(format!("{:.1}", severity)).fg(color)
}

fn display_group_rates(report: &AuditReport) {
    for (attribute, audit) in &report.sensitive_audit {
        println!();
        println!(
            "      {} {}:",
            style("Group rates for").dim(),
            style(attribute).yellow()
        );
        for (group, rate) in &audit.selection_rate {
            let tpr = audit.true_positive_rate.get(group).copied().unwrap_or(0.0);
            println!(
                "        {} {:<20} selection {:.4}   TPR {:.4}",
                style("•").dim(),
                group,
                rate,
                tpr
            );
        }
        if let Some((lower, upper)) = audit.dpd_ci {
            println!(
                "        {} selection-rate CI [{:.4}, {:.4}]",
                style("◦").dim(),
                lower,
                upper
            );
        }
        if let Some((lower, upper)) = audit.eod_ci {
            println!(
                "        {} TPR CI            [{:.4}, {:.4}]",
                style("◦").dim(),
                lower,
                upper
            );
        }
    }
}

fn display_warnings(report: &AuditReport) {
    if report.warnings.is_empty() {
        return;
    }

    println!();
    println!(
        "    {} {}",
        style("⚠️").yellow(),
        style("WARNINGS").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    for warning in &report.warnings {
        println!("      {} {}", style("•").yellow(), warning);
    }
}

fn display_verdict(report: &AuditReport) {
    println!();
    println!("    {}", style("─".repeat(50)).dim());

    if report.bias_present {
        println!(
            "    {} {}",
            style("✗").red().bold(),
            style(format!(
                "Bias detected (severity {:.1}/10)",
                report.bias_severity_score
            ))
            .red()
            .bold()
        );
        if let Some(driver) = &report.bias_driver {
            println!(
                "      Primary bias driver: {}",
                style(driver).yellow().bold()
            );
        }
    } else {
        println!(
            "    {} {}",
            style("✓").green().bold(),
            style("No bias detected across the audited attributes")
                .green()
                .bold()
        );
    }

    let next = match report.next_step {
        NextStep::BiasMitigation => "bias mitigation",
        NextStep::ModelOptimization => "model optimization",
    };
    println!("      Recommended next step: {}", style(next).cyan());
}

/// One-line summary for a single attribute, used in verbose step output.
pub fn attribute_summary_line(attribute: &str, audit: &AttributeAudit) -> String {
    format!(
        "{}: dpd={:.4} eod={:.4} dir={:.4} severity={:.1}",
        attribute, audit.dpd, audit.eod, audit.dir, audit.severity_score
    )
}
