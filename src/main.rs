//! Biaslens: Fairness Audit CLI Tool
//!
//! Audits a trained classifier for group-level outcome disparities
//! across one or more sensitive attributes in a labeled tabular dataset.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;

use biaslens::audit::{load_dataset, load_model, run_audit};
use biaslens::cli::Cli;
use biaslens::report::{display_report, save_json_report, ReportDocument};
use biaslens::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_info, print_step_header, print_success,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.audit_config();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&cli.input, &cli.model, &cli.target, &cli.sensitive);

    // Step 1: Load inputs
    print_step_header(1, "Load Inputs");

    let spinner = create_spinner("Loading dataset...");
    let df = load_dataset(&cli.input, cli.infer_schema_length)?;
    finish_with_success(&spinner, "Dataset loaded");

    let (rows, cols) = df.shape();
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);

    let model = load_model(&cli.model)?;
    print_success(&format!("Model loaded ({})", model.model_type));

    // Step 2: Run the audit
    print_step_header(2, "Fairness Audit");

    let audit_start = Instant::now();
    let spinner = create_spinner("Auditing fairness across sensitive attributes...");
    let report = run_audit(&df, &model, &cli.target, &cli.sensitive, &config)?;
    finish_with_success(
        &spinner,
        &format!(
            "Audited {} sensitive attribute(s) in {:.2}s",
            report.sensitive_audit.len(),
            audit_start.elapsed().as_secs_f64()
        ),
    );

    // Step 3: Display and export results
    display_report(&report);

    if let Some(report_path) = &cli.report {
        let document = ReportDocument::new(
            report,
            &cli.input,
            &cli.model,
            &model.model_type,
            &cli.target,
            &config,
        );
        save_json_report(&document, report_path)?;
        print_info(&format!("JSON report written to {}", report_path.display()));
    }

    print_completion();

    Ok(())
}
