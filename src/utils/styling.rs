//! Terminal styling utilities for a modern, visually appealing CLI

use console::{style, Emoji};
use std::path::Path;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static SCALE: Emoji<'_, '_> = Emoji("⚖️  ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static ROBOT: Emoji<'_, '_> = Emoji("🤖 ", "");
pub static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

/// Print the application banner with ASCII art
pub fn print_banner(version: &str) {
    let banner = r#"
    ██████╗ ██╗ █████╗ ███████╗██╗     ███████╗███╗   ██╗███████╗
    ██╔══██╗██║██╔══██╗██╔════╝██║     ██╔════╝████╗  ██║██╔════╝
    ██████╔╝██║███████║███████╗██║     █████╗  ██╔██╗ ██║███████╗
    ██╔══██╗██║██╔══██║╚════██║██║     ██╔══╝  ██║╚██╗██║╚════██║
    ██████╔╝██║██║  ██║███████║███████╗███████╗██║ ╚████║███████║
    ╚═════╝ ╚═╝╚═╝  ╚═╝╚══════╝╚══════╝╚══════╝╚═╝  ╚═══╝╚══════╝
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {} {}",
        style("⚖").magenta().bold(),
        style("Classifier fairness auditing for tabular data").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(dataset: &Path, model: &Path, target: &str, sensitive: &[String]) {
    println!("    {} {}", style("⚙").cyan().bold(), style("Configuration").cyan().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!("      {} Dataset:   {}", FOLDER, truncate_path(dataset, 40));
    println!("      {} Model:     {}", ROBOT, truncate_path(model, 40));
    println!("      {} Target:    {}", TARGET, truncate_string(target, 40));
    println!(
        "      {} Sensitive: {}",
        SCALE,
        style(sensitive.join(", ")).yellow()
    );
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {} {}", WARNING, style(message).yellow());
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Biaslens audit complete!").green().bold()
    );
    println!();
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("...{}", &s[s.len() - max_len + 3..])
    }
}
