//! User-facing progress lines with severity colours
//!
//! Everything the operator watches during a run goes through here. Diagnostic
//! detail goes to `tracing` instead.

use crate::checkpoint::{Finding, FindingCategory};
use crate::crawler::RunStats;
use crate::output::tally::TallyReport;
use crate::state::FinishReason;
use crate::NavigationError;
use colored::Colorize;
use url::Url;

/// Informational step ("Loading files...")
pub fn notice(message: &str) {
    println!("{}", message.cyan());
}

/// Fatal or terminal condition
pub fn alert(message: &str) {
    println!("{}", message.red());
}

pub fn login_succeeded() {
    println!("\t{}", "Success".green());
}

pub fn login_failed(error: &dyn std::fmt::Display) {
    println!("\t{}", error.to_string().red());
}

pub fn checking(url: &Url) {
    println!("{}{} ...", "Checking ".cyan(), url);
}

/// One line per finding, as soon as it is seen
pub fn finding(finding: &Finding) {
    match finding.category {
        FindingCategory::Blockable => println!("\t{}{}", "Blockable: ".red(), finding.detail),
        FindingCategory::OptionallyBlockable => {
            println!("\t{}{}", "Optionally Blockable: ".yellow(), finding.detail)
        }
        FindingCategory::UnpublishedPage => println!("\t{}", "Unpublished Page".yellow()),
        FindingCategory::Error => println!("\t{}", finding.detail.red()),
    }
}

pub fn page_ok() {
    println!("\t{}", "OK".green());
}

pub fn page_failed(error: &NavigationError) {
    println!("\t{}", error.to_string().red());
}

/// Prints the run summary
pub fn print_summary(stats: &RunStats, reason: FinishReason) {
    println!();
    println!("{}", "Summary".cyan());
    if reason != FinishReason::Completed {
        println!("Run ended early: {}", reason);
    }
    println!("Targets checked: {}", stats.checked);
    println!("\tsuccess: {}", stats.success);
    println!("\tfailure: {}", stats.failure);
    println!("\tunpublished: {}", stats.unpublished);
    println!("Blockable content: {}", stats.blockable);
    println!("Optionally blockable content: {}", stats.optionally_blockable);
    println!(
        "Started {} ({:.1}s, {:.2} targets/sec)",
        stats.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        stats.elapsed().as_secs_f64(),
        stats.rate()
    );
}

/// Prints the grand totals of a tally
pub fn print_tally_totals(report: &TallyReport) {
    let totals = report.totals();
    println!("{}", "Tally".cyan());
    println!("Pages: {}", report.len());
    println!("\tpublished: {}", totals.published);
    println!("\tunpublished: {}", totals.unpublished);
    println!("\terrors: {}", totals.errors);
    println!("Blockable content: {}", totals.blockable);
    println!("Optionally blockable content: {}", totals.optionally_blockable);
}
