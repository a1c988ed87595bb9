//! The `drillbook progress` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use drillbook_core::report::ProgressReport;
use drillbook_core::traits::{Clock, SystemClock};

use super::{load, GlobalArgs};

pub fn execute(global: &GlobalArgs, format: String) -> Result<()> {
    let loaded = load(global)?;
    let report = ProgressReport::build(
        &loaded.bank,
        &loaded.learner,
        SystemClock.now(),
        loaded.config.progress_bar_width,
    )?;

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => print_table(&report),
    }

    Ok(())
}

fn print_table(report: &ProgressReport) {
    println!("Progress on all tags for {}", report.learner);

    let mut table = Table::new();
    table.set_header(vec!["Tag", "Percent Mastery", "Progress Bar", "Questions", "Due"]);
    for row in &report.rows {
        table.add_row(vec![
            Cell::new(&row.tag),
            Cell::new(format!("{}%", row.percent)),
            Cell::new(&row.bar),
            Cell::new(row.questions),
            Cell::new(row.due),
        ]);
    }
    println!("{table}");
    println!("Overall mastery: {}%", report.overall_percent);
}
