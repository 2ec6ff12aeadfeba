use crate::config::CheckerConfig;
use crate::core::ExistenceChecker;
use crate::error::{CheckerError, CheckerResult};
use crate::excel::XlsxSheetStore;
use crate::types::{candidate_name, CheckReport, Resolution, RunOutcome};
use colored::Colorize;
use std::path::PathBuf;

/// Execute the check command
///
/// Prints a report (or the JSON outcome) and saves the annotated workbook
/// unless `dry_run` is set or the run ended in an error outcome. The saved
/// file is rebuilt from cell values and formulas, so overwriting the input
/// needs `in_place`.
pub fn check(
    file: PathBuf,
    output: Option<PathBuf>,
    in_place: bool,
    dry_run: bool,
    json: bool,
    config: &CheckerConfig,
) -> CheckerResult<RunOutcome> {
    if !dry_run && output.is_none() && !in_place {
        return Err(CheckerError::Config(format!(
            "refusing to overwrite {}: pass -o <path> or --in-place",
            file.display()
        )));
    }

    let mut store = XlsxSheetStore::new(&file);
    let checker = ExistenceChecker::new(config.clone());
    let outcome = checker.run(&mut store)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", "🔍 sheetcheck - Checking sheet references".bold().green());
        println!("   Workbook: {}", file.display());
        println!("   Manifest: {}", config.sheet_name.bright_blue().bold());
        println!();

        match &outcome {
            RunOutcome::Failed { error_message, .. } => {
                println!("{} {}", "❌".red(), error_message.red());
            }
            RunOutcome::Completed(report) => print_report(report, config),
        }
        println!();
    }

    if let RunOutcome::Completed(_) = &outcome {
        let target = output.unwrap_or(file);
        if dry_run {
            if !json {
                println!("{}", "📋 Dry run - workbook not written".yellow());
            }
        } else {
            store.save_as(&target)?;
            if !json {
                println!("{} {}", "💾 Saved:".green(), target.display());
            }
        }
    }

    Ok(outcome)
}

fn print_report(report: &CheckReport, config: &CheckerConfig) {
    for (i, (row, resolution)) in report
        .sheet_name_list
        .iter()
        .zip(&report.resolutions)
        .enumerate()
    {
        let row_index = config.first_data_row + i as u32;
        let name = candidate_name(row).unwrap_or("");
        match resolution {
            Resolution::FoundVisible => {
                println!("   {} row {:<4} {}", "✅".green(), row_index, name.cyan());
            }
            other => {
                println!(
                    "   {} row {:<4} {} ({})",
                    "⚠️ ".yellow(),
                    row_index,
                    name.bright_red(),
                    other.label()
                );
            }
        }
    }

    let total = report.sheet_name_list.len();
    let failures = report.failure_count();
    println!();
    if failures == 0 {
        println!(
            "{}",
            format!("✅ All {} references resolve to visible sheets", total)
                .bold()
                .green()
        );
    } else {
        println!(
            "{}",
            format!("⚠️  {} of {} references are broken or hidden", failures, total)
                .bold()
                .yellow()
        );
    }
}

/// Print the effective configuration as YAML
pub fn show_config(config: &CheckerConfig) -> CheckerResult<()> {
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
