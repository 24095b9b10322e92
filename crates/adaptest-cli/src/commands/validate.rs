//! The `adaptest validate` command.

use std::path::PathBuf;

use anyhow::Result;

use adaptest_core::bank::{level_coverage, load_banks, validate_item_bank};
use adaptest_core::model::CefrLevel;

pub fn execute(bank_path: PathBuf, deny_warnings: bool) -> Result<()> {
    let banks = load_banks(&bank_path)?;

    let mut total_warnings = 0;

    for bank in &banks {
        println!("Item bank: {} ({} items)", bank.name, bank.items.len());

        let coverage = level_coverage(bank);
        let counts: Vec<String> = CefrLevel::ALL
            .iter()
            .map(|level| format!("{level}={}", coverage.get(level).copied().unwrap_or(0)))
            .collect();
        println!("  levels: {}", counts.join(" "));

        let warnings = validate_item_bank(bank);
        for w in &warnings {
            let prefix = w
                .item_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if banks.is_empty() {
        println!("No item banks found.");
    } else if total_warnings == 0 {
        println!("All item banks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    if deny_warnings && total_warnings > 0 {
        anyhow::bail!("{total_warnings} validation warning(s)");
    }

    Ok(())
}
