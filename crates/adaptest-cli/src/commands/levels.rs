//! The `adaptest levels` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use adaptest_core::model::CefrLevel;
use adaptest_core::scoring::score_percentage;

pub fn execute() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Level", "Anchor θ", "Score at anchor", "Band", "Description"]);

    for level in CefrLevel::ALL {
        table.add_row(vec![
            Cell::new(level),
            Cell::new(format!("{:+.1}", level.anchor())),
            Cell::new(format!("{:.1}%", score_percentage(level.anchor()))),
            Cell::new(format!("{:.1}", level.band())),
            Cell::new(level.description()),
        ]);
    }

    println!("{table}");
    Ok(())
}
